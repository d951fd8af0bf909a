//! JSON codec backed by serde_json.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{Codec, CodecError, Delimited};
use crate::config::CodecConfig;

/// JSON encoding with newline-delimited streams.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    /// Emit indented output instead of compact output.
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            pretty: config.pretty,
        }
    }
}

impl Codec for JsonCodec {
    fn content_type(&self) -> Cow<'_, str> {
        Cow::Borrowed("application/json")
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        encoded.map_err(CodecError::encode)
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(data).map_err(CodecError::decode)
    }

    fn delimited(&self) -> Option<&dyn Delimited> {
        Some(self)
    }
}

impl Delimited for JsonCodec {
    fn delimiter(&self) -> &[u8] {
        b"\n"
    }
}
