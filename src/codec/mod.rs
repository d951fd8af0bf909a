//! Pluggable wire encoding subsystem.
//!
//! # Data Flow
//! ```text
//! RPC response message / error envelope
//!     → Codec::marshal (bytes)
//!     → Codec::content_type (Content-Type header)
//!     → Codec::delimited (optional: bytes between stream chunks)
//!     → HTTP response sink
//! ```
//!
//! # Design Decisions
//! - Codecs are `Send + Sync` and shared read-only across requests
//! - The delimiter is a separate capability, probed per request; codecs
//!   without it get `DEFAULT_DELIMITER`
//! - Encoding problems are `CodecError` values, never panics

pub mod json;

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use json::JsonCodec;

/// Boxed error used for failures coming from arbitrary collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Delimiter written after each stream chunk when a codec has none of its own.
pub const DEFAULT_DELIMITER: &[u8] = b"\n";

/// Errors produced while encoding or decoding a value.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode value: {0}")]
    Encode(#[source] BoxError),

    #[error("failed to decode value: {0}")]
    Decode(#[source] BoxError),
}

impl CodecError {
    pub fn encode(err: impl Into<BoxError>) -> Self {
        Self::Encode(err.into())
    }

    pub fn decode(err: impl Into<BoxError>) -> Self {
        Self::Decode(err.into())
    }
}

/// Serialization strategy between in-memory values and wire bytes.
pub trait Codec: Send + Sync {
    /// MIME type of the bytes produced by `marshal`.
    fn content_type(&self) -> Cow<'_, str>;

    /// Encode a value.
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode a value.
    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError>;

    /// Capability probe for stream delimiting. `None` if the codec has no
    /// opinion on how stream chunks are separated.
    fn delimited(&self) -> Option<&dyn Delimited> {
        None
    }
}

/// Optional codec capability: bytes written between consecutive stream chunks.
pub trait Delimited {
    fn delimiter(&self) -> &[u8];
}

/// Resolve the delimiter to use with `codec` for one stream.
pub fn delimiter_of<C: Codec + ?Sized>(codec: &C) -> &[u8] {
    match codec.delimited() {
        Some(d) => d.delimiter(),
        None => DEFAULT_DELIMITER,
    }
}
