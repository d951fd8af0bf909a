//! Process-wide forwarding options.

use axum::http::HeaderValue;

use crate::codec::Codec;
use crate::config::GatewayConfig;

const DEFAULT_CONTENT_TYPE: &str = "application/json";
const DEFAULT_METADATA_PREFIX: &str = "Grpc-Metadata-";
const DEFAULT_TRAILER_PREFIX: &str = "Grpc-Trailer-";
const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Immutable options shared by every request the gateway serves.
#[derive(Debug, Clone)]
pub struct ForwardOptions {
    fallback_content_type: HeaderValue,
    metadata_header_prefix: String,
    trailer_header_prefix: String,
    channel_capacity: usize,
}

impl ForwardOptions {
    /// Build options from validated configuration. Values that still fail to
    /// convert keep their defaults.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let defaults = Self::default();
        Self {
            fallback_content_type: HeaderValue::from_str(&config.errors.fallback_content_type)
                .unwrap_or(defaults.fallback_content_type),
            metadata_header_prefix: config.metadata.header_prefix.clone(),
            trailer_header_prefix: config.metadata.trailer_prefix.clone(),
            channel_capacity: config.stream.channel_capacity.max(1),
        }
    }

    pub fn fallback_content_type(&self) -> &HeaderValue {
        &self.fallback_content_type
    }

    pub fn metadata_header_prefix(&self) -> &str {
        &self.metadata_header_prefix
    }

    pub fn trailer_header_prefix(&self) -> &str {
        &self.trailer_header_prefix
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Content type to send for `codec`, or the fallback when the codec's
    /// answer cannot be used as a header value.
    pub fn content_type_for<C: Codec>(&self, codec: &C) -> HeaderValue {
        let content_type = codec.content_type();
        if content_type.is_empty() {
            return self.fallback_content_type.clone();
        }
        HeaderValue::from_str(&content_type).unwrap_or_else(|_| {
            tracing::warn!(
                content_type = %content_type,
                "Codec content type is not a valid header value, using fallback"
            );
            self.fallback_content_type.clone()
        })
    }
}

impl Default for ForwardOptions {
    fn default() -> Self {
        Self {
            fallback_content_type: HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            metadata_header_prefix: DEFAULT_METADATA_PREFIX.to_string(),
            trailer_header_prefix: DEFAULT_TRAILER_PREFIX.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, JsonCodec};
    use serde::{de::DeserializeOwned, Serialize};
    use std::borrow::Cow;

    struct BadTypeCodec(&'static str);

    impl Codec for BadTypeCodec {
        fn content_type(&self) -> Cow<'_, str> {
            Cow::Borrowed(self.0)
        }

        fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
            serde_json::to_vec(value).map_err(CodecError::encode)
        }

        fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
            serde_json::from_slice(data).map_err(CodecError::decode)
        }
    }

    #[test]
    fn test_codec_content_type_used() {
        let opts = ForwardOptions::default();
        assert_eq!(opts.content_type_for(&JsonCodec::new()), "application/json");
        assert_eq!(opts.content_type_for(&BadTypeCodec("text/plain")), "text/plain");
    }

    #[test]
    fn test_unusable_content_type_falls_back() {
        let opts = ForwardOptions::default();
        assert_eq!(opts.content_type_for(&BadTypeCodec("")), "application/json");
        assert_eq!(
            opts.content_type_for(&BadTypeCodec("bad\nvalue")),
            "application/json"
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = GatewayConfig::default();
        config.errors.fallback_content_type = "text/plain".into();
        config.metadata.header_prefix = "X-Md-".into();
        config.stream.channel_capacity = 0;

        let opts = ForwardOptions::from_config(&config);
        assert_eq!(opts.fallback_content_type(), "text/plain");
        assert_eq!(opts.metadata_header_prefix(), "X-Md-");
        assert_eq!(opts.trailer_header_prefix(), "Grpc-Trailer-");
        assert_eq!(opts.channel_capacity(), 1);
    }
}
