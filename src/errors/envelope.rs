//! Serializable error payloads.

use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::rpc::{http_status_from_code, Status};

/// Body written when the codec cannot even encode the error payload.
pub const FALLBACK_BODY: &str = r#"{"error": "failed to marshal error message"}"#;

/// Payload of a complete (non-streamed) error response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Canonical RPC code.
    pub code: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
}

impl ErrorBody {
    pub fn from_status(status: &Status) -> Self {
        Self {
            error: status.message().to_string(),
            code: status.code().as_i32(),
            details: status.details().to_vec(),
        }
    }

    pub fn from_error(err: &GatewayError) -> Self {
        Self::from_status(&err.to_status())
    }
}

/// Error reported in-band once a stream has already committed its headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamError {
    pub grpc_code: i32,
    pub http_code: u16,
    pub message: String,
    pub http_status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
}

impl StreamError {
    pub fn from_status(status: &Status) -> Self {
        let http = http_status_from_code(status.code());
        Self {
            grpc_code: status.code().as_i32(),
            http_code: http.as_u16(),
            message: status.message().to_string(),
            http_status: http.canonical_reason().unwrap_or_default().to_string(),
            details: status.details().to_vec(),
        }
    }

    pub fn from_error(err: &GatewayError) -> Self {
        Self::from_status(&err.to_status())
    }
}

/// `{"error": StreamError}` container for in-band stream errors.
#[derive(Debug, Serialize)]
pub struct StreamErrorEnvelope<'a> {
    pub error: &'a StreamError,
}
