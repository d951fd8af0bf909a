//! Failures that can reach the response forwarding layer.

use thiserror::Error;

use crate::codec::{BoxError, CodecError};
use crate::rpc::{Code, Status};

/// A failure produced while serving one request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The RPC layer reported a canonical status.
    #[error("{0}")]
    Status(#[from] Status),

    /// The receive source failed without a canonical status.
    #[error("{0}")]
    Transport(#[source] BoxError),

    /// A value could not be encoded or decoded.
    #[error("{0}")]
    Encoding(#[from] CodecError),
}

impl GatewayError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Canonical code of this failure. Anything that did not come from the
    /// RPC layer is `Internal`.
    pub fn code(&self) -> Code {
        match self {
            GatewayError::Status(status) => status.code(),
            _ => Code::Internal,
        }
    }

    /// Status representation of this failure. Never fails.
    pub fn to_status(&self) -> Status {
        match self {
            GatewayError::Status(status) => status.clone(),
            other => Status::new(Code::Internal, other.to_string()),
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}
