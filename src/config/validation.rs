//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacities > 0)
//! - Check that header-related strings are usable on the wire
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: '{value}' is not a valid header value")]
    InvalidHeaderValue { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid header name prefix")]
    InvalidHeaderPrefix { field: &'static str, value: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }

    if config.stream.channel_capacity == 0 {
        errors.push(ValidationError::Zero {
            field: "stream.channel_capacity",
        });
    }

    let content_type = &config.errors.fallback_content_type;
    if content_type.is_empty() || HeaderValue::from_str(content_type).is_err() {
        errors.push(ValidationError::InvalidHeaderValue {
            field: "errors.fallback_content_type",
            value: content_type.clone(),
        });
    }

    for (field, prefix) in [
        ("metadata.header_prefix", &config.metadata.header_prefix),
        ("metadata.trailer_prefix", &config.metadata.trailer_prefix),
    ] {
        if !is_header_prefix(prefix) {
            errors.push(ValidationError::InvalidHeaderPrefix {
                field,
                value: prefix.clone(),
            });
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A prefix is usable when prefix + any header name is still a header name.
fn is_header_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && HeaderName::from_bytes(prefix.as_bytes()).is_ok()
}
