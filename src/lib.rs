//! REST gateway response forwarding.
//!
//! Turns the outcome of an RPC call (a unary message, a server stream, or an
//! error) into an HTTP response.
//!
//! # Architecture Overview
//!
//! ```text
//!     RPC outcome                          HTTP response
//!   ──────────────┐                      ┌──────────────▶
//!                 ▼                      │
//!         ┌──────────────┐    ┌──────────┴───┐
//!         │   forward    │───▶│ ResponseSink │  recorder (buffered)
//!         │ message/stream│   │              │  body (streaming, axum)
//!         └──────┬───────┘    └──────────────┘
//!                │ failures before the first byte
//!                ▼
//!         ┌──────────────┐    ┌──────────────┐
//!         │    errors    │───▶│ rpc::mapping │  RPC code → HTTP status
//!         │ http_error   │    └──────────────┘
//!         └──────────────┘
//!
//!   codec: content type, marshal, stream delimiter
//!   config / observability: cross-cutting
//! ```

// Core
pub mod codec;
pub mod error;
pub mod errors;
pub mod forward;
pub mod rpc;

// Serving
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use codec::{Codec, Delimited, JsonCodec};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use errors::http_error;
pub use forward::{
    forward_response_message, forward_response_stream, ForwardContext, ForwardOptions, Gateway,
    StreamEnd, StreamSummary,
};
pub use http::{HttpServer, ResponseRecorder, ResponseSink};
pub use rpc::{Code, ServerMetadata, Status};
