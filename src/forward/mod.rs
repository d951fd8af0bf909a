//! Response forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch layer (external)
//!     → context.rs (request ID, server metadata)
//!     → message.rs (unary success) | stream.rs (receive loop)
//!         → codec (marshal `{"result": ...}` / `{"error": ...}`)
//!         → errors::writer (failures before the first byte)
//!     → ResponseSink (http::recorder in memory, http::body for axum)
//! ```
//!
//! # Design Decisions
//! - Strictly synchronous per request; the only blocking point is `recv`
//! - Failures before the head is committed choose the HTTP status
//! - Failures after the head is committed are sent in-band; status stays 200
//! - Codec and options are immutable values shared by all requests (gateway.rs)

pub mod context;
pub mod gateway;
pub mod message;
pub mod options;
pub mod stream;

use serde::Serialize;

pub use context::{ForwardContext, X_REQUEST_ID};
pub use gateway::Gateway;
pub use message::forward_response_message;
pub use options::ForwardOptions;
pub use stream::{forward_response_stream, StreamEnd, StreamSummary};

/// `{"result": message}` container for successful stream elements.
#[derive(Debug, Serialize)]
pub struct ResultEnvelope<'a, M: ?Sized> {
    pub result: &'a M,
}
