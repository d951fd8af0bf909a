//! Error translation subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayError (status / transport / encoding)
//!     → envelope.rs (ErrorBody for whole responses, StreamError for in-band chunks)
//!     → writer.rs (status mapping, codec, single header + body write)
//!     → ResponseSink
//! ```
//!
//! # Design Decisions
//! - Building an envelope never fails
//! - The error path has its own fallback body so it can never be unhandleable
//! - Success and error payloads use distinct top-level keys (`result` / `error`)

pub mod envelope;
pub mod writer;

pub use envelope::{ErrorBody, StreamError, StreamErrorEnvelope, FALLBACK_BODY};
pub use writer::http_error;
