//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → echo.rs (in-process RPC stand-in, builds ForwardContext)
//!     → Gateway::serve_unary → recorder.rs (buffered response)
//!     → Gateway::serve_stream → body.rs (ChannelSink → streaming body)
//!     → Send to client
//! ```

pub mod body;
pub mod echo;
pub mod recorder;
pub mod server;
pub mod sink;

pub use body::{stream_response, ChannelSink, PendingResponse};
pub use recorder::ResponseRecorder;
pub use server::{shutdown_signal, HttpServer};
pub use sink::ResponseSink;
