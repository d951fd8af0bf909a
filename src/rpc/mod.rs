//! RPC status model subsystem.
//!
//! # Data Flow
//! ```text
//! RPC call fails
//!     → status.rs (Status: canonical Code + message + details)
//!     → mapping.rs (Code → HTTP StatusCode)
//!     → errors::envelope (serializable error payload)
//!
//! RPC call succeeds with metadata
//!     → metadata.rs (ServerMetadata: header/trailer maps)
//!     → merged into HTTP headers before the first write
//! ```
//!
//! # Design Decisions
//! - Codes are transport independent; HTTP status is derived, never stored
//! - Unknown numeric codes collapse to `Code::Unknown` instead of failing
//! - Mapping is a total pure function

pub mod code;
pub mod mapping;
pub mod metadata;
pub mod status;

pub use code::Code;
pub use mapping::http_status_from_code;
pub use metadata::ServerMetadata;
pub use status::Status;
