//! HTTP response sink abstraction.
//!
//! # Responsibilities
//! - Stage headers until the response head is committed
//! - Commit status + headers exactly once
//! - Accept body bytes and explicit flushes for incremental delivery
//!
//! # Design Decisions
//! - Writing a body byte before `write_head` commits a 200 head implicitly
//! - A second `write_head` is ignored: the head on the wire cannot change
//! - I/O errors surface as `std::io::Error` (client gone, channel closed)

use std::io;

use axum::http::{HeaderMap, StatusCode};

/// Destination of one HTTP response, owned exclusively by one request.
pub trait ResponseSink {
    /// Headers that will be sent with the head. Changes after commit are not sent.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status line and staged headers.
    fn write_head(&mut self, status: StatusCode) -> io::Result<()>;

    /// Append bytes to the body.
    fn write(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Push everything written so far towards the client.
    fn flush(&mut self) -> io::Result<()>;

    /// Whether the head has been committed.
    fn is_committed(&self) -> bool;
}
