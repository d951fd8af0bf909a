//! In-memory response sink.
//!
//! Records what a handler wrote so it can be inspected afterwards: the
//! committed head, the body, and how many head/body writes and flushes
//! happened. Can simulate a client that disconnects mid-response.

use std::io;

use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::sink::ResponseSink;

#[derive(Debug, Default)]
pub struct ResponseRecorder {
    staged: HeaderMap,
    head: Option<(StatusCode, HeaderMap)>,
    body: Vec<u8>,
    head_writes: usize,
    body_writes: usize,
    flushes: usize,
    /// Fail every body write/flush after this many successful body writes.
    disconnect_after: Option<usize>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a client that goes away after `writes` body writes.
    pub fn disconnect_after(writes: usize) -> Self {
        Self {
            disconnect_after: Some(writes),
            ..Self::default()
        }
    }

    /// Committed status. A response nobody wrote to reads as 200.
    pub fn status(&self) -> StatusCode {
        self.head
            .as_ref()
            .map(|(status, _)| *status)
            .unwrap_or(StatusCode::OK)
    }

    /// Headers as committed with the head (empty before commit).
    pub fn headers(&self) -> HeaderMap {
        self.head
            .as_ref()
            .map(|(_, headers)| headers.clone())
            .unwrap_or_default()
    }

    /// Single committed header value as a string.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head
            .as_ref()
            .and_then(|(_, headers)| headers.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn head_writes(&self) -> usize {
        self.head_writes
    }

    pub fn body_writes(&self) -> usize {
        self.body_writes
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    fn check_connected(&self) -> io::Result<()> {
        match self.disconnect_after {
            Some(limit) if self.body_writes >= limit => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "client disconnected",
            )),
            _ => Ok(()),
        }
    }
}

impl ResponseSink for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.staged
    }

    fn write_head(&mut self, status: StatusCode) -> io::Result<()> {
        if self.head.is_some() {
            tracing::warn!(status = %status, "Superfluous write_head ignored");
            return Ok(());
        }
        self.head_writes += 1;
        self.head = Some((status, self.staged.clone()));
        Ok(())
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        if self.head.is_none() {
            self.write_head(StatusCode::OK)?;
        }
        self.check_connected()?;
        self.body_writes += 1;
        self.body.extend_from_slice(chunk);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_connected()?;
        self.flushes += 1;
        Ok(())
    }

    fn is_committed(&self) -> bool {
        self.head.is_some()
    }
}

/// Turn a fully written recording into an axum response.
impl IntoResponse for ResponseRecorder {
    fn into_response(self) -> Response {
        let (status, mut headers) = self.head.unwrap_or((StatusCode::OK, self.staged));
        headers.remove(header::TRANSFER_ENCODING);

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
