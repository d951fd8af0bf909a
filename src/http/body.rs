//! Bridge from the synchronous forwarding core to axum streaming bodies.
//!
//! # Data Flow
//! ```text
//! spawn_blocking worker                      request task
//!   forwarder ─▶ ChannelSink                   PendingResponse
//!                 write_head ──oneshot──▶        head (status + headers)
//!                 flush      ──mpsc────▶         Body::from_stream
//! ```
//!
//! # Design Decisions
//! - Writes are buffered until `flush`, so one flush is one body frame
//! - A closed body channel (client gone) turns into `BrokenPipe` on flush
//! - `Transfer-Encoding` is dropped from the head: hyper frames the body itself

use std::convert::Infallible;
use std::io;
use std::mem;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::sync::{mpsc, oneshot};

use crate::http::sink::ResponseSink;

type Head = (StatusCode, HeaderMap);

/// `ResponseSink` that hands its output to an async response.
#[derive(Debug)]
pub struct ChannelSink {
    staged: HeaderMap,
    head_tx: Option<oneshot::Sender<Head>>,
    body_tx: mpsc::Sender<Bytes>,
    pending: Vec<u8>,
}

/// Receiving half of a `ChannelSink`.
#[derive(Debug)]
pub struct PendingResponse {
    head_rx: oneshot::Receiver<Head>,
    body_rx: mpsc::Receiver<Bytes>,
}

impl ChannelSink {
    /// Create a sink whose body channel holds up to `capacity` flushed chunks.
    pub fn channel(capacity: usize) -> (Self, PendingResponse) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(capacity.max(1));
        let sink = Self {
            staged: HeaderMap::new(),
            head_tx: Some(head_tx),
            body_tx,
            pending: Vec::new(),
        };
        (sink, PendingResponse { head_rx, body_rx })
    }

    /// Flush what is still buffered and close the body.
    ///
    /// Must be called from a thread that may block (not an async task).
    pub fn finish(mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.flush()?;
        }
        Ok(())
    }
}

fn disconnected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "client disconnected")
}

impl ResponseSink for ChannelSink {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.staged
    }

    fn write_head(&mut self, status: StatusCode) -> io::Result<()> {
        let Some(tx) = self.head_tx.take() else {
            tracing::warn!(status = %status, "Superfluous write_head ignored");
            return Ok(());
        };
        tx.send((status, self.staged.clone()))
            .map_err(|_| disconnected())
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        if self.head_tx.is_some() {
            self.write_head(StatusCode::OK)?;
        }
        self.pending.extend_from_slice(chunk);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.body_tx.is_closed() {
            return Err(disconnected());
        }
        if self.pending.is_empty() {
            return Ok(());
        }
        let chunk = Bytes::from(mem::take(&mut self.pending));
        self.body_tx
            .blocking_send(chunk)
            .map_err(|_| disconnected())
    }

    fn is_committed(&self) -> bool {
        self.head_tx.is_none()
    }
}

impl PendingResponse {
    /// Wait for the head and build a response streaming the body chunks.
    pub async fn into_response(self) -> Response {
        let Ok((status, mut headers)) = self.head_rx.await else {
            tracing::error!("Response sink dropped without writing a head");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };
        headers.remove(header::TRANSFER_ENCODING);

        let chunks = futures_util::stream::unfold(self.body_rx, |mut rx| async move {
            rx.recv()
                .await
                .map(|chunk| (Ok::<_, Infallible>(chunk), rx))
        });

        let mut response = Response::new(Body::from_stream(chunks));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// Run `write` against a fresh `ChannelSink` on the blocking pool and return
/// the streaming response it produces.
pub async fn stream_response<F>(capacity: usize, write: F) -> Response
where
    F: FnOnce(&mut ChannelSink) + Send + 'static,
{
    let (mut sink, pending) = ChannelSink::channel(capacity);
    let _worker = tokio::task::spawn_blocking(move || {
        write(&mut sink);
        if let Err(e) = sink.finish() {
            tracing::debug!(error = %e, "Response body dropped before completion");
        }
    });
    pending.into_response().await
}
