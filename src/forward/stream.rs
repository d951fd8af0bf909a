//! Server-streaming response forwarding.
//!
//! # States
//! ```text
//! INIT ──first recv: failure──────────────▶ DONE (whole error response, mapped status)
//!  │
//!  ├──first recv: end-of-stream──▶ commit 200 + chunked, empty body ──▶ DONE
//!  │
//!  └──first recv: message──▶ commit 200 + chunked, write chunk ──▶ STREAMING
//!
//! STREAMING ──recv: message──▶ write chunk, stay
//!           ──recv: end──────▶ DONE
//!           ──recv: failure──▶ write `{"error": ...}` chunk ──▶ DONE (status stays 200)
//! ```
//!
//! Every chunk is `marshal(envelope) + delimiter` followed by a flush.

use std::io;

use axum::http::{header, HeaderValue, Request, StatusCode};
use serde::Serialize;

use crate::codec::{delimiter_of, Codec, CodecError};
use crate::error::GatewayError;
use crate::errors::envelope::{StreamError, StreamErrorEnvelope, FALLBACK_BODY};
use crate::errors::http_error;
use crate::forward::{ForwardContext, ForwardOptions, ResultEnvelope};
use crate::http::ResponseSink;
use crate::observability::metrics;
use crate::rpc::Code;

/// How a forwarded stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The source reached end-of-stream.
    Completed,
    /// The very first outcome was a failure; a whole error response was sent.
    Rejected(StatusCode),
    /// A failure after the head was committed, reported in-band.
    Failed(Code),
    /// The client stopped accepting bytes.
    Disconnected,
}

impl StreamEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamEnd::Completed => "completed",
            StreamEnd::Rejected(_) => "rejected",
            StreamEnd::Failed(_) => "failed",
            StreamEnd::Disconnected => "disconnected",
        }
    }
}

/// Result of one `forward_response_stream` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Success chunks delivered to the sink.
    pub messages: usize,
    pub end: StreamEnd,
}

enum ChunkError {
    Encoding(CodecError),
    Sink(io::Error),
}

/// Drive `recv` until a terminal outcome, writing a chunked response.
///
/// `recv` yields `Ok(Some(msg))` for a message, `Ok(None)` at end-of-stream
/// and `Err(e)` on failure. It is never called again after a terminal outcome.
pub fn forward_response_stream<C, S, B, M, E, F>(
    ctx: &ForwardContext,
    opts: &ForwardOptions,
    codec: &C,
    sink: &mut S,
    req: &Request<B>,
    mut recv: F,
) -> StreamSummary
where
    C: Codec,
    S: ResponseSink,
    M: Serialize,
    E: Into<GatewayError>,
    F: FnMut() -> Result<Option<M>, E>,
{
    let delimiter = delimiter_of(codec);

    let mut next = match recv() {
        Ok(outcome) => outcome,
        Err(err) => {
            let err = err.into();
            tracing::debug!(
                request_id = %ctx.request_id(),
                error = %err,
                "Stream failed before the first message"
            );
            let status = http_error(ctx, opts, codec, sink, req, &err);
            return finish(ctx, req, 0, StreamEnd::Rejected(status));
        }
    };

    if let Err(e) = commit_head(ctx, opts, codec, sink) {
        tracing::debug!(request_id = %ctx.request_id(), error = %e, "Client went away before the head");
        return finish(ctx, req, 0, StreamEnd::Disconnected);
    }

    let mut delivered = 0;
    while let Some(message) = next.take() {
        match write_chunk(codec, sink, &ResultEnvelope { result: &message }, delimiter) {
            Ok(()) => {
                delivered += 1;
                metrics::record_stream_message();
            }
            Err(ChunkError::Encoding(e)) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    error = %e,
                    "Failed to marshal stream message"
                );
                let end = write_stream_error(ctx, codec, sink, &GatewayError::Encoding(e), delimiter);
                return finish(ctx, req, delivered, end);
            }
            Err(ChunkError::Sink(e)) => {
                tracing::debug!(request_id = %ctx.request_id(), error = %e, "Client went away mid-stream");
                return finish(ctx, req, delivered, StreamEnd::Disconnected);
            }
        }

        next = match recv() {
            Ok(outcome) => outcome,
            Err(err) => {
                let end = write_stream_error(ctx, codec, sink, &err.into(), delimiter);
                return finish(ctx, req, delivered, end);
            }
        };
    }

    finish(ctx, req, delivered, StreamEnd::Completed)
}

/// Commit 200 with chunked transfer and the codec's content type.
fn commit_head<C: Codec, S: ResponseSink>(
    ctx: &ForwardContext,
    opts: &ForwardOptions,
    codec: &C,
    sink: &mut S,
) -> io::Result<()> {
    let content_type = opts.content_type_for(codec);
    let headers = sink.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
    ctx.merge_metadata(opts, headers, false);
    sink.write_head(StatusCode::OK)
}

fn write_chunk<C, S, T>(codec: &C, sink: &mut S, value: &T, delimiter: &[u8]) -> Result<(), ChunkError>
where
    C: Codec,
    S: ResponseSink,
    T: Serialize + ?Sized,
{
    let payload = codec.marshal(value).map_err(ChunkError::Encoding)?;
    write_framed(sink, &payload, delimiter).map_err(ChunkError::Sink)
}

fn write_framed<S: ResponseSink>(sink: &mut S, payload: &[u8], delimiter: &[u8]) -> io::Result<()> {
    sink.write(payload)?;
    sink.write(delimiter)?;
    sink.flush()
}

/// Report a failure in-band after the head is committed.
fn write_stream_error<C: Codec, S: ResponseSink>(
    ctx: &ForwardContext,
    codec: &C,
    sink: &mut S,
    err: &GatewayError,
    delimiter: &[u8],
) -> StreamEnd {
    let stream_err = StreamError::from_error(err);
    tracing::debug!(
        request_id = %ctx.request_id(),
        code = %err.code(),
        error = %err,
        "Stream failed after headers were sent, reporting in-band"
    );

    let payload = match codec.marshal(&StreamErrorEnvelope { error: &stream_err }) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(
                request_id = %ctx.request_id(),
                error = %e,
                "Failed to marshal stream error, sending fallback"
            );
            FALLBACK_BODY.as_bytes().to_vec()
        }
    };

    match write_framed(sink, &payload, delimiter) {
        Ok(()) => StreamEnd::Failed(err.code()),
        Err(e) => {
            tracing::debug!(request_id = %ctx.request_id(), error = %e, "Client went away before the error chunk");
            StreamEnd::Disconnected
        }
    }
}

fn finish<B>(ctx: &ForwardContext, req: &Request<B>, messages: usize, end: StreamEnd) -> StreamSummary {
    tracing::debug!(
        request_id = %ctx.request_id(),
        method = %req.method(),
        path = %req.uri().path(),
        messages,
        outcome = end.as_str(),
        "Stream finished"
    );
    metrics::record_stream_end(end.as_str());
    StreamSummary { messages, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::http::ResponseRecorder;
    use crate::rpc::Status;
    use serde_json::json;

    fn run(
        rec: &mut ResponseRecorder,
        outcomes: Vec<Result<Option<serde_json::Value>, Status>>,
    ) -> (StreamSummary, usize) {
        let req = Request::builder().uri("/stream").body(()).unwrap();
        let mut outcomes = outcomes.into_iter();
        let mut calls = 0;
        let summary = forward_response_stream(
            &ForwardContext::new("t"),
            &ForwardOptions::default(),
            &JsonCodec::new(),
            rec,
            &req,
            || {
                calls += 1;
                outcomes.next().unwrap_or(Ok(None))
            },
        );
        (summary, calls)
    }

    #[test]
    fn test_each_chunk_is_flushed() {
        let mut rec = ResponseRecorder::new();
        let (summary, calls) = run(
            &mut rec,
            vec![Ok(Some(json!({"id": 1}))), Ok(Some(json!({"id": 2}))), Ok(None)],
        );

        assert_eq!(summary, StreamSummary { messages: 2, end: StreamEnd::Completed });
        assert_eq!(calls, 3);
        assert_eq!(rec.flushes(), 2);
        assert_eq!(rec.body_string(), "{\"result\":{\"id\":1}}\n{\"result\":{\"id\":2}}\n");
    }

    #[test]
    fn test_disconnect_stops_receiving() {
        let mut rec = ResponseRecorder::disconnect_after(3);
        let (summary, calls) = run(
            &mut rec,
            vec![
                Ok(Some(json!(1))),
                Ok(Some(json!(2))),
                Ok(Some(json!(3))),
                Ok(None),
            ],
        );

        assert_eq!(summary.end, StreamEnd::Disconnected);
        assert_eq!(summary.messages, 1);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_failure_end_reports_code() {
        let mut rec = ResponseRecorder::new();
        let (summary, _) = run(
            &mut rec,
            vec![Ok(Some(json!(1))), Err(Status::unavailable("backend gone"))],
        );
        assert_eq!(summary.end, StreamEnd::Failed(Code::Unavailable));
        assert_eq!(rec.status(), StatusCode::OK);
    }
}
