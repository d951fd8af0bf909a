//! Complete HTTP error responses for a single failure.
//!
//! # Responsibilities
//! - Pick the HTTP status from the failure's canonical code
//! - Encode the error body with the request's codec
//! - Fall back to a fixed JSON body (and 500) when that encoding fails
//! - Write exactly one head and one body
//!
//! # Design Decisions
//! - The content type is read from the codec after encoding the body, so
//!   codecs that tailor it to the payload are honoured
//! - Encoding failures on this path are logged, never sent as a second error

use axum::http::{header, Request, StatusCode};

use crate::codec::Codec;
use crate::error::GatewayError;
use crate::errors::envelope::{ErrorBody, FALLBACK_BODY};
use crate::forward::{ForwardContext, ForwardOptions};
use crate::http::ResponseSink;
use crate::observability::metrics;
use crate::rpc::http_status_from_code;

/// Write a whole HTTP error response for `err`. Returns the status written.
pub fn http_error<C, S, B>(
    ctx: &ForwardContext,
    opts: &ForwardOptions,
    codec: &C,
    sink: &mut S,
    req: &Request<B>,
    err: &GatewayError,
) -> StatusCode
where
    C: Codec,
    S: ResponseSink,
{
    let status = err.to_status();
    let body = ErrorBody::from_status(&status);

    let (http_status, content_type, payload) = match codec.marshal(&body) {
        Ok(payload) => (
            http_status_from_code(status.code()),
            opts.content_type_for(codec),
            payload,
        ),
        Err(marshal_err) => {
            tracing::warn!(
                request_id = %ctx.request_id(),
                error = %marshal_err,
                "Failed to marshal error body, sending fallback"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                opts.fallback_content_type().clone(),
                FALLBACK_BODY.as_bytes().to_vec(),
            )
        }
    };

    let headers = sink.headers_mut();
    headers.remove(header::TRAILER);
    headers.insert(header::CONTENT_TYPE, content_type);
    ctx.merge_metadata(opts, headers, true);

    tracing::debug!(
        request_id = %ctx.request_id(),
        method = %req.method(),
        path = %req.uri().path(),
        code = %status.code(),
        status = http_status.as_u16(),
        "Writing error response"
    );
    metrics::record_error_response(http_status.as_u16());

    if let Err(e) = sink
        .write_head(http_status)
        .and_then(|_| sink.write(&payload))
    {
        tracing::debug!(
            request_id = %ctx.request_id(),
            error = %e,
            "Client went away while writing error response"
        );
    }

    http_status
}
