//! In-process echo service standing in for an RPC backend.
//!
//! # Routes
//! - `GET /v1/echo/{message}`: unary echo, `?code=<n>` fails with that code
//! - `GET /v1/echo/{message}/stream?count=N&fail_after=K&code=C`: server
//!   stream of `N` replies, failing with `C` after `K` replies when set

use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::codec::JsonCodec;
use crate::forward::{ForwardContext, Gateway};
use crate::rpc::{Code, ServerMetadata, Status};

/// Replies per stream when `count` is absent.
const DEFAULT_COUNT: u32 = 3;

pub type AppState = Arc<Gateway<JsonCodec>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EchoParams {
    pub code: Option<i32>,
    pub count: Option<u32>,
    pub fail_after: Option<u32>,
}

impl EchoParams {
    /// Requested failure; `code=0` means none.
    fn failure(&self, message: &str) -> Option<Status> {
        match self.code.map(Code::from_i32) {
            Some(Code::Ok) | None => None,
            Some(code) => Some(Status::new(code, format!("echo of '{message}' failed"))),
        }
    }
}

/// Unary echo call. Header metadata carries the message length; the trailer
/// marks completion.
pub fn echo(message: &str, params: &EchoParams) -> Result<(EchoReply, ServerMetadata), Status> {
    if let Some(status) = params.failure(message) {
        return Err(status);
    }

    let mut headers = HeaderMap::new();
    headers.insert("echo-length", HeaderValue::from(message.len()));
    let mut trailers = HeaderMap::new();
    trailers.insert("echo-done", HeaderValue::from_static("true"));
    let metadata = ServerMetadata::new(headers, trailers);

    let reply = EchoReply {
        message: message.to_string(),
        index: None,
    };
    Ok((reply, metadata))
}

/// Server-streaming echo call as a receive function.
pub fn echo_stream(
    message: String,
    params: &EchoParams,
) -> impl FnMut() -> Result<Option<EchoReply>, Status> + Send + 'static {
    let count = params.count.unwrap_or(DEFAULT_COUNT);
    let fail_after = params.fail_after;
    let failure = match fail_after {
        Some(_) => Some(params.failure(&message).unwrap_or_else(|| {
            Status::internal(format!("echo stream of '{message}' aborted"))
        })),
        None => None,
    };
    let mut sent = 0u32;

    move || {
        if fail_after == Some(sent) {
            if let Some(status) = &failure {
                return Err(status.clone());
            }
        }
        if sent >= count {
            return Ok(None);
        }
        let reply = EchoReply {
            message: message.clone(),
            index: Some(sent),
        };
        sent += 1;
        Ok(Some(reply))
    }
}

pub async fn unary_handler(
    State(gateway): State<AppState>,
    Path(message): Path<String>,
    Query(params): Query<EchoParams>,
    request: Request,
) -> Response {
    let ctx = ForwardContext::from_headers(request.headers());
    tracing::debug!(request_id = %ctx.request_id(), message = %message, "Echo");

    match echo(&message, &params) {
        Ok((reply, metadata)) => {
            let ctx = ctx.with_metadata(metadata);
            gateway.serve_unary::<_, _, Status>(&ctx, &request, Ok(reply))
        }
        Err(status) => gateway.serve_unary::<_, EchoReply, _>(&ctx, &request, Err(status)),
    }
}

pub async fn stream_handler(
    State(gateway): State<AppState>,
    Path(message): Path<String>,
    Query(params): Query<EchoParams>,
    request: Request,
) -> Response {
    let ctx = ForwardContext::from_headers(request.headers());
    tracing::debug!(request_id = %ctx.request_id(), message = %message, "Echo stream");

    let (parts, _body) = request.into_parts();
    let request = axum::http::Request::from_parts(parts, ());
    let recv = echo_stream(message, &params);
    gateway.serve_stream(ctx, request, recv).await
}
