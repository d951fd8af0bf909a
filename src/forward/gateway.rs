//! Gateway runtime value shared by every request.
//!
//! # Responsibilities
//! - Own the codec and forwarding options for the process lifetime
//! - Expose the forwarding operations with those values injected
//! - Adapt them to axum handlers (`serve_*`)
//!
//! # Design Decisions
//! - Immutable after construction; shared as `Arc<Gateway<C>>`
//! - Streams run on the blocking pool because `recv` may block
//! - Unary responses are written into an in-memory recorder, no extra thread

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::codec::Codec;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::errors::http_error;
use crate::forward::{
    forward_response_message, forward_response_stream, ForwardContext, ForwardOptions,
    StreamSummary,
};
use crate::http::{body, ResponseRecorder, ResponseSink};

/// Codec plus options, injected into every forwarding call.
#[derive(Debug)]
pub struct Gateway<C> {
    codec: C,
    options: ForwardOptions,
}

impl<C: Codec> Gateway<C> {
    pub fn new(codec: C, options: ForwardOptions) -> Self {
        Self { codec, options }
    }

    pub fn from_config(codec: C, config: &GatewayConfig) -> Self {
        Self::new(codec, ForwardOptions::from_config(config))
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn options(&self) -> &ForwardOptions {
        &self.options
    }

    /// See [`http_error`].
    pub fn http_error<S, B>(
        &self,
        ctx: &ForwardContext,
        sink: &mut S,
        req: &Request<B>,
        err: &GatewayError,
    ) -> StatusCode
    where
        S: ResponseSink,
    {
        http_error(ctx, &self.options, &self.codec, sink, req, err)
    }

    /// See [`forward_response_message`].
    pub fn forward_message<S, B, M>(
        &self,
        ctx: &ForwardContext,
        sink: &mut S,
        req: &Request<B>,
        message: &M,
    ) -> StatusCode
    where
        S: ResponseSink,
        M: Serialize + ?Sized,
    {
        forward_response_message(ctx, &self.options, &self.codec, sink, req, message)
    }

    /// See [`forward_response_stream`].
    pub fn forward_stream<S, B, M, E, F>(
        &self,
        ctx: &ForwardContext,
        sink: &mut S,
        req: &Request<B>,
        recv: F,
    ) -> StreamSummary
    where
        S: ResponseSink,
        M: Serialize,
        E: Into<GatewayError>,
        F: FnMut() -> Result<Option<M>, E>,
    {
        forward_response_stream(ctx, &self.options, &self.codec, sink, req, recv)
    }

    /// Unary result of an RPC call as an axum response.
    pub fn serve_unary<B, M, E>(
        &self,
        ctx: &ForwardContext,
        req: &Request<B>,
        result: Result<M, E>,
    ) -> Response
    where
        M: Serialize,
        E: Into<GatewayError>,
    {
        let mut recorder = ResponseRecorder::new();
        match result {
            Ok(message) => {
                self.forward_message(ctx, &mut recorder, req, &message);
            }
            Err(err) => {
                self.http_error(ctx, &mut recorder, req, &err.into());
            }
        }
        recorder.into_response()
    }
}

impl<C: Codec + 'static> Gateway<C> {
    /// Server-streaming RPC as an axum response. `recv` runs on the blocking
    /// pool and may block between messages.
    pub async fn serve_stream<M, E, F>(
        self: Arc<Self>,
        ctx: ForwardContext,
        req: Request<()>,
        recv: F,
    ) -> Response
    where
        M: Serialize + 'static,
        E: Into<GatewayError> + 'static,
        F: FnMut() -> Result<Option<M>, E> + Send + 'static,
    {
        let capacity = self.options.channel_capacity();
        body::stream_response(capacity, move |sink| {
            self.forward_stream(&ctx, sink, &req, recv);
        })
        .await
    }
}
