//! Unary response forwarding.

use axum::http::{header, Request, StatusCode};
use serde::Serialize;

use crate::codec::Codec;
use crate::error::GatewayError;
use crate::errors::http_error;
use crate::forward::{ForwardContext, ForwardOptions};
use crate::http::ResponseSink;

/// Write a successful unary RPC response. The message is encoded as-is,
/// without a `result` container. Returns the status written.
pub fn forward_response_message<C, S, B, M>(
    ctx: &ForwardContext,
    opts: &ForwardOptions,
    codec: &C,
    sink: &mut S,
    req: &Request<B>,
    message: &M,
) -> StatusCode
where
    C: Codec,
    S: ResponseSink,
    M: Serialize + ?Sized,
{
    let payload = match codec.marshal(message) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(request_id = %ctx.request_id(), error = %e, "Failed to marshal response");
            return http_error(ctx, opts, codec, sink, req, &GatewayError::Encoding(e));
        }
    };

    let content_type = opts.content_type_for(codec);
    let headers = sink.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    ctx.merge_metadata(opts, headers, true);

    if let Err(e) = sink
        .write_head(StatusCode::OK)
        .and_then(|_| sink.write(&payload))
    {
        tracing::debug!(request_id = %ctx.request_id(), error = %e, "Client went away while writing response");
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::http::ResponseRecorder;
    use crate::rpc::ServerMetadata;
    use axum::http::HeaderValue;
    use serde::Serializer;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    fn request() -> Request<()> {
        Request::builder().uri("/v1/echo/hi").body(()).unwrap()
    }

    #[test]
    fn test_message_written_unwrapped() {
        let mut md = ServerMetadata::default();
        md.headers.insert("x-served-by", HeaderValue::from_static("a1"));
        let ctx = ForwardContext::new("t").with_metadata(md);
        let mut rec = ResponseRecorder::new();

        let status = forward_response_message(
            &ctx,
            &ForwardOptions::default(),
            &JsonCodec::new(),
            &mut rec,
            &request(),
            &serde_json::json!({"id": "One"}),
        );

        assert_eq!(status, StatusCode::OK);
        assert_eq!(rec.body_string(), r#"{"id":"One"}"#);
        assert_eq!(rec.header("content-type").as_deref(), Some("application/json"));
        assert_eq!(rec.header("grpc-metadata-x-served-by").as_deref(), Some("a1"));
        assert!(rec.header("transfer-encoding").is_none());
    }

    #[test]
    fn test_encoding_failure_becomes_500() {
        let mut rec = ResponseRecorder::new();
        let status = forward_response_message(
            &ForwardContext::new("t"),
            &ForwardOptions::default(),
            &JsonCodec::new(),
            &mut rec,
            &request(),
            &Unencodable,
        );

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(rec.body()).unwrap();
        assert!(body["error"].as_str().unwrap().contains("cannot encode"));
    }
}
