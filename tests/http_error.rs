//! Whole-response error writing.

use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use rest_gateway::codec::Codec;
use rest_gateway::config::GatewayConfig;
use rest_gateway::http::{ResponseRecorder, ResponseSink};
use rest_gateway::rpc::{Code, ServerMetadata, Status};
use rest_gateway::{http_error, ForwardContext, ForwardOptions, GatewayError, JsonCodec};
use serde_json::{json, Value};

mod common;

use common::{BrokenCodec, ChangingTypeCodec};

fn write_error<C: Codec>(codec: &C, err: GatewayError) -> (ResponseRecorder, StatusCode) {
    write_error_with(codec, &ForwardContext::new("test"), &ForwardOptions::default(), err)
}

fn write_error_with<C: Codec>(
    codec: &C,
    ctx: &ForwardContext,
    opts: &ForwardOptions,
    err: GatewayError,
) -> (ResponseRecorder, StatusCode) {
    let req = Request::builder().body(()).unwrap();
    let mut rec = ResponseRecorder::new();
    let status = http_error(ctx, opts, codec, &mut rec, &req, &err);
    (rec, status)
}

fn body_json(rec: &ResponseRecorder) -> Value {
    serde_json::from_slice(rec.body()).unwrap()
}

enum TestCodec {
    Json,
    Broken,
    ChangingType,
}

#[test]
fn test_default_http_error_cases() {
    let cases = [
        (
            GatewayError::transport("example error"),
            StatusCode::INTERNAL_SERVER_ERROR,
            "example error",
            TestCodec::Json,
        ),
        (
            Status::not_found("no such resource").into(),
            StatusCode::NOT_FOUND,
            "no such resource",
            TestCodec::Json,
        ),
        (
            GatewayError::transport("can't marshal me anyway"),
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to marshal error message",
            TestCodec::Broken,
        ),
        (
            GatewayError::transport("example error"),
            StatusCode::INTERNAL_SERVER_ERROR,
            "example error",
            TestCodec::ChangingType,
        ),
    ];

    for (err, want_status, want_msg, codec) in cases {
        let shown = err.to_string();
        let (rec, status) = match codec {
            TestCodec::Json => write_error(&JsonCodec::new(), err),
            TestCodec::Broken => write_error(&BrokenCodec, err),
            TestCodec::ChangingType => write_error(&ChangingTypeCodec::default(), err),
        };

        assert_eq!(status, want_status, "on {shown}");
        assert_eq!(rec.status(), want_status, "on {shown}");
        assert_eq!(
            rec.header("content-type").as_deref(),
            Some("application/json"),
            "on {shown}"
        );
        let body = body_json(&rec);
        let msg = body["error"].as_str().unwrap();
        assert!(msg.contains(want_msg), "body error {msg:?} on {shown}");
    }
}

#[test]
fn test_body_carries_code_and_details() {
    let err = Status::new(Code::FailedPrecondition, "not ready")
        .with_details(vec![json!({"reason": "warming up"})]);
    let (rec, status) = write_error(&JsonCodec::new(), err.into());

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(&rec),
        json!({"error": "not ready", "code": 9, "details": [{"reason": "warming up"}]})
    );
}

#[test]
fn test_single_head_and_body_write() {
    let (rec, _) = write_error(&JsonCodec::new(), Status::unavailable("down").into());
    assert_eq!(rec.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(rec.head_writes(), 1);
    assert_eq!(rec.body_writes(), 1);
}

#[test]
fn test_trailer_header_removed() {
    let req = Request::builder().body(()).unwrap();
    let mut rec = ResponseRecorder::new();
    rec.headers_mut()
        .insert(header::TRAILER, HeaderValue::from_static("Grpc-Trailer-Foo"));

    http_error(
        &ForwardContext::new("test"),
        &ForwardOptions::default(),
        &JsonCodec::new(),
        &mut rec,
        &req,
        &Status::internal("boom").into(),
    );

    assert_eq!(rec.header("trailer"), None);
}

#[test]
fn test_metadata_and_trailers_merged() {
    let mut headers = HeaderMap::new();
    headers.insert("session", HeaderValue::from_static("abc"));
    let mut trailers = HeaderMap::new();
    trailers.insert("checksum", HeaderValue::from_static("ff"));
    let ctx = ForwardContext::new("test").with_metadata(ServerMetadata::new(headers, trailers));

    let (rec, _) = write_error_with(
        &JsonCodec::new(),
        &ctx,
        &ForwardOptions::default(),
        Status::not_found("gone").into(),
    );

    assert_eq!(rec.header("grpc-metadata-session").as_deref(), Some("abc"));
    assert_eq!(rec.header("grpc-trailer-checksum").as_deref(), Some("ff"));
}

#[test]
fn test_configured_fallback_content_type() {
    let mut config = GatewayConfig::default();
    config.errors.fallback_content_type = "application/problem+json".into();
    let opts = ForwardOptions::from_config(&config);

    let (rec, status) = write_error_with(
        &BrokenCodec,
        &ForwardContext::new("test"),
        &opts,
        Status::not_found("gone").into(),
    );

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        rec.header("content-type").as_deref(),
        Some("application/problem+json")
    );
    assert_eq!(
        body_json(&rec),
        json!({"error": "failed to marshal error message"})
    );
}
