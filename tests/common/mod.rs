//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rest_gateway::codec::{Codec, CodecError, Delimited};
use rest_gateway::config::GatewayConfig;
use rest_gateway::http::HttpServer;
use rest_gateway::rpc::Status;
use rest_gateway::JsonCodec;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Payload used by the stream tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleMessage {
    pub id: String,
}

pub fn simple(id: &str) -> SimpleMessage {
    SimpleMessage { id: id.to_string() }
}

/// Encodes error envelopes as their bare message and switches its content
/// type to `text/plain` after doing so. Delimits chunks with `\r\n`.
#[derive(Debug, Default)]
pub struct ErrorStringCodec {
    inner: JsonCodec,
    error_state: AtomicBool,
}

impl ErrorStringCodec {
    pub fn set_error_state(&self, on: bool) {
        self.error_state.store(on, Ordering::SeqCst);
    }
}

impl Codec for ErrorStringCodec {
    fn content_type(&self) -> Cow<'_, str> {
        if self.error_state.load(Ordering::SeqCst) {
            Cow::Borrowed("text/plain")
        } else {
            self.inner.content_type()
        }
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let tree = serde_json::to_value(value).map_err(CodecError::encode)?;
        let message = match tree.get("error") {
            Some(serde_json::Value::String(msg)) => Some(msg.clone()),
            Some(err) => err.get("message").and_then(|m| m.as_str()).map(str::to_string),
            None => None,
        };
        match message {
            Some(msg) => {
                self.set_error_state(true);
                Ok(msg.into_bytes())
            }
            None => {
                self.set_error_state(false);
                self.inner.marshal(value)
            }
        }
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        self.inner.unmarshal(data)
    }

    fn delimited(&self) -> Option<&dyn Delimited> {
        Some(self)
    }
}

impl Delimited for ErrorStringCodec {
    fn delimiter(&self) -> &[u8] {
        b"\r\n"
    }
}

/// JSON without the delimiter capability.
#[derive(Debug, Default)]
pub struct UndelimitedCodec {
    inner: JsonCodec,
}

impl Codec for UndelimitedCodec {
    fn content_type(&self) -> Cow<'_, str> {
        self.inner.content_type()
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        self.inner.marshal(value)
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        self.inner.unmarshal(data)
    }
}

/// Fails every encode.
#[derive(Debug, Default)]
pub struct BrokenCodec;

impl Codec for BrokenCodec {
    fn content_type(&self) -> Cow<'_, str> {
        Cow::Borrowed("application/json")
    }

    fn marshal<T: Serialize + ?Sized>(&self, _value: &T) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::encode("broken test codec"))
    }

    fn unmarshal<T: DeserializeOwned>(&self, _data: &[u8]) -> Result<T, CodecError> {
        Err(CodecError::decode("broken test codec"))
    }
}

/// Reports a bogus content type until it has encoded something.
#[derive(Debug, Default)]
pub struct ChangingTypeCodec {
    inner: JsonCodec,
    called: AtomicBool,
}

impl Codec for ChangingTypeCodec {
    fn content_type(&self) -> Cow<'_, str> {
        if self.called.load(Ordering::SeqCst) {
            Cow::Borrowed("application/json")
        } else {
            Cow::Borrowed("some other type")
        }
    }

    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        self.called.store(true, Ordering::SeqCst);
        self.inner.marshal(value)
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        self.inner.unmarshal(data)
    }
}

/// One scripted receive outcome.
pub type Outcome = Result<SimpleMessage, Status>;

/// Receive function replaying `outcomes` then end-of-stream. Panics if it is
/// called again after the end-of-stream was returned.
pub fn scripted_recv(
    outcomes: Vec<Outcome>,
) -> (
    impl FnMut() -> Result<Option<SimpleMessage>, Status> + Send + 'static,
    Arc<AtomicUsize>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let total = outcomes.len();
    let mut outcomes = outcomes.into_iter();

    let recv = move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        assert!(n <= total, "recv() called {} times for {} messages", n + 1, total);
        outcomes.next().transpose()
    };
    (recv, calls)
}

/// Start the gateway on an ephemeral port; it runs until the test ends.
pub async fn start_gateway(config: GatewayConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config);

    tokio::spawn(async move {
        let _ = server.run_until(listener, std::future::pending()).await;
    });
    addr
}
