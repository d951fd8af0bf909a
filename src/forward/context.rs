//! Per-request forwarding context.

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::forward::ForwardOptions;
use crate::rpc::metadata::{merge_prefixed, ServerMetadata};

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request-scoped values handed to the forwarder by the dispatch layer.
#[derive(Debug, Clone)]
pub struct ForwardContext {
    request_id: String,
    metadata: Option<ServerMetadata>,
}

impl ForwardContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            metadata: None,
        }
    }

    /// Build a context from request headers, generating a request ID when
    /// the client did not send one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self::new(request_id)
    }

    /// Attach the metadata the RPC server returned.
    pub fn with_metadata(mut self, metadata: ServerMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn metadata(&self) -> Option<&ServerMetadata> {
        self.metadata.as_ref()
    }

    /// Merge carried metadata into staged response headers.
    ///
    /// Trailers are only merged when the whole response is written at once;
    /// a stream commits its head before any trailer exists.
    pub(crate) fn merge_metadata(
        &self,
        opts: &ForwardOptions,
        headers: &mut HeaderMap,
        with_trailers: bool,
    ) {
        let Some(md) = &self.metadata else {
            return;
        };
        merge_prefixed(headers, &md.headers, opts.metadata_header_prefix());
        if with_trailers {
            merge_prefixed(headers, &md.trailers, opts.trailer_header_prefix());
        }
    }
}

impl Default for ForwardContext {
    fn default() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}
