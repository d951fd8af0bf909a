//! Response metadata returned by the RPC call.

use axum::http::{HeaderMap, HeaderName};

/// Header and trailer metadata the RPC server attached to its response.
///
/// Keys are already valid HTTP header names; they get a configurable prefix
/// when merged into the HTTP response so they cannot clash with real headers.
#[derive(Debug, Clone, Default)]
pub struct ServerMetadata {
    pub headers: HeaderMap,
    pub trailers: HeaderMap,
}

impl ServerMetadata {
    pub fn new(headers: HeaderMap, trailers: HeaderMap) -> Self {
        Self { headers, trailers }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.trailers.is_empty()
    }
}

/// Copy every entry of `md` into `dst` as `<prefix><key>`.
///
/// Entries whose prefixed name is not a valid header name are skipped.
pub(crate) fn merge_prefixed(dst: &mut HeaderMap, md: &HeaderMap, prefix: &str) {
    for (key, value) in md.iter() {
        let name = format!("{}{}", prefix, key.as_str());
        match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => {
                dst.append(name, value.clone());
            }
            Err(_) => {
                tracing::warn!(header = %name, "Dropping metadata with invalid header name");
            }
        }
    }
}
