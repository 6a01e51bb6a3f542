//! Header manipulation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Prepare the outbound header set for the upstream
//! - Flatten multi-value upstream headers for the client
//!
//! # Design Decisions
//! - Headers named in `Connection` are hop-by-hop too
//! - `Accept-Encoding` never goes upstream; the client negotiates compression
//!   itself and hands the pipeline decoded bytes

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in &listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Header set for the upstream request, derived from the inbound one.
///
/// `Host` is left for the client to derive from the destination URL. When
/// `keep_length` is false the body was re-buffered and `Content-Length` is
/// dropped so the client recomputes it.
pub fn outbound_headers(
    inbound: &HeaderMap,
    keep_length: bool,
    content_type: Option<&HeaderValue>,
) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::ACCEPT_ENCODING);
    if !keep_length {
        headers.remove(header::CONTENT_LENGTH);
    }
    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, content_type.clone());
    }
    headers
}

/// Copy upstream headers for the client, one value per name.
///
/// Repeated headers are joined with `,`. Hop-by-hop headers and
/// `Content-Length` are left out; the caller sets the length for the body it
/// actually sends.
pub fn flatten_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut stripped = upstream.clone();
    strip_hop_by_hop(&mut stripped);
    stripped.remove(header::CONTENT_LENGTH);

    let mut flat = HeaderMap::with_capacity(stripped.keys_len());
    for name in stripped.keys() {
        let mut joined = Vec::new();
        for (i, value) in stripped.get_all(name).iter().enumerate() {
            if i > 0 {
                joined.push(b',');
            }
            joined.extend_from_slice(value.as_bytes());
        }
        // Joining valid values with ',' cannot produce an invalid value.
        if let Ok(value) = HeaderValue::from_bytes(&joined) {
            flat.insert(name.clone(), value);
        }
    }
    flat
}
