//! Upstream forwarding.
//!
//! # Responsibilities
//! - Resolve the destination URL for the matched route
//! - Rebuild the inbound request for the upstream
//! - Apply configured content-type overrides on both sides
//!
//! # Design Decisions
//! - One attempt per request; transport failures are reported, never retried
//! - The client handles compression; the pipeline always sees decoded bytes

use std::time::Duration;

use axum::body::HttpBody;
use axum::http::{header, request::Parts};

use crate::config::TimeoutConfig;
use crate::error::ProxyError;
use crate::http::headers::outbound_headers;
use crate::routing::Route;
use crate::transform::OutboundBody;

/// Build the shared upstream client.
pub fn build_client(timeouts: &TimeoutConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.request_secs))
        .build()
}

/// Send the exchange to the route's upstream and return its response.
pub async fn forward(
    client: &reqwest::Client,
    route: &Route,
    parts: &Parts,
    body: OutboundBody,
) -> Result<reqwest::Response, ProxyError> {
    let destination = route.destination(parts.uri.path());

    let (headers, body) = match body {
        OutboundBody::Stream(body) if body.size_hint().exact() == Some(0) => (
            outbound_headers(&parts.headers, true, route.request_content_type()),
            None,
        ),
        OutboundBody::Stream(body) => (
            outbound_headers(&parts.headers, true, route.request_content_type()),
            Some(reqwest::Body::wrap_stream(body.into_data_stream())),
        ),
        OutboundBody::Buffered(bytes) => (
            outbound_headers(&parts.headers, false, route.request_content_type()),
            Some(reqwest::Body::from(bytes)),
        ),
    };

    tracing::debug!(
        route = %route.name(),
        method = %parts.method,
        destination = %destination,
        "Forwarding to upstream"
    );

    let mut builder = client
        .request(parts.method.clone(), destination)
        .headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }
    let request = builder.build().map_err(ProxyError::Build)?;

    let mut response = client
        .execute(request)
        .await
        .map_err(ProxyError::Upstream)?;

    if let Some(content_type) = route.response_content_type() {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type.clone());
    }

    Ok(response)
}
