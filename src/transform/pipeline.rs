//! Request and response body transformation.
//!
//! # Responsibilities
//! - Decide per body whether a transform applies at all
//! - Run decode → transform → encode on buffered bodies
//! - Fall back to the raw bytes when a body is not JSON
//! - Build the client response with corrected framing headers
//!
//! # Design Decisions
//! - No program or an empty body streams through without buffering
//! - A non-JSON body is forwarded untouched; a program that yields nothing
//!   is an error for the exchange
//! - Only the first program output is used

use axum::body::{Body, Bytes, HttpBody};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::error::{ProxyError, Side, TransformError};
use crate::http::headers::flatten_headers;
use crate::observability::metrics;
use crate::query::{QueryError, QueryProgram};
use crate::routing::Route;

/// Result of running a program over one buffered body.
#[derive(Debug)]
pub enum Decoded {
    /// The body parsed and the program produced a replacement.
    Transformed(Bytes),
    /// The body was not JSON; these are the original bytes.
    PassedThrough(Bytes),
    /// The body parsed but the program could not produce a usable value.
    Failed(TransformError),
}

/// Decode `body` as JSON, run `program` over it and encode the first output.
pub fn transform_body(program: &QueryProgram, body: Bytes, side: Side) -> Decoded {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                side = %side,
                error = %err,
                bytes = body.len(),
                "JSON decode failed, forwarding body unmodified"
            );
            metrics::record_transform(side, "passthrough");
            return Decoded::PassedThrough(body);
        }
    };

    let decoded = match program.run_first(value) {
        Ok(None) => Decoded::Failed(TransformError::NoResult),
        Ok(Some(output)) => match serde_json::to_vec(&output) {
            Ok(encoded) => Decoded::Transformed(Bytes::from(encoded)),
            Err(err) => Decoded::Failed(TransformError::Serialize(err.to_string())),
        },
        Err(QueryError::Output(err)) => Decoded::Failed(TransformError::Serialize(err.to_string())),
        Err(err) => Decoded::Failed(TransformError::Runtime(err.to_string())),
    };

    match &decoded {
        Decoded::Transformed(_) => metrics::record_transform(side, "transformed"),
        Decoded::Failed(err) => {
            tracing::debug!(side = %side, program = program.source(), error = %err, "Transform failed");
            metrics::record_transform(side, "failed");
        }
        Decoded::PassedThrough(_) => {}
    }
    decoded
}

/// Body handed to the upstream client.
#[derive(Debug)]
pub enum OutboundBody {
    /// The inbound stream, untouched. Its `Content-Length` stays valid.
    Stream(Body),
    /// A fully read body, transformed or not. Framing is recomputed.
    Buffered(Bytes),
}

/// Prepare the inbound body for forwarding.
pub async fn prepare_request_body(
    route: &Route,
    body: Body,
    max_body_bytes: usize,
) -> Result<OutboundBody, ProxyError> {
    let Some(program) = route.request_program() else {
        return Ok(OutboundBody::Stream(body));
    };
    if body.size_hint().exact() == Some(0) {
        return Ok(OutboundBody::Stream(body));
    }

    let bytes = axum::body::to_bytes(body, max_body_bytes)
        .await
        .map_err(|e| ProxyError::RequestRead(e.to_string()))?;

    match transform_body(program, bytes, Side::Request) {
        Decoded::Transformed(bytes) | Decoded::PassedThrough(bytes) => {
            Ok(OutboundBody::Buffered(bytes))
        }
        Decoded::Failed(err) => Err(ProxyError::transform(Side::Request, err)),
    }
}

/// Turn the upstream response into the response sent to the client.
///
/// Status and headers always come from the upstream (after any configured
/// override). `Content-Length` is the upstream's when the body streams
/// through and the actual length whenever the body was buffered.
pub async fn finalize_response(
    route: &Route,
    upstream: reqwest::Response,
    max_body_bytes: usize,
) -> Result<Response, ProxyError> {
    let status = upstream.status();
    let mut headers = flatten_headers(upstream.headers());

    let program = match route.response_program() {
        Some(program) if upstream.content_length() != Some(0) => program,
        _ => {
            if let Some(len) = upstream.headers().get(header::CONTENT_LENGTH) {
                headers.insert(header::CONTENT_LENGTH, len.clone());
            }
            let body = Body::from_stream(upstream.bytes_stream());
            return Ok(build_response(status, headers, body));
        }
    };

    let bytes = read_limited(upstream, max_body_bytes).await?;
    let bytes = match transform_body(program, bytes, Side::Response) {
        Decoded::Transformed(bytes) | Decoded::PassedThrough(bytes) => bytes,
        Decoded::Failed(err) => return Err(ProxyError::transform(Side::Response, err)),
    };

    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    Ok(build_response(status, headers, Body::from(bytes)))
}

async fn read_limited(mut upstream: reqwest::Response, limit: usize) -> Result<Bytes, ProxyError> {
    if let Some(len) = upstream.content_length() {
        if len > limit as u64 {
            return Err(ProxyError::ResponseRead(format!(
                "body of {len} bytes exceeds limit of {limit}"
            )));
        }
    }

    let mut buf = Vec::new();
    while let Some(chunk) = upstream
        .chunk()
        .await
        .map_err(|e| ProxyError::ResponseRead(e.to_string()))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(ProxyError::ResponseRead(format!(
                "body exceeds limit of {limit} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    fn program(source: &str) -> QueryProgram {
        QueryProgram::compile(source).unwrap()
    }

    fn route(request: Option<&str>) -> Route {
        Route::build(&RouteConfig {
            path: Some("/t".into()),
            upstream: Some("http://localhost:1".into()),
            request: request.map(String::from),
            ..RouteConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn json_body_is_transformed() {
        let out = transform_body(
            &program("{a: .a}"),
            Bytes::from_static(br#"{"a":1,"b":2}"#),
            Side::Response,
        );
        match out {
            Decoded::Transformed(bytes) => assert_eq!(&bytes[..], br#"{"a":1}"#),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_body_passes_through() {
        let out = transform_body(
            &program(".a"),
            Bytes::from_static(b"not json"),
            Side::Request,
        );
        match out {
            Decoded::PassedThrough(bytes) => assert_eq!(&bytes[..], b"not json"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_program_output_fails() {
        let out = transform_body(&program("empty"), Bytes::from_static(b"{}"), Side::Request);
        assert!(matches!(out, Decoded::Failed(TransformError::NoResult)));
    }

    #[test]
    fn runtime_error_fails() {
        let out = transform_body(
            &program(".a + 1"),
            Bytes::from_static(br#"{"a":"x"}"#),
            Side::Response,
        );
        assert!(matches!(out, Decoded::Failed(TransformError::Runtime(_))));
    }

    #[test]
    fn scalar_results_are_encoded() {
        let out = transform_body(&program(".n"), Bytes::from_static(br#"{"n":"hi"}"#), Side::Request);
        match out {
            Decoded::Transformed(bytes) => assert_eq!(&bytes[..], br#""hi""#),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_without_program_streams() {
        let body = prepare_request_body(&route(None), Body::from("raw"), 1024)
            .await
            .unwrap();
        let OutboundBody::Stream(body) = body else {
            panic!("expected stream");
        };
        let bytes = axum::body::to_bytes(body, 1024).await.unwrap();
        assert_eq!(&bytes[..], b"raw");
    }

    #[tokio::test]
    async fn empty_request_body_skips_transform() {
        let body = prepare_request_body(&route(Some("empty")), Body::empty(), 1024)
            .await
            .unwrap();
        assert!(matches!(body, OutboundBody::Stream(_)));
    }

    #[tokio::test]
    async fn request_body_is_transformed() {
        let body = prepare_request_body(
            &route(Some(".payload")),
            Body::from(r#"{"payload":{"x":1}}"#),
            1024,
        )
        .await
        .unwrap();
        let OutboundBody::Buffered(bytes) = body else {
            panic!("expected buffered body");
        };
        assert_eq!(&bytes[..], br#"{"x":1}"#);
    }

    #[tokio::test]
    async fn non_json_request_is_buffered_verbatim() {
        let body = prepare_request_body(&route(Some(".payload")), Body::from("not json"), 1024)
            .await
            .unwrap();
        let OutboundBody::Buffered(bytes) = body else {
            panic!("expected buffered body");
        };
        assert_eq!(&bytes[..], b"not json");
    }

    #[tokio::test]
    async fn request_program_without_result_is_an_error() {
        let err = prepare_request_body(&route(Some("empty")), Body::from("{}"), 1024)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "jq run failed");
    }

    #[tokio::test]
    async fn oversized_request_body_is_a_read_error() {
        let err = prepare_request_body(&route(Some(".")), Body::from("[1,2,3,4,5,6]"), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::RequestRead(_)));
    }
}
