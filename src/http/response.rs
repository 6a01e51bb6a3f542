//! Error responses.
//!
//! # Responsibilities
//! - Map per-request failures to a client-visible response
//!
//! # Design Decisions
//! - Every pipeline failure answers `400` with `{"error": "<message>"}`
//! - The message is the error's `Display`, nothing else leaks

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::error::ProxyError;

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
