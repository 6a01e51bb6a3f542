//! Transform pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound body
//!     → no request program / empty body ──────────────▶ stream upstream
//!     → buffer → JSON decode ─ fails ─────────────────▶ raw bytes upstream
//!                            └ ok → run program → encode → new bytes upstream
//!
//! Upstream response
//!     → no response program / empty body ─────────────▶ stream to client
//!     → buffer → JSON decode ─ fails ─────────────────▶ raw bytes to client
//!                            └ ok → run program → encode → new bytes to client
//! ```
//!
//! # Design Decisions
//! - Each decode step yields an explicit `Decoded` outcome; the callers match on it
//! - A program yielding nothing fails the exchange, a non-JSON body does not
//! - Content-Length follows the body actually sent

pub mod pipeline;

pub use pipeline::{
    finalize_response, prepare_request_body, transform_body, Decoded, OutboundBody,
};
