//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, per-route handler)
//!     → transform pipeline (request body)
//!     → proxy.rs (rebuild request, call upstream)
//!     → headers.rs (strip hop-by-hop, flatten)
//!     → transform pipeline (response body)
//!     → Send to client, or response.rs error envelope
//! ```

pub mod headers;
pub mod proxy;
pub mod response;
pub mod server;

pub use server::{HttpServer, RouteState};
