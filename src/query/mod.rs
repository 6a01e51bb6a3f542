//! Query engine subsystem.
//!
//! # Data Flow
//! ```text
//! Route config (`request` / `response` expression text)
//!     → program.rs (parse + compile against the jq standard library)
//!     → QueryProgram (immutable, shared via Arc)
//!
//! Per request:
//!     serde_json::Value → QueryProgram::run_first → zero or one Value
//! ```
//!
//! # Design Decisions
//! - Expressions compile once at startup; a broken expression never reaches a request
//! - Every run gets a fresh evaluation context, so programs carry no state between bodies
//! - Only the first output is consumed

pub mod program;

pub use program::{QueryError, QueryProgram};
