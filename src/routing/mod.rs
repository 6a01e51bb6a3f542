//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteConfig[] (jqhttp shorthand first, then routes)
//!     → route.rs (validate, compile query programs)
//!     → registry.rs (collect, reject duplicates)
//!     → Freeze as immutable RouteTable
//!
//! Per request:
//!     axum router picks the route by path
//!     → matcher.rs (extract suffix, join onto upstream path)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Fail fast: one broken route aborts startup
//! - Exact routes and prefix routes only, no captures

pub mod matcher;
pub mod registry;
pub mod route;

pub use matcher::PathPattern;
pub use registry::{RouteError, RouteTable};
pub use route::{Route, RouteBuildError};
