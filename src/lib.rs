//! jqhttp: a configuration-driven reverse proxy that rewrites JSON bodies
//! with jq programs, per route.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod query;
pub mod routing;
pub mod transform;

pub use crate::config::ProxyConfig;
pub use crate::error::ProxyError;
pub use crate::http::HttpServer;
