//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from the layered sources
//! assembled in [`crate::config::loader`].

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Bind address. A bare `:PORT` binds every interface.
    pub listen: String,

    /// Legacy single-route shorthand, registered ahead of `routes`.
    pub jqhttp: Option<RouteConfig>,

    /// Route definitions, registered in order.
    pub routes: Vec<RouteConfig>,

    /// Upstream client timeouts.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: ":8080".to_string(),
            jqhttp: None,
            routes: Vec::new(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Every configured route in registration order: the `jqhttp` shorthand
    /// first, then the `routes` list.
    pub fn all_routes(&self) -> impl Iterator<Item = &RouteConfig> {
        self.jqhttp.iter().chain(self.routes.iter())
    }

    /// The socket address to bind, with `:PORT` expanded to `0.0.0.0:PORT`.
    pub fn listen_address(&self) -> String {
        if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        }
    }
}

/// A single route as written in configuration.
///
/// Every field is optional here; [`crate::routing::Route::build`] decides
/// which ones are required.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Inbound path. A trailing `/` makes it a prefix route.
    pub path: Option<String>,

    /// Absolute upstream base URL.
    pub upstream: Option<String>,

    /// jq expression applied to JSON request bodies.
    pub request: Option<String>,

    /// jq expression applied to JSON response bodies.
    pub response: Option<String>,

    /// Header overrides.
    pub set: SetConfig,
}

/// Header overrides applied on each side of the exchange.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SetConfig {
    pub request: HeaderOverrides,
    pub response: HeaderOverrides,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderOverrides {
    /// Replaces whatever `Content-Type` the message carries.
    pub contenttype: Option<String>,
}

/// Upstream client timeouts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total upstream exchange timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest body buffered for a transform. Passthrough is never capped.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
