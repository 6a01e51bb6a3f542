//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults < JQHTTP_* environment (EnvOverrides) < YAML file
//!     → loader.rs (merge & deserialize)
//!     → ProxyConfig (plain data, nothing validated yet)
//!     → routing::RouteTable::from_config (semantic checks, fail fast)
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Serde handles shape; route semantics are checked by the registry

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_with_env, ConfigError, EnvOverrides};
pub use schema::{
    HeaderOverrides, LimitsConfig, LogFormat, ObservabilityConfig, ProxyConfig, RouteConfig,
    SetConfig, TimeoutConfig,
};
