//! Route registry.
//!
//! # Responsibilities
//! - Build every configured route, in order
//! - Reject the whole configuration on the first broken route
//! - Reject two routes that would claim the same router path
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - Errors name the offending route by ordinal and path

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::routing::route::{Route, RouteBuildError};

/// A route that failed to build, with enough context to find it in config.
#[derive(Debug, thiserror::Error)]
#[error("route #{index} ({path}): {source}")]
pub struct RouteError {
    /// 1-based position in registration order.
    pub index: usize,
    pub path: String,
    #[source]
    pub source: RouteBuildError,
}

/// Every route the proxy serves, fixed at startup.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    /// Build all routes from `config`, failing on the first invalid one.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, RouteError> {
        let mut routes = Vec::new();
        let mut claimed = HashSet::new();

        for (i, route_config) in config.all_routes().enumerate() {
            let error = |source: RouteBuildError| RouteError {
                index: i + 1,
                path: route_config.path.clone().unwrap_or_default(),
                source,
            };

            let route = Route::build(route_config).map_err(error)?;
            for path in route.pattern().router_paths() {
                if !claimed.insert(path.clone()) {
                    return Err(error(RouteBuildError::DuplicatePath(path)));
                }
            }

            tracing::info!(
                path = %route.name(),
                upstream = %route.upstream(),
                prefix = route.pattern().is_prefix(),
                request_transform = route.request_program().is_some(),
                response_transform = route.response_program().is_some(),
                "Route registered"
            );
            routes.push(Arc::new(route));
        }

        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
