//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router, one sub-router per configured route
//! - Wire up middleware (tracing, request ID)
//! - Run each exchange through the transform pipeline and upstream
//! - Serve on a listener until shutdown

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::proxy::{build_client, forward};
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::startup::StartupError;
use crate::observability::metrics;
use crate::routing::{Route, RouteTable};
use crate::transform::{finalize_response, prepare_request_body};

/// Everything one route's handler needs. Cloned per request, never mutated.
#[derive(Clone)]
pub struct RouteState {
    pub route: Arc<Route>,
    pub client: reqwest::Client,
    pub max_body_bytes: usize,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build every route and the upstream client. Fails on the first invalid route.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let table = RouteTable::from_config(&config)?;
        if table.is_empty() {
            tracing::warn!("No routes configured; every request will get 404");
        }

        let client = build_client(&config.timeouts).map_err(StartupError::Client)?;
        let router = Self::build_router(&table, client, config.limits.max_body_bytes);

        Ok(Self { router })
    }

    /// Register each route under its path(s) for every method.
    ///
    /// A prefix route also answers its slash-less form with a redirect, unless
    /// another route owns that path.
    fn build_router(table: &RouteTable, client: reqwest::Client, max_body_bytes: usize) -> Router {
        let owned: HashSet<&str> = table
            .routes()
            .iter()
            .map(|route| route.pattern().as_str())
            .collect();

        let mut app = Router::new();
        for route in table.routes() {
            let state = RouteState {
                route: route.clone(),
                client: client.clone(),
                max_body_bytes,
            };

            let mut sub = Router::new();
            for path in route.pattern().router_paths() {
                sub = sub.route(&path, any(proxy_handler));
            }
            if let Some(bare) = route.pattern().redirect_from() {
                if !owned.contains(bare) {
                    sub = sub.route(bare, any(redirect_to_prefix));
                }
            }
            app = app.merge(sub.with_state(state));
        }

        app.layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for serving or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Handler shared by every route; the route itself arrives as state.
async fn proxy_handler(State(state): State<RouteState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        route = %state.route.name(),
        method = %method,
        path = %request.uri().path(),
        "Proxying request"
    );

    let response = match exchange(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                route = %state.route.name(),
                error = %err,
                "Exchange failed"
            );
            metrics::record_error(state.route.name(), err.kind());
            err.into_response()
        }
    };

    metrics::record_request(
        state.route.name(),
        method.as_str(),
        response.status().as_u16(),
        start,
    );
    response
}

/// Add the trailing slash: `301` for GET, `307` otherwise so the method and
/// body are replayed.
async fn redirect_to_prefix(request: Request<Body>) -> Response {
    let uri = request.uri();
    let location = match uri.query() {
        Some(query) => format!("{}/?{query}", uri.path()),
        None => format!("{}/", uri.path()),
    };
    let status = if request.method() == Method::GET {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::TEMPORARY_REDIRECT
    };
    (status, [(header::LOCATION, location)]).into_response()
}

/// Request body → upstream → response body.
async fn exchange(state: &RouteState, request: Request<Body>) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let body = prepare_request_body(&state.route, body, state.max_body_bytes).await?;
    let upstream = forward(&state.client, &state.route, &parts, body).await?;
    finalize_response(&state.route, upstream, state.max_body_bytes).await
}
