//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Router,
};
use jqhttp::config::{ProxyConfig, RouteConfig};
use jqhttp::HttpServer;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A proxy running in the background. Dropping it stops the server.
pub struct RunningProxy {
    pub addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that answers every request with a JSON description of it:
/// `{"method", "path", "query", "headers", "body"}`.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
        let mut header_map = Map::new();
        for name in headers.keys() {
            let values: Vec<&str> = headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect();
            header_map.insert(name.to_string(), json!(values.join(",")));
        }
        Json(json!({
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "headers": header_map,
            "body": String::from_utf8_lossy(&body),
        }))
    }

    serve(Router::new().fallback(echo)).await
}

/// Start a backend that always returns the same response and counts hits.
pub async fn start_fixed_backend(
    status: u16,
    headers: &'static [(&'static str, &'static str)],
    body: &'static str,
) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let handler = move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut response: Response = body.into_response();
            *response.status_mut() = StatusCode::from_u16(status).unwrap();
            response.headers_mut().remove("content-type");
            for &(name, value) in headers {
                response.headers_mut().append(
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                );
            }
            response
        }
    };

    let addr = serve(Router::new().fallback(handler)).await;
    (addr, hits)
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let server = HttpServer::new(config).expect("valid proxy config");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = server
            .run_until(listener, async {
                let _ = rx.await;
            })
            .await;
    });

    RunningProxy {
        addr,
        _shutdown: tx,
    }
}

/// A route record with just `path` and `upstream` set.
pub fn route(path: &str, upstream: String) -> RouteConfig {
    RouteConfig {
        path: Some(path.to_string()),
        upstream: Some(upstream),
        ..RouteConfig::default()
    }
}

pub fn config(routes: Vec<RouteConfig>) -> ProxyConfig {
    ProxyConfig {
        routes,
        ..ProxyConfig::default()
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
