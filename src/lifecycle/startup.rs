//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and initialize logging
//! - Build the route table before anything listens
//! - Start the metrics exporter when enabled
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when every route is ready)

use tokio::net::TcpListener;

use crate::cli::Cli;
use crate::config::{load_config, ConfigError};
use crate::http::HttpServer;
use crate::observability::{logging, metrics};
use crate::routing::RouteError;

/// Anything that stops the proxy from coming up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("metrics: {0}")]
    Metrics(String),

    #[error("bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serve: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the proxy described by the command line until shutdown.
pub async fn run(cli: Cli) -> Result<(), StartupError> {
    let config = load_config(&cli.config)?;

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("logging already initialized: {e}");
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "jqhttp starting"
    );

    let address = config.listen_address();
    let metrics_enabled = config.observability.metrics_enabled;
    let metrics_address = config.observability.metrics_address.clone();

    let server = HttpServer::new(config)?;

    if metrics_enabled {
        let addr: std::net::SocketAddr = metrics_address
            .parse()
            .map_err(|e| StartupError::Metrics(format!("{metrics_address}: {e}")))?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    server.run(listener).await.map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
