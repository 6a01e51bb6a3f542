//! jqhttp
//!
//! A reverse proxy that optionally rewrites JSON request and response bodies
//! with jq programs, per route.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ axum router ──▶ route handler ──▶ transform (request) ──▶ upstream
//!                                      │
//!     Client ◀── error envelope ◀──────┤
//!     Client ◀───────────────────── transform (response) ◀──────────────── upstream
//! ```

use std::process::ExitCode;

use clap::Parser;

use jqhttp::cli::Cli;
use jqhttp::lifecycle::startup;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match startup::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("jqhttp: {e}");
            ExitCode::FAILURE
        }
    }
}
