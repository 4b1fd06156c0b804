#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use glampsite_server::handler::{CustomRoutes, routes};
use glampsite_server::middleware::{
    RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
};
use glampsite_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "glampsite_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "glampsite_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "glampsite_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.log.init_tracing()?;
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting glampsite server"
    );

    cli.log();
    cli.validate()?;

    let state = ServiceState::from_config(&cli.service)
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    if let Err(error) = server::serve(router, cli.server).await {
        for (key, value) in error.context() {
            tracing::debug!(target: TRACING_TARGET_SERVER_SHUTDOWN, key, value, "error context");
        }
        return Err(error.into());
    }

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Last added is outermost:
/// 1. Recovery: panics, timeouts and service errors
/// 2. Observability: request IDs and trace spans
/// 3. Security: response headers and compression
/// 4. Metrics: timing per site area
/// 5. Routes behind the edge gate
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(CustomRoutes::new(), state.clone())
        .with_metrics(state.clone())
        .with_state(state)
        .with_security(&middleware.security)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
