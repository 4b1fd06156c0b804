//! Startup and exit bookkeeping shared by both listeners.

use std::future::Future;
use std::io;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::server::{ServerError, ServerResult};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Awaits the listener built by `serve_fn`, logging when it comes up and how
/// long it ran.
///
/// # Errors
///
/// An I/O failure of the listener is wrapped in [`ServerError::Serve`].
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    let started = Instant::now();

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Listening on every interface, keep the port behind a firewall or proxy"
        );
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_config.server_addr(),
        tls = server_config.is_tls_enabled(),
        "Site is accepting connections"
    );

    let result = serve_fn().await;
    let uptime = started.elapsed();

    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs = uptime.as_secs(),
                "Site stopped cleanly"
            );
            Ok(())
        }
        Err(err) => {
            let error = ServerError::Serve(err);
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %error,
                error_code = error.error_code(),
                suggestion = error.suggestion(),
                uptime_secs = uptime.as_secs(),
                "Listener failed"
            );
            Err(error)
        }
    }
}
