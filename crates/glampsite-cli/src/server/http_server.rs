//! Plain HTTP server.

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::server::lifecycle::serve_with_shutdown;
use crate::server::{ServerError, ServerResult, shutdown_signal};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` over HTTP.
///
/// After a shutdown signal, in-flight requests get the configured shutdown
/// timeout to finish before the server stops waiting for them.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();

    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "Failed to bind to address"
        );
        ServerError::Bind {
            addr: server_addr,
            source: err,
        }
    })?;

    serve_with_shutdown(&server_config, || async move {
        let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app.into_make_service()).with_graceful_shutdown(
            async move {
                shutdown_signal(shutdown_timeout).await;
                let _ = signalled_tx.send(());
            },
        );

        let server = server.into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => result,
            Ok(()) = signalled_rx => {
                match tokio::time::timeout(shutdown_timeout, &mut server).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(
                            target: TRACING_TARGET_SERVER_SHUTDOWN,
                            timeout_secs = shutdown_timeout.as_secs(),
                            "Shutdown timeout elapsed, dropping remaining connections"
                        );
                        Ok(())
                    }
                }
            }
        }
    })
    .await
}
