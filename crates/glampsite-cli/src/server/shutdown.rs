//! Termination signals.

use std::time::Duration;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Signal that stopped the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopSignal {
    Interrupt,
    Terminate,
}

impl StopSignal {
    const fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
///
/// A signal whose handler cannot be installed is logged and never fires, so
/// the other one still works.
async fn interrupt() -> StopSignal {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "cannot listen for SIGINT"
        );
        std::future::pending::<()>().await;
    }
    StopSignal::Interrupt
}

#[cfg(unix)]
async fn terminate() -> StopSignal {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %error,
                "cannot listen for SIGTERM"
            );
            std::future::pending::<()>().await;
        }
    }
    StopSignal::Terminate
}

#[cfg(not(unix))]
async fn terminate() -> StopSignal {
    std::future::pending().await
}

/// Waits until the process is asked to stop.
///
/// `drain_timeout` is only reported here; the caller enforces it.
pub async fn shutdown_signal(drain_timeout: Duration) {
    let stop = tokio::select! {
        stop = interrupt() => stop,
        stop = terminate() => stop,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = stop.name(),
        drain_timeout_secs = drain_timeout.as_secs(),
        "stopping: no new connections, draining in-flight requests"
    );
}
