//! Listener setup for the site.
//!
//! Builds with the `tls` feature terminate HTTPS through rustls; every other
//! build listens on plain HTTP, usually behind a proxy.

mod error;
#[cfg(not(feature = "tls"))]
mod http_server;
#[cfg(feature = "tls")]
mod https_server;
mod lifecycle;
mod shutdown;

use axum::Router;

pub use self::error::{ServerError, ServerResult};
use self::shutdown::shutdown_signal;
use crate::config::ServerConfig;

/// Accepts connections for `app` until SIGINT or SIGTERM, then drains.
///
/// # Errors
///
/// Fails when the address cannot be bound, when the TLS files are unusable,
/// or when the accept loop itself breaks.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    #[cfg(feature = "tls")]
    let outcome = https_server::serve_https(app, config).await;
    #[cfg(not(feature = "tls"))]
    let outcome = http_server::serve_http(app, config).await;
    outcome
}
