//! Middleware configuration for the HTTP server.

use anyhow::anyhow;
use clap::Args;
use glampsite_server::middleware::{RecoveryConfig, SecurityHeadersConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration combining recovery and security header settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,

    /// Security response headers.
    #[clap(flatten)]
    pub security: SecurityHeadersConfig,
}

impl MiddlewareConfig {
    /// Validates middleware settings.
    ///
    /// The request timeout must be 1-300 seconds.
    pub fn validate(&self) -> anyhow::Result<()> {
        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > 300 {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and 300 seconds."
            ));
        }
        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            hsts_max_age_secs = self.security.hsts_max_age_seconds,
            hsts_include_subdomains = self.security.hsts_include_subdomains,
            frame_options = self.security.frame_options.as_str(),
            "Security headers configuration"
        );
    }
}
