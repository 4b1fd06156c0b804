//! Tracing subscriber setup.

use anyhow::anyhow;
use clap::Args;
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log output configuration.
///
/// Filtering follows `RUST_LOG` and defaults to `info`, e.g.
/// `RUST_LOG=glampsite_server::authorization=debug`.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct LogConfig {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    #[serde(default)]
    pub log_json: bool,
}

impl LogConfig {
    /// Installs the global tracing subscriber.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .map_err(|e| anyhow!("Failed to create env filter: {e}"))?;

        let json_layer = self.log_json.then(|| fmt::layer().json().with_target(true));
        let text_layer = (!self.log_json).then(|| fmt::layer().with_target(true).with_ansi(true));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .with(text_layer)
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize tracing: {e}"))
    }
}
