//! Command line and environment settings for the `glampsite` binary.
//!
//! ```text
//! Cli
//! ├── server      listener address, TLS files, drain window
//! ├── middleware  request deadline, security headers
//! ├── service     access policy file, unmatched route handling
//! └── log         text or JSON output
//! ```
//!
//! Every flag has an environment variable twin; `glampsite --help` lists them.

mod logging;
mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use glampsite_server::service::ServiceConfig;
pub use logging::LogConfig;
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Parsed settings for one run of the site.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "glampsite")]
#[command(about = "Glampsite booking site with role-scoped staff consoles")]
#[command(version)]
pub struct Cli {
    /// Where and how the listener binds.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// Request deadline and response headers.
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Which paths need which role.
    #[clap(flatten)]
    pub service: ServiceConfig,

    #[clap(flatten)]
    pub log: LogConfig,
}

impl Cli {
    /// Loads a `.env` file (if enabled) and parses CLI arguments.
    ///
    /// The `.env` file is loaded first so clap's `env` fallbacks can see it.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("glampsite: ignoring unreadable .env ({err})");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Rejects settings the listener or middleware cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("server settings rejected")?;
        self.middleware
            .validate()
            .context("middleware settings rejected")?;
        Ok(())
    }

    /// Logs configuration (no session material is ever part of it).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            access_policy_path = ?self.service.access_policy_path,
            deny_unmatched = self.service.deny_unmatched,
            log_json = self.log.log_json,
            "Service configuration"
        );
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "tls").then_some("tls"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
