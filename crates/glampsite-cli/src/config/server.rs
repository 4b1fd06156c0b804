//! Listener settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Ports that do not need elevated privileges.
const UNPRIVILEGED_PORTS: RangeInclusive<u16> = 1024..=u16::MAX;

/// Accepted drain time after a stop signal, in seconds.
const SHUTDOWN_TIMEOUT_SECS: RangeInclusive<u64> = 1..=300;

/// Where and how the site listens.
///
/// Every field has an environment fallback: `HOST`, `PORT`,
/// `SHUTDOWN_TIMEOUT`, plus `TLS_CERT_PATH` and `TLS_KEY_PATH` in `tls` builds.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Interface to listen on; `0.0.0.0` exposes the site on every interface.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    #[serde(default = "loopback")]
    pub host: IpAddr,

    /// Listening port, 1024 or above.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds in-flight requests may take to finish once a stop signal arrives.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,

    /// PEM certificate chain.
    #[cfg(feature = "tls")]
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<std::path::PathBuf>,

    /// PEM private key matching the certificate.
    #[cfg(feature = "tls")]
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<std::path::PathBuf>,
}

fn loopback() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl ServerConfig {
    /// Rejects privileged ports, out-of-range shutdown timeouts and half
    /// configured TLS.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            UNPRIVILEGED_PORTS.contains(&self.port),
            "port {} needs root privileges, pick one in {}-{}",
            self.port,
            UNPRIVILEGED_PORTS.start(),
            UNPRIVILEGED_PORTS.end(),
        );

        ensure!(
            SHUTDOWN_TIMEOUT_SECS.contains(&self.shutdown_timeout),
            "shutdown timeout of {}s is outside {}-{}s",
            self.shutdown_timeout,
            SHUTDOWN_TIMEOUT_SECS.start(),
            SHUTDOWN_TIMEOUT_SECS.end(),
        );

        #[cfg(feature = "tls")]
        ensure!(
            self.tls_cert_path.is_some() == self.tls_key_path.is_some(),
            "--tls-cert-path and --tls-key-path go together"
        );

        Ok(())
    }

    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Returns true for `0.0.0.0` and `::`.
    #[must_use]
    pub const fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    /// Returns true for the stock loopback setup on port 3000.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.host.is_loopback() && self.port == 3000
    }

    #[must_use]
    pub const fn is_tls_enabled(&self) -> bool {
        #[cfg(feature = "tls")]
        {
            self.tls_cert_path.is_some() && self.tls_key_path.is_some()
        }

        #[cfg(not(feature = "tls"))]
        {
            false
        }
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            tls = self.is_tls_enabled(),
            development = self.is_development(),
            "listener configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: loopback(),
            port: 3000,
            shutdown_timeout: 30,
            #[cfg(feature = "tls")]
            tls_cert_path: None,
            #[cfg(feature = "tls")]
            tls_key_path: None,
        }
    }
}
