//! Listener failures, with hints for the operator.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Why the site could not start or stopped serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Settings that only fail once the listener is built.
    #[error("cannot start with these settings: {0}")]
    #[cfg_attr(not(feature = "tls"), allow(dead_code))]
    InvalidConfig(String),

    #[error("cannot listen on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The accept loop failed after startup.
    #[error("listener stopped unexpectedly")]
    Serve(#[source] io::Error),

    #[error("unusable TLS material: {0}")]
    #[cfg_attr(not(feature = "tls"), allow(dead_code))]
    Tls(String),
}

impl ServerError {
    /// Short stable code, printed next to the message for support requests.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "SRV-CONFIG",
            Self::Bind { .. } => "SRV-BIND",
            Self::Serve(_) => "SRV-SERVE",
            Self::Tls(_) => "SRV-TLS",
        }
    }

    fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Bind { source, .. } | Self::Serve(source) => Some(source.kind()),
            Self::InvalidConfig(_) | Self::Tls(_) => None,
        }
    }

    /// True when starting again later, or on another port, can work without
    /// changing files.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.io_kind(),
            Some(
                io::ErrorKind::AddrInUse
                    | io::ErrorKind::AddrNotAvailable
                    | io::ErrorKind::PermissionDenied
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::TimedOut
            )
        )
    }

    /// What the operator can try next.
    pub fn suggestion(&self) -> Option<&'static str> {
        match (self, self.io_kind()) {
            (Self::InvalidConfig(_), _) => Some("run with --help to see accepted values"),
            (Self::Tls(_), _) => {
                Some("point --tls-cert-path and --tls-key-path at readable, non-empty PEM files")
            }
            (Self::Bind { .. }, Some(io::ErrorKind::AddrInUse)) => {
                Some("another process holds the port; stop it or set PORT")
            }
            (Self::Bind { .. }, Some(io::ErrorKind::PermissionDenied)) => {
                Some("the port needs privileges; use one from 1024 upwards")
            }
            (Self::Bind { .. }, Some(io::ErrorKind::AddrNotAvailable)) => {
                Some("HOST is not an address of this machine")
            }
            (Self::Bind { .. }, _) => Some("check HOST, PORT and the firewall"),
            (Self::Serve(_), Some(io::ErrorKind::TimedOut | io::ErrorKind::Interrupted)) => {
                Some("transient failure, restarting should work")
            }
            (Self::Serve(_), _) => None,
        }
    }

    /// Key-value pairs for structured logs.
    pub fn context(&self) -> Vec<(&'static str, String)> {
        let mut context = vec![
            ("error_code", self.error_code().to_owned()),
            ("recoverable", self.is_recoverable().to_string()),
        ];

        if let Some(kind) = self.io_kind() {
            context.push(("io_error_kind", format!("{kind:?}")));
        }
        if let Self::Bind { addr, .. } = self {
            context.push(("address", addr.to_string()));
        }
        if let Some(suggestion) = self.suggestion() {
            context.push(("suggestion", suggestion.to_owned()));
        }

        context
    }
}
