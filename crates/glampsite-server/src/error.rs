//! Startup errors of the site service.
//!
//! The only fallible work outside request handling is loading the access
//! policy, so there are two kinds: the policy is wrong, or it cannot be read.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Boxed source error.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result of building or configuring the service.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong while setting up the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The access policy or another setting is invalid.
    Config,
    /// A configured file could not be read.
    FileSystem,
}

impl ErrorKind {
    /// Returns a stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::FileSystem => "file_system",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service setup error.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    fn with_kind(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Invalid configuration.
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::Config, message)
    }

    /// Unreadable file.
    pub fn file_system(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::FileSystem, message)
    }

    /// Keeps `source` as the cause of this error.
    pub fn with_source(self, source: impl Into<BoxedError>) -> Self {
        Self {
            source: Some(source.into()),
            ..self
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<glampsite_core::Error> for Error {
    fn from(err: glampsite_core::Error) -> Self {
        use glampsite_core::ErrorKind as PolicyErrorKind;

        let error = match err.kind() {
            PolicyErrorKind::FileSystem => Self::file_system(err.to_string()),
            PolicyErrorKind::InvalidPolicy | PolicyErrorKind::Serialization => {
                Self::config(err.to_string())
            }
        };

        error.with_source(err)
    }
}
