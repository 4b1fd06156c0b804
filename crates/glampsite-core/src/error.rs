//! Errors raised while loading an access policy.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Boxed cause of an [`Error`].
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result of loading or validating a policy.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Policy error category.
///
/// Gate evaluation never fails; these errors only arise while an
/// [`AccessPolicy`] is being loaded or validated.
///
/// [`AccessPolicy`]: crate::policy::AccessPolicy
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The access policy is inconsistent (redirect loops, bad paths, empty role sets).
    InvalidPolicy,
    /// The access policy document could not be (de)serialized.
    Serialization,
    /// The access policy document could not be read.
    FileSystem,
}

/// Policy loading error with an optional message and cause.
#[derive(Debug, Error)]
#[error("{}{}", kind.as_ref(), message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates an error of `kind` without message or cause.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Sets the human-readable detail.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Records the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The policy parsed but is inconsistent.
    pub fn invalid_policy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPolicy).with_message(message)
    }

    /// The policy document is not valid JSON for the schema.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// The policy document could not be read.
    pub fn file_system() -> Self {
        Self::new(ErrorKind::FileSystem)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the snake_case kind name for logs.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }
}
