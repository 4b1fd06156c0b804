//! Application state and dependency injection.

mod config;

use std::sync::Arc;

use glampsite_core::policy::AccessPolicy;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    /// Route classification table shared by the edge and render gates.
    pub access_policy: Arc<AccessPolicy>,
}

impl ServiceState {
    /// Creates application state around an already validated policy.
    pub fn new(access_policy: AccessPolicy) -> Self {
        Self {
            access_policy: Arc::new(access_policy),
        }
    }

    /// Initializes application state from configuration.
    ///
    /// The access policy is loaded and validated exactly once here.
    pub fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(service_config.load_access_policy()?))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(access_policy: Arc<AccessPolicy>);
