//! Middleware for `axum::Router` and HTTP request processing.
//!
//! ```rust,no_run
//! use axum::Router;
//! use glampsite_core::policy::AccessPolicy;
//! use glampsite_server::middleware::*;
//! use glampsite_server::service::ServiceState;
//!
//! let state = ServiceState::new(AccessPolicy::default());
//! let app: Router<ServiceState> = Router::new()
//!     .with_edge_gate(state.clone())
//!     .with_default_security()
//!     .with_metrics(state)
//!     .with_observability()
//!     .with_default_recovery();
//! ```

mod edge_gate;
mod observability;
mod recovery;
mod security;

pub use crate::middleware::edge_gate::{RouterEdgeGateExt, edge_gate};
pub use crate::middleware::observability::{RouterObservabilityExt, track_request_metrics};
pub use crate::middleware::recovery::{RecoveryConfig, RouterRecoveryExt};
pub use crate::middleware::security::{
    FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
