//! Edge gate run before routing.
//!
//! The edge gate only checks that a session cookie is present on protected
//! paths. Role and expiry checks happen when the protected page renders.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use glampsite_core::SESSION_COOKIE_NAME;
use glampsite_core::gate::{EdgeOutcome, EdgeRequest};
use glampsite_core::policy::AccessPolicy;

use crate::service::ServiceState;
use crate::utility::tracing_targets;

/// Extension trait for `axum::`[`Router`] to apply the edge gate.
pub trait RouterEdgeGateExt<S> {
    /// Redirects requests for protected paths without a session cookie to
    /// the matching login page.
    ///
    /// Applies to every request reaching the router, including the fallback.
    fn with_edge_gate(self, state: ServiceState) -> Self;
}

impl<S> RouterEdgeGateExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_edge_gate(self, state: ServiceState) -> Self {
        self.layer(from_fn_with_state(state, edge_gate))
    }
}

/// Classifies the request and either lets it through or redirects to login.
pub async fn edge_gate(
    State(access_policy): State<Arc<AccessPolicy>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let session_token = jar.get(SESSION_COOKIE_NAME).map(|cookie| cookie.value());
    let edge_request = EdgeRequest::new(request.uri().path()).with_session_token(session_token);

    let outcome = access_policy.classify(&edge_request);
    let decision = outcome.decision();

    if let Some(location) = decision.redirect_target() {
        tracing::debug!(
            target: tracing_targets::AUTHENTICATION,
            method = %request.method(),
            path = %request.uri().path(),
            location = %location,
            "missing session cookie, redirecting to login"
        );

        return Redirect::temporary(location).into_response();
    }

    let section = match &outcome {
        EdgeOutcome::Authenticated { section } => section.as_deref(),
        _ => None,
    };
    tracing::trace!(
        target: tracing_targets::AUTHENTICATION,
        path = %request.uri().path(),
        outcome = outcome.as_str(),
        section,
        "edge gate passed"
    );

    next.run(request).await
}
