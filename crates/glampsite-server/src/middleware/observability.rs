//! Observability middleware for tracing, request IDs and request timing.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use glampsite_core::policy::AccessPolicy;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::service::ServiceState;
use crate::utility::tracing_targets;

const REQUEST_ID: header::HeaderName = header::HeaderName::from_static("x-request-id");

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Layers request IDs, trace spans and redaction of the session cookie.
    ///
    /// `Cookie` carries the session token, so it never shows up in span fields.
    fn with_observability(self) -> Self;

    /// Layers request timing grouped by the access policy area of the path.
    fn with_metrics(self, state: ServiceState) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(PropagateRequestIdLayer::new(REQUEST_ID))
            .layer(SetSensitiveRequestHeadersLayer::new([
                header::AUTHORIZATION,
                header::COOKIE,
            ]))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
    }

    fn with_metrics(self, state: ServiceState) -> Self {
        self.layer(from_fn_with_state(state, track_request_metrics))
    }
}

/// Returns the site area a path belongs to: a section name, `public`,
/// `excluded` or `unmatched`.
fn site_area<'a>(access_policy: &'a AccessPolicy, path: &str) -> &'a str {
    if access_policy.is_excluded(path) {
        "excluded"
    } else if access_policy.is_public(path) {
        "public"
    } else {
        access_policy
            .section_for(path)
            .map_or("unmatched", |section| section.name.as_str())
    }
}

/// Request timing middleware.
pub async fn track_request_metrics(
    State(access_policy): State<Arc<AccessPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let area = site_area(&access_policy, &path);

    tracing::trace!(
        target: tracing_targets::METRICS,
        method = %method,
        path = %path,
        area = area,
        "request started"
    );

    let response = next.run(request).await;
    let duration = start_time.elapsed();

    tracing::trace!(
        target: tracing_targets::METRICS,
        method = %method,
        path = %path,
        area = area,
        status = %response.status(),
        duration_ms = duration.as_millis() as u64,
        "request completed"
    );

    response
}
