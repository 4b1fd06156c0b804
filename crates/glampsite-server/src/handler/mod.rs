//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! ```rust
//! use axum::Router;
//! use axum::routing::get;
//! use glampsite_server::handler::{CustomRoutes, routes};
//! use glampsite_server::service::{ServiceConfig, ServiceState};
//!
//! # fn example() -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&ServiceConfig::default())?;
//! let custom = CustomRoutes::new()
//!     .with_routes(Router::new().route("/events", get(|| async { "events" })));
//!
//! let router: Router = routes(custom, state.clone()).with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod consoles;
mod error;
mod pages;
pub(crate) mod template;
mod utils;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::utils::{CustomRoutes, RouterMapFn};
use crate::middleware::RouterEdgeGateExt;
use crate::service::ServiceState;

#[inline]
async fn not_found() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all site pages behind the edge gate.
///
/// The edge gate also covers the fallback, so unknown paths under a
/// protected prefix redirect to login instead of answering 404.
pub fn routes(custom: CustomRoutes, state: ServiceState) -> Router<ServiceState> {
    let mut router = Router::new()
        .merge(pages::routes())
        .merge(authentication::routes());

    if !custom.disable_consoles {
        router = router.merge(consoles::routes());
    }

    if let Some(additional) = custom.routes.clone() {
        router = router.merge(additional);
    }

    custom
        .map_before_gate(router)
        .fallback(not_found)
        .with_edge_gate(state)
}

#[cfg(test)]
pub(crate) mod test {
    use axum_test::TestServer;
    use glampsite_core::policy::AccessPolicy;

    use crate::handler::{CustomRoutes, routes};
    use crate::service::ServiceState;

    /// Returns a new [`TestServer`] with the given routes and policy.
    pub fn create_test_server_with(
        custom: CustomRoutes,
        access_policy: AccessPolicy,
    ) -> anyhow::Result<TestServer> {
        let state = ServiceState::new(access_policy);
        let app = routes(custom, state.clone()).with_state(state);
        Ok(TestServer::new(app)?)
    }

    /// Returns a new [`TestServer`] with the default routes and policy.
    pub fn create_test_server() -> anyhow::Result<TestServer> {
        create_test_server_with(CustomRoutes::new(), AccessPolicy::default())
    }

    mod tests {
        use axum::Router;
        use axum::http::header::{HeaderName, HeaderValue};
        use axum::http::{StatusCode, header};
        use axum::routing::get;
        use glampsite_core::policy::{AccessPolicy, UnmatchedPolicy};
        use tower_http::set_header::SetResponseHeaderLayer;

        use super::*;

        #[tokio::test]
        async fn unknown_public_path_is_not_found() -> anyhow::Result<()> {
            let server = create_test_server()?;

            let response = server.get("/careers").await;
            response.assert_status(StatusCode::NOT_FOUND);
            assert!(response.text().contains("Page not found"));
            Ok(())
        }

        #[tokio::test]
        async fn unknown_protected_path_redirects_first() -> anyhow::Result<()> {
            let server = create_test_server()?;

            let response = server.get("/agent/reports").await;
            response.assert_status(StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(
                response.header(header::LOCATION),
                "/agent/login?redirect=%2Fagent%2Freports"
            );
            Ok(())
        }

        #[tokio::test]
        async fn custom_routes_are_gated() -> anyhow::Result<()> {
            let custom = CustomRoutes::new().with_routes(
                Router::new()
                    .route("/events", get(|| async { "events" }))
                    .route("/agent/commissions", get(|| async { "commissions" })),
            );
            let server = create_test_server_with(custom, AccessPolicy::default())?;

            server.get("/events").await.assert_status_ok();
            server
                .get("/agent/commissions")
                .await
                .assert_status(StatusCode::TEMPORARY_REDIRECT);
            Ok(())
        }

        #[tokio::test]
        async fn disabled_consoles_are_not_found() -> anyhow::Result<()> {
            let custom = CustomRoutes::new().with_disable_consoles(true);
            let server = create_test_server_with(custom, AccessPolicy::default())?;

            let response = server
                .get("/agent/dashboard")
                .add_header(header::COOKIE, "auth_token=x")
                .await;
            response.assert_status(StatusCode::NOT_FOUND);
            Ok(())
        }

        const SITE_PAGE: HeaderName = HeaderName::from_static("x-site-page");

        fn tag_site_pages(router: Router<ServiceState>) -> Router<ServiceState> {
            router.layer(SetResponseHeaderLayer::overriding(
                SITE_PAGE,
                HeaderValue::from_static("1"),
            ))
        }

        #[tokio::test]
        async fn before_gate_hook_runs_behind_the_edge_gate() -> anyhow::Result<()> {
            let custom = CustomRoutes::new().with_before_gate(tag_site_pages);
            let server = create_test_server_with(custom, AccessPolicy::default())?;

            let page = server.get("/glamps").await;
            page.assert_status_ok();
            assert_eq!(page.header(SITE_PAGE), "1");

            let redirect = server.get("/agent/dashboard").await;
            redirect.assert_status(StatusCode::TEMPORARY_REDIRECT);
            assert!(redirect.maybe_header(SITE_PAGE).is_none());
            Ok(())
        }

        #[tokio::test]
        async fn deny_mode_gates_unmatched_paths() -> anyhow::Result<()> {
            let mut policy = AccessPolicy::default().with_unmatched(UnmatchedPolicy::Deny);
            policy.public_routes.push("/unauthorized".to_owned());
            let server = create_test_server_with(CustomRoutes::new(), policy)?;

            let response = server.get("/careers").await;
            response.assert_status(StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(
                response.header(header::LOCATION),
                "/admin?redirect=%2Fcareers"
            );

            server.get("/unauthorized").await.assert_status_ok();
            server.get("/admin").await.assert_status_ok();
            Ok(())
        }
    }
}
