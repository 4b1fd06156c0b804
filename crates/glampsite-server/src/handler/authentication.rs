//! Console sign-in pages and sign-out.
//!
//! Credentials are exchanged with the booking API, which sets the session
//! cookie. These pages only render the form and clear the cookie again.

use axum::Router;
use axum::extract::Query;
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use glampsite_core::SESSION_COOKIE_NAME;
use serde::Deserialize;

use crate::handler::template::{escape, layout};
use crate::service::ServiceState;
use crate::utility::tracing_targets;

/// Endpoint of the booking API that exchanges credentials for a session.
const SIGN_IN_ACTION: &str = "/api/auth/login";

#[derive(Debug, Default, Deserialize)]
struct LoginQuery {
    redirect: Option<String>,
}

/// Returns the redirect target if it stays on this site.
fn same_site_path(redirect: Option<&str>) -> Option<&str> {
    redirect.filter(|path| {
        path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
    })
}

fn login_page(console: &str, query: &LoginQuery) -> Html<String> {
    let redirect_field = same_site_path(query.redirect.as_deref())
        .map(|path| {
            format!(
                "<input type=\"hidden\" name=\"redirect\" value=\"{}\">",
                escape(path)
            )
        })
        .unwrap_or_default();

    let body = format!(
        "<h1>{console} sign in</h1>\
         <form method=\"post\" action=\"{SIGN_IN_ACTION}\">\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         {redirect_field}\
         <button type=\"submit\">Sign in</button>\
         </form>",
        console = escape(console),
    );

    layout(&format!("{console} sign in"), &body)
}

async fn admin_login(Query(query): Query<LoginQuery>) -> Html<String> {
    login_page("Admin", &query)
}

async fn agent_login(Query(query): Query<LoginQuery>) -> Html<String> {
    login_page("Agent", &query)
}

async fn super_admin_login(Query(query): Query<LoginQuery>) -> Html<String> {
    login_page("Super admin", &query)
}

/// Clears the session cookie and returns to the home page.
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let signed_in = jar.get(SESSION_COOKIE_NAME).is_some();
    tracing::debug!(
        target: tracing_targets::AUTHENTICATION,
        signed_in,
        "clearing session cookie"
    );

    let jar = jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"));
    (jar, Redirect::to("/"))
}

/// Returns a [`Router`] with the sign-in pages and sign-out.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/admin", get(admin_login))
        .route("/agent/login", get(agent_login))
        .route("/super-admin/login", get(super_admin_login))
        .route("/logout", get(logout).post(logout))
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};

    use super::*;
    use crate::handler::test::create_test_server;

    #[test]
    fn only_same_site_paths_are_kept() {
        assert_eq!(same_site_path(Some("/agent/dashboard")), Some("/agent/dashboard"));
        assert_eq!(same_site_path(Some("//evil.example")), None);
        assert_eq!(same_site_path(Some("/\\evil.example")), None);
        assert_eq!(same_site_path(Some("https://evil.example")), None);
        assert_eq!(same_site_path(None), None);
    }

    #[tokio::test]
    async fn login_page_carries_redirect() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/agent/login")
            .add_query_param("redirect", "/agent/dashboard")
            .await;
        response.assert_status_ok();
        assert!(
            response
                .text()
                .contains("name=\"redirect\" value=\"/agent/dashboard\"")
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_page_drops_offsite_redirect() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/super-admin/login")
            .add_query_param("redirect", "https://evil.example")
            .await;
        response.assert_status_ok();
        assert!(!response.text().contains("evil.example"));
        Ok(())
    }

    #[tokio::test]
    async fn admin_login_is_served_at_section_root() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/admin").await;
        response.assert_status_ok();
        assert!(response.text().contains("Admin sign in"));
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_session_cookie() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/logout")
            .add_header(header::COOKIE, "auth_token=abc")
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/");

        let set_cookie = response.header(header::SET_COOKIE);
        let set_cookie = set_cookie.to_str()?;
        assert!(set_cookie.starts_with("auth_token="));
        assert!(set_cookie.contains("Path=/"));
        assert!(set_cookie.contains("Max-Age=0"));
        Ok(())
    }
}
