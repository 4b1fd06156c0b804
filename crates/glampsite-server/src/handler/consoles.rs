//! Staff consoles behind the render gate.

use axum::Router;
use axum::response::{Html, Response};
use axum::routing::get;
use glampsite_core::token::TokenPayload;

use crate::extract::ProtectedPage;
use crate::handler::template::{escape, layout};
use crate::service::ServiceState;

fn console(title: &str, payload: &TokenPayload, links: &[(&str, &str)]) -> Html<String> {
    let links: String = links
        .iter()
        .map(|(href, label)| format!("<li><a href=\"{href}\">{label}</a></li>"))
        .collect();

    let body = format!(
        "<h1>{title}</h1>\
         <p>Signed in as <strong>{user}</strong> ({role}).</p>\
         <ul>{links}</ul>\
         <form method=\"post\" action=\"/logout\"><button type=\"submit\">Sign out</button></form>",
        title = escape(title),
        user = escape(&payload.user_id),
        role = escape(&payload.role),
    );

    layout(title, &body)
}

async fn agent_dashboard(page: ProtectedPage) -> Response {
    page.render("agent", |payload| {
        console(
            "Agent dashboard",
            payload,
            &[("/booking", "New booking"), ("/packages", "Packages")],
        )
    })
}

async fn admin_dashboard(page: ProtectedPage) -> Response {
    page.render("admin", |payload| {
        console(
            "Admin dashboard",
            payload,
            &[("/glamps", "Glamps"), ("/booking", "Bookings")],
        )
    })
}

async fn super_admin_dashboard(page: ProtectedPage) -> Response {
    page.render("super-admin", |payload| {
        console(
            "Super admin dashboard",
            payload,
            &[("/admin/dashboard", "Admin console"), ("/policies", "Site policies")],
        )
    })
}

/// Returns a [`Router`] with the protected consoles.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/agent/dashboard", get(agent_dashboard))
        .route("/admin/dashboard", get(admin_dashboard))
        .route("/super-admin/dashboard", get(super_admin_dashboard))
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use jiff::Timestamp;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use crate::handler::test::create_test_server;

    fn session(role: &str, ttl_secs: i64) -> anyhow::Result<String> {
        let now = Timestamp::now().as_second();
        let claims = json!({
            "role": role,
            "userId": "staff-3",
            "iat": now,
            "exp": now + ttl_secs,
        });
        let key = EncodingKey::from_secret(b"booking-api-secret");
        Ok(format!("auth_token={}", encode(&Header::default(), &claims, &key)?))
    }

    #[tokio::test]
    async fn matching_role_sees_console() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/agent/dashboard")
            .add_header(header::COOKIE, session("AGENT", 3600)?)
            .await;
        response.assert_status_ok();
        let text = response.text();
        assert!(text.contains("Agent dashboard"));
        assert!(text.contains("staff-3"));
        Ok(())
    }

    #[tokio::test]
    async fn other_role_is_sent_to_unauthorized() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/admin/dashboard")
            .add_header(header::COOKIE, session("AGENT", 3600)?)
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn admin_cannot_open_super_admin_console() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/super-admin/dashboard")
            .add_header(header::COOKIE, session("ADMIN", 3600)?)
            .await;
        assert_eq!(response.header(header::LOCATION), "/unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn expired_session_is_sent_to_plain_login() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/super-admin/dashboard")
            .add_header(header::COOKIE, session("SUPER_ADMIN", -60)?)
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/super-admin/login");
        Ok(())
    }

    #[tokio::test]
    async fn garbage_cookie_passes_edge_but_not_render_gate() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/admin/dashboard")
            .add_header(header::COOKIE, "auth_token=garbage")
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/admin");
        Ok(())
    }

    #[tokio::test]
    async fn no_cookie_is_stopped_at_the_edge() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/admin/dashboard").await;
        response.assert_status(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.header(header::LOCATION),
            "/admin?redirect=%2Fadmin%2Fdashboard"
        );
        Ok(())
    }
}
