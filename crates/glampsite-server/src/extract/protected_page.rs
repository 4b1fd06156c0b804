use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use glampsite_core::gate::{CookieStore, GateView, RenderGate};
use glampsite_core::policy::AccessPolicy;
use glampsite_core::token::TokenPayload;
use jiff::Timestamp;

use crate::handler::{ErrorKind, template};
use crate::utility::tracing_targets;

/// Read-only view of a request's cookies for the access gates.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies<'a>(pub &'a CookieJar);

impl CookieStore for SessionCookies<'_> {
    fn cookie(&self, name: &str) -> Option<String> {
        self.0.get(name).map(|cookie| cookie.value().to_owned())
    }
}

/// Render gate for a protected console page.
///
/// Extraction never fails. The gate is evaluated by [`render`], once per
/// request, so every page load re-reads the session cookie.
///
/// [`render`]: ProtectedPage::render
#[derive(Debug, Clone)]
pub struct ProtectedPage {
    access_policy: Arc<AccessPolicy>,
    jar: CookieJar,
}

impl ProtectedPage {
    /// Creates a protected page from an access policy and the request cookies.
    pub fn new(access_policy: Arc<AccessPolicy>, jar: CookieJar) -> Self {
        Self { access_policy, jar }
    }

    /// Evaluates the gate of `section` at `now` and renders its outcome.
    ///
    /// `content` is only called for an authorized session.
    pub fn render_at<T>(
        &self,
        section: &str,
        now: Timestamp,
        content: impl FnOnce(&TokenPayload) -> T,
    ) -> Response
    where
        T: IntoResponse,
    {
        let Some(section) = self.access_policy.section(section) else {
            tracing::error!(
                target: tracing_targets::AUTHORIZATION,
                section = section,
                "protected page names a section missing from the access policy"
            );
            return ErrorKind::InternalServerError
                .with_message("This page is not available right now")
                .with_context(format!("unknown section `{section}`"))
                .into_response();
        };

        let mut gate = RenderGate::for_section(section, &self.access_policy);
        gate.mount(&SessionCookies(&self.jar), now);

        let Some(decision) = gate.decision() else {
            return template::loading().into_response();
        };

        if let Some(location) = decision.redirect_target() {
            tracing::debug!(
                target: tracing_targets::AUTHORIZATION,
                section = %section.name,
                location = %location,
                "render gate redirect"
            );
            return Redirect::to(location).into_response();
        }

        match gate.render(|payload| {
            tracing::debug!(
                target: tracing_targets::AUTHORIZATION,
                section = %section.name,
                user_id = %payload.user_id,
                role = %payload.role,
                "rendering protected page"
            );
            content(payload)
        }) {
            GateView::Content(content) => content.into_response(),
            // An allowed gate always renders content.
            GateView::Redirect(_) | GateView::Loading => template::loading().into_response(),
        }
    }

    /// Evaluates the gate of `section` now and renders its outcome.
    pub fn render<T>(&self, section: &str, content: impl FnOnce(&TokenPayload) -> T) -> Response
    where
        T: IntoResponse,
    {
        self.render_at(section, Timestamp::now(), content)
    }
}

impl<S> FromRequestParts<S> for ProtectedPage
where
    S: Sync + Send + 'static,
    Arc<AccessPolicy>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        Ok(Self::new(Arc::<AccessPolicy>::from_ref(state), jar))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::{self, HeaderMap, HeaderValue};
    use axum::http::StatusCode;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use super::*;

    const NOW: i64 = 1_800_000_000;

    fn issue(role: &str, exp: i64) -> anyhow::Result<String> {
        let claims = json!({ "role": role, "userId": "u-17", "iat": NOW - 60, "exp": exp });
        let key = EncodingKey::from_secret(b"booking-api-secret");
        Ok(encode(&Header::default(), &claims, &key)?)
    }

    fn page(cookie: Option<&str>) -> anyhow::Result<ProtectedPage> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(header::COOKIE, HeaderValue::from_str(cookie)?);
        }
        Ok(ProtectedPage::new(
            Arc::new(AccessPolicy::default()),
            CookieJar::from_headers(&headers),
        ))
    }

    fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    #[test]
    fn authorized_session_renders_content() -> anyhow::Result<()> {
        let token = issue("AGENT", NOW + 3600)?;
        let page = page(Some(&format!("auth_token={token}")))?;

        let response = page.render_at("agent", Timestamp::from_second(NOW)?, |payload| {
            format!("hello {}", payload.user_id)
        });
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[test]
    fn wrong_role_goes_to_unauthorized() -> anyhow::Result<()> {
        let token = issue("AGENT", NOW + 3600)?;
        let page = page(Some(&format!("auth_token={token}")))?;

        let response = page.render_at("admin", Timestamp::from_second(NOW)?, |_| "console");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/unauthorized"));
        Ok(())
    }

    #[test]
    fn expired_session_goes_to_login_without_redirect() -> anyhow::Result<()> {
        let token = issue("SUPER_ADMIN", NOW - 1)?;
        let page = page(Some(&format!("auth_token={token}")))?;

        let response = page.render_at("super-admin", Timestamp::from_second(NOW)?, |_| "console");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/super-admin/login"));
        Ok(())
    }

    #[test]
    fn content_is_not_built_without_session() -> anyhow::Result<()> {
        let page = page(None)?;

        let response = page.render_at("admin", Timestamp::from_second(NOW)?, |_| -> &'static str {
            panic!("content must not render")
        });
        assert_eq!(location(&response), Some("/admin"));
        Ok(())
    }

    #[test]
    fn unknown_section_is_an_error() -> anyhow::Result<()> {
        let page = page(None)?;

        let response = page.render_at("billing", Timestamp::from_second(NOW)?, |_| "console");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }
}
