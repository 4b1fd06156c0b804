//! Render gate: fine-grained check before protected content is produced.

use jiff::Timestamp;
use strum::IntoStaticStr;

use super::{AuthDecision, CookieStore};
use crate::policy::{AccessPolicy, ProtectedSection};
use crate::role::RoleSet;
use crate::token::{TokenPayload, decode_token};
use crate::{SESSION_COOKIE_NAME, TRACING_TARGET_GATE};

/// Why the render gate sent the caller to the login page.
///
/// The reason only shows up in logs; every variant leads to the same page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum LoginReason {
    /// No session cookie, or an empty one.
    MissingToken,
    /// The token could not be decoded or lacks required claims.
    Malformed,
    /// The token's `exp` claim is in the past.
    Expired,
}

/// State of a [`RenderGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Not evaluated yet; only a loading indicator may be shown.
    Loading,
    /// The caller must sign in.
    LoginRedirect(LoginReason),
    /// The caller is signed in with a role the section does not allow.
    ForbiddenRedirect,
    /// The caller may see the protected content.
    Authorized(TokenPayload),
}

/// What a protected subtree should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView<T> {
    /// Evaluation has not run yet.
    Loading,
    /// Navigate to the given path instead of rendering.
    Redirect(String),
    /// The rendered protected content.
    Content(T),
}

/// Gate wrapping the render of a protected subtree.
///
/// A gate starts in [`GateState::Loading`] and is evaluated by
/// [`mount`](Self::mount). It does not watch the cookie afterwards: a token
/// that expires while the page is open is noticed on the next mount.
#[derive(Debug, Clone)]
pub struct RenderGate {
    required_roles: RoleSet,
    login_page: String,
    unauthorized_page: String,
    state: GateState,
}

impl RenderGate {
    /// Creates a gate requiring one of `required_roles`.
    pub fn new(
        required_roles: impl Into<RoleSet>,
        login_page: impl Into<String>,
        unauthorized_page: impl Into<String>,
    ) -> Self {
        Self {
            required_roles: required_roles.into(),
            login_page: login_page.into(),
            unauthorized_page: unauthorized_page.into(),
            state: GateState::Loading,
        }
    }

    /// Creates a gate for a section of the policy.
    pub fn for_section(section: &ProtectedSection, policy: &AccessPolicy) -> Self {
        Self::new(
            section.roles.clone(),
            section.login_page.clone(),
            policy.unauthorized_page.clone(),
        )
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Returns the login page this gate redirects to.
    #[must_use]
    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    /// Evaluates the gate against a cookie store without changing its state.
    #[must_use]
    pub fn evaluate(&self, cookies: &impl CookieStore, now: Timestamp) -> GateState {
        let Some(raw) = cookies
            .cookie(SESSION_COOKIE_NAME)
            .filter(|token| !token.is_empty())
        else {
            return self.login(LoginReason::MissingToken, None);
        };

        let Some(payload) = decode_token(&raw) else {
            return self.login(LoginReason::Malformed, None);
        };

        if payload.is_expired_at(now) {
            return self.login(LoginReason::Expired, Some(&payload));
        }

        if !self.required_roles.contains_role(&payload.role) {
            tracing::info!(
                target: TRACING_TARGET_GATE,
                user_id = %payload.user_id,
                role = %payload.role,
                required = %self.required_roles,
                unauthorized_page = %self.unauthorized_page,
                "role not permitted for protected content"
            );
            return GateState::ForbiddenRedirect;
        }

        tracing::trace!(
            target: TRACING_TARGET_GATE,
            user_id = %payload.user_id,
            role = %payload.role,
            "protected content authorized"
        );

        GateState::Authorized(payload)
    }

    fn login(&self, reason: LoginReason, payload: Option<&TokenPayload>) -> GateState {
        tracing::debug!(
            target: TRACING_TARGET_GATE,
            reason = <&'static str>::from(reason),
            user_id = payload.map(|p| p.user_id.as_str()),
            expired_at = ?payload.and_then(TokenPayload::expiry),
            login_page = %self.login_page,
            "sending caller to login"
        );
        GateState::LoginRedirect(reason)
    }

    /// Evaluates the gate and stores the resulting state.
    pub fn mount(&mut self, cookies: &impl CookieStore, now: Timestamp) -> &GateState {
        self.state = self.evaluate(cookies, now);
        &self.state
    }

    /// Returns the decision for the current state, or `None` while loading.
    #[must_use]
    pub fn decision(&self) -> Option<AuthDecision> {
        match &self.state {
            GateState::Loading => None,
            GateState::LoginRedirect(_) => {
                Some(AuthDecision::RedirectToLogin(self.login_page.clone()))
            }
            GateState::ForbiddenRedirect => Some(AuthDecision::RedirectToUnauthorized(
                self.unauthorized_page.clone(),
            )),
            GateState::Authorized(_) => Some(AuthDecision::Allow),
        }
    }

    /// Renders the protected subtree only when authorized.
    ///
    /// `content` is not called in any other state.
    pub fn render<T>(&self, content: impl FnOnce(&TokenPayload) -> T) -> GateView<T> {
        match &self.state {
            GateState::Loading => GateView::Loading,
            GateState::LoginRedirect(_) => GateView::Redirect(self.login_page.clone()),
            GateState::ForbiddenRedirect => GateView::Redirect(self.unauthorized_page.clone()),
            GateState::Authorized(payload) => GateView::Content(content(payload)),
        }
    }
}
