//! Edge gate: coarse, per-request classification.

use strum::IntoStaticStr;
use url::form_urlencoded;

use super::AuthDecision;
use crate::TRACING_TARGET_GATE;
use crate::policy::{AccessPolicy, UnmatchedPolicy};

/// The parts of an incoming request the edge gate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRequest<'a> {
    /// Request path, without query string.
    pub path: &'a str,
    /// Raw value of the session cookie, if the request carries one.
    pub session_token: Option<&'a str>,
}

impl<'a> EdgeRequest<'a> {
    /// Creates a request for the given path without a session cookie.
    #[must_use]
    pub const fn new(path: &'a str) -> Self {
        Self {
            path,
            session_token: None,
        }
    }

    /// Attaches the raw session cookie value.
    #[must_use]
    pub const fn with_session_token(mut self, session_token: Option<&'a str>) -> Self {
        self.session_token = session_token;
        self
    }

    /// Returns `true` if a non-empty session cookie is present.
    ///
    /// The cookie's contents are not examined.
    #[must_use]
    pub fn has_session_token(&self) -> bool {
        self.session_token.is_some_and(|token| !token.is_empty())
    }
}

/// Terminal state of the edge gate for one request.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EdgeOutcome {
    /// API, static asset or image path; never gated.
    Excluded,
    /// Public route or a sub-path of one.
    Public,
    /// Not covered by the route table; let through.
    Unprotected,
    /// The login page of the matching section; let through to avoid a loop.
    LoginPage,
    /// Protected path with a session cookie present.
    Authenticated {
        /// Name of the matched section; `None` for an unmatched path under
        /// [`UnmatchedPolicy::Deny`].
        section: Option<String>,
    },
    /// Protected path without a session cookie.
    MissingToken {
        /// Login URL carrying the original path as `redirect`.
        login_url: String,
    },
}

impl EdgeOutcome {
    /// Returns the decision this outcome stands for.
    #[must_use]
    pub fn decision(&self) -> AuthDecision {
        match self {
            Self::MissingToken { login_url } => AuthDecision::RedirectToLogin(login_url.clone()),
            _ => AuthDecision::Allow,
        }
    }

    /// Returns the outcome name for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Builds a login URL that returns the user to `original_path` after sign-in.
///
/// ```
/// use glampsite_core::gate::login_url;
///
/// assert_eq!(
///     login_url("/agent/login", "/agent/dashboard"),
///     "/agent/login?redirect=%2Fagent%2Fdashboard",
/// );
/// ```
#[must_use]
pub fn login_url(login_page: &str, original_path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", original_path)
        .finish();
    format!("{login_page}?{query}")
}

impl AccessPolicy {
    /// Classifies a request at the edge.
    ///
    /// Evaluation is stateless: the same request always yields the same
    /// outcome. Roles and expiry are not checked here.
    #[must_use]
    pub fn classify(&self, request: &EdgeRequest<'_>) -> EdgeOutcome {
        let path = request.path;

        if self.is_excluded(path) {
            return EdgeOutcome::Excluded;
        }

        if self.is_public(path) {
            return EdgeOutcome::Public;
        }

        let section = self.section_for(path);
        let login_page = match section {
            Some(section) => section.login_page.as_str(),
            None => match self.unmatched {
                UnmatchedPolicy::Allow => return EdgeOutcome::Unprotected,
                UnmatchedPolicy::Deny if self.is_login_page(path) => {
                    return EdgeOutcome::LoginPage;
                }
                UnmatchedPolicy::Deny => self.fallback_login_page.as_str(),
            },
        };

        if path == login_page {
            return EdgeOutcome::LoginPage;
        }

        if request.has_session_token() {
            return EdgeOutcome::Authenticated {
                section: section.map(|section| section.name.clone()),
            };
        }

        let login_url = login_url(login_page, path);

        tracing::debug!(
            target: TRACING_TARGET_GATE,
            path = %path,
            login_url = %login_url,
            "protected path requested without a session cookie"
        );

        EdgeOutcome::MissingToken { login_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC: [&str; 9] = [
        "/",
        "/glamps",
        "/about",
        "/contact",
        "/facilities",
        "/gallery",
        "/policies",
        "/packages",
        "/booking",
    ];

    fn classify(policy: &AccessPolicy, path: &str, token: Option<&str>) -> EdgeOutcome {
        policy.classify(&EdgeRequest::new(path).with_session_token(token))
    }

    #[test]
    fn public_routes_always_proceed() {
        let policy = AccessPolicy::default();

        for route in PUBLIC {
            let mut paths = vec![route.to_owned()];
            if route != "/" {
                paths.push(format!("{route}/details"));
            }

            for path in paths {
                for token in [None, Some(""), Some("a.b.c"), Some("garbage")] {
                    assert_eq!(classify(&policy, &path, token), EdgeOutcome::Public, "{path}");
                }
            }
        }
    }

    #[test]
    fn agent_dashboard_without_cookie() {
        let policy = AccessPolicy::default();
        let outcome = classify(&policy, "/agent/dashboard", None);

        assert_eq!(
            outcome.decision(),
            AuthDecision::RedirectToLogin("/agent/login?redirect=%2Fagent%2Fdashboard".to_owned())
        );
    }

    #[test]
    fn each_section_redirects_to_its_own_login() {
        let policy = AccessPolicy::default();

        let cases = [
            ("/agent", "/agent/login?redirect=%2Fagent"),
            ("/agent/bookings/42", "/agent/login?redirect=%2Fagent%2Fbookings%2F42"),
            ("/admin/rates", "/admin?redirect=%2Fadmin%2Frates"),
            ("/super-admin", "/super-admin/login?redirect=%2Fsuper-admin"),
            (
                "/super-admin/sites/new",
                "/super-admin/login?redirect=%2Fsuper-admin%2Fsites%2Fnew",
            ),
        ];

        for (path, expected) in cases {
            assert_eq!(
                classify(&policy, path, None),
                EdgeOutcome::MissingToken {
                    login_url: expected.to_owned()
                },
                "{path}"
            );
        }
    }

    #[test]
    fn login_pages_are_never_gated() {
        let policy = AccessPolicy::default();

        for path in ["/admin", "/agent/login", "/super-admin/login"] {
            assert_eq!(classify(&policy, path, None), EdgeOutcome::LoginPage);
            assert!(classify(&policy, path, None).decision().is_allowed());
        }
    }

    #[test]
    fn cookie_presence_is_enough() {
        let policy = AccessPolicy::default();

        for token in ["a.b.c", "not-even-a-token"] {
            assert_eq!(
                classify(&policy, "/super-admin/sites", Some(token)),
                EdgeOutcome::Authenticated {
                    section: Some("super-admin".to_owned())
                }
            );
        }

        assert!(matches!(
            classify(&policy, "/super-admin/sites", Some("")),
            EdgeOutcome::MissingToken { .. }
        ));
    }

    #[test]
    fn excluded_paths_bypass_everything() {
        let policy = AccessPolicy::default();

        for path in ["/api/bookings", "/static/site.css", "/admin/logo.svg", "/favicon.ico"] {
            assert_eq!(classify(&policy, path, None), EdgeOutcome::Excluded, "{path}");
        }
    }

    #[test]
    fn unmatched_paths_follow_policy() {
        let allow = AccessPolicy::default();
        assert_eq!(classify(&allow, "/reports", None), EdgeOutcome::Unprotected);
        assert_eq!(classify(&allow, "/administrator", None), EdgeOutcome::Unprotected);

        let deny = AccessPolicy::default().with_unmatched(UnmatchedPolicy::Deny);
        assert_eq!(
            classify(&deny, "/reports", None),
            EdgeOutcome::MissingToken {
                login_url: "/admin?redirect=%2Freports".to_owned()
            }
        );
        assert_eq!(
            classify(&deny, "/reports", Some("t")),
            EdgeOutcome::Authenticated { section: None }
        );
        assert_eq!(classify(&deny, "/about", None), EdgeOutcome::Public);
    }

    #[test]
    fn double_slash_is_not_the_home_page() {
        let policy = AccessPolicy::default();
        assert_eq!(classify(&policy, "//agent/dashboard", None), EdgeOutcome::Unprotected);

        let deny = AccessPolicy::default().with_unmatched(UnmatchedPolicy::Deny);
        assert_eq!(
            classify(&deny, "//agent/dashboard", None),
            EdgeOutcome::MissingToken {
                login_url: "/admin?redirect=%2F%2Fagent%2Fdashboard".to_owned()
            }
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let policy = AccessPolicy::default();
        let paths = ["/", "/agent/dashboard", "/admin", "/reports", "/api/x", "/admin/rates"];

        for path in paths {
            for token in [None, Some("a.b.c")] {
                let request = EdgeRequest::new(path).with_session_token(token);
                assert_eq!(policy.classify(&request), policy.classify(&request));
            }
        }
    }

    #[test]
    fn redirect_parameter_is_form_encoded() {
        assert_eq!(
            login_url("/admin", "/admin/guests/Zoë & Co"),
            "/admin?redirect=%2Fadmin%2Fguests%2FZo%C3%AB+%26+Co"
        );
        assert_eq!(EdgeOutcome::LoginPage.as_str(), "login_page");
    }
}
