use std::fmt;

/// Outcome of a gate evaluation.
///
/// Decisions are transient: they are recomputed for every request and every
/// render of a protected subtree and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// The caller may proceed.
    Allow,
    /// The caller must sign in; carries the login URL to navigate to.
    RedirectToLogin(String),
    /// The caller is signed in but not permitted; carries the unauthorized page.
    RedirectToUnauthorized(String),
}

impl AuthDecision {
    /// Returns `true` if the caller may proceed.
    #[inline]
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the navigation target for redirect decisions.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin(target) | Self::RedirectToUnauthorized(target) => Some(target),
        }
    }
}

impl fmt::Display for AuthDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::RedirectToLogin(target) => write!(f, "redirect to login `{target}`"),
            Self::RedirectToUnauthorized(target) => {
                write!(f, "redirect to unauthorized `{target}`")
            }
        }
    }
}
