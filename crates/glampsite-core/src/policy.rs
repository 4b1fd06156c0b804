//! Route classification table shared by the edge and render gates.
//!
//! An [`AccessPolicy`] is loaded once at startup, validated, and then shared
//! immutably. It classifies every path as excluded (never gated), public, part
//! of a protected console section, or unmatched.
//!
//! Paths are matched segment-wise: a path falls under a prefix when it equals
//! the prefix or continues it with `/`. The public route `/` therefore matches
//! only the home page, and `/administrator` does not fall under `/admin`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::role::{Role, RoleSet};
use crate::{Error, Result, TRACING_TARGET_POLICY};

/// Returns `true` if `path` equals `prefix` or is a sub-path of it.
///
/// The root prefix `/` only covers `/` itself.
pub(crate) fn falls_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path == "/";
    }

    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// What to do with paths that are neither public nor inside a protected section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Let the request through without a session (fail-open).
    #[default]
    Allow,
    /// Require a session, redirecting to the fallback login page.
    Deny,
}

/// A console section guarded by a session with one of the listed roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedSection {
    /// Stable name used by page handlers to look the section up.
    pub name: String,
    /// Path prefix covered by this section.
    pub prefix: String,
    /// Sign-in page for this section; never protected itself.
    pub login_page: String,
    /// Roles allowed to see the section's content.
    pub roles: RoleSet,
}

impl ProtectedSection {
    /// Creates a new protected section.
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        login_page: impl Into<String>,
        roles: impl Into<RoleSet>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            login_page: login_page.into(),
            roles: roles.into(),
        }
    }

    /// Returns `true` if the path is inside this section.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        falls_under(path, &self.prefix)
    }
}

/// Paths that bypass gating entirely: API calls, static assets and images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    /// Path prefixes (and exact paths) that are never gated.
    pub prefixes: Vec<String>,
    /// File extensions, without the dot, that are never gated.
    pub extensions: Vec<String>,
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            prefixes: ["/api", "/static", "/assets", "/favicon.ico"]
                .map(String::from)
                .to_vec(),
            extensions: ["svg", "png", "jpg", "jpeg", "gif", "webp", "ico"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl Exclusions {
    /// Returns `true` if the path bypasses both gates.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.prefixes.iter().any(|prefix| falls_under(path, prefix)) {
            return true;
        }

        let file_name = path.rsplit('/').next().unwrap_or(path);
        file_name
            .rsplit_once('.')
            .is_some_and(|(stem, extension)| {
                !stem.is_empty()
                    && self
                        .extensions
                        .iter()
                        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
            })
    }
}

/// The complete route classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicy {
    /// Marketing and booking pages reachable without a session.
    pub public_routes: Vec<String>,
    /// Protected console sections.
    pub sections: Vec<ProtectedSection>,
    /// Paths never intercepted by the gates.
    #[serde(default)]
    pub exclusions: Exclusions,
    /// Page shown to signed-in users whose role is not allowed.
    pub unauthorized_page: String,
    /// Login page used for protected paths with no section of their own.
    pub fallback_login_page: String,
    /// Handling of paths the table does not enumerate.
    #[serde(default)]
    pub unmatched: UnmatchedPolicy,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            public_routes: [
                "/",
                "/glamps",
                "/about",
                "/contact",
                "/facilities",
                "/gallery",
                "/policies",
                "/packages",
                "/booking",
            ]
            .map(String::from)
            .to_vec(),
            sections: vec![
                ProtectedSection::new("admin", "/admin", "/admin", RoleSet::only(Role::Admin)),
                ProtectedSection::new(
                    "agent",
                    "/agent",
                    "/agent/login",
                    RoleSet::only(Role::Agent),
                ),
                ProtectedSection::new(
                    "super-admin",
                    "/super-admin",
                    "/super-admin/login",
                    RoleSet::only(Role::SuperAdmin),
                ),
            ],
            exclusions: Exclusions::default(),
            unauthorized_page: "/unauthorized".to_owned(),
            fallback_login_page: "/admin".to_owned(),
            unmatched: UnmatchedPolicy::Allow,
        }
    }
}

impl AccessPolicy {
    /// Parses and validates a policy from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed JSON and an invalid policy
    /// error if [`validate`](Self::validate) fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(json).map_err(|error| {
            Error::serialization()
                .with_message("access policy is not valid JSON")
                .with_source(error)
        })?;

        policy.validate()?;
        Ok(policy)
    }

    /// Reads, parses and validates a policy file.
    ///
    /// # Errors
    ///
    /// Returns a file system error if the file cannot be read, otherwise the
    /// errors of [`from_json`](Self::from_json).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|error| {
            Error::file_system()
                .with_message(format!("cannot read access policy `{}`", path.display()))
                .with_source(error)
        })?;

        let policy = Self::from_json(&json)?;

        tracing::info!(
            target: TRACING_TARGET_POLICY,
            path = %path.display(),
            sections = policy.sections.len(),
            public_routes = policy.public_routes.len(),
            "loaded access policy"
        );

        Ok(policy)
    }

    /// Returns the policy with a different handling of unmatched paths.
    #[must_use]
    pub fn with_unmatched(mut self, unmatched: UnmatchedPolicy) -> Self {
        self.unmatched = unmatched;
        self
    }

    /// Returns `true` if the path is, or is a sub-path of, a public route.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_routes
            .iter()
            .any(|route| falls_under(path, route))
    }

    /// Returns `true` if the path bypasses gating.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.matches(path)
    }

    /// Returns the most specific section covering the path.
    #[must_use]
    pub fn section_for(&self, path: &str) -> Option<&ProtectedSection> {
        self.sections
            .iter()
            .filter(|section| section.covers(path))
            .max_by_key(|section| section.prefix.len())
    }

    /// Looks a section up by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&ProtectedSection> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Returns `true` if the path is the login page of a section or the fallback login page.
    #[must_use]
    pub fn is_login_page(&self, path: &str) -> bool {
        path == self.fallback_login_page
            || self.sections.iter().any(|section| section.login_page == path)
    }

    /// Checks the policy for inconsistencies that would break gating.
    ///
    /// # Errors
    ///
    /// Returns an invalid policy error when a path does not start with `/`,
    /// a section has no name, no roles or a duplicate name or prefix, a login
    /// page is guarded by another section, or the unauthorized or fallback
    /// login page is itself protected.
    pub fn validate(&self) -> Result<()> {
        let absolute = |label: &str, path: &str| -> Result<()> {
            if path.starts_with('/') {
                Ok(())
            } else {
                Err(Error::invalid_policy(format!(
                    "{label} `{path}` must start with `/`"
                )))
            }
        };

        for route in &self.public_routes {
            absolute("public route", route)?;
        }
        absolute("unauthorized page", &self.unauthorized_page)?;
        absolute("fallback login page", &self.fallback_login_page)?;

        for (index, section) in self.sections.iter().enumerate() {
            if section.name.is_empty() {
                return Err(Error::invalid_policy(format!(
                    "section for `{}` has no name",
                    section.prefix
                )));
            }
            absolute("section prefix", &section.prefix)?;
            absolute("login page", &section.login_page)?;

            if section.roles.is_empty() {
                return Err(Error::invalid_policy(format!(
                    "section `{}` allows no roles",
                    section.name
                )));
            }

            let earlier = &self.sections[..index];
            if earlier.iter().any(|other| other.name == section.name) {
                return Err(Error::invalid_policy(format!(
                    "duplicate section name `{}`",
                    section.name
                )));
            }
            if earlier.iter().any(|other| other.prefix == section.prefix) {
                return Err(Error::invalid_policy(format!(
                    "duplicate section prefix `{}`",
                    section.prefix
                )));
            }
        }

        for section in &self.sections {
            if let Some(guard) = self.section_for(&section.login_page)
                && guard.login_page != section.login_page
            {
                return Err(Error::invalid_policy(format!(
                    "login page `{}` of section `{}` is guarded by section `{}`",
                    section.login_page, section.name, guard.name
                )));
            }
        }

        if let Some(guard) = self.section_for(&self.unauthorized_page) {
            return Err(Error::invalid_policy(format!(
                "unauthorized page `{}` is guarded by section `{}`",
                self.unauthorized_page, guard.name
            )));
        }

        if let Some(guard) = self.section_for(&self.fallback_login_page)
            && guard.login_page != self.fallback_login_page
        {
            return Err(Error::invalid_policy(format!(
                "fallback login page `{}` is guarded by section `{}`",
                self.fallback_login_page, guard.name
            )));
        }

        if self.unmatched == UnmatchedPolicy::Deny
            && !self.is_public(&self.unauthorized_page)
            && !self.is_excluded(&self.unauthorized_page)
        {
            return Err(Error::invalid_policy(format!(
                "unauthorized page `{}` must be public when unmatched paths are denied",
                self.unauthorized_page
            )));
        }

        Ok(())
    }
}
