use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use glampsite_core::policy::{AccessPolicy, UnmatchedPolicy};
use serde::{Deserialize, Serialize};

use crate::service::Result;
use crate::utility::tracing_targets;

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Default, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(pattern = "owned", setter(into, strip_option, prefix = "with"))]
pub struct ServiceConfig {
    /// Path to a JSON access policy document.
    ///
    /// When unset, the built-in route table is used.
    #[cfg_attr(feature = "config", arg(long, env = "ACCESS_POLICY_PATH"))]
    #[builder(default)]
    pub access_policy_path: Option<PathBuf>,

    /// Require a session on paths the access policy does not enumerate.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "DENY_UNMATCHED_ROUTES", default_value_t = false)
    )]
    #[builder(default)]
    pub deny_unmatched: bool,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Loads and validates the access policy.
    ///
    /// `deny_unmatched` only ever tightens the policy: a document that already
    /// denies unmatched paths keeps doing so.
    pub fn load_access_policy(&self) -> Result<AccessPolicy> {
        let mut policy = match &self.access_policy_path {
            Some(path) => AccessPolicy::from_path(path)?,
            None => AccessPolicy::default(),
        };

        if self.deny_unmatched {
            policy = policy.with_unmatched(UnmatchedPolicy::Deny);
            policy.validate()?;
        }

        tracing::info!(
            target: tracing_targets::SERVICE,
            source = self
                .access_policy_path
                .as_deref()
                .map_or_else(|| "built-in".to_owned(), |p| p.display().to_string()),
            sections = policy.sections.len(),
            unmatched = ?policy.unmatched,
            "access policy ready"
        );

        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn default_config_uses_builtin_policy() -> anyhow::Result<()> {
        let policy = ServiceConfig::default().load_access_policy()?;
        assert_eq!(policy, AccessPolicy::default());
        Ok(())
    }

    #[test]
    fn deny_unmatched_requires_public_unauthorized_page() -> anyhow::Result<()> {
        let config = ServiceConfig::builder().with_deny_unmatched(true).build()?;
        let error = config.load_access_policy().expect_err("unauthorized page is unmatched");
        assert_eq!(error.kind(), ErrorKind::Config);

        let mut policy = AccessPolicy::default();
        policy.public_routes.push("/unauthorized".to_owned());
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(serde_json::to_string(&policy)?.as_bytes())?;

        let config = ServiceConfig::builder()
            .with_access_policy_path(file.path())
            .with_deny_unmatched(true)
            .build()?;
        let loaded = config.load_access_policy()?;
        assert_eq!(loaded.unmatched, UnmatchedPolicy::Deny);
        Ok(())
    }

    #[test]
    fn missing_policy_file_is_reported() -> anyhow::Result<()> {
        let config = ServiceConfig::builder()
            .with_access_policy_path("/nonexistent/access-policy.json")
            .build()?;

        let error = config.load_access_policy().expect_err("file is missing");
        assert_eq!(error.kind(), ErrorKind::FileSystem);
        Ok(())
    }
}
