//! Hardening headers and compression for every page the site serves.

use axum::Router;
use axum::http::header::{self, HeaderName, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::utility::tracing_targets;

const ONE_YEAR_SECS: u64 = 365 * 24 * 60 * 60;

/// Adds [`SecurityHeadersConfig::response_headers`] to a [`Router`].
pub trait RouterSecurityExt<S> {
    /// Compresses bodies and overrides the hardening headers on every response.
    fn with_security(self, config: &SecurityHeadersConfig) -> Self;

    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, config: &SecurityHeadersConfig) -> Self {
        config
            .response_headers()
            .into_iter()
            .fold(self.layer(CompressionLayer::new()), |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::overriding(name, value))
            })
    }

    fn with_default_security(self) -> Self {
        self.with_security(&SecurityHeadersConfig::default())
    }
}

/// Browser hardening headers.
///
/// Only the HSTS settings are exposed on the command line; the rest are
/// fixed for a site that is never framed and loads only its own assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityHeadersConfig {
    /// `Strict-Transport-Security` max-age; `0` omits the header.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HSTS_MAX_AGE", default_value_t = ONE_YEAR_SECS)
    )]
    pub hsts_max_age_seconds: u64,

    #[cfg_attr(
        feature = "config",
        arg(long, env = "HSTS_INCLUDE_SUBDOMAINS", default_value = "true")
    )]
    pub hsts_include_subdomains: bool,

    #[cfg_attr(feature = "config", arg(skip = SecurityHeadersConfig::default_csp()))]
    pub content_security_policy: Option<String>,

    #[cfg_attr(feature = "config", arg(skip = FrameOptions::Deny))]
    pub frame_options: FrameOptions,

    #[cfg_attr(feature = "config", arg(skip = ReferrerPolicy::StrictOriginWhenCrossOrigin))]
    pub referrer_policy: ReferrerPolicy,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            hsts_max_age_seconds: ONE_YEAR_SECS,
            hsts_include_subdomains: true,
            content_security_policy: Self::default_csp(),
            frame_options: FrameOptions::Deny,
            referrer_policy: ReferrerPolicy::StrictOriginWhenCrossOrigin,
        }
    }
}

impl SecurityHeadersConfig {
    fn default_csp() -> Option<String> {
        let directives = [
            "default-src 'self'",
            "script-src 'self'",
            "style-src 'self' 'unsafe-inline'",
            "img-src 'self' data:",
            "frame-ancestors 'none'",
            "base-uri 'self'",
            // Login forms post to the booking API on the same origin.
            "form-action 'self'",
        ];
        Some(directives.join("; "))
    }

    /// `max-age=N`, with `includeSubDomains` appended when enabled.
    pub fn hsts_header_value(&self) -> String {
        let mut value = format!("max-age={}", self.hsts_max_age_seconds);
        if self.hsts_include_subdomains {
            value.push_str("; includeSubDomains");
        }
        value
    }

    /// Headers set on every response, skipping any whose value is not a
    /// legal header value.
    pub fn response_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = vec![
            (
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static(self.frame_options.as_str()),
            ),
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
            (
                header::REFERRER_POLICY,
                HeaderValue::from_static(self.referrer_policy.as_str()),
            ),
        ];

        if self.hsts_max_age_seconds > 0 {
            push_parsed(
                &mut headers,
                header::STRICT_TRANSPORT_SECURITY,
                &self.hsts_header_value(),
            );
        }
        if let Some(csp) = self.content_security_policy.as_deref() {
            push_parsed(&mut headers, header::CONTENT_SECURITY_POLICY, csp);
        }

        headers
    }
}

fn push_parsed(headers: &mut Vec<(HeaderName, HeaderValue)>, name: HeaderName, raw: &str) {
    match HeaderValue::from_str(raw) {
        Ok(value) => headers.push((name, value)),
        Err(error) => tracing::warn!(
            target: tracing_targets::SERVICE,
            header = %name,
            error = %error,
            "dropping security header with an invalid value"
        ),
    }
}

/// `X-Frame-Options` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOptions {
    Deny,
    SameOrigin,
}

impl FrameOptions {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deny => "DENY",
            Self::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// `Referrer-Policy` values the site may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferrerPolicy {
    NoReferrer,
    SameOrigin,
    StrictOriginWhenCrossOrigin,
}

impl ReferrerPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoReferrer => "no-referrer",
            Self::SameOrigin => "same-origin",
            Self::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        }
    }
}
