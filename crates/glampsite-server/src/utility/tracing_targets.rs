//! Centralized tracing target constants for structured logging.
//!
//! Using consistent targets enables fine-grained control over log output
//! via tracing subscriber filters, e.g.
//! `RUST_LOG=glampsite_server::authentication=debug`.

/// Edge gate redirects and session cookie handling.
pub const AUTHENTICATION: &str = "glampsite_server::authentication";

/// Render gate outcomes for console pages.
pub const AUTHORIZATION: &str = "glampsite_server::authorization";

/// Error recovery including middleware errors and request failures.
pub const RECOVERY_ERROR: &str = "glampsite_server::recovery::error";

/// Panic recovery including handler panics.
pub const RECOVERY_PANIC: &str = "glampsite_server::recovery::panic";

/// Service state construction and configuration.
pub const SERVICE: &str = "glampsite_server::service";

/// Request timing grouped by site area.
pub const METRICS: &str = "glampsite_server::metrics";
