#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for session token decoding.
pub const TRACING_TARGET_TOKEN: &str = "glampsite_core::token";

/// Tracing target for access policy loading and validation.
pub const TRACING_TARGET_POLICY: &str = "glampsite_core::policy";

/// Tracing target for edge and render gate decisions.
pub const TRACING_TARGET_GATE: &str = "glampsite_core::gate";

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "auth_token";

mod error;

pub mod gate;
pub mod policy;
pub mod prelude;
pub mod role;
pub mod token;

pub use error::{BoxedError, Error, ErrorKind, Result};
