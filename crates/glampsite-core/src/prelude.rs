//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::gate::{
    AuthDecision, CookieStore, EdgeOutcome, EdgeRequest, GateState, GateView,
    LoginReason, RenderGate,
};
pub use crate::policy::{AccessPolicy, Exclusions, ProtectedSection, UnmatchedPolicy};
pub use crate::role::{Role, RoleSet};
pub use crate::token::{TokenError, TokenPayload, decode_token};
pub use crate::SESSION_COOKIE_NAME;
