//! Access gates.
//!
//! Two independent layers decide whether a caller may proceed:
//!
//! - The **edge gate** ([`AccessPolicy::classify`]) runs on every request
//!   before any page code. It is coarse: on protected paths it only checks
//!   that a session cookie is present.
//! - The **render gate** ([`RenderGate`]) runs before protected content is
//!   produced. It decodes the token, checks expiry and checks the role.
//!
//! A request can pass the edge gate and still be turned away by the render
//! gate; both layers are kept on purpose.
//!
//! [`AccessPolicy::classify`]: crate::policy::AccessPolicy::classify

mod cookies;
mod decision;
mod edge;
mod render;

pub use cookies::CookieStore;
pub use decision::AuthDecision;
pub use edge::{EdgeOutcome, EdgeRequest, login_url};
pub use render::{GateState, GateView, LoginReason, RenderGate};
