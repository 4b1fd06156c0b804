//! Request extractors.
//!
//! - [`ProtectedPage`] evaluates the render gate for a console page.
//! - [`SessionCookies`] exposes an `axum_extra` cookie jar to the gates.

mod protected_page;

pub use crate::extract::protected_page::{ProtectedPage, SessionCookies};
