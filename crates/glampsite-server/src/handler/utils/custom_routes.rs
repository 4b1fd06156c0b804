//! Extra pages merged into the site router.

use axum::Router;

use crate::service::ServiceState;

/// Function transforming a router, e.g. to add a layer.
pub type RouterMapFn = fn(Router<ServiceState>) -> Router<ServiceState>;

/// Additional routes merged into the site router.
///
/// Custom routes sit behind the edge gate like every built-in page, so a
/// custom route under a protected prefix still needs a session cookie.
///
/// ```rust
/// use axum::Router;
/// use axum::routing::get;
/// use glampsite_server::handler::CustomRoutes;
///
/// let custom = CustomRoutes::new()
///     .with_routes(Router::new().route("/events", get(|| async { "events" })));
/// assert!(!custom.is_empty());
/// ```
#[derive(Default, Clone)]
pub struct CustomRoutes {
    /// Routes merged next to the built-in pages.
    pub routes: Option<Router<ServiceState>>,
    /// Applied to all routes before the edge gate is layered.
    pub before_gate: Option<RouterMapFn>,
    /// Flag to leave out the built-in staff consoles.
    pub disable_consoles: bool,
}

impl CustomRoutes {
    /// Creates a new empty `CustomRoutes` instance.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the custom routes.
    pub fn with_routes(mut self, routes: Router<ServiceState>) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Adds custom routes, merging with existing ones if any.
    pub fn add_routes(mut self, routes: Router<ServiceState>) -> Self {
        self.routes = Some(match self.routes.take() {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Sets a function applied to all routes before the edge gate.
    pub fn with_before_gate(mut self, f: RouterMapFn) -> Self {
        self.before_gate = Some(f);
        self
    }

    /// Leaves the staff consoles out of the site router.
    pub fn with_disable_consoles(mut self, disable: bool) -> Self {
        self.disable_consoles = disable;
        self
    }

    /// Returns true if no custom routes are configured.
    pub fn is_empty(&self) -> bool {
        self.routes.is_none()
    }

    /// Merges this `CustomRoutes` with another, combining routes.
    pub fn merge(mut self, other: CustomRoutes) -> Self {
        if let Some(routes) = other.routes {
            self = self.add_routes(routes);
        }
        self
    }

    pub(crate) fn map_before_gate(&self, routes: Router<ServiceState>) -> Router<ServiceState> {
        match self.before_gate {
            Some(f) => f(routes),
            None => routes,
        }
    }
}
