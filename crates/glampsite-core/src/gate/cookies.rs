//! Read-only cookie access for the render gate.

/// A source of cookie values, such as a request's parsed `Cookie` header.
pub trait CookieStore {
    /// Returns the value of the named cookie, if set.
    fn cookie(&self, name: &str) -> Option<String>;
}

#[cfg(test)]
impl CookieStore for std::collections::HashMap<String, String> {
    fn cookie(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
