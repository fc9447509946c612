use std::collections::HashMap;

/// Resolves clip names to loaded clip resources.
///
/// Asset loading belongs to the host. A missing name is an ordinary outcome,
/// not a failure of the library.
pub trait ClipLibrary<C> {
    fn clip(&self, name: &str) -> Option<C>;
}

impl<C: Clone> ClipLibrary<C> for HashMap<String, C> {
    fn clip(&self, name: &str) -> Option<C> {
        self.get(name).cloned()
    }
}
