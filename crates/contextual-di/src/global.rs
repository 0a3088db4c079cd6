//! The process-wide container slot used by global helpers.

use crate::container::Container;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

// Empty until first accessed or explicitly set.
static GLOBAL_CONTAINER: Lazy<RwLock<Option<Arc<Container>>>> = Lazy::new(|| RwLock::new(None));

impl Container {
    /// The global container, created on first access.
    pub fn get_instance() -> Arc<Container> {
        if let Some(container) = GLOBAL_CONTAINER.read().as_ref() {
            return container.clone();
        }
        GLOBAL_CONTAINER
            .write()
            .get_or_insert_with(|| Arc::new(Container::new()))
            .clone()
    }

    /// Replaces the global container. `None` resets the slot, so the next
    /// [`Container::get_instance`] starts from an empty container.
    pub fn set_instance(container: Option<Arc<Container>>) -> Option<Arc<Container>> {
        *GLOBAL_CONTAINER.write() = container.clone();
        container
    }
}
