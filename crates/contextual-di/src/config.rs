use parking_lot::RwLock;
use serde_json::{Map, Value as Json};
use std::sync::Arc;

/// The abstract a [`Repository`] is expected to be bound under when
/// `give_config` bindings are used.
pub const CONFIG: &str = "config";

/// Shared configuration items addressed with dot notation (`"mail.from.name"`).
///
/// Clones share the same items, so a repository registered as an instance
/// can still be updated after it was handed out.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    items: Arc<RwLock<Json>>,
}

impl Repository {
    pub fn new(items: Json) -> Self {
        Repository {
            items: Arc::new(RwLock::new(items)),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<Json> {
        let items = self.items.read();
        key.split('.')
            .try_fold(&*items, |node, segment| node.get(segment))
            .cloned()
    }

    /// Sets `key`, creating intermediate objects (and replacing scalars in the
    /// way) as needed.
    pub fn set(&self, key: &str, value: Json) {
        let mut items = self.items.write();
        let mut node = &mut *items;
        for segment in key.split('.') {
            if !node.is_object() {
                *node = Json::Object(Map::new());
            }
            node = &mut node[segment];
        }
        *node = value;
    }

    pub fn all(&self) -> Json {
        self.items.read().clone()
    }
}
