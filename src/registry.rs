use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Key under which an engine object is registered.
///
/// Variables cannot hold engine objects directly (a shared global store
/// outlives any scene), so they carry a key and the registry owns the
/// association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleKey(pub String);

impl HandleKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HandleKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Keyed map from handle keys to live objects, shared by reference across
/// flows. Targets are type-erased; callers downcast with
/// [`resolve_as`](Self::resolve_as).
#[derive(Default)]
pub struct ObjectRegistry {
    entries: RwLock<AHashMap<HandleKey, Arc<dyn Any + Send + Sync>>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: impl Into<HandleKey>, target: Arc<dyn Any + Send + Sync>) {
        let key = key.into();
        if key.as_str().is_empty() {
            return;
        }
        self.entries.write().insert(key, target);
    }

    /// Convenience over [`register`](Self::register) that wraps the value.
    pub fn register_value<T: Any + Send + Sync>(&self, key: impl Into<HandleKey>, target: T) {
        self.register(key, Arc::new(target));
    }

    pub fn unregister(&self, key: &HandleKey) {
        self.entries.write().remove(key);
    }

    pub fn resolve(&self, key: &HandleKey) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.read().get(key).cloned()
    }

    pub fn resolve_as<T: Any + Send + Sync>(&self, key: &HandleKey) -> Option<Arc<T>> {
        self.resolve(key).and_then(|target| target.downcast().ok())
    }

    pub fn contains(&self, key: &HandleKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<HandleKey> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}
