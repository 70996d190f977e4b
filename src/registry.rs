//! Registry of global handles installed by remote scripts.
//!
//! A remote script, once executed, publishes its control surface under a
//! fixed global name. The registry is the process-wide table of those
//! handles. Binders only ever look handles up at call time; they never
//! construct or own them.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

/// Control surface a remote SDK installs once its script has run.
///
/// The core never checks the shape of a handle beyond presence, so failures
/// are plain messages.
pub trait GlobalHandle: Send + Sync {
    /// Initialize the SDK with the caller's configuration.
    fn init(&self, config: &Value) -> Result<(), String>;

    /// Call an action method such as `track` or `open`.
    fn invoke(&self, method: &str, args: &Value) -> Result<(), String>;
}

/// Thread-safe table of global handles, keyed by global name.
pub struct HandleRegistry {
    handles: RwLock<HashMap<String, Arc<dyn GlobalHandle>>>,
}

impl HandleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Install a handle under a global name, replacing any previous one.
    pub fn install(&self, name: impl Into<String>, handle: Arc<dyn GlobalHandle>) {
        let name = name.into();
        if self.write().insert(name.clone(), handle).is_some() {
            tracing::debug!("Replaced global handle: {}", name);
        } else {
            tracing::debug!("Installed global handle: {}", name);
        }
    }

    /// Look up a handle by global name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn GlobalHandle>> {
        self.read().get(name).cloned()
    }

    /// Remove a handle. Returns true if one was installed.
    pub fn remove(&self, name: &str) -> bool {
        self.write().remove(name).is_some()
    }

    /// Check if a handle is installed.
    pub fn has_handle(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Names of all installed handles.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Get the number of installed handles.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A handle that panicked mid-call leaves the table itself intact.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn GlobalHandle>>> {
        self.handles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn GlobalHandle>>> {
        self.handles.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
