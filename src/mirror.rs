//! Latest-value cell for caller configuration.

use std::sync::{Arc, PoisonError, RwLock};

/// Single-slot cell holding the most recent configuration.
///
/// Updating the mirror has no side effects: whoever needs the configuration
/// reads it at the moment it is actually used. Clones share the same slot.
#[derive(Debug)]
pub struct ConfigMirror<T> {
    slot: Arc<RwLock<T>>,
}

impl<T> ConfigMirror<T> {
    /// Create a mirror holding an initial value.
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(RwLock::new(value)),
        }
    }

    /// Replace the held value.
    pub fn update(&self, value: T) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Borrow the held value.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.slot.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<T: Clone> ConfigMirror<T> {
    /// Clone of the latest value.
    pub fn current(&self) -> T {
        self.read(T::clone)
    }
}

impl<T> Clone for ConfigMirror<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}
