//! Lazily allocated, duplicate-free listener registry.
//!
//! [`ListenerSet`] holds `Arc` handles to listeners in registration order.
//! Storage is only allocated on first registration and released again when
//! the last listener is removed. Identity is pointer identity
//! ([`Arc::ptr_eq`]), so registering the same handle twice is a no-op.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Ordered set of listener handles.
pub struct ListenerSet<T: ?Sized> {
    listeners: Option<Vec<Arc<T>>>,
}

impl<T: ?Sized> ListenerSet<T> {
    /// Creates an empty set without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self { listeners: None }
    }

    /// Registers `listener`. Returns `false` if it was already present.
    pub fn add(&mut self, listener: Arc<T>) -> bool {
        let listeners = self.listeners.get_or_insert_with(Vec::new);
        if listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregisters `listener`. Returns `false` if it was not present.
    pub fn remove(&mut self, listener: &Arc<T>) -> bool {
        let Some(listeners) = self.listeners.as_mut() else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.listeners = None;
        }
        removed
    }

    /// Returns `true` if `listener` is registered.
    #[must_use]
    pub fn contains(&self, listener: &Arc<T>) -> bool {
        self.iter().any(|l| Arc::ptr_eq(l, listener))
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.as_ref().map_or(0, Vec::len)
    }

    /// Returns `true` if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once storage has been allocated and not yet released.
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.listeners.is_some()
    }

    /// Drops every listener and releases storage.
    pub fn clear(&mut self) {
        self.listeners = None;
    }

    /// Iterates listeners in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.listeners.iter().flatten()
    }

    /// Invokes `deliver` for every listener in registration order.
    ///
    /// A panic in one listener is caught and logged; the remaining listeners
    /// are still invoked. Returns the number of listeners that failed.
    pub fn notify(&self, event_type: &'static str, mut deliver: impl FnMut(&T)) -> usize {
        let mut failed = 0;
        for (position, listener) in self.iter().enumerate() {
            let result = catch_unwind(AssertUnwindSafe(|| deliver(&**listener)));
            if let Err(payload) = result {
                failed += 1;
                tracing::warn!(
                    event_type,
                    listener = position,
                    error = %panic_message(payload.as_ref()),
                    "listener panicked during event delivery"
                );
            }
        }
        failed
    }
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for ListenerSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.len())
            .field("allocated", &self.is_allocated())
            .finish()
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
