//! Ordered, duplicate-free sequence of layers.
//!
//! [`LayerList`] is the plain container behind [`crate::service::MapContent`].
//! It only knows membership and order; subscription, disposal and events
//! are layered on top by the map. Position in the list is z-order: index 0
//! is painted first.

use std::sync::Arc;

use super::{Layer, LayerId};

/// Ordered layer sequence with identity-based uniqueness.
///
/// Lookups are linear; maps hold tens of layers, not millions.
#[derive(Debug, Default)]
pub struct LayerList {
    layers: Vec<Arc<dyn Layer>>,
}

impl LayerList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the list holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the position of the layer with `id`.
    #[must_use]
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    /// Returns `true` if a layer with `id` is present.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    /// Returns the layer at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<dyn Layer>> {
        self.layers.get(index)
    }

    /// Iterates layers in z-order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Layer>> {
        self.layers.iter()
    }

    /// Borrows the layers in z-order.
    #[must_use]
    pub fn as_slice(&self) -> &[Arc<dyn Layer>] {
        &self.layers
    }

    /// Clones the current sequence of handles.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Arc<dyn Layer>> {
        self.layers.iter().map(Arc::clone).collect()
    }

    /// Appends `layer` unless already present. Returns its new index.
    pub fn push_absent(&mut self, layer: Arc<dyn Layer>) -> Option<usize> {
        if self.contains(layer.id()) {
            return None;
        }
        self.layers.push(layer);
        Some(self.layers.len() - 1)
    }

    /// Inserts `layer` at `index` unless already present.
    ///
    /// The caller validates `index <= len()`; an out-of-range index is
    /// treated as "not inserted".
    pub fn insert_absent(&mut self, index: usize, layer: Arc<dyn Layer>) -> bool {
        if index > self.layers.len() || self.contains(layer.id()) {
            return false;
        }
        self.layers.insert(index, layer);
        true
    }

    /// Removes and returns the layer at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<Arc<dyn Layer>> {
        (index < self.layers.len()).then(|| self.layers.remove(index))
    }

    /// Keeps only layers for which `keep` returns `true`, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&Arc<dyn Layer>) -> bool) {
        self.layers.retain(|l| keep(l));
    }

    /// Exchanges the layers at `a` and `b`. Returns `false` if either index
    /// is out of range.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        let len = self.layers.len();
        if a >= len || b >= len {
            return false;
        }
        self.layers.swap(a, b);
        true
    }

    /// Removes and returns every layer.
    pub fn drain_all(&mut self) -> Vec<Arc<dyn Layer>> {
        std::mem::take(&mut self.layers)
    }
}
