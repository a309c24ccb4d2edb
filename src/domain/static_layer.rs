//! In-memory layer with fixed bounds.
//!
//! [`StaticLayer`] keeps its extent, title, visibility and selection in
//! memory and notifies subscribed [`MapLayerListener`]s when any of them
//! change. It backs manifest-built maps and is a convenient stand-in for
//! data-backed layers.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{
    ChangeReason, Layer, LayerEventKind, LayerId, MapLayerEvent, MapLayerListener,
    ReferencedEnvelope,
};
use crate::error::LayerError;

/// A layer whose bounds are set by the caller.
pub struct StaticLayer {
    id: LayerId,
    title: Mutex<Option<String>>,
    bounds: Mutex<Option<ReferencedEnvelope>>,
    unavailable: Mutex<Option<String>>,
    visible: AtomicBool,
    selected: AtomicBool,
    listeners: Mutex<Vec<Arc<dyn MapLayerListener>>>,
    disposals: AtomicUsize,
    disposed: AtomicBool,
}

impl StaticLayer {
    /// Creates a visible, unselected layer with no bounds.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: LayerId::new(),
            title: Mutex::new(Some(title.into())),
            bounds: Mutex::new(None),
            unavailable: Mutex::new(None),
            visible: AtomicBool::new(true),
            selected: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
            disposals: AtomicUsize::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// Sets the initial bounds.
    #[must_use]
    pub fn with_bounds(self, bounds: ReferencedEnvelope) -> Self {
        *self.bounds.lock() = Some(bounds);
        self
    }

    /// Sets the initial visibility.
    #[must_use]
    pub fn with_visible(self, visible: bool) -> Self {
        self.visible.store(visible, Ordering::SeqCst);
        self
    }

    /// Replaces the bounds and notifies listeners.
    pub fn set_bounds(&self, bounds: Option<ReferencedEnvelope>) {
        *self.bounds.lock() = bounds;
        self.fire(LayerEventKind::Changed(ChangeReason::Bounds));
    }

    /// Replaces the title and notifies listeners.
    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.lock() = Some(title.into());
        self.fire(LayerEventKind::Changed(ChangeReason::Metadata));
    }

    /// Marks the backing source unavailable; [`Layer::bounds`] then fails
    /// with `reason`. `None` restores it.
    pub fn set_unavailable(&self, reason: Option<String>) {
        *self.unavailable.lock() = reason;
    }

    /// Shows or hides the layer. Notifies only on an actual change.
    pub fn set_visible(&self, visible: bool) {
        if self.visible.swap(visible, Ordering::SeqCst) != visible {
            self.fire(if visible {
                LayerEventKind::Shown
            } else {
                LayerEventKind::Hidden
            });
        }
    }

    /// Selects or deselects the layer. Notifies only on an actual change.
    pub fn set_selected(&self, selected: bool) {
        if self.selected.swap(selected, Ordering::SeqCst) != selected {
            self.fire(if selected {
                LayerEventKind::Selected
            } else {
                LayerEventKind::Deselected
            });
        }
    }

    /// Returns `true` if the layer is visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// Returns `true` if the layer is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }

    /// Returns `true` once [`Layer::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Number of times [`Layer::dispose`] was called, including no-op calls.
    #[must_use]
    pub fn dispose_calls(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    /// Number of subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn fire(&self, kind: LayerEventKind) {
        // Snapshot so listeners run without the layer's lock held.
        let listeners = self.listeners.lock().clone();
        let event = MapLayerEvent::new(self.id, kind);
        for listener in listeners {
            listener.layer_event(&event);
        }
    }
}

impl Layer for StaticLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn title(&self) -> Option<String> {
        self.title.lock().clone()
    }

    fn bounds(&self) -> Result<Option<ReferencedEnvelope>, LayerError> {
        if self.is_disposed() {
            return Err(LayerError::Disposed(self.id));
        }
        if let Some(reason) = self.unavailable.lock().clone() {
            return Err(LayerError::SourceUnavailable {
                layer: self.id,
                reason,
            });
        }
        Ok(self.bounds.lock().clone())
    }

    fn add_listener(&self, listener: Arc<dyn MapLayerListener>) {
        let mut listeners = self.listeners.lock();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    fn remove_listener(&self, listener: &Arc<dyn MapLayerListener>) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.listeners.lock().clear();
        tracing::trace!(layer = %self.id, "layer disposed");
    }
}

impl fmt::Debug for StaticLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticLayer")
            .field("id", &self.id)
            .field("title", &*self.title.lock())
            .field("visible", &self.is_visible())
            .field("selected", &self.is_selected())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
