//! The layer capability consumed by map content.
//!
//! A [`Layer`] is owned by whoever created it; [`crate::service::MapContent`]
//! holds a shared reference while the layer is a member and disposes it
//! when the layer is removed or the map is disposed.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LayerId, ReferencedEnvelope};
use crate::error::LayerError;

/// Why a layer reported a generic change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    /// Underlying features or pixels changed.
    Data,
    /// Rendering style changed.
    Style,
    /// Title or other descriptive metadata changed.
    Metadata,
    /// The layer's bounds changed.
    Bounds,
}

/// Kind of attribute-level change reported by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum LayerEventKind {
    /// Layer became visible.
    Shown,
    /// Layer became hidden.
    Hidden,
    /// Layer became selected.
    Selected,
    /// Layer became deselected.
    Deselected,
    /// Some other attribute changed.
    Changed(ChangeReason),
}

/// Attribute-level notification published by a single layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayerEvent {
    /// Layer that changed.
    pub layer_id: LayerId,
    /// What changed.
    pub kind: LayerEventKind,
    /// When the change happened.
    pub timestamp: DateTime<Utc>,
}

impl MapLayerEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(layer_id: LayerId, kind: LayerEventKind) -> Self {
        Self {
            layer_id,
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Receiver of per-layer attribute events.
///
/// Implemented for any `Fn(&MapLayerEvent) + Send + Sync` closure.
pub trait MapLayerListener: Send + Sync {
    /// Called after the layer's attribute has changed.
    fn layer_event(&self, event: &MapLayerEvent);
}

impl<F> MapLayerListener for F
where
    F: Fn(&MapLayerEvent) + Send + Sync,
{
    fn layer_event(&self, event: &MapLayerEvent) {
        self(event);
    }
}

/// A renderable unit of map content.
///
/// Implementations must not notify listeners synchronously from inside
/// [`Layer::add_listener`], [`Layer::remove_listener`] or [`Layer::dispose`]:
/// those calls are made while the owning map holds exclusive access.
pub trait Layer: Send + Sync + fmt::Debug {
    /// Stable identity of this layer.
    fn id(&self) -> LayerId;

    /// Human-readable title, if any.
    fn title(&self) -> Option<String> {
        None
    }

    /// Computes the layer's bounds.
    ///
    /// `Ok(None)` means the layer has no spatial extent. An empty envelope
    /// with a known CRS is also a valid answer.
    ///
    /// # Errors
    ///
    /// Returns a [`LayerError`] if the bounds cannot be computed.
    fn bounds(&self) -> Result<Option<ReferencedEnvelope>, LayerError>;

    /// Subscribes `listener` to this layer's attribute events. Subscribing
    /// the same listener (by pointer) twice is a no-op.
    fn add_listener(&self, listener: Arc<dyn MapLayerListener>);

    /// Unsubscribes `listener`. Unknown listeners are ignored.
    fn remove_listener(&self, listener: &Arc<dyn MapLayerListener>);

    /// Releases the layer's resources. Must tolerate repeated calls.
    fn dispose(&self);
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_with_reason() {
        let event = MapLayerEvent::new(LayerId::new(), LayerEventKind::Changed(ChangeReason::Style));
        let Ok(json) = serde_json::to_value(&event) else {
            panic!("serialization failed");
        };
        assert_eq!(json["kind"]["kind"], "changed");
        assert_eq!(json["kind"]["reason"], "style");

        let shown = MapLayerEvent::new(LayerId::new(), LayerEventKind::Shown);
        let Ok(json) = serde_json::to_value(&shown) else {
            panic!("serialization failed");
        };
        assert_eq!(json["kind"]["kind"], "shown");
    }

    #[test]
    fn closures_are_listeners() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let listener: Arc<dyn MapLayerListener> = Arc::new(move |_: &MapLayerEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        listener.layer_event(&MapLayerEvent::new(LayerId::new(), LayerEventKind::Hidden));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
