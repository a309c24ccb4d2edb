//! Events published by map content, and the listener traits that receive
//! them.
//!
//! Three independent families exist:
//!
//! - [`MapLayerListEvent`] to [`MapLayerListListener`]: structural changes
//!   to the layer list, plus per-layer attribute events forwarded with the
//!   layer's current index.
//! - [`PropertyChangeEvent`] to [`PropertyChangeListener`]: title and user
//!   data changes.
//! - [`MapBoundsEvent`] to [`MapBoundsListener`]: viewport bounds and CRS
//!   changes.
//!
//! All listener traits are implemented for matching `Fn` closures.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Crs, Layer, LayerId, MapLayerEvent, ReferencedEnvelope};

/// Index span carried by structural events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "span", rename_all = "snake_case")]
pub enum IndexRange {
    /// Inclusive range of affected positions. For bulk removals the range
    /// is advisory: affected positions need not be contiguous.
    Span {
        /// First affected index.
        from: usize,
        /// Last affected index (inclusive).
        to: usize,
    },
    /// Every position was affected (the list was cleared).
    All,
}

impl IndexRange {
    /// A span covering exactly one index.
    #[must_use]
    pub const fn single(index: usize) -> Self {
        Self::Span {
            from: index,
            to: index,
        }
    }

    /// A span covering `from..=to`.
    #[must_use]
    pub const fn span(from: usize, to: usize) -> Self {
        Self::Span { from, to }
    }
}

/// Structural notification about the layer list.
///
/// `layer` is `None` for batch operations where no single element is
/// canonical.
#[derive(Debug, Clone)]
pub enum MapLayerListEvent {
    /// Layers were inserted.
    Added {
        /// The inserted layer for single inserts.
        layer: Option<Arc<dyn Layer>>,
        /// Positions now occupied by the inserted layers.
        range: IndexRange,
        /// When the change was committed.
        timestamp: DateTime<Utc>,
    },

    /// Layers were removed.
    Removed {
        /// The removed layer for single removals.
        layer: Option<Arc<dyn Layer>>,
        /// Positions the removed layers occupied.
        range: IndexRange,
        /// When the change was committed.
        timestamp: DateTime<Utc>,
    },

    /// Two layers were swapped. Only the new occupant of the later position
    /// is reported.
    Moved {
        /// Layer now at `to_index`.
        layer: Arc<dyn Layer>,
        /// The later of the two swapped positions.
        to_index: usize,
        /// When the change was committed.
        timestamp: DateTime<Utc>,
    },

    /// A member layer reported an attribute change.
    Changed {
        /// The layer that changed.
        layer: Arc<dyn Layer>,
        /// Its index at the time of forwarding.
        index: usize,
        /// The layer's own event.
        source: MapLayerEvent,
        /// When the event was forwarded.
        timestamp: DateTime<Utc>,
    },
}

impl MapLayerListEvent {
    /// Returns the id of the layer the event is about, if there is one.
    #[must_use]
    pub fn layer_id(&self) -> Option<LayerId> {
        match self {
            Self::Added { layer, .. } | Self::Removed { layer, .. } => {
                layer.as_ref().map(|l| l.id())
            }
            Self::Moved { layer, .. } | Self::Changed { layer, .. } => Some(layer.id()),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::Added { .. } => "layer_added",
            Self::Removed { .. } => "layer_removed",
            Self::Moved { .. } => "layer_moved",
            Self::Changed { .. } => "layer_changed",
        }
    }

    /// Returns the commit timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Added { timestamp, .. }
            | Self::Removed { timestamp, .. }
            | Self::Moved { timestamp, .. }
            | Self::Changed { timestamp, .. } => *timestamp,
        }
    }
}

/// Title or user-data change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyChangeEvent {
    /// Property name: `"title"`, a user-data key, or `"userData"` for bulk
    /// user-data changes.
    pub property: String,
    /// Value before the change.
    pub old_value: Option<serde_json::Value>,
    /// Value after the change.
    pub new_value: Option<serde_json::Value>,
    /// When the change was committed.
    pub timestamp: DateTime<Utc>,
}

impl PropertyChangeEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(
        property: impl Into<String>,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
    ) -> Self {
        Self {
            property: property.into(),
            old_value,
            new_value,
            timestamp: Utc::now(),
        }
    }
}

/// What part of the viewport changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsChangeKind {
    /// The displayed area changed.
    Bounds,
    /// The reference CRS changed.
    Crs,
}

/// Viewport bounds or CRS change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapBoundsEvent {
    /// What changed.
    pub kind: BoundsChangeKind,
    /// Displayed area before the change.
    pub old_bounds: Option<ReferencedEnvelope>,
    /// Displayed area after the change.
    pub new_bounds: Option<ReferencedEnvelope>,
    /// Reference CRS before the change.
    pub old_crs: Option<Crs>,
    /// Reference CRS after the change.
    pub new_crs: Option<Crs>,
    /// When the change was committed.
    pub timestamp: DateTime<Utc>,
}

/// Receiver of structural layer-list events.
pub trait MapLayerListListener: Send + Sync {
    /// Called after the layer list changed or a member layer changed.
    fn layer_list_changed(&self, event: &MapLayerListEvent);
}

impl<F> MapLayerListListener for F
where
    F: Fn(&MapLayerListEvent) + Send + Sync,
{
    fn layer_list_changed(&self, event: &MapLayerListEvent) {
        self(event);
    }
}

/// Receiver of property-change events.
pub trait PropertyChangeListener: Send + Sync {
    /// Called after a property value has been committed.
    fn property_changed(&self, event: &PropertyChangeEvent);
}

impl<F> PropertyChangeListener for F
where
    F: Fn(&PropertyChangeEvent) + Send + Sync,
{
    fn property_changed(&self, event: &PropertyChangeEvent) {
        self(event);
    }
}

/// Receiver of viewport bounds events.
pub trait MapBoundsListener: Send + Sync {
    /// Called after the viewport bounds or CRS changed.
    fn map_bounds_changed(&self, event: &MapBoundsEvent);
}

impl<F> MapBoundsListener for F
where
    F: Fn(&MapBoundsEvent) + Send + Sync,
{
    fn map_bounds_changed(&self, event: &MapBoundsEvent) {
        self(event);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{LayerEventKind, StaticLayer};

    #[test]
    fn event_type_and_layer_id() {
        let layer: Arc<dyn Layer> = Arc::new(StaticLayer::new("roads"));
        let added = MapLayerListEvent::Added {
            layer: Some(Arc::clone(&layer)),
            range: IndexRange::single(0),
            timestamp: Utc::now(),
        };
        assert_eq!(added.event_type_str(), "layer_added");
        assert_eq!(added.layer_id(), Some(layer.id()));

        let cleared = MapLayerListEvent::Removed {
            layer: None,
            range: IndexRange::All,
            timestamp: Utc::now(),
        };
        assert_eq!(cleared.event_type_str(), "layer_removed");
        assert_eq!(cleared.layer_id(), None);

        let changed = MapLayerListEvent::Changed {
            layer: Arc::clone(&layer),
            index: 0,
            source: MapLayerEvent::new(layer.id(), LayerEventKind::Shown),
            timestamp: Utc::now(),
        };
        assert_eq!(changed.event_type_str(), "layer_changed");
    }

    #[test]
    fn property_event_serializes() {
        let event = PropertyChangeEvent::new(
            "title",
            None,
            Some(serde_json::Value::String("Roads".to_string())),
        );
        let Ok(json) = serde_json::to_string(&event) else {
            panic!("serialization failed");
        };
        assert!(json.contains("\"property\":\"title\""));
        assert!(json.contains("Roads"));
    }

    #[test]
    fn index_range_serializes_tagged() {
        let Ok(json) = serde_json::to_string(&IndexRange::span(1, 3)) else {
            panic!("serialization failed");
        };
        assert_eq!(json, r#"{"span":"span","from":1,"to":3}"#);
        let Ok(json) = serde_json::to_string(&IndexRange::All) else {
            panic!("serialization failed");
        };
        assert_eq!(json, r#"{"span":"all"}"#);
    }
}
