//! Domain layer: value types, the layer capability, and event types.
//!
//! This module contains everything the map content service is built from:
//! layer identity and the [`Layer`] trait, envelopes and coordinate
//! reference systems, the plain [`LayerList`] container, the
//! [`ListenerSet`] registry, and the events published to listeners.

pub mod crs;
pub mod envelope;
pub mod layer;
pub mod layer_id;
pub mod layer_list;
pub mod listener_set;
pub mod map_event;
pub mod static_layer;
pub mod viewport;

pub use crs::{AxisTransform, Crs, CrsService, LinearCrsService};
pub use envelope::{Envelope, ReferencedEnvelope};
pub use layer::{ChangeReason, Layer, LayerEventKind, MapLayerEvent, MapLayerListener};
pub use layer_id::LayerId;
pub use layer_list::LayerList;
pub use listener_set::ListenerSet;
pub use map_event::{
    BoundsChangeKind, IndexRange, MapBoundsEvent, MapBoundsListener, MapLayerListEvent,
    MapLayerListListener, PropertyChangeEvent, PropertyChangeListener,
};
pub use static_layer::StaticLayer;
pub use viewport::MapViewport;
