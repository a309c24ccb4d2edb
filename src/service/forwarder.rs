//! Shared per-layer listener that republishes layer events as structural
//! "changed" events.

use std::sync::Weak;

use super::map_content::Shared;
use crate::domain::{MapLayerEvent, MapLayerListener};

/// The single listener a map subscribes to each of its layers while at
/// least one structural listener is registered.
///
/// Holds a weak handle so layers never keep their map alive.
#[derive(Debug)]
pub(crate) struct LayerForwarder {
    map: Weak<Shared>,
}

impl LayerForwarder {
    pub(crate) const fn new(map: Weak<Shared>) -> Self {
        Self { map }
    }
}

impl MapLayerListener for LayerForwarder {
    fn layer_event(&self, event: &MapLayerEvent) {
        let Some(shared) = self.map.upgrade() else {
            return;
        };
        let state = shared.read_state();
        state.forward_layer_event(event);
    }
}
