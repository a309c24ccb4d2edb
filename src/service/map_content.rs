//! Map content: the ordered layer collection, its lock, and event dispatch.
//!
//! [`MapContent`] owns one reader/writer lock guarding the layer list, the
//! three listener sets, the title, user data and viewport. Every mutation
//! follows the same pattern: acquire exclusive access → validate and commit
//! → downgrade to shared access → publish events → return. Listeners
//! therefore always observe the committed state, and no other writer can
//! slip in between commit and delivery.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;

use super::bounds::compute_max_bounds;
use super::forwarder::LayerForwarder;
use crate::config::MapConfig;
use crate::domain::{
    BoundsChangeKind, Crs, CrsService, IndexRange, Layer, LayerId, LayerList, LinearCrsService,
    ListenerSet, MapBoundsEvent, MapBoundsListener, MapLayerEvent, MapLayerListEvent,
    MapLayerListListener, MapLayerListener, MapViewport, PropertyChangeEvent,
    PropertyChangeListener, ReferencedEnvelope,
};
use crate::error::MapError;

/// Property name used for title changes.
pub const TITLE_PROPERTY: &str = "title";

/// Property name used for bulk user-data changes.
pub const USER_DATA_PROPERTY: &str = "userData";

/// Thread-safe, change-notifying collection of map layers.
///
/// Cloning a `MapContent` yields another handle to the same map.
///
/// # Concurrency
///
/// - Mutations take exclusive access; queries take shared access.
/// - Listeners run synchronously on the mutating thread, in registration
///   order, while that thread still holds shared access. A listener may
///   call any query method on the map; calling a mutating method from
///   inside a listener deadlocks and is a contract violation.
/// - A panicking listener is logged and skipped; it neither stops delivery
///   to the remaining listeners nor unwinds the mutation.
///
/// Listeners that capture a `MapContent` handle keep the map alive until
/// they are removed or [`MapContent::dispose`] is called.
#[derive(Debug, Clone)]
pub struct MapContent {
    shared: Arc<Shared>,
}

#[derive(Debug)]
pub(crate) struct Shared {
    state: RwLock<MapState>,
    crs_service: Arc<dyn CrsService>,
}

#[derive(Debug, Default)]
pub(crate) struct MapState {
    layers: LayerList,
    list_listeners: ListenerSet<dyn MapLayerListListener>,
    property_listeners: ListenerSet<dyn PropertyChangeListener>,
    bounds_listeners: ListenerSet<dyn MapBoundsListener>,
    forwarder: Option<Arc<LayerForwarder>>,
    title: Option<String>,
    user_data: Option<HashMap<String, Value>>,
    viewport: Option<MapViewport>,
    disposed: bool,
}

impl Shared {
    pub(crate) fn read_state(&self) -> RwLockReadGuard<'_, MapState> {
        self.state.read_recursive()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.disposed || state.layers.is_empty() {
            return;
        }
        tracing::warn!(
            layers = state.layers.len(),
            "map content dropped without dispose; releasing layers"
        );
        state.release_all();
    }
}

impl MapState {
    fn ensure_live(&self) -> Result<(), MapError> {
        if self.disposed {
            Err(MapError::Disposed)
        } else {
            Ok(())
        }
    }

    fn forwarder_handle(&self) -> Option<Arc<dyn MapLayerListener>> {
        self.forwarder
            .as_ref()
            .map(|f| Arc::clone(f) as Arc<dyn MapLayerListener>)
    }

    fn attach(&self, layer: &Arc<dyn Layer>) {
        if let Some(handle) = self.forwarder_handle() {
            layer.add_listener(handle);
        }
    }

    /// Unsubscribes and disposes a layer leaving the list.
    fn release(&self, layer: &Arc<dyn Layer>) {
        if let Some(handle) = self.forwarder_handle() {
            layer.remove_listener(&handle);
        }
        layer.dispose();
    }

    /// Releases every member, then empties the list. Returns the count.
    fn release_all(&mut self) -> usize {
        for layer in self.layers.iter() {
            self.release(layer);
        }
        self.layers.drain_all().len()
    }

    fn stop_listening_to_layers(&mut self) {
        let Some(forwarder) = self.forwarder.take() else {
            return;
        };
        let handle: Arc<dyn MapLayerListener> = forwarder;
        for layer in self.layers.iter() {
            layer.remove_listener(&handle);
        }
        tracing::debug!(layers = self.layers.len(), "stopped listening to layers");
    }

    fn publish_layer_list(&self, event: &MapLayerListEvent) {
        if self.list_listeners.is_empty() {
            return;
        }
        self.list_listeners
            .notify(event.event_type_str(), |l| l.layer_list_changed(event));
    }

    fn publish_property(&self, event: &PropertyChangeEvent) {
        if self.property_listeners.is_empty() {
            return;
        }
        self.property_listeners
            .notify("property_changed", |l| l.property_changed(event));
    }

    fn publish_bounds(&self, event: &MapBoundsEvent) {
        if self.bounds_listeners.is_empty() {
            return;
        }
        self.bounds_listeners
            .notify("map_bounds_changed", |l| l.map_bounds_changed(event));
    }

    /// Republishes a member layer's event with the layer's current index.
    pub(crate) fn forward_layer_event(&self, event: &MapLayerEvent) {
        let Some(index) = self.layers.index_of(event.layer_id) else {
            tracing::trace!(layer = %event.layer_id, "ignoring event from non-member layer");
            return;
        };
        let Some(layer) = self.layers.get(index) else {
            return;
        };
        self.publish_layer_list(&MapLayerListEvent::Changed {
            layer: Arc::clone(layer),
            index,
            source: event.clone(),
            timestamp: Utc::now(),
        });
    }
}

impl MapContent {
    /// Creates an empty map whose CRS service only relates equivalent CRS.
    #[must_use]
    pub fn new() -> Self {
        Self::with_crs_service(Arc::new(LinearCrsService::new()))
    }

    /// Creates an empty map using `crs_service` for bounds reprojection.
    #[must_use]
    pub fn with_crs_service(crs_service: Arc<dyn CrsService>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(MapState::default()),
                crs_service,
            }),
        }
    }

    /// Creates an empty map with the configured title and reference CRS.
    #[must_use]
    pub fn from_config(config: &MapConfig, crs_service: Arc<dyn CrsService>) -> Self {
        let map = Self::with_crs_service(crs_service);
        {
            let mut state = map.write();
            state.title.clone_from(&config.title);
            state.viewport = config.crs.clone().map(MapViewport::with_crs);
        }
        map
    }

    /// Returns the CRS service used for bounds aggregation.
    #[must_use]
    pub fn crs_service(&self) -> &Arc<dyn CrsService> {
        &self.shared.crs_service
    }

    fn write(&self) -> RwLockWriteGuard<'_, MapState> {
        self.shared.state.write()
    }

    fn read(&self) -> RwLockReadGuard<'_, MapState> {
        self.shared.read_state()
    }

    // ---------------------------------------------------------------------
    // Layer list mutations
    // ---------------------------------------------------------------------

    /// Appends `layer` unless a layer with the same id is already present.
    ///
    /// Returns `true` if the layer was added.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn add_layer(&self, layer: Arc<dyn Layer>) -> Result<bool, MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let Some(index) = state.layers.push_absent(Arc::clone(&layer)) else {
            return Ok(false);
        };
        state.attach(&layer);

        let state = RwLockWriteGuard::downgrade(state);
        tracing::debug!(layer = %layer.id(), index, "layer added");
        state.publish_layer_list(&MapLayerListEvent::Added {
            layer: Some(layer),
            range: IndexRange::single(index),
            timestamp: Utc::now(),
        });
        Ok(true)
    }

    /// Inserts `layer` at `index` unless already present.
    ///
    /// Returns `true` if the layer was inserted.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::IndexOutOfBounds`] if `index > layer_count()`, or
    /// [`MapError::Disposed`] if the map has been disposed.
    pub fn insert_layer(&self, index: usize, layer: Arc<dyn Layer>) -> Result<bool, MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let len = state.layers.len();
        if index > len {
            return Err(MapError::IndexOutOfBounds { index, len });
        }
        if !state.layers.insert_absent(index, Arc::clone(&layer)) {
            return Ok(false);
        }
        state.attach(&layer);

        let state = RwLockWriteGuard::downgrade(state);
        tracing::debug!(layer = %layer.id(), index, "layer inserted");
        state.publish_layer_list(&MapLayerListEvent::Added {
            layer: Some(layer),
            range: IndexRange::single(index),
            timestamp: Utc::now(),
        });
        Ok(true)
    }

    /// Appends every layer not already present, skipping duplicates.
    ///
    /// Publishes a single `Added` event spanning the appended range.
    /// Returns the number of layers added.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn add_layers(&self, layers: &[Arc<dyn Layer>]) -> Result<usize, MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let start = state.layers.len();
        let mut added = 0_usize;
        for layer in layers {
            if state.layers.push_absent(Arc::clone(layer)).is_some() {
                state.attach(layer);
                added += 1;
            }
        }
        if added == 0 {
            return Ok(0);
        }

        let state = RwLockWriteGuard::downgrade(state);
        let end = start + added - 1;
        tracing::debug!(count = added, from = start, to = end, "layers added");
        state.publish_layer_list(&MapLayerListEvent::Added {
            layer: None,
            range: IndexRange::span(start, end),
            timestamp: Utc::now(),
        });
        Ok(added)
    }

    /// Removes the layer with `id`, disposing it.
    ///
    /// Returns `false` if no such layer is present.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn remove_layer(&self, id: LayerId) -> Result<bool, MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let Some(index) = state.layers.index_of(id) else {
            return Ok(false);
        };
        let Some(layer) = state.layers.remove_at(index) else {
            return Ok(false);
        };
        state.release(&layer);

        let state = RwLockWriteGuard::downgrade(state);
        tracing::debug!(layer = %id, index, "layer removed");
        state.publish_layer_list(&MapLayerListEvent::Removed {
            layer: Some(layer),
            range: IndexRange::single(index),
            timestamp: Utc::now(),
        });
        Ok(true)
    }

    /// Removes and returns the layer at `index`, disposing it.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::IndexOutOfBounds`] if `index >= layer_count()`,
    /// or [`MapError::Disposed`] if the map has been disposed.
    pub fn remove_layer_at(&self, index: usize) -> Result<Arc<dyn Layer>, MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let len = state.layers.len();
        let Some(layer) = state.layers.remove_at(index) else {
            return Err(MapError::IndexOutOfBounds { index, len });
        };
        state.release(&layer);

        let state = RwLockWriteGuard::downgrade(state);
        tracing::debug!(layer = %layer.id(), index, "layer removed");
        state.publish_layer_list(&MapLayerListEvent::Removed {
            layer: Some(Arc::clone(&layer)),
            range: IndexRange::single(index),
            timestamp: Utc::now(),
        });
        Ok(layer)
    }

    /// Removes every listed layer that is present, disposing each.
    ///
    /// Publishes one `Removed` event whose range spans the first and last
    /// removed positions; positions in between need not all be affected.
    /// Returns the number of layers removed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn remove_layers(&self, ids: &[LayerId]) -> Result<usize, MapError> {
        let state = self.write();
        state.ensure_live()?;
        Ok(Self::remove_where(state, |layer| ids.contains(&layer.id())))
    }

    /// Removes every layer not listed in `keep`, disposing each.
    ///
    /// Event semantics match [`MapContent::remove_layers`]. Returns the
    /// number of layers removed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn retain_layers(&self, keep: &[LayerId]) -> Result<usize, MapError> {
        let state = self.write();
        state.ensure_live()?;
        Ok(Self::remove_where(state, |layer| !keep.contains(&layer.id())))
    }

    fn remove_where(
        mut state: RwLockWriteGuard<'_, MapState>,
        doomed: impl Fn(&Arc<dyn Layer>) -> bool,
    ) -> usize {
        let positions: Vec<usize> = state
            .layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| doomed(*layer))
            .map(|(index, _)| index)
            .collect();
        let (Some(&first), Some(&last)) = (positions.first(), positions.last()) else {
            return 0;
        };
        for layer in state.layers.iter().filter(|layer| doomed(*layer)) {
            state.release(layer);
        }
        state.layers.retain(|layer| !doomed(layer));

        let state = RwLockWriteGuard::downgrade(state);
        tracing::debug!(count = positions.len(), from = first, to = last, "layers removed");
        state.publish_layer_list(&MapLayerListEvent::Removed {
            layer: None,
            range: IndexRange::span(first, last),
            timestamp: Utc::now(),
        });
        positions.len()
    }

    /// Exchanges the layers at positions `a` and `b`.
    ///
    /// Publishes a single `Moved` event naming the new occupant of the later
    /// position. No `Added`/`Removed` events are published. Swapping a
    /// position with itself changes nothing and publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::IndexOutOfBounds`] if either index is out of
    /// range, or [`MapError::Disposed`] if the map has been disposed.
    pub fn swap_layers(&self, a: usize, b: usize) -> Result<(), MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let len = state.layers.len();
        if let Some(&index) = [a, b].iter().find(|&&i| i >= len) {
            return Err(MapError::IndexOutOfBounds { index, len });
        }
        if a == b {
            return Ok(());
        }
        state.layers.swap(a, b);
        let to_index = a.max(b);
        let Some(layer) = state.layers.get(to_index).map(Arc::clone) else {
            return Ok(());
        };

        let state = RwLockWriteGuard::downgrade(state);
        tracing::debug!(layer = %layer.id(), from = a.min(b), to = to_index, "layers swapped");
        state.publish_layer_list(&MapLayerListEvent::Moved {
            layer,
            to_index,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Removes and disposes every layer.
    ///
    /// Publishes one `Removed` event with [`IndexRange::All`].
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn clear_layers(&self) -> Result<(), MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let released = state.release_all();

        let state = RwLockWriteGuard::downgrade(state);
        tracing::debug!(count = released, "layers cleared");
        state.publish_layer_list(&MapLayerListEvent::Removed {
            layer: None,
            range: IndexRange::All,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Layer list queries
    // ---------------------------------------------------------------------

    /// Snapshot of the layers in z-order.
    #[must_use]
    pub fn layers(&self) -> Vec<Arc<dyn Layer>> {
        self.read().layers.to_vec()
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.read().layers.len()
    }

    /// The layer at `index`, if any.
    #[must_use]
    pub fn layer_at(&self, index: usize) -> Option<Arc<dyn Layer>> {
        self.read().layers.get(index).map(Arc::clone)
    }

    /// Position of the layer with `id`, if present.
    #[must_use]
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.read().layers.index_of(id)
    }

    /// Returns `true` if a layer with `id` is present.
    #[must_use]
    pub fn contains_layer(&self, id: LayerId) -> bool {
        self.read().layers.contains(id)
    }

    /// Union of all layer bounds, in the viewport CRS when one is set.
    ///
    /// See [`compute_max_bounds`] for the empty/unknown distinction.
    #[must_use]
    pub fn max_bounds(&self) -> Option<ReferencedEnvelope> {
        let state = self.read();
        let preferred = state.viewport.as_ref().and_then(MapViewport::reference_crs);
        compute_max_bounds(
            state.layers.as_slice(),
            preferred,
            self.shared.crs_service.as_ref(),
        )
    }

    /// Union of all layer bounds, in `preferred` when given, otherwise in
    /// the CRS of the first layer with usable bounds.
    #[must_use]
    pub fn max_bounds_in(&self, preferred: Option<&Crs>) -> Option<ReferencedEnvelope> {
        let state = self.read();
        compute_max_bounds(
            state.layers.as_slice(),
            preferred,
            self.shared.crs_service.as_ref(),
        )
    }

    // ---------------------------------------------------------------------
    // Structural listeners
    // ---------------------------------------------------------------------

    /// Registers a structural listener. Returns `false` if it was already
    /// registered or the map is disposed.
    ///
    /// The first registration subscribes the shared layer forwarder to every
    /// member layer.
    pub fn add_layer_list_listener(&self, listener: Arc<dyn MapLayerListListener>) -> bool {
        let mut state = self.write();
        if state.disposed {
            return false;
        }
        let added = state.list_listeners.add(listener);
        if added && state.list_listeners.len() == 1 {
            self.listen_to_layers(&mut state);
        }
        added
    }

    /// Unregisters a structural listener. Returns `false` if it was not
    /// registered.
    ///
    /// Removing the last listener unsubscribes the forwarder from every
    /// member layer and discards it.
    pub fn remove_layer_list_listener(&self, listener: &Arc<dyn MapLayerListListener>) -> bool {
        let mut state = self.write();
        let removed = state.list_listeners.remove(listener);
        if removed && state.list_listeners.is_empty() {
            state.stop_listening_to_layers();
        }
        removed
    }

    /// Returns `true` while the shared forwarder is subscribed to layers.
    #[must_use]
    pub fn is_listening_to_layers(&self) -> bool {
        self.read().forwarder.is_some()
    }

    fn listen_to_layers(&self, state: &mut MapState) {
        let shared = &self.shared;
        let forwarder = state
            .forwarder
            .get_or_insert_with(|| Arc::new(LayerForwarder::new(Arc::downgrade(shared))));
        let handle: Arc<dyn MapLayerListener> = Arc::clone(forwarder) as Arc<dyn MapLayerListener>;
        for layer in state.layers.iter() {
            layer.add_listener(Arc::clone(&handle));
        }
        tracing::debug!(layers = state.layers.len(), "listening to layers");
    }

    // ---------------------------------------------------------------------
    // Title and user data
    // ---------------------------------------------------------------------

    /// Registers a property-change listener. Returns `false` if it was
    /// already registered or the map is disposed.
    pub fn add_property_change_listener(&self, listener: Arc<dyn PropertyChangeListener>) -> bool {
        let mut state = self.write();
        !state.disposed && state.property_listeners.add(listener)
    }

    /// Unregisters a property-change listener.
    pub fn remove_property_change_listener(
        &self,
        listener: &Arc<dyn PropertyChangeListener>,
    ) -> bool {
        self.write().property_listeners.remove(listener)
    }

    /// Map title.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.read().title.clone()
    }

    /// Sets the title and publishes a `"title"` property event.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn set_title(&self, title: impl Into<String>) -> Result<(), MapError> {
        let title = title.into();
        let mut state = self.write();
        state.ensure_live()?;
        let old = state.title.replace(title.clone());

        let state = RwLockWriteGuard::downgrade(state);
        state.publish_property(&PropertyChangeEvent::new(
            TITLE_PROPERTY,
            old.map(Value::String),
            Some(Value::String(title)),
        ));
        Ok(())
    }

    /// Value stored under `key` in the user-data store.
    #[must_use]
    pub fn user_data(&self, key: &str) -> Option<Value> {
        self.read()
            .user_data
            .as_ref()
            .and_then(|data| data.get(key).cloned())
    }

    /// Copy of the whole user-data store.
    #[must_use]
    pub fn user_data_snapshot(&self) -> HashMap<String, Value> {
        self.read().user_data.clone().unwrap_or_default()
    }

    /// Stores `value` under `key` and publishes a property event named
    /// `key`. Returns the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn put_user_data(
        &self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, MapError> {
        let key = key.into();
        let mut state = self.write();
        state.ensure_live()?;
        let old = state
            .user_data
            .get_or_insert_with(HashMap::new)
            .insert(key.clone(), value.clone());

        let state = RwLockWriteGuard::downgrade(state);
        state.publish_property(&PropertyChangeEvent::new(key, old.clone(), Some(value)));
        Ok(old)
    }

    /// Removes `key` from the user-data store. Publishes a property event
    /// named `key` only if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn remove_user_data(&self, key: &str) -> Result<Option<Value>, MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let Some(old) = state.user_data.as_mut().and_then(|data| data.remove(key)) else {
            return Ok(None);
        };

        let state = RwLockWriteGuard::downgrade(state);
        state.publish_property(&PropertyChangeEvent::new(key, Some(old.clone()), None));
        Ok(Some(old))
    }

    /// Inserts every entry and publishes one `"userData"` property event.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn extend_user_data(&self, entries: HashMap<String, Value>) -> Result<(), MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        state
            .user_data
            .get_or_insert_with(HashMap::new)
            .extend(entries);

        let state = RwLockWriteGuard::downgrade(state);
        state.publish_property(&PropertyChangeEvent::new(USER_DATA_PROPERTY, None, None));
        Ok(())
    }

    /// Empties the user-data store and publishes one `"userData"` property
    /// event.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn clear_user_data(&self) -> Result<(), MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        if let Some(data) = state.user_data.as_mut() {
            data.clear();
        }

        let state = RwLockWriteGuard::downgrade(state);
        state.publish_property(&PropertyChangeEvent::new(USER_DATA_PROPERTY, None, None));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Viewport
    // ---------------------------------------------------------------------

    /// Registers a viewport bounds listener. Returns `false` if it was
    /// already registered or the map is disposed.
    pub fn add_map_bounds_listener(&self, listener: Arc<dyn MapBoundsListener>) -> bool {
        let mut state = self.write();
        !state.disposed && state.bounds_listeners.add(listener)
    }

    /// Unregisters a viewport bounds listener.
    pub fn remove_map_bounds_listener(&self, listener: &Arc<dyn MapBoundsListener>) -> bool {
        self.write().bounds_listeners.remove(listener)
    }

    /// Current viewport; the default (no bounds, no CRS) if never set.
    #[must_use]
    pub fn viewport(&self) -> MapViewport {
        self.read().viewport.clone().unwrap_or_default()
    }

    /// Viewport reference CRS.
    #[must_use]
    pub fn coordinate_reference_system(&self) -> Option<Crs> {
        self.read()
            .viewport
            .as_ref()
            .and_then(MapViewport::reference_crs)
            .cloned()
    }

    /// Replaces the viewport, publishing a bounds event for each part that
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn set_viewport(&self, viewport: MapViewport) -> Result<(), MapError> {
        self.update_viewport(|current| *current = viewport)
    }

    /// Sets the viewport reference CRS.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn set_coordinate_reference_system(&self, crs: Option<Crs>) -> Result<(), MapError> {
        self.update_viewport(|current| current.crs = crs)
    }

    /// Sets the displayed area.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Disposed`] if the map has been disposed.
    pub fn set_viewport_bounds(&self, bounds: Option<ReferencedEnvelope>) -> Result<(), MapError> {
        self.update_viewport(|current| current.bounds = bounds)
    }

    fn update_viewport(&self, update: impl FnOnce(&mut MapViewport)) -> Result<(), MapError> {
        let mut state = self.write();
        state.ensure_live()?;
        let old = state.viewport.clone().unwrap_or_default();
        let mut new = old.clone();
        update(&mut new);
        if new == old {
            return Ok(());
        }
        state.viewport = Some(new.clone());

        let state = RwLockWriteGuard::downgrade(state);
        let timestamp = Utc::now();
        for (kind, changed) in [
            (BoundsChangeKind::Bounds, old.bounds != new.bounds),
            (BoundsChangeKind::Crs, old.crs != new.crs),
        ] {
            if changed {
                state.publish_bounds(&MapBoundsEvent {
                    kind,
                    old_bounds: old.bounds.clone(),
                    new_bounds: new.bounds.clone(),
                    old_crs: old.crs.clone(),
                    new_crs: new.crs.clone(),
                    timestamp,
                });
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Unsubscribes and disposes every layer, publishes a final `Removed`
    /// event if any layer was released, and drops all listeners, title,
    /// user data and viewport. Further calls are no-ops.
    pub fn dispose(&self) {
        let mut state = self.write();
        if state.disposed {
            return;
        }
        state.disposed = true;
        let listeners = std::mem::take(&mut state.list_listeners);
        let released = state.release_all();
        state.forwarder = None;
        state.property_listeners.clear();
        state.bounds_listeners.clear();
        state.title = None;
        state.user_data = None;
        state.viewport = None;

        let _state = RwLockWriteGuard::downgrade(state);
        tracing::debug!(released, "map content disposed");
        if released > 0 {
            let event = MapLayerListEvent::Removed {
                layer: None,
                range: IndexRange::All,
                timestamp: Utc::now(),
            };
            listeners.notify(event.event_type_str(), |l| l.layer_list_changed(&event));
        }
    }

    /// Returns `true` once [`MapContent::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.read().disposed
    }
}

impl Default for MapContent {
    fn default() -> Self {
        Self::new()
    }
}
