//! # map-content
//!
//! Thread-safe, change-notifying collection of map layers.
//!
//! A [`MapContent`](service::MapContent) holds an ordered, duplicate-free
//! list of [`Layer`](domain::Layer)s, publishes structural events to
//! registered listeners, forwards per-layer change events with the layer's
//! current index, and aggregates the maximum bounds of all layers in one
//! coordinate reference system.
//!
//! ## Architecture
//!
//! ```text
//! Callers (renderers, tools, map-bounds CLI)
//!     │
//!     ├── MapManifest / MapConfig (manifest, config)
//!     │
//!     ├── MapContent (service/)
//!     │     ├── RwLock<MapState>: layers, listeners, title, viewport
//!     │     ├── LayerForwarder: layer events → Changed events
//!     │     └── compute_max_bounds → CrsService
//!     │
//!     └── Layer, LayerList, ListenerSet, events (domain/)
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod service;
