//! Service layer: the map content and its bounds aggregation.
//!
//! [`MapContent`] owns the layer list and publishes events to registered
//! listeners. [`compute_max_bounds`] is the pure aggregation it delegates
//! to, exposed for callers holding their own layer snapshots.

pub mod bounds;
mod forwarder;
pub mod map_content;

pub use bounds::compute_max_bounds;
pub use map_content::{MapContent, TITLE_PROPERTY, USER_DATA_PROPERTY};
