//! Type-safe layer identifier.
//!
//! [`LayerId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that layer
//! identity cannot be confused with other UUIDs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a map layer.
///
/// Generated once when the layer is created and immutable thereafter. Used
/// for duplicate detection in [`super::LayerList`] and to correlate
/// per-layer events with the layer's current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(uuid::Uuid);

impl LayerId {
    /// Creates a new random `LayerId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `LayerId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for LayerId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(LayerId::new(), LayerId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let s = LayerId::new().to_string();
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn serializes_transparently() {
        let uuid = uuid::Uuid::new_v4();
        let id = LayerId::from_uuid(uuid);
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{uuid}\""));
        assert_eq!(*id.as_uuid(), uuid);
    }
}
