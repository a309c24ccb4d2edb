//! Error types for map content operations.
//!
//! [`MapError`] is the central error type returned by [`crate::service::MapContent`]
//! and configuration loading. Per-layer failures ([`LayerError`]) and
//! reprojection failures ([`ReprojectionError`]) are usually recovered
//! locally by bounds aggregation; they only surface through [`MapError`]
//! when a caller asks for them directly.

use crate::domain::LayerId;

/// Failure raised by a layer while computing its bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    /// The layer's data source could not be read.
    #[error("layer {layer} data source unavailable: {reason}")]
    SourceUnavailable {
        /// Layer that failed.
        layer: LayerId,
        /// Human-readable cause.
        reason: String,
    },

    /// The layer has already been disposed.
    #[error("layer {0} is disposed")]
    Disposed(LayerId),
}

/// Failure to express an envelope in another coordinate reference system.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReprojectionError {
    /// No transform is known between the two CRS codes.
    #[error("no transform from {from_crs} to {to_crs}")]
    NoTransform {
        /// Source CRS code.
        from_crs: String,
        /// Target CRS code.
        to_crs: String,
    },

    /// The transform produced non-finite coordinates.
    #[error("reprojection from {from_crs} to {to_crs} produced a degenerate envelope")]
    Degenerate {
        /// Source CRS code.
        from_crs: String,
        /// Target CRS code.
        to_crs: String,
    },
}

/// Top-level error enum for map content operations.
///
/// # Error Code Ranges
///
/// | Range     | Category                          |
/// |-----------|-----------------------------------|
/// | 1000–1999 | Contract violation (caller error) |
/// | 2000–2999 | Layer                             |
/// | 3000–3999 | Coordinate reference system       |
/// | 4000–4999 | Configuration / manifest          |
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Index outside the valid range for the operation.
    #[error("index {index} out of bounds for {len} layers")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of layers at the time of the call.
        len: usize,
    },

    /// The map content was disposed; no further mutation is valid.
    #[error("map content has been disposed")]
    Disposed,

    /// Error raised by a layer.
    #[error("layer error: {0}")]
    Layer(#[from] LayerError),

    /// Error raised while reprojecting an envelope.
    #[error("reprojection error: {0}")]
    Reprojection(#[from] ReprojectionError),

    /// A CRS code could not be parsed.
    #[error("invalid crs: {0}")]
    InvalidCrs(String),

    /// Configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The map manifest could not be read or decoded.
    #[error("manifest error: {0}")]
    Manifest(String),
}

impl MapError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::IndexOutOfBounds { .. } => 1001,
            Self::Disposed => 1002,
            Self::Layer(LayerError::SourceUnavailable { .. }) => 2001,
            Self::Layer(LayerError::Disposed(_)) => 2002,
            Self::Reprojection(ReprojectionError::NoTransform { .. }) => 3001,
            Self::Reprojection(ReprojectionError::Degenerate { .. }) => 3002,
            Self::InvalidCrs(_) => 3003,
            Self::InvalidConfig(_) => 4001,
            Self::Manifest(_) => 4002,
        }
    }

    /// Returns `true` if the error is a caller contract violation.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::IndexOutOfBounds { .. } | Self::Disposed)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_ranges() {
        let oob = MapError::IndexOutOfBounds { index: 3, len: 1 };
        assert_eq!(oob.error_code(), 1001);
        assert!(oob.is_contract_violation());

        let layer = MapError::from(LayerError::Disposed(LayerId::new()));
        assert_eq!(layer.error_code(), 2002);
        assert!(!layer.is_contract_violation());

        let reproj = MapError::from(ReprojectionError::NoTransform {
            from_crs: "EPSG:4326".to_string(),
            to_crs: "EPSG:3857".to_string(),
        });
        assert_eq!(reproj.error_code(), 3001);
    }

    #[test]
    fn display_includes_context() {
        let err = MapError::IndexOutOfBounds { index: 5, len: 2 };
        assert_eq!(err.to_string(), "index 5 out of bounds for 2 layers");

        let err = ReprojectionError::NoTransform {
            from_crs: "EPSG:4326".to_string(),
            to_crs: "EPSG:27700".to_string(),
        };
        assert!(err.to_string().contains("EPSG:27700"));
    }
}
