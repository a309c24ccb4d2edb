//! Viewport state held by a map.

use serde::{Deserialize, Serialize};

use super::{Crs, ReferencedEnvelope};

/// The displayed area and reference CRS of a map.
///
/// The viewport CRS, when set, is the preferred CRS for bounds
/// aggregation. Pan/zoom arithmetic lives with the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    /// Displayed area.
    pub bounds: Option<ReferencedEnvelope>,
    /// Reference CRS.
    pub crs: Option<Crs>,
}

impl MapViewport {
    /// Creates a viewport with a reference CRS and no bounds.
    #[must_use]
    pub const fn with_crs(crs: Crs) -> Self {
        Self {
            bounds: None,
            crs: Some(crs),
        }
    }

    /// The CRS aggregation should prefer: the explicit CRS, else the CRS of
    /// the displayed bounds.
    #[must_use]
    pub fn reference_crs(&self) -> Option<&Crs> {
        self.crs
            .as_ref()
            .or_else(|| self.bounds.as_ref().map(ReferencedEnvelope::crs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Envelope;

    #[test]
    fn reference_crs_prefers_explicit() {
        assert!(MapViewport::default().reference_crs().is_none());

        let from_bounds = MapViewport {
            bounds: Some(ReferencedEnvelope::new(
                Envelope::new(0.0, 0.0, 1.0, 1.0),
                Crs::web_mercator(),
            )),
            crs: None,
        };
        assert_eq!(from_bounds.reference_crs(), Some(&Crs::web_mercator()));

        let explicit = MapViewport {
            crs: Some(Crs::wgs84()),
            ..from_bounds
        };
        assert_eq!(explicit.reference_crs(), Some(&Crs::wgs84()));
    }
}
