//! JSON map manifest: the layers, CRS and transforms a map is built from.
//!
//! ```json
//! {
//!   "title": "Harbour",
//!   "crs": "LOCAL:SITE",
//!   "transforms": [
//!     { "source": "LOCAL:GRID", "target": "LOCAL:SITE",
//!       "transform": { "scale_x": 1.0, "offset_x": -100.0, "scale_y": 1.0 } }
//!   ],
//!   "layers": [
//!     { "title": "quay", "crs": "LOCAL:SITE",
//!       "envelope": { "min_x": 0.0, "min_y": 0.0, "max_x": 10.0, "max_y": 5.0 } }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{
    AxisTransform, Crs, Envelope, Layer, LinearCrsService, ReferencedEnvelope, StaticLayer,
};
use crate::error::MapError;
use crate::service::MapContent;

/// Parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapManifest {
    /// Map title.
    #[serde(default)]
    pub title: Option<String>,
    /// Reference CRS code.
    #[serde(default)]
    pub crs: Option<String>,
    /// Transforms registered with the map's CRS service.
    #[serde(default)]
    pub transforms: Vec<TransformEntry>,
    /// Layers in z-order.
    #[serde(default)]
    pub layers: Vec<LayerEntry>,
}

/// A transform between two CRS codes. Its inverse is registered as well.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformEntry {
    /// Source CRS code.
    pub source: String,
    /// Target CRS code.
    pub target: String,
    /// Per-axis transform from source to target.
    pub transform: AxisTransform,
}

/// One layer of the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerEntry {
    /// Layer title.
    pub title: String,
    /// CRS code of `envelope`. Required when `envelope` is present.
    #[serde(default)]
    pub crs: Option<String>,
    /// Layer extent. Absent for layers with unknown bounds.
    #[serde(default)]
    pub envelope: Option<Envelope>,
    /// Initial visibility.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

const fn visible_by_default() -> bool {
    true
}

impl MapManifest {
    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Manifest`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, MapError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MapError::Manifest(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Manifest`] if the text is not a valid manifest.
    pub fn from_json(raw: &str) -> Result<Self, MapError> {
        serde_json::from_str(raw).map_err(|e| MapError::Manifest(e.to_string()))
    }

    /// Builds the CRS service described by `transforms`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidCrs`] if a transform names a blank code.
    pub fn crs_service(&self) -> Result<LinearCrsService, MapError> {
        let mut service = LinearCrsService::new();
        for entry in &self.transforms {
            let source: Crs = entry.source.parse()?;
            let target: Crs = entry.target.parse()?;
            service.register(&source, &target, entry.transform);
        }
        Ok(service)
    }

    /// Builds the layers described by the manifest, in z-order.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Manifest`] if a layer has an envelope but no CRS,
    /// or [`MapError::InvalidCrs`] if a CRS code is blank.
    pub fn build_layers(&self) -> Result<Vec<Arc<dyn Layer>>, MapError> {
        self.layers
            .iter()
            .map(|entry| {
                let mut layer = StaticLayer::new(entry.title.as_str()).with_visible(entry.visible);
                if let Some(env) = entry.envelope {
                    let Some(code) = entry.crs.as_deref() else {
                        return Err(MapError::Manifest(format!(
                            "layer '{}' has an envelope but no crs",
                            entry.title
                        )));
                    };
                    let crs: Crs = code.parse()?;
                    let env = Envelope::new(env.min_x, env.min_y, env.max_x, env.max_y);
                    layer = layer.with_bounds(ReferencedEnvelope::new(env, crs));
                }
                Ok(Arc::new(layer) as Arc<dyn Layer>)
            })
            .collect()
    }

    /// Builds a map holding every manifest layer.
    ///
    /// The manifest title and CRS override the ones in `base`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`MapManifest::crs_service`],
    /// [`MapManifest::build_layers`] and CRS parsing.
    pub fn build(&self, base: &crate::config::MapConfig) -> Result<MapContent, MapError> {
        let mut config = base.clone();
        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }
        if let Some(code) = self.crs.as_deref() {
            config.crs = Some(code.parse()?);
        }

        let layers = self.build_layers()?;
        let map = MapContent::from_config(&config, Arc::new(self.crs_service()?));
        let added = map.add_layers(&layers)?;
        tracing::info!(
            layers = added,
            transforms = self.transforms.len(),
            "map built from manifest"
        );
        Ok(map)
    }
}
