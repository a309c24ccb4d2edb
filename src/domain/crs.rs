//! Coordinate reference systems and the services that relate them.
//!
//! This crate does not implement projection math. A [`Crs`] is an
//! authority code plus optional descriptive metadata, and a [`CrsService`]
//! answers the two questions bounds aggregation needs: are two CRS
//! equivalent, and how does an envelope look in another CRS.
//! [`LinearCrsService`] is a table-driven implementation for callers that
//! only need per-axis affine relations between known codes.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Envelope, ReferencedEnvelope};
use crate::error::{MapError, ReprojectionError};

/// A coordinate reference system, identified by an authority code such as
/// `EPSG:4326`.
///
/// `name` is peripheral metadata; [`Crs::equals_ignore_metadata`] compares
/// codes only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Crs {
    /// Creates a CRS from an authority code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
        }
    }

    /// WGS 84 geographic coordinates.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::new("EPSG:4326").with_name("WGS 84")
    }

    /// Spherical web mercator.
    #[must_use]
    pub fn web_mercator() -> Self {
        Self::new("EPSG:3857").with_name("WGS 84 / Pseudo-Mercator")
    }

    /// Attaches a human-readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the authority code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the descriptive name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Compares authority codes, ignoring case, surrounding whitespace and
    /// the descriptive name.
    #[must_use]
    pub fn equals_ignore_metadata(&self, other: &Self) -> bool {
        self.code.trim().eq_ignore_ascii_case(other.code.trim())
    }

    fn normalized_code(&self) -> String {
        self.code.trim().to_ascii_uppercase()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl FromStr for Crs {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() {
            return Err(MapError::InvalidCrs("empty crs code".to_string()));
        }
        Ok(Self::new(code))
    }
}

/// CRS services consumed by bounds aggregation.
pub trait CrsService: Send + Sync + fmt::Debug {
    /// Returns `true` if the two CRS describe the same frame, ignoring
    /// incidental metadata.
    fn equivalent(&self, a: &Crs, b: &Crs) -> bool {
        a.equals_ignore_metadata(b)
    }

    /// Expresses `envelope` in `target`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReprojectionError`] when no transform is available or the
    /// result is degenerate.
    fn reproject(
        &self,
        envelope: &ReferencedEnvelope,
        target: &Crs,
    ) -> Result<ReferencedEnvelope, ReprojectionError>;
}

/// Per-axis affine transform: `x' = x * scale_x + offset_x`, likewise for y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTransform {
    /// Multiplier applied to x.
    pub scale_x: f64,
    /// Offset added to x after scaling.
    #[serde(default)]
    pub offset_x: f64,
    /// Multiplier applied to y.
    pub scale_y: f64,
    /// Offset added to y after scaling.
    #[serde(default)]
    pub offset_y: f64,
}

impl AxisTransform {
    /// Pure scaling on both axes.
    #[must_use]
    pub const fn scale(scale_x: f64, scale_y: f64) -> Self {
        Self {
            scale_x,
            offset_x: 0.0,
            scale_y,
            offset_y: 0.0,
        }
    }

    /// Pure translation on both axes.
    #[must_use]
    pub const fn translate(offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale_x: 1.0,
            offset_x,
            scale_y: 1.0,
            offset_y,
        }
    }

    /// Returns the inverse transform, or `None` if either scale is zero.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return None;
        }
        Some(Self {
            scale_x: 1.0 / self.scale_x,
            offset_x: -self.offset_x / self.scale_x,
            scale_y: 1.0 / self.scale_y,
            offset_y: -self.offset_y / self.scale_y,
        })
    }

    /// Applies the transform to both corners of `envelope`.
    #[must_use]
    pub fn apply(&self, envelope: &Envelope) -> Envelope {
        Envelope::new(
            envelope.min_x * self.scale_x + self.offset_x,
            envelope.min_y * self.scale_y + self.offset_y,
            envelope.max_x * self.scale_x + self.offset_x,
            envelope.max_y * self.scale_y + self.offset_y,
        )
    }
}

/// Table of affine transforms between CRS codes.
///
/// Registering `a → b` also registers `b → a` when the transform is
/// invertible. Lookups are by normalized code, so metadata differences do
/// not matter.
#[derive(Debug, Clone, Default)]
pub struct LinearCrsService {
    transforms: HashMap<(String, String), AxisTransform>,
}

impl LinearCrsService {
    /// Creates a service with no transforms; only equivalent CRS reproject.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transform from `source` to `target` (and its inverse).
    #[must_use]
    pub fn with_transform(mut self, source: &Crs, target: &Crs, transform: AxisTransform) -> Self {
        self.register(source, target, transform);
        self
    }

    /// Registers a transform from `source` to `target` (and its inverse).
    pub fn register(&mut self, source: &Crs, target: &Crs, transform: AxisTransform) {
        let from = source.normalized_code();
        let to = target.normalized_code();
        if let Some(inverse) = transform.inverse() {
            self.transforms.insert((to.clone(), from.clone()), inverse);
        }
        self.transforms.insert((from, to), transform);
    }

    /// Returns the number of registered directed transforms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns `true` if no transforms are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl CrsService for LinearCrsService {
    fn reproject(
        &self,
        envelope: &ReferencedEnvelope,
        target: &Crs,
    ) -> Result<ReferencedEnvelope, ReprojectionError> {
        if self.equivalent(envelope.crs(), target) {
            return Ok(ReferencedEnvelope::new(*envelope.envelope(), target.clone()));
        }
        let key = (envelope.crs().normalized_code(), target.normalized_code());
        let Some(transform) = self.transforms.get(&key) else {
            return Err(ReprojectionError::NoTransform {
                from_crs: envelope.crs().code().to_string(),
                to_crs: target.code().to_string(),
            });
        };
        let projected = transform.apply(envelope.envelope());
        if projected.is_empty() {
            return Err(ReprojectionError::Degenerate {
                from_crs: envelope.crs().code().to_string(),
                to_crs: target.code().to_string(),
            });
        }
        Ok(ReferencedEnvelope::new(projected, target.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_metadata() {
        let a = Crs::new("EPSG:4326");
        let b = Crs::new(" epsg:4326 ").with_name("WGS 84");
        assert!(a.equals_ignore_metadata(&b));
        assert_ne!(a, b);
        assert!(!a.equals_ignore_metadata(&Crs::web_mercator()));
    }

    #[test]
    fn parse_rejects_blank() {
        assert!("   ".parse::<Crs>().is_err());
        let Ok(crs) = "EPSG:3857".parse::<Crs>() else {
            panic!("valid code");
        };
        assert_eq!(crs.code(), "EPSG:3857");
        assert_eq!(crs.to_string(), "EPSG:3857");
        assert_eq!(Crs::wgs84().to_string(), "EPSG:4326 (WGS 84)");
    }

    #[test]
    fn registered_transform_and_inverse() {
        let geo = Crs::new("LOCAL:A");
        let local = Crs::new("LOCAL:B");
        let service = LinearCrsService::new().with_transform(
            &geo,
            &local,
            AxisTransform {
                scale_x: 2.0,
                offset_x: 10.0,
                scale_y: 2.0,
                offset_y: 0.0,
            },
        );
        assert_eq!(service.len(), 2);

        let source = ReferencedEnvelope::new(Envelope::new(0.0, 0.0, 1.0, 1.0), geo.clone());
        let Ok(forward) = service.reproject(&source, &local) else {
            panic!("forward transform registered");
        };
        assert_eq!(forward.envelope(), &Envelope::new(10.0, 0.0, 12.0, 2.0));
        assert_eq!(forward.crs(), &local);

        let Ok(back) = service.reproject(&forward, &geo) else {
            panic!("inverse transform registered");
        };
        assert_eq!(back.envelope(), &Envelope::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn missing_transform_is_error() {
        let service = LinearCrsService::new();
        let source = ReferencedEnvelope::new(Envelope::new(0.0, 0.0, 1.0, 1.0), Crs::wgs84());
        let result = service.reproject(&source, &Crs::web_mercator());
        assert!(matches!(result, Err(ReprojectionError::NoTransform { .. })));
    }

    #[test]
    fn equivalent_crs_reprojects_without_transform() {
        let service = LinearCrsService::new();
        let source = ReferencedEnvelope::new(Envelope::new(0.0, 0.0, 1.0, 1.0), Crs::wgs84());
        let Ok(out) = service.reproject(&source, &Crs::new("epsg:4326")) else {
            panic!("equivalent crs needs no transform");
        };
        assert_eq!(out.envelope(), source.envelope());
    }

    #[test]
    fn zero_scale_has_no_inverse() {
        assert!(AxisTransform::scale(0.0, 1.0).inverse().is_none());
        let t = AxisTransform::translate(3.0, -4.0);
        let Some(inv) = t.inverse() else {
            panic!("translation is invertible");
        };
        let env = Envelope::new(1.0, 1.0, 2.0, 2.0);
        assert_eq!(inv.apply(&t.apply(&env)), env);
    }
}
