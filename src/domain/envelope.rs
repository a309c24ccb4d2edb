//! Axis-aligned envelopes, bare and CRS-referenced.

use serde::{Deserialize, Serialize};

use super::Crs;

/// Axis-aligned bounding box.
///
/// A *null* envelope covers nothing (`min > max` on either axis, or NaN
/// coordinates) and is the identity for [`Envelope::union`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Minimum x coordinate.
    pub min_x: f64,
    /// Minimum y coordinate.
    pub min_y: f64,
    /// Maximum x coordinate.
    pub max_x: f64,
    /// Maximum y coordinate.
    pub max_y: f64,
}

impl Envelope {
    /// Creates an envelope spanning the two corner points, in any order.
    ///
    /// Any NaN coordinate yields the null envelope.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        if [x1, y1, x2, y2].iter().any(|c| c.is_nan()) {
            return Self::null();
        }
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Returns the null envelope.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: -1.0,
            max_y: -1.0,
        }
    }

    /// Returns `true` if the envelope covers nothing.
    #[must_use]
    pub fn is_null(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    /// Returns `true` if the envelope is null or has non-finite coordinates.
    ///
    /// Zero-area envelopes (a single point, a horizontal line) are not empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_null()
            || !(self.min_x.is_finite()
                && self.min_y.is_finite()
                && self.max_x.is_finite()
                && self.max_y.is_finite())
    }

    /// Width along the x axis, or `0.0` for a null envelope.
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    /// Height along the y axis, or `0.0` for a null envelope.
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// Grows this envelope to cover `other`. Null envelopes are ignored.
    pub fn expand_to_include(&mut self, other: &Self) {
        if other.is_null() {
            return;
        }
        if self.is_null() {
            *self = *other;
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Returns the smallest envelope covering both inputs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        out.expand_to_include(other);
        out
    }

    /// Returns `true` if `other` lies entirely within this envelope.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        !self.is_null()
            && !other.is_null()
            && other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::null()
    }
}

/// An [`Envelope`] tagged with the coordinate reference system it is
/// expressed in.
///
/// An envelope whose inner box is null but whose CRS is known is the
/// explicit "empty" bounds result, distinct from having no result at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencedEnvelope {
    envelope: Envelope,
    crs: Crs,
}

impl ReferencedEnvelope {
    /// Creates a referenced envelope.
    #[must_use]
    pub const fn new(envelope: Envelope, crs: Crs) -> Self {
        Self { envelope, crs }
    }

    /// Creates an empty (null) envelope in the given CRS.
    #[must_use]
    pub const fn empty(crs: Crs) -> Self {
        Self {
            envelope: Envelope::null(),
            crs,
        }
    }

    /// Returns the bare envelope.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the CRS the envelope is expressed in.
    #[must_use]
    pub const fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Returns `true` if the inner envelope is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.envelope.is_empty()
    }

    /// Splits into the bare envelope and its CRS.
    #[must_use]
    pub fn into_parts(self) -> (Envelope, Crs) {
        (self.envelope, self.crs)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_corners() {
        let env = Envelope::new(10.0, 5.0, -2.0, 1.0);
        assert_eq!(env, Envelope::new(-2.0, 1.0, 10.0, 5.0));
        assert!((env.width() - 12.0).abs() < f64::EPSILON);
        assert!((env.height() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn null_and_empty() {
        assert!(Envelope::null().is_null());
        assert!(Envelope::null().is_empty());
        assert!(Envelope::default().is_null());

        let point = Envelope::new(3.0, 3.0, 3.0, 3.0);
        assert!(!point.is_null());
        assert!(!point.is_empty());

        let nan = Envelope::new(f64::NAN, 0.0, 1.0, 1.0);
        assert!(nan.is_null());
        assert!(nan.is_empty());
        assert!(Envelope::new(0.0, 0.0, 1.0, f64::NAN).is_empty());

        let infinite = Envelope::new(f64::NEG_INFINITY, 0.0, 1.0, 1.0);
        assert!(!infinite.is_null());
        assert!(infinite.is_empty());
    }

    #[test]
    fn union_ignores_null() {
        let a = Envelope::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(a.union(&Envelope::null()), a);
        assert_eq!(Envelope::null().union(&a), a);

        let b = Envelope::new(5.0, -1.0, 6.0, 0.5);
        let u = a.union(&b);
        assert_eq!(u, Envelope::new(0.0, -1.0, 6.0, 1.0));
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert!(!a.contains(&b));
    }

    #[test]
    fn referenced_empty_keeps_crs() {
        let crs = Crs::new("EPSG:4326");
        let env = ReferencedEnvelope::empty(crs.clone());
        assert!(env.is_empty());
        assert_eq!(env.crs(), &crs);
    }
}
