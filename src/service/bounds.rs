//! Maximum-bounds aggregation across layers in differing CRS.
//!
//! [`compute_max_bounds`] folds every layer's bounds into one envelope
//! expressed in a single reference CRS. Layer failures and reprojection
//! failures are logged and skip that layer; they never abort the fold.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::domain::listener_set::panic_message;
use crate::domain::{Crs, CrsService, Envelope, Layer, ReferencedEnvelope};

/// Computes the union of all layer bounds in a common CRS.
///
/// The reference CRS is `preferred` when given, otherwise the CRS of the
/// first layer reporting non-empty bounds. Layers in a different CRS are
/// reprojected into the reference CRS through `crs_service`.
///
/// Returns:
/// - `Some(envelope)` when at least one layer contributed;
/// - `Some(empty)` carrying a CRS when nothing contributed but a CRS is
///   known (from `preferred` or from a layer that reported empty bounds);
/// - `None` when neither bounds nor a CRS could be established.
#[must_use]
pub fn compute_max_bounds(
    layers: &[Arc<dyn Layer>],
    preferred: Option<&Crs>,
    crs_service: &dyn CrsService,
) -> Option<ReferencedEnvelope> {
    let mut reference: Option<Crs> = preferred.cloned();
    let mut fallback: Option<Crs> = None;
    let mut max_bounds: Option<Envelope> = None;

    for layer in layers {
        let Some(bounds) = fetch_bounds(layer.as_ref()) else {
            continue;
        };
        if bounds.is_empty() {
            if fallback.is_none() {
                fallback = Some(bounds.crs().clone());
            }
            continue;
        }

        let Some(target) = reference.as_ref() else {
            let (envelope, crs) = bounds.into_parts();
            reference = Some(crs);
            max_bounds = Some(envelope);
            continue;
        };

        let normalized = if crs_service.equivalent(target, bounds.crs()) {
            *bounds.envelope()
        } else {
            match crs_service.reproject(&bounds, target) {
                Ok(projected) => *projected.envelope(),
                Err(e) => {
                    tracing::debug!(
                        layer = %layer.id(),
                        error = %e,
                        "skipping layer that cannot be reprojected"
                    );
                    continue;
                }
            }
        };

        match max_bounds.as_mut() {
            Some(max) => max.expand_to_include(&normalized),
            None => max_bounds = Some(normalized),
        }
    }

    let crs = reference.or(fallback)?;
    Some(match max_bounds {
        Some(envelope) => ReferencedEnvelope::new(envelope, crs),
        None => ReferencedEnvelope::empty(crs),
    })
}

/// Fetches one layer's bounds, logging and swallowing errors and panics.
fn fetch_bounds(layer: &dyn Layer) -> Option<ReferencedEnvelope> {
    match catch_unwind(AssertUnwindSafe(|| layer.bounds())) {
        Ok(Ok(bounds)) => bounds,
        Ok(Err(e)) => {
            tracing::warn!(layer = %layer.id(), error = %e, "unable to determine layer bounds");
            None
        }
        Err(payload) => {
            tracing::warn!(
                layer = %layer.id(),
                error = %panic_message(payload.as_ref()),
                "layer panicked while computing bounds"
            );
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AxisTransform, LayerId, LinearCrsService, MapLayerListener, StaticLayer};
    use crate::error::LayerError;

    #[derive(Debug)]
    struct PanickingLayer(LayerId);

    impl Layer for PanickingLayer {
        fn id(&self) -> LayerId {
            self.0
        }
        fn bounds(&self) -> Result<Option<ReferencedEnvelope>, LayerError> {
            panic!("corrupt index");
        }
        fn add_listener(&self, _listener: Arc<dyn MapLayerListener>) {}
        fn remove_listener(&self, _listener: &Arc<dyn MapLayerListener>) {}
        fn dispose(&self) {}
    }

    fn layer(env: Envelope, crs: Crs) -> Arc<dyn Layer> {
        Arc::new(StaticLayer::new("layer").with_bounds(ReferencedEnvelope::new(env, crs)))
    }

    fn local_a() -> Crs {
        Crs::new("LOCAL:A")
    }

    fn local_b() -> Crs {
        Crs::new("LOCAL:B")
    }

    fn service() -> LinearCrsService {
        // B coordinates are A coordinates shifted by +100 on x.
        LinearCrsService::new().with_transform(
            &local_b(),
            &local_a(),
            AxisTransform::translate(-100.0, 0.0),
        )
    }

    #[test]
    fn unions_same_crs() {
        let layers = vec![
            layer(Envelope::new(0.0, 0.0, 1.0, 1.0), local_a()),
            layer(Envelope::new(2.0, -1.0, 3.0, 0.5), local_a()),
        ];
        let Some(out) = compute_max_bounds(&layers, None, &service()) else {
            panic!("bounds expected");
        };
        assert_eq!(out.envelope(), &Envelope::new(0.0, -1.0, 3.0, 1.0));
        assert_eq!(out.crs(), &local_a());
    }

    #[test]
    fn reprojects_into_first_layer_crs() {
        let layers = vec![
            layer(Envelope::new(0.0, 0.0, 1.0, 1.0), local_a()),
            layer(Envelope::new(105.0, 2.0, 110.0, 3.0), local_b()),
        ];
        let Some(out) = compute_max_bounds(&layers, None, &service()) else {
            panic!("bounds expected");
        };
        assert_eq!(out.envelope(), &Envelope::new(0.0, 0.0, 10.0, 3.0));
        assert_eq!(out.crs(), &local_a());
    }

    #[test]
    fn preferred_crs_wins() {
        let layers = vec![layer(Envelope::new(0.0, 0.0, 1.0, 1.0), local_a())];
        let Some(out) = compute_max_bounds(&layers, Some(&local_b()), &service()) else {
            panic!("bounds expected");
        };
        assert_eq!(out.envelope(), &Envelope::new(100.0, 0.0, 101.0, 1.0));
        assert_eq!(out.crs(), &local_b());
    }

    #[test]
    fn equivalent_crs_ignores_metadata() {
        let layers = vec![
            layer(Envelope::new(0.0, 0.0, 1.0, 1.0), local_a()),
            layer(Envelope::new(4.0, 4.0, 5.0, 5.0), local_a().with_name("Site grid")),
        ];
        let Some(out) = compute_max_bounds(&layers, None, &LinearCrsService::new()) else {
            panic!("bounds expected");
        };
        assert_eq!(out.envelope(), &Envelope::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn failing_layers_are_skipped() {
        let broken = StaticLayer::new("broken").with_bounds(ReferencedEnvelope::new(
            Envelope::new(50.0, 50.0, 60.0, 60.0),
            local_a(),
        ));
        broken.set_unavailable(Some("timeout".to_string()));
        let layers: Vec<Arc<dyn Layer>> = vec![
            layer(Envelope::new(0.0, 0.0, 1.0, 1.0), local_a()),
            Arc::new(broken),
            Arc::new(PanickingLayer(LayerId::new())),
        ];
        let Some(out) = compute_max_bounds(&layers, None, &service()) else {
            panic!("bounds expected");
        };
        assert_eq!(out.envelope(), &Envelope::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn nan_corner_layer_is_skipped() {
        let layers = vec![
            layer(Envelope::new(5.0, 5.0, 6.0, 6.0), local_a()),
            layer(Envelope::new(f64::NAN, -50.0, 0.0, -40.0), local_a()),
        ];
        let Some(out) = compute_max_bounds(&layers, None, &service()) else {
            panic!("bounds expected");
        };
        assert_eq!(out.envelope(), &Envelope::new(5.0, 5.0, 6.0, 6.0));
    }

    #[test]
    fn nan_from_reprojection_is_degenerate() {
        let nan_shift = LinearCrsService::new().with_transform(
            &local_b(),
            &local_a(),
            AxisTransform::translate(f64::NAN, 0.0),
        );
        let bad = ReferencedEnvelope::new(Envelope::new(1.0, 1.0, 2.0, 2.0), local_b());
        assert!(matches!(
            nan_shift.reproject(&bad, &local_a()),
            Err(crate::error::ReprojectionError::Degenerate { .. })
        ));

        let layers = vec![
            layer(Envelope::new(0.0, 0.0, 1.0, 1.0), local_a()),
            layer(Envelope::new(1.0, 1.0, 2.0, 2.0), local_b()),
        ];
        let Some(out) = compute_max_bounds(&layers, None, &nan_shift) else {
            panic!("bounds expected");
        };
        assert_eq!(out.envelope(), &Envelope::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn unreprojectable_layer_is_skipped() {
        let layers = vec![
            layer(Envelope::new(0.0, 0.0, 1.0, 1.0), local_a()),
            layer(Envelope::new(-70.0, 40.0, -60.0, 45.0), Crs::wgs84()),
        ];
        let Some(out) = compute_max_bounds(&layers, None, &service()) else {
            panic!("bounds expected");
        };
        assert_eq!(out.envelope(), &Envelope::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(out.crs(), &local_a());
    }

    #[test]
    fn empty_bounds_with_known_crs() {
        let empty: Arc<dyn Layer> =
            Arc::new(StaticLayer::new("empty").with_bounds(ReferencedEnvelope::empty(local_a())));
        let Some(out) = compute_max_bounds(&[empty], None, &service()) else {
            panic!("empty-with-crs expected");
        };
        assert!(out.is_empty());
        assert_eq!(out.crs(), &local_a());
    }

    #[test]
    fn preferred_crs_without_layers_is_empty() {
        let Some(out) = compute_max_bounds(&[], Some(&local_b()), &service()) else {
            panic!("empty-with-crs expected");
        };
        assert!(out.is_empty());
        assert_eq!(out.crs(), &local_b());
    }

    #[test]
    fn nothing_known_is_unknown() {
        assert!(compute_max_bounds(&[], None, &service()).is_none());

        let no_bounds: Arc<dyn Layer> = Arc::new(StaticLayer::new("no bounds"));
        assert!(compute_max_bounds(&[no_bounds], None, &service()).is_none());
    }

    #[test]
    fn later_non_empty_layer_sets_reference() {
        let layers: Vec<Arc<dyn Layer>> = vec![
            Arc::new(StaticLayer::new("empty").with_bounds(ReferencedEnvelope::empty(local_b()))),
            layer(Envelope::new(0.0, 0.0, 2.0, 2.0), local_a()),
        ];
        let Some(out) = compute_max_bounds(&layers, None, &service()) else {
            panic!("bounds expected");
        };
        assert_eq!(out.crs(), &local_a());
        assert_eq!(out.envelope(), &Envelope::new(0.0, 0.0, 2.0, 2.0));
    }
}
