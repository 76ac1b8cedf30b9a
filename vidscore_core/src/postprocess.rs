//! Score post-processing chain
//!
//! Everything that happens to a score after the regression model (or before
//! it, for feature rescaling): domain rescaling into [0, 1], the optional
//! polynomial transform with monotonic rectification, clip bounds, and the
//! motion-dependent correction the legacy fusion path applies.
//!
//! The numeric constants here are part of each runner version's identity.
//! Do not retune them without bumping the owning runner's version.

use crate::errors::Result;
use crate::model::{ScoreModel, TransformSpec};

/// Motion level above which regression output starts to get inflated.
const MOTION_CORRECTION_START: f64 = 12.0;

/// Motion level at which the inflation saturates.
const MOTION_CORRECTION_CAP: f64 = 20.0;

/// Inflation per motion unit above the start level.
const MOTION_CORRECTION_GAIN: f64 = 0.015;

/// Final score range for the legacy fusion path.
const SCORE_FLOOR: f64 = 0.0;
const SCORE_CEIL: f64 = 100.0;

/// Clip every value into `[lower, upper]`, then map linearly to [0, 1].
/// The bound pair is part of the calling runner version's numeric identity.
pub fn rescale(values: &[f64], (lower, upper): (f64, f64)) -> Vec<f64> {
    values
        .iter()
        .map(|v| (v.clamp(lower, upper) - lower) / (upper - lower))
        .collect()
}

/// Elementwise clip into `[lower, upper]`.
pub fn clip(values: &[f64], lower: f64, upper: f64) -> Vec<f64> {
    values.iter().map(|v| v.clamp(lower, upper)).collect()
}

/// Correction for a known failure mode where high-motion content makes the
/// regression over/under-shoot: above the start level the score is scaled by
/// `1 + (min(motion, cap) - start) * gain`, then clipped to [0, 100].
pub fn motion_correction(motion: f64, score: f64) -> f64 {
    let mut score = score;
    if motion > MOTION_CORRECTION_START {
        let v = motion.min(MOTION_CORRECTION_CAP);
        score *= 1.0 + (v - MOTION_CORRECTION_START) * MOTION_CORRECTION_GAIN;
    }
    score.clamp(SCORE_FLOOR, SCORE_CEIL)
}

/// Apply the model-declared polynomial transform and rectification. Missing
/// coefficients count as 0. When both rectification flags are set the lte
/// clamp runs first, then the gte clamp.
pub fn transform_score(transform: &TransformSpec, ys: &[f64]) -> Vec<f64> {
    let p0 = transform.p0.unwrap_or(0.0);
    let p1 = transform.p1.unwrap_or(0.0);
    let p2 = transform.p2.unwrap_or(0.0);
    ys.iter()
        .map(|&y_in| {
            let mut y_out = p0 + p1 * y_in + p2 * y_in * y_in;
            if transform.out_lte_in {
                y_out = y_out.min(y_in);
            }
            if transform.out_gte_in {
                y_out = y_out.max(y_in);
            }
            y_out
        })
        .collect()
}

/// Run `predict` and the model-driven tail of the chain: transform (when
/// enabled and declared), then clip (unless disabled, when declared).
/// Transform and clip metadata are looked up independently; absence of
/// either is a no-op for that step.
pub fn predict_with_model(
    model: &dyn ScoreModel,
    xs: &[Vec<f64>],
    enable_transform: bool,
    disable_clip: bool,
) -> Result<Vec<f64>> {
    let mut ys = model.predict(xs)?;

    if enable_transform {
        if let Some(transform) = &model.metadata().score_transform {
            ys = transform_score(transform, &ys);
        }
    }

    if !disable_clip {
        if let Some(bounds) = &model.metadata().score_clip {
            ys = clip(&ys, bounds.lower(), bounds.upper());
        }
    }

    Ok(ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClipSpec, ModelMetadata};

    struct FixedModel {
        outputs: Vec<f64>,
        metadata: ModelMetadata,
    }

    impl ScoreModel for FixedModel {
        fn predict(&self, _xs: &[Vec<f64>]) -> Result<Vec<f64>> {
            Ok(self.outputs.clone())
        }

        fn metadata(&self) -> &ModelMetadata {
            &self.metadata
        }
    }

    #[test]
    fn test_rescale_inside_bounds() {
        let out = rescale(&[10.0, 30.0, 50.0], (10.0, 50.0));
        assert_eq!(out, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_rescale_clips_outside_bounds() {
        let out = rescale(&[-3.0, 25.0], (0.0, 20.0));
        assert_eq!(out, vec![0.0, 1.0]);
    }

    #[test]
    fn test_motion_correction_below_start() {
        assert_eq!(motion_correction(10.0, 80.0), 80.0);
    }

    #[test]
    fn test_motion_correction_midrange() {
        // factor 1 + (17 - 12) * 0.015 = 1.075
        let corrected = motion_correction(17.0, 80.0);
        assert!((corrected - 86.0).abs() < 1e-9);
    }

    #[test]
    fn test_motion_correction_saturates() {
        // factor caps at 1 + (20 - 12) * 0.015 = 1.12
        let at_cap = motion_correction(20.0, 50.0);
        let past_cap = motion_correction(25.0, 50.0);
        assert!((at_cap - 56.0).abs() < 1e-9);
        assert_eq!(at_cap, past_cap);
    }

    #[test]
    fn test_motion_correction_clips_to_score_range() {
        assert_eq!(motion_correction(18.0, 99.0), 100.0);
        assert_eq!(motion_correction(5.0, -2.0), 0.0);
    }

    #[test]
    fn test_transform_polynomial() {
        let transform = TransformSpec {
            p0: Some(1.0),
            p1: Some(1.0),
            p2: Some(0.5),
            ..Default::default()
        };
        // 1 + 2 + 0.5 * 4 = 5
        assert_eq!(transform_score(&transform, &[2.0]), vec![5.0]);
    }

    #[test]
    fn test_transform_missing_coefficients_are_zero() {
        let transform = TransformSpec {
            p1: Some(2.0),
            ..Default::default()
        };
        assert_eq!(transform_score(&transform, &[3.0]), vec![6.0]);
    }

    #[test]
    fn test_transform_rectification_lte() {
        let transform = TransformSpec {
            p0: Some(1.0),
            p1: Some(1.0),
            p2: Some(0.5),
            out_lte_in: true,
            ..Default::default()
        };
        // raw transform would give 5, clamped back to the input
        assert_eq!(transform_score(&transform, &[2.0]), vec![2.0]);
    }

    #[test]
    fn test_transform_rectification_gte() {
        let transform = TransformSpec {
            p1: Some(0.5),
            out_gte_in: true,
            ..Default::default()
        };
        assert_eq!(transform_score(&transform, &[4.0]), vec![4.0]);
    }

    #[test]
    fn test_transform_both_rectifications_pin_to_input() {
        // lte then gte: output always lands exactly on the input.
        let transform = TransformSpec {
            p0: Some(10.0),
            p1: Some(1.0),
            out_lte_in: true,
            out_gte_in: true,
            ..Default::default()
        };
        assert_eq!(transform_score(&transform, &[3.0, -1.0]), vec![3.0, -1.0]);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip(&[-5.0, 50.0, 150.0], 0.0, 100.0), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn test_predict_with_model_transform_and_clip() {
        let model = FixedModel {
            outputs: vec![-5.0, 2.0, 150.0],
            metadata: ModelMetadata {
                score_transform: Some(TransformSpec {
                    p1: Some(1.0),
                    ..Default::default()
                }),
                score_clip: Some(ClipSpec(0.0, 100.0)),
                ..Default::default()
            },
        };

        let clipped = predict_with_model(&model, &[], false, false).unwrap();
        assert_eq!(clipped, vec![0.0, 2.0, 100.0]);

        let unclipped = predict_with_model(&model, &[], false, true).unwrap();
        assert_eq!(unclipped, vec![-5.0, 2.0, 150.0]);
    }

    #[test]
    fn test_predict_with_model_no_metadata_is_noop() {
        let model = FixedModel {
            outputs: vec![-5.0, 150.0],
            metadata: ModelMetadata::default(),
        };
        let ys = predict_with_model(&model, &[], true, false).unwrap();
        assert_eq!(ys, vec![-5.0, 150.0]);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn rescale_lands_in_unit_interval(v in -1000.0f64..1000.0) {
            let out = rescale(&[v], (10.0, 50.0));
            prop_assert!((0.0..=1.0).contains(&out[0]));
        }

        #[test]
        fn rescale_is_monotonic(a in -100.0f64..100.0, b in -100.0f64..100.0) {
            let (lo, hi) = (a.min(b), a.max(b));
            let out = rescale(&[lo, hi], (0.0, 20.0));
            prop_assert!(out[0] <= out[1]);
        }

        #[test]
        fn motion_correction_stays_in_score_range(
            motion in -5.0f64..100.0,
            score in -50.0f64..200.0,
        ) {
            let corrected = motion_correction(motion, score);
            prop_assert!((0.0..=100.0).contains(&corrected));
        }

        #[test]
        fn motion_correction_factor_is_bounded(
            motion in 0.0f64..100.0,
            score in 0.0f64..80.0,
        ) {
            // below the cap the inflation never exceeds 12%
            let corrected = motion_correction(motion, score);
            prop_assert!(corrected <= (score * 1.12).min(100.0) + 1e-9);
            prop_assert!(corrected + 1e-9 >= score.min(100.0));
        }

        #[test]
        fn clip_respects_bounds(values in proptest::collection::vec(-500.0f64..500.0, 0..32)) {
            for v in clip(&values, 0.0, 100.0) {
                prop_assert!((0.0..=100.0).contains(&v));
            }
        }
    }
}
