//! Pinch-to-zoom estimation.
//!
//! # Mapping
//!
//! 1. Take the first detected hand and measure the normalized distance
//!    between the thumb tip and the index fingertip.
//! 2. Scale it by the frame width to get a pixel distance.
//! 3. Divide by `sensitivity` to get a raw zoom and clamp it to
//!    `[min_zoom, max_zoom]`.
//!
//! When no hand is visible the previous zoom moves `decay_rate` of the way
//! back toward `min_zoom` each frame, so the view eases out instead of
//! snapping back.

use serde::Serialize;

use pinchzoom_common::config::ZoomConfig;
use pinchzoom_common::error::PinchzoomResult;
use pinchzoom_hand_model::detection::DetectionResult;

/// Compute the next zoom from the previous one and the current detection.
///
/// Total over its inputs: a negative or non-finite `frame_width`, or any
/// non-finite intermediate, yields `config.min_zoom`.
pub fn estimate_zoom(
    previous: f64,
    detection: &DetectionResult,
    frame_width: f64,
    config: &ZoomConfig,
) -> f64 {
    let target = match detection.primary_hand() {
        Some(hand) => hand.pinch_distance() * frame_width.max(0.0) / config.sensitivity,
        None => previous + (config.min_zoom - previous) * config.decay_rate,
    };
    clamp_zoom(target, config)
}

fn clamp_zoom(value: f64, config: &ZoomConfig) -> f64 {
    if !value.is_finite() {
        return config.min_zoom;
    }
    value.max(config.min_zoom).min(config.max_zoom)
}

/// The current zoom level. Only [`ZoomEstimator`] produces or changes one,
/// so it always lies within the estimator's configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ZoomFactor(f64);

impl ZoomFactor {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// What drove the latest zoom update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomSource {
    /// A hand was visible; carries the fingertip distance in pixels.
    Pinch { distance_px: f64 },
    /// No hand; eased toward the minimum.
    Decay,
}

/// Owns a validated [`ZoomConfig`] and applies it to a [`ZoomFactor`].
#[derive(Debug, Clone)]
pub struct ZoomEstimator {
    config: ZoomConfig,
}

impl ZoomEstimator {
    /// Create an estimator, rejecting unusable bounds.
    pub fn new(config: ZoomConfig) -> PinchzoomResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create an estimator with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: ZoomConfig::default(),
        }
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// Starting zoom: the unzoomed view.
    pub fn initial(&self) -> ZoomFactor {
        ZoomFactor(self.config.min_zoom)
    }

    /// A zoom factor starting at `value`, clamped into the configured bounds.
    pub fn seeded(&self, value: f64) -> ZoomFactor {
        ZoomFactor(clamp_zoom(value, &self.config))
    }

    /// Update `zoom` in place for one frame.
    pub fn update(
        &self,
        zoom: &mut ZoomFactor,
        detection: &DetectionResult,
        frame_width: f64,
    ) -> ZoomSource {
        let previous = zoom.0;
        zoom.0 = estimate_zoom(previous, detection, frame_width, &self.config);

        let source = match detection.primary_hand() {
            Some(hand) => ZoomSource::Pinch {
                distance_px: hand.pinch_distance() * frame_width.max(0.0),
            },
            None => ZoomSource::Decay,
        };

        tracing::trace!(previous, zoom = zoom.0, ?source, "Zoom updated");
        source
    }
}

impl Default for ZoomEstimator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use pinchzoom_hand_model::landmark::{HandLandmark, HandLandmarks, Landmark, HAND_LANDMARK_COUNT};
    use proptest::prelude::*;

    use super::*;

    fn pinch(thumb: (f64, f64), index: (f64, f64)) -> DetectionResult {
        let mut points = vec![Landmark::new(0.5, 0.8); HAND_LANDMARK_COUNT];
        points[HandLandmark::ThumbTip.index()] = Landmark::new(thumb.0, thumb.1);
        points[HandLandmark::IndexFingerTip.index()] = Landmark::new(index.0, index.1);
        DetectionResult::single(HandLandmarks::from_points(points).unwrap())
    }

    #[test]
    fn test_small_pinch_floors_at_min_zoom() {
        // distance 0.05 * 640 = 32px -> 0.32 -> clamped to 1.0
        let detection = pinch((0.3, 0.5), (0.35, 0.5));
        let zoom = estimate_zoom(1.0, &detection, 640.0, &ZoomConfig::default());
        assert_eq!(zoom, 1.0);
    }

    #[test]
    fn test_wide_frame_reaches_exactly_one() {
        // distance 0.05 * 2000 = 100px -> 1.0
        let detection = pinch((0.3, 0.5), (0.35, 0.5));
        let zoom = estimate_zoom(2.0, &detection, 2000.0, &ZoomConfig::default());
        assert!((zoom - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_pinch_clamps_to_max_zoom() {
        // distance 0.2 * 2000 = 400px -> 4.0 -> clamped to 3.0
        let detection = pinch((0.3, 0.5), (0.5, 0.5));
        let zoom = estimate_zoom(1.0, &detection, 2000.0, &ZoomConfig::default());
        assert_eq!(zoom, 3.0);
    }

    #[test]
    fn test_mid_range_pinch_is_linear() {
        // distance 0.25 * 640 = 160px -> 1.6
        let detection = pinch((0.3, 0.5), (0.55, 0.5));
        let zoom = estimate_zoom(1.0, &detection, 640.0, &ZoomConfig::default());
        assert!((zoom - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_single_decay_step() {
        let zoom = estimate_zoom(3.0, &DetectionResult::empty(), 640.0, &ZoomConfig::default());
        assert!((zoom - 2.8).abs() < 1e-12);
    }

    #[test]
    fn test_zero_frame_width_gives_min_zoom() {
        let detection = pinch((0.1, 0.1), (0.9, 0.9));
        let zoom = estimate_zoom(2.5, &detection, 0.0, &ZoomConfig::default());
        assert_eq!(zoom, 1.0);
    }

    #[test]
    fn test_non_finite_width_gives_min_zoom() {
        let detection = pinch((0.1, 0.1), (0.9, 0.9));
        let zoom = estimate_zoom(2.5, &detection, f64::NAN, &ZoomConfig::default());
        assert_eq!(zoom, 1.0);
    }

    #[test]
    fn test_estimator_owns_state_updates() {
        let estimator = ZoomEstimator::with_defaults();
        let mut zoom = estimator.initial();
        assert_eq!(zoom.value(), 1.0);

        let source = estimator.update(&mut zoom, &pinch((0.3, 0.5), (0.7, 0.5)), 640.0);
        assert!((zoom.value() - 2.56).abs() < 1e-9);
        match source {
            ZoomSource::Pinch { distance_px } => assert!((distance_px - 256.0).abs() < 1e-9),
            ZoomSource::Decay => panic!("expected pinch"),
        }

        let source = estimator.update(&mut zoom, &DetectionResult::empty(), 640.0);
        assert_eq!(source, ZoomSource::Decay);
        assert!((zoom.value() - (2.56 - 1.56 * 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_estimator_rejects_invalid_config() {
        let config = ZoomConfig {
            min_zoom: 3.0,
            max_zoom: 1.0,
            ..ZoomConfig::default()
        };
        assert!(ZoomEstimator::new(config).is_err());
    }

    #[test]
    fn test_seeded_clamps_into_bounds() {
        let estimator = ZoomEstimator::with_defaults();
        assert_eq!(estimator.seeded(2.5).value(), 2.5);
        assert_eq!(estimator.seeded(9.0).value(), 3.0);
        assert_eq!(estimator.seeded(f64::NAN).value(), 1.0);
    }

    #[test]
    fn test_decay_converges_to_min_zoom() {
        let config = ZoomConfig::default();
        let mut zoom = config.max_zoom;
        for _ in 0..300 {
            zoom = estimate_zoom(zoom, &DetectionResult::empty(), 640.0, &config);
        }
        assert!((zoom - config.min_zoom).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_output_within_bounds(
            tx in 0.0f64..=1.0,
            ty in 0.0f64..=1.0,
            ix in 0.0f64..=1.0,
            iy in 0.0f64..=1.0,
            frame_width in 0.0f64..8192.0,
            previous in 1.0f64..=3.0,
        ) {
            let config = ZoomConfig::default();
            let zoom = estimate_zoom(previous, &pinch((tx, ty), (ix, iy)), frame_width, &config);
            prop_assert!(zoom >= config.min_zoom && zoom <= config.max_zoom);
        }

        #[test]
        fn prop_decay_is_monotone_toward_min(previous in 1.0f64..=3.0, frames in 1usize..64) {
            let config = ZoomConfig::default();
            let mut zoom = previous;
            for _ in 0..frames {
                let next = estimate_zoom(zoom, &DetectionResult::empty(), 640.0, &config);
                prop_assert!(next <= zoom);
                prop_assert!(next >= config.min_zoom);
                zoom = next;
            }
        }
    }
}
