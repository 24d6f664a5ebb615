//! One-shot zoom estimate from fingertip positions.

use pinchzoom_common::config::AppConfig;
use pinchzoom_hand_model::detection::DetectionResult;
use pinchzoom_hand_model::landmark::{HandLandmark, HandLandmarks, Landmark, HAND_LANDMARK_COUNT};
use pinchzoom_hand_model::viewport::CropRect;
use pinchzoom_processing_core::zoom::{ZoomEstimator, ZoomSource};

/// Parse `X,Y` into a normalized point.
pub fn parse_point(value: &str) -> Result<(f64, f64), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{part}': {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

pub fn run(
    config: &AppConfig,
    tips: Option<((f64, f64), (f64, f64))>,
    frame_width: u32,
    frame_height: u32,
    previous: Option<f64>,
) -> anyhow::Result<()> {
    let estimator = ZoomEstimator::new(config.zoom)?;

    let detection = match tips {
        Some((thumb, index)) => DetectionResult::single(hand_with_tips(thumb, index)?),
        None => DetectionResult::empty(),
    };

    let mut zoom = match previous {
        Some(previous) => estimator.seeded(previous),
        None => estimator.initial(),
    };
    let before = zoom.value();
    let source = estimator.update(&mut zoom, &detection, f64::from(frame_width));
    let crop = CropRect::centered(f64::from(frame_width), f64::from(frame_height), zoom.value());

    println!("Frame: {frame_width}x{frame_height}");
    match source {
        ZoomSource::Pinch { distance_px } => {
            println!("Pinch distance: {distance_px:.2} px");
        }
        ZoomSource::Decay => {
            println!("No hand: easing from {before:.4} toward {:.4}", config.zoom.min_zoom);
        }
    }
    println!("Zoom: {:.4}", zoom.value());
    println!(
        "Crop: x={:.1} y={:.1} {:.1}x{:.1}",
        crop.x, crop.y, crop.width, crop.height
    );

    Ok(())
}

/// A hand with every landmark at the fingertips' midpoint, except the two tips.
fn hand_with_tips(thumb: (f64, f64), index: (f64, f64)) -> anyhow::Result<HandLandmarks> {
    let mid = Landmark::new((thumb.0 + index.0) / 2.0, (thumb.1 + index.1) / 2.0);
    let mut points = vec![mid; HAND_LANDMARK_COUNT];
    points[HandLandmark::ThumbTip.index()] = Landmark::new(thumb.0, thumb.1);
    points[HandLandmark::IndexFingerTip.index()] = Landmark::new(index.0, index.1);
    Ok(HandLandmarks::from_points(points)?)
}
