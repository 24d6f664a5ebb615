//! Frame compositor: combines the zoomed camera frame and the hand overlay.
//!
//! Composition is split from drawing so the per-frame geometry can be
//! inspected without a surface. Drawing always happens in the same order:
//! clear, mirror transform, image, overlay.

use image::RgbaImage;

use pinchzoom_common::config::{DisplayConfig, OverlayStyle};
use pinchzoom_common::error::PinchzoomResult;
use pinchzoom_hand_model::detection::DetectionResult;
use pinchzoom_hand_model::landmark::Landmark;
use pinchzoom_hand_model::viewport::CropRect;

use crate::surface::{Color, DisplaySurface};

/// A single frame's composition instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameComposition {
    /// Region of the source frame to show.
    pub crop: CropRect,

    /// Where the crop lands on the surface (the whole surface).
    pub dest: CropRect,

    /// Whether the surface's mirror transform is applied.
    pub mirrored: bool,

    /// One overlay per detected hand, in surface coordinates before the
    /// mirror transform.
    pub hands: Vec<HandOverlay>,
}

/// Landmark skeleton projected onto the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct HandOverlay {
    pub points: Vec<(f64, f64)>,
    pub connections: Vec<((f64, f64), (f64, f64))>,
}

/// Parsed overlay colors and sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPalette {
    pub connector: Color,
    pub connector_width: u32,
    pub point: Color,
    pub point_radius: u32,
}

impl OverlayPalette {
    pub fn from_style(style: &OverlayStyle) -> PinchzoomResult<Self> {
        Ok(Self {
            connector: style.connector_rgba()?,
            connector_width: style.connector_width,
            point: style.point_rgba()?,
            point_radius: style.point_radius,
        })
    }
}

/// Compute the composition for one frame.
///
/// `frame_size` is the video's intrinsic size and `surface_size` the
/// display's fixed size. Landmarks go through the same crop as the image so
/// they stay on the fingertips at any zoom.
pub fn compose_frame(
    frame_size: (u32, u32),
    zoom: f64,
    detection: &DetectionResult,
    surface_size: (u32, u32),
    display: &DisplayConfig,
) -> FrameComposition {
    let (fw, fh) = (f64::from(frame_size.0), f64::from(frame_size.1));
    let (dw, dh) = (f64::from(surface_size.0), f64::from(surface_size.1));
    let crop = CropRect::centered(fw, fh, zoom);

    let hands = if display.draw_landmarks {
        detection
            .hands()
            .iter()
            .map(|hand| {
                let project = |point: &Landmark| crop.project(point, fw, fh, dw, dh);
                HandOverlay {
                    points: hand.points().iter().map(|p| project(p)).collect(),
                    connections: hand
                        .connections()
                        .map(|(a, b)| (project(a), project(b)))
                        .collect(),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    FrameComposition {
        crop,
        dest: CropRect::full(dw, dh),
        mirrored: display.mirror,
        hands,
    }
}

/// Draw a composition onto a surface.
///
/// The surface's transform is saved before and restored after, so the
/// mirror never leaks into the next frame.
pub fn draw_composition<S: DisplaySurface + ?Sized>(
    surface: &mut S,
    image: &RgbaImage,
    composition: &FrameComposition,
    palette: &OverlayPalette,
) -> PinchzoomResult<()> {
    surface.save();
    surface.clear();
    surface.set_mirrored(composition.mirrored);

    let drawn = surface.draw_image(image, &composition.crop, &composition.dest);
    if drawn.is_ok() {
        for hand in &composition.hands {
            for &(from, to) in &hand.connections {
                surface.draw_line(from, to, palette.connector, palette.connector_width);
            }
            for &point in &hand.points {
                surface.draw_point(point, palette.point_radius, palette.point);
            }
        }
    }

    surface.restore();
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;

    use pinchzoom_hand_model::landmark::{HandLandmark, HandLandmarks};

    use crate::surface::ImageSurface;

    fn hand_at(x: f64, y: f64) -> HandLandmarks {
        HandLandmarks::from_points(vec![Landmark::new(x, y); 21]).unwrap()
    }

    #[test]
    fn test_no_hand_no_overlay() {
        let comp = compose_frame(
            (640, 480),
            1.0,
            &DetectionResult::empty(),
            (640, 480),
            &DisplayConfig::default(),
        );
        assert!(comp.hands.is_empty());
        assert_eq!(comp.crop, CropRect::full(640.0, 480.0));
        assert_eq!(comp.dest, CropRect::full(640.0, 480.0));
        assert!(comp.mirrored);
    }

    #[test]
    fn test_landmarks_follow_crop() {
        let detection = DetectionResult::single(hand_at(0.25, 0.25));
        let comp = compose_frame((640, 480), 2.0, &detection, (640, 480), &DisplayConfig::default());
        assert_eq!(comp.hands.len(), 1);
        let hand = &comp.hands[0];
        assert_eq!(hand.points.len(), 21);
        // The crop's top-left corner maps to the surface origin.
        let (x, y) = hand.points[HandLandmark::IndexFingerTip.index()];
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
        assert_eq!(hand.connections.len(), 21);
    }

    #[test]
    fn test_landmarks_disabled() {
        let display = DisplayConfig {
            draw_landmarks: false,
            ..DisplayConfig::default()
        };
        let detection = DetectionResult::single(hand_at(0.5, 0.5));
        let comp = compose_frame((640, 480), 1.5, &detection, (640, 480), &display);
        assert!(comp.hands.is_empty());
    }

    #[test]
    fn test_overlay_drawn_above_image() {
        let display = DisplayConfig {
            mirror: false,
            ..DisplayConfig::default()
        };
        let palette = OverlayPalette::from_style(&display.overlay).unwrap();
        let detection = DetectionResult::single(hand_at(0.5, 0.5));
        let comp = compose_frame((64, 48), 1.0, &detection, (64, 48), &display);

        let mut surface = ImageSurface::new(64, 48);
        let image = RgbaImage::from_pixel(64, 48, image::Rgba([200, 200, 200, 255]));
        draw_composition(&mut surface, &image, &comp, &palette).unwrap();

        assert_eq!(surface.image().get_pixel(32, 24).0, palette.point);
        assert_eq!(surface.image().get_pixel(2, 2).0, [200, 200, 200, 255]);
        assert!(!surface.is_mirrored());
    }

    #[test]
    fn test_mirror_is_restored_after_draw() {
        let display = DisplayConfig::default();
        let palette = OverlayPalette::from_style(&display.overlay).unwrap();
        let comp = compose_frame((8, 8), 1.0, &DetectionResult::empty(), (8, 8), &display);
        let mut surface = ImageSurface::new(8, 8);
        draw_composition(&mut surface, &RgbaImage::new(8, 8), &comp, &palette).unwrap();
        assert!(!surface.is_mirrored());
    }

    #[test]
    fn test_palette_rejects_bad_color() {
        let style = OverlayStyle {
            point_color: "red".into(),
            ..OverlayStyle::default()
        };
        assert!(OverlayPalette::from_style(&style).is_err());
    }
}
