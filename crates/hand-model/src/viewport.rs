//! Crop rectangles for zoomed framing.
//!
//! A [`CropRect`] lives in source-frame pixel space. It is always centered on
//! the frame center and sized inversely to the zoom factor, so for a fixed
//! frame size it is a pure function of the zoom.

use serde::{Deserialize, Serialize};

use crate::landmark::Landmark;

/// Source-frame region that gets scaled to fill the display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge (pixels).
    pub x: f64,
    /// Top edge (pixels).
    pub y: f64,
    /// Width (pixels).
    pub width: f64,
    /// Height (pixels).
    pub height: f64,
}

impl CropRect {
    /// The whole frame (no zoom).
    pub fn full(frame_width: f64, frame_height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: frame_width,
            height: frame_height,
        }
    }

    /// Centered crop of size `(frame_width / zoom, frame_height / zoom)`.
    ///
    /// A zoom that is not a positive finite number is treated as `1.0`.
    pub fn centered(frame_width: f64, frame_height: f64, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            1.0
        };

        let width = frame_width / zoom;
        let height = frame_height / zoom;
        let (cx, cy) = (frame_width / 2.0, frame_height / 2.0);

        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// The center point of this rectangle.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Intersection with the frame bounds, or `None` when nothing is left.
    pub fn clamped_to(&self, frame_width: f64, frame_height: f64) -> Option<CropRect> {
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = self.right().min(frame_width);
        let y1 = self.bottom().min(frame_height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(CropRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    /// Map a normalized landmark from the source frame into a destination
    /// of `dest_width × dest_height` that shows this crop.
    ///
    /// Points outside the crop map outside the destination.
    pub fn project(
        &self,
        point: &Landmark,
        frame_width: f64,
        frame_height: f64,
        dest_width: f64,
        dest_height: f64,
    ) -> (f64, f64) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return (point.x * dest_width, point.y * dest_height);
        }
        let px = point.x * frame_width;
        let py = point.y * frame_height;
        (
            (px - self.x) / self.width * dest_width,
            (py - self.y) / self.height * dest_height,
        )
    }
}
