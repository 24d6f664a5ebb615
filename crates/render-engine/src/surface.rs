//! Display surfaces.
//!
//! A [`DisplaySurface`] is a fixed-size 2D target with a minimal
//! canvas-like API. The only transform is a horizontal mirror about the
//! surface's vertical center line, equivalent to `translate(width, 0)`
//! followed by `scale(-1, 1)`.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use pinchzoom_common::error::{PinchzoomError, PinchzoomResult};
use pinchzoom_hand_model::viewport::CropRect;

/// RGBA color.
pub type Color = [u8; 4];

/// In-process drawing target.
pub trait DisplaySurface {
    /// Fixed `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Reset every pixel, ignoring the current transform.
    fn clear(&mut self);

    /// Push the current transform.
    fn save(&mut self);

    /// Pop the transform pushed by the matching `save`.
    fn restore(&mut self);

    /// Enable or disable the horizontal mirror transform.
    fn set_mirrored(&mut self, mirrored: bool);

    /// Draw the `src` region of `image` scaled into `dst`.
    ///
    /// Parts of `src` outside the image are skipped, shrinking the
    /// destination proportionally. An empty intersection draws nothing.
    fn draw_image(&mut self, image: &RgbaImage, src: &CropRect, dst: &CropRect)
        -> PinchzoomResult<()>;

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: u32);

    fn draw_point(&mut self, at: (f64, f64), radius: u32, color: Color);
}

/// Surface backed by an in-memory RGBA raster.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    canvas: RgbaImage,
    clear_color: Rgba<u8>,
    mirrored: bool,
    saved: Vec<bool>,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let clear_color = Rgba([0, 0, 0, 255]);
        Self {
            canvas: RgbaImage::from_pixel(width, height, clear_color),
            clear_color,
            mirrored: false,
            saved: Vec::new(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Write the current contents as a PNG.
    pub fn save_png(&self, path: &Path) -> PinchzoomResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.canvas
            .save(path)
            .map_err(|e| PinchzoomError::render(format!("Failed to write {}: {e}", path.display())))
    }

    fn map_x(&self, x: f64) -> f64 {
        if self.mirrored {
            f64::from(self.canvas.width()) - x
        } else {
            x
        }
    }
}

impl DisplaySurface for ImageSurface {
    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn clear(&mut self) {
        let color = self.clear_color;
        self.canvas.pixels_mut().for_each(|p| *p = color);
    }

    fn save(&mut self) {
        self.saved.push(self.mirrored);
    }

    fn restore(&mut self) {
        if let Some(mirrored) = self.saved.pop() {
            self.mirrored = mirrored;
        }
    }

    fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        src: &CropRect,
        dst: &CropRect,
    ) -> PinchzoomResult<()> {
        if src.width <= 0.0 || src.height <= 0.0 || dst.width <= 0.0 || dst.height <= 0.0 {
            tracing::trace!(?src, ?dst, "Skipping draw of empty rectangle");
            return Ok(());
        }
        let Some(visible) = src.clamped_to(f64::from(image.width()), f64::from(image.height()))
        else {
            return Ok(());
        };

        let scale_x = dst.width / src.width;
        let scale_y = dst.height / src.height;

        // Whole source pixels covering the visible area.
        let sx = visible.x.floor() as u32;
        let sy = visible.y.floor() as u32;
        let sw = (visible.right().ceil() as u32).min(image.width()).saturating_sub(sx).max(1);
        let sh = (visible.bottom().ceil() as u32).min(image.height()).saturating_sub(sy).max(1);

        // Place that pixel block where its own edges land, not where the
        // fractional crop edges land.
        let left = (dst.x + (f64::from(sx) - src.x) * scale_x).round();
        let top = (dst.y + (f64::from(sy) - src.y) * scale_y).round();
        let right = (dst.x + (f64::from(sx + sw) - src.x) * scale_x).round();
        let bottom = (dst.y + (f64::from(sy + sh) - src.y) * scale_y).round();
        let tw = (right - left).max(1.0) as u32;
        let th = (bottom - top).max(1.0) as u32;

        let region = imageops::crop_imm(image, sx, sy, sw, sh).to_image();
        let mut scaled = imageops::resize(&region, tw, th, FilterType::Triangle);

        let x = if self.mirrored {
            imageops::flip_horizontal_in_place(&mut scaled);
            self.map_x(left + f64::from(tw))
        } else {
            left
        };

        imageops::replace(&mut self.canvas, &scaled, x.round() as i64, top as i64);
        Ok(())
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: u32) {
        let (x0, y0) = (self.map_x(from.0) as f32, from.1 as f32);
        let (x1, y1) = (self.map_x(to.0) as f32, to.1 as f32);
        let mostly_horizontal = (x1 - x0).abs() >= (y1 - y0).abs();

        let width = width.max(1);
        for i in 0..width {
            let offset = i as f32 - (width - 1) as f32 / 2.0;
            let (dx, dy) = if mostly_horizontal {
                (0.0, offset)
            } else {
                (offset, 0.0)
            };
            draw_line_segment_mut(
                &mut self.canvas,
                (x0 + dx, y0 + dy),
                (x1 + dx, y1 + dy),
                Rgba(color),
            );
        }
    }

    fn draw_point(&mut self, at: (f64, f64), radius: u32, color: Color) {
        let center = (self.map_x(at.0).round() as i32, at.1.round() as i32);
        draw_filled_circle_mut(&mut self.canvas, center, radius as i32, Rgba(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];
    const BLUE: Color = [0, 0, 255, 255];

    /// Left half red, right half blue.
    fn split_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba(RED)
            } else {
                Rgba(BLUE)
            }
        })
    }

    #[test]
    fn test_draw_full_image_unmirrored() {
        let mut surface = ImageSurface::new(64, 48);
        let image = split_image(64, 48);
        let full = CropRect::full(64.0, 48.0);
        surface.draw_image(&image, &full, &full).unwrap();
        assert_eq!(surface.image().get_pixel(2, 10).0, RED);
        assert_eq!(surface.image().get_pixel(60, 10).0, BLUE);
    }

    #[test]
    fn test_mirror_swaps_sides() {
        let mut surface = ImageSurface::new(64, 48);
        let image = split_image(64, 48);
        let full = CropRect::full(64.0, 48.0);
        surface.set_mirrored(true);
        surface.draw_image(&image, &full, &full).unwrap();
        assert_eq!(surface.image().get_pixel(2, 10).0, BLUE);
        assert_eq!(surface.image().get_pixel(60, 10).0, RED);
    }

    #[test]
    fn test_crop_scales_to_fill() {
        let mut surface = ImageSurface::new(64, 48);
        let image = split_image(64, 48);
        // Left quarter of the image is all red; it should fill the surface.
        let src = CropRect {
            x: 0.0,
            y: 0.0,
            width: 16.0,
            height: 12.0,
        };
        surface
            .draw_image(&image, &src, &CropRect::full(64.0, 48.0))
            .unwrap();
        assert_eq!(surface.image().get_pixel(63, 47).0, RED);
    }

    #[test]
    fn test_fractional_crop_keeps_content_aligned() {
        // A thin white stripe at columns 192..200 of a black frame.
        let image = RgbaImage::from_fn(640, 480, |x, _| {
            if (192..200).contains(&x) {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let crop = CropRect::centered(640.0, 480.0, 2.37);
        let scale = 640.0 / crop.width;
        let left = (192.0 - crop.x) * scale;
        let right = (200.0 - crop.x) * scale;

        let lit_span = |surface: &ImageSurface| {
            let lit: Vec<u32> = (0..640)
                .filter(|&x| surface.image().get_pixel(x, 240).0[0] > 127)
                .collect();
            (f64::from(lit[0]), f64::from(lit[lit.len() - 1] + 1))
        };

        let mut surface = ImageSurface::new(640, 480);
        surface
            .draw_image(&image, &crop, &CropRect::full(640.0, 480.0))
            .unwrap();
        let (first, end) = lit_span(&surface);
        assert!((first - left).abs() <= 1.5, "stripe starts at {first}, expected {left}");
        assert!((end - right).abs() <= 1.5, "stripe ends at {end}, expected {right}");

        let mut surface = ImageSurface::new(640, 480);
        surface.set_mirrored(true);
        surface
            .draw_image(&image, &crop, &CropRect::full(640.0, 480.0))
            .unwrap();
        let (first, end) = lit_span(&surface);
        assert!((first - (640.0 - right)).abs() <= 1.5);
        assert!((end - (640.0 - left)).abs() <= 1.5);
    }

    #[test]
    fn test_save_restore_mirror_state() {
        let mut surface = ImageSurface::new(8, 8);
        surface.save();
        surface.set_mirrored(true);
        assert!(surface.is_mirrored());
        surface.restore();
        assert!(!surface.is_mirrored());
        // Unbalanced restore is a no-op.
        surface.restore();
        assert!(!surface.is_mirrored());
    }

    #[test]
    fn test_point_is_mirrored() {
        let mut surface = ImageSurface::new(64, 48);
        surface.set_mirrored(true);
        surface.draw_point((10.0, 20.0), 2, RED);
        assert_eq!(surface.image().get_pixel(54, 20).0, RED);
        assert_eq!(surface.image().get_pixel(10, 20).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_clear_resets_pixels() {
        let mut surface = ImageSurface::new(16, 16);
        surface.draw_line((0.0, 8.0), (15.0, 8.0), BLUE, 1);
        assert_eq!(surface.image().get_pixel(5, 8).0, BLUE);
        surface.clear();
        assert!(surface.image().pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_empty_source_draws_nothing() {
        let mut surface = ImageSurface::new(16, 16);
        let image = split_image(16, 16);
        let empty = CropRect::full(0.0, 0.0);
        surface
            .draw_image(&image, &empty, &CropRect::full(16.0, 16.0))
            .unwrap();
        assert!(surface.image().pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }
}
