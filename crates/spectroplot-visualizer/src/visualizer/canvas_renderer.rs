//! Raster frame renderer
//!
//! Paints the normalized scan field into the plot box of the canvas
//! (0 = white, 1 = black), frames the box, overlays the cursor marker and
//! encodes the result.

use super::viewport::{CoordinateSpace, RenderTransform};
use crate::imaging::Field2D;
use image::{ImageFormat, Rgb, RgbImage};
use spectroplot_core::ImagingError;
use std::io::Cursor;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const CURSOR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Half-length of the cursor cross arms and radius of its ring, in pixels
const CURSOR_RADIUS: f64 = 10.0;

/// An encoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Turns a field plus cursor into an encoded image
pub trait FrameRenderer: Send {
    /// Render one frame. `cursor` is in display pixels.
    fn render(
        &mut self,
        field: &Field2D,
        cursor: Option<(f64, f64)>,
        space: &CoordinateSpace,
    ) -> Result<EncodedImage, ImagingError>;
}

/// PNG renderer reusing one drawing surface across frames
#[derive(Debug)]
pub struct PngFrameRenderer {
    surface: RgbImage,
}

impl Default for PngFrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PngFrameRenderer {
    pub fn new() -> Self {
        Self {
            surface: RgbImage::new(1, 1),
        }
    }

    /// Last drawn surface
    pub fn surface(&self) -> &RgbImage {
        &self.surface
    }

    fn prepare_surface(&mut self, transform: &RenderTransform) {
        let (width, height) = transform.canvas_size();
        if self.surface.dimensions() != (width, height) {
            tracing::debug!("Resizing render surface to {}x{}", width, height);
            self.surface = RgbImage::new(width, height);
        }
        for pixel in self.surface.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    fn paint_field(&mut self, field: &Field2D, space: &CoordinateSpace) {
        let pixel = space.pixel_size_mm();
        for iy in 0..field.height() {
            for (ix, &value) in field.row(iy).iter().enumerate() {
                if value <= 0.0 {
                    continue;
                }
                let shade = (255.0 * (1.0 - value.min(1.0))).round() as u8;
                let (x0, y0) = space
                    .workspace_to_display(ix as f64 * pixel.x, iy as f64 * pixel.y);
                let (x1, y1) = space.workspace_to_display(
                    (ix + 1) as f64 * pixel.x,
                    (iy + 1) as f64 * pixel.y,
                );
                self.fill_rect(x0, y0, x1, y1, Rgb([shade, shade, shade]));
            }
        }
    }

    fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>) {
        let (w, h) = self.surface.dimensions();
        let clamp_x = |v: f64| v.round().clamp(0.0, f64::from(w)) as u32;
        let clamp_y = |v: f64| v.round().clamp(0.0, f64::from(h)) as u32;
        for y in clamp_y(y0.min(y1))..clamp_y(y0.max(y1)) {
            for x in clamp_x(x0.min(x1))..clamp_x(x0.max(x1)) {
                self.surface.put_pixel(x, y, color);
            }
        }
    }

    fn put(&mut self, x: f64, y: f64, color: Rgb<u8>) {
        let (w, h) = self.surface.dimensions();
        let (x, y) = (x.round(), y.round());
        if x >= 0.0 && y >= 0.0 && x < f64::from(w) && y < f64::from(h) {
            self.surface.put_pixel(x as u32, y as u32, color);
        }
    }

    fn draw_frame(&mut self, transform: &RenderTransform) {
        let (left, top, right, bottom) = transform.plot_box();
        let (left, top) = (left.round(), top.round());
        let (right, bottom) = (right.round(), bottom.round());
        let mut x = left;
        while x <= right {
            self.put(x, top, FRAME_COLOR);
            self.put(x, bottom, FRAME_COLOR);
            x += 1.0;
        }
        let mut y = top;
        while y <= bottom {
            self.put(left, y, FRAME_COLOR);
            self.put(right, y, FRAME_COLOR);
            y += 1.0;
        }
    }

    fn draw_cursor(&mut self, cx: f64, cy: f64) {
        let arm = CURSOR_RADIUS as i32;
        for d in -arm..=arm {
            self.put(cx + f64::from(d), cy, CURSOR_COLOR);
            self.put(cx, cy + f64::from(d), CURSOR_COLOR);
        }
        let steps = 64;
        for step in 0..steps {
            let angle = f64::from(step) / f64::from(steps) * std::f64::consts::TAU;
            self.put(
                cx + CURSOR_RADIUS * angle.cos(),
                cy + CURSOR_RADIUS * angle.sin(),
                CURSOR_COLOR,
            );
        }
    }
}

impl FrameRenderer for PngFrameRenderer {
    fn render(
        &mut self,
        field: &Field2D,
        cursor: Option<(f64, f64)>,
        space: &CoordinateSpace,
    ) -> Result<EncodedImage, ImagingError> {
        let resolution = space.resolution();
        if (field.width(), field.height()) != (resolution.x, resolution.y) {
            return Err(ImagingError::DimensionMismatch {
                reason: format!(
                    "field {}x{} does not match grid {}x{}",
                    field.width(),
                    field.height(),
                    resolution.x,
                    resolution.y
                ),
            });
        }

        self.prepare_surface(space.transform());
        self.paint_field(field, space);
        self.draw_frame(space.transform());
        if let Some((cx, cy)) = cursor.filter(|(x, y)| x.is_finite() && y.is_finite()) {
            self.draw_cursor(cx, cy);
        }

        let mut bytes = Cursor::new(Vec::new());
        self.surface
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| ImagingError::Encode {
                reason: e.to_string(),
            })?;

        Ok(EncodedImage {
            bytes: bytes.into_inner(),
            content_type: "image/png",
        })
    }
}
