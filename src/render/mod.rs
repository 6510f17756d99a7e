mod text;

pub(crate) use text::{Align, CellSize, Font};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Transform};

use crate::error::Error;

/// A canvas backed by a tiny-skia Pixmap.
/// Stores pixels in RGBA format internally, X11 wants them as BGRA.
pub struct Canvas {
    pub(crate) pixmap: Pixmap,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        let pixmap = Pixmap::new(width, height).ok_or(Error::Canvas {
            width,
            height,
        })?;
        Ok(Self {
            pixmap,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fills the entire canvas with a color.
    pub fn fill(&mut self, color: Rgba) {
        self.pixmap.fill(color.into());
    }

    /// Fills a rectangle with a color.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Draws a one pixel horizontal line.
    pub fn hline(&mut self, x: f32, y: f32, w: f32, color: Rgba) {
        self.fill_rect(x, y, w, 1.0, color);
    }

    /// Fills a rounded rectangle with a color.
    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgba) {
        let Some(path) = rounded_rect_path(x, y, w, h, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Strokes a rounded rectangle outline.
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        color: Rgba,
        width: f32,
    ) {
        let Some(path) = rounded_rect_path(x, y, w, h, radius) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = true;
        let stroke = tiny_skia::Stroke {
            width,
            ..Default::default()
        };
        self.pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Returns the pixel data in the byte order of a 24-bit X11 visual.
    pub fn as_argb(&self) -> Vec<u8> {
        let data = self.pixmap.data();
        let mut argb = Vec::with_capacity(data.len());

        // B, G, R, A: a little-endian u32 in ARGB order
        for chunk in data.chunks_exact(4) {
            argb.extend_from_slice(&[chunk[2], chunk[1], chunk[0], chunk[3]]);
        }

        argb
    }

    /// Fills the window background and its one pixel frame.
    pub fn fill_dialog_bg(&mut self, bg_color: Rgba, border_color: Rgba) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        self.fill(bg_color);
        self.stroke_rounded_rect(0.5, 0.5, w - 1.0, h - 1.0, 0.0, border_color, 1.0);
    }
}

/// Creates a rounded rectangle path, or `None` for an empty rectangle.
fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<tiny_skia::Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let mut pb = PathBuilder::new();

    // Clamp radius to half the smallest dimension
    let r = r.max(0.0).min(w / 2.0).min(h / 2.0);

    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);

    pb.close();
    pb.finish()
}

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a,
        }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: 255,
        }
    }
}

impl From<Rgba> for Color {
    fn from(c: Rgba) -> Self {
        Color::from_rgba8(c.r, c.g, c.b, c.a)
    }
}

/// Convenience function to create an RGB color.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    Rgba::rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canvas_is_an_error() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(Error::Canvas {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn pixels_come_out_as_bgra() {
        let mut canvas = Canvas::new(2, 1).unwrap();
        canvas.fill(rgb(10, 20, 30));
        assert_eq!(canvas.as_argb(), vec![30, 20, 10, 255, 30, 20, 10, 255]);
    }

    #[test]
    fn degenerate_rounded_rect_is_skipped() {
        assert!(rounded_rect_path(0.0, 0.0, 0.0, 5.0, 2.0).is_none());
        assert!(rounded_rect_path(0.0, 0.0, 4.0, 5.0, 20.0).is_some());

        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.fill_rounded_rect(0.0, 0.0, -1.0, 3.0, 1.0, rgb(1, 2, 3));
    }
}
