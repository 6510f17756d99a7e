use std::{
    fs,
    path::{Path, PathBuf},
};

use ab_glyph::{Font as _, FontArc, Glyph, PxScaleFont, ScaleFont, point};

use super::{Canvas, Rgba, rgb};
use crate::{error::Error, text::Measure};

const BASE_FONT_SIZE: f32 = 15.0;

/// Sample used to find the average character width.
const CELL_SAMPLE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const SANS_FONTS: &[&str] = &[
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "NotoSans-Regular.ttf",
    "Cantarell-Regular.otf",
    "FreeSans.ttf",
    "Vera.ttf",
];

const MONO_FONTS: &[&str] = &[
    "DejaVuSansMono.ttf",
    "LiberationMono-Regular.ttf",
    "NotoSansMono-Regular.ttf",
    "FreeMono.ttf",
    "VeraMono.ttf",
];

/// How deep the font directories are searched.
const SEARCH_DEPTH: usize = 4;

/// Size of one character cell, the unit dialog sizes are given in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub xmult: f32,
    pub ymult: f32,
}

/// Horizontal alignment of the lines of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

pub struct Font {
    font: PxScaleFont<FontArc>,
}

impl Font {
    /// Loads `custom`, or the first sans (or monospace, with `fixed`) font
    /// installed on the system.
    pub fn load(custom: Option<&Path>, fixed: bool, scale: f32) -> Result<Self, Error> {
        let path = match custom {
            Some(path) => path.to_path_buf(),
            None => {
                let names = if fixed { MONO_FONTS } else { SANS_FONTS };
                find_font(names)
                    .or_else(|| fixed.then(|| find_font(SANS_FONTS)).flatten())
                    .ok_or_else(|| {
                        Error::Font("no usable font found, set XDIALOG_FONT".to_string())
                    })?
            }
        };
        log::debug!("loading font {}", path.display());

        let data = fs::read(&path)
            .map_err(|e| Error::Font(format!("can't read {}: {e}", path.display())))?;
        Self::from_bytes(data, scale)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))
    }

    pub fn from_bytes(data: Vec<u8>, scale: f32) -> Result<Self, ab_glyph::InvalidFont> {
        let inner = FontArc::try_from_vec(data)?;
        Ok(Self {
            font: inner.into_scaled(BASE_FONT_SIZE * scale),
        })
    }

    pub fn ascent(&self) -> f32 {
        self.font.ascent()
    }

    pub fn line_height(&self) -> f32 {
        self.font.height() + self.font.line_gap()
    }

    /// Average character width and the line pitch plus two pixels.
    pub fn cell_size(&self) -> CellSize {
        CellSize {
            xmult: self.text_width(CELL_SAMPLE) / CELL_SAMPLE.len() as f32,
            ymult: (self.font.ascent() - self.font.descent() + 2.0).ceil(),
        }
    }

    /// Advance width of a single line.
    pub fn text_width(&self, line: &str) -> f32 {
        let mut x = 0.0;
        let mut last = None;
        for c in line.chars() {
            let id = self.font.glyph_id(c);
            if let Some(last) = last {
                x += self.font.kern(last, id);
            }
            x += self.font.h_advance(id);
            last = Some(id);
        }
        x
    }

    /// Returns a renderer for the given text.
    pub fn render<'a>(&'a self, text: &'a str) -> TextRenderer<'a> {
        TextRenderer {
            font: self,
            text,
            color: rgb(255, 255, 255),
            align: Align::Left,
            box_width: 0.0,
            clip: None,
        }
    }
}

impl Measure for Font {
    fn width(&self, text: &str) -> f32 {
        self.text_width(text)
    }
}

/// Returns the first of `names` found in the font directories.
fn find_font(names: &[&str]) -> Option<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    roots.extend(dirs::font_dir());
    roots.extend(dirs::data_dir().map(|d| d.join("fonts")));
    roots.extend(dirs::home_dir().map(|d| d.join(".fonts")));
    roots.extend(
        ["/usr/share/fonts", "/usr/local/share/fonts", "/usr/X11R6/lib/X11/fonts"]
            .iter()
            .map(PathBuf::from),
    );

    names.iter().find_map(|name| roots.iter().find_map(|dir| search(dir, name, SEARCH_DEPTH)))
}

fn search(dir: &Path, name: &str, depth: usize) -> Option<PathBuf> {
    let candidate = dir.join(name);
    if candidate.is_file() {
        return Some(candidate);
    }
    if depth == 0 {
        return None;
    }
    let entries = fs::read_dir(dir).ok()?;
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .find_map(|p| search(&p, name, depth - 1))
}

pub struct TextRenderer<'a> {
    font: &'a Font,
    text: &'a str,
    color: Rgba,
    align: Align,
    box_width: f32,
    clip: Option<(i32, i32, i32, i32)>,
}

impl<'a> TextRenderer<'a> {
    pub fn with_color(self, color: Rgba) -> Self {
        Self {
            color,
            ..self
        }
    }

    /// Aligns every line inside a box `width` wide.
    pub fn with_align(self, align: Align, width: f32) -> Self {
        Self {
            align,
            box_width: width,
            ..self
        }
    }

    /// Only pixels inside this canvas rectangle are drawn.
    pub fn with_clip(self, x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            clip: Some((x, y, x + w as i32, y + h as i32)),
            ..self
        }
    }

    /// Width of the widest line and total height.
    pub fn measure(&self) -> (f32, f32) {
        let lines = self.lines();
        let width = lines.iter().map(|l| l.width).fold(0.0, f32::max);
        (width, lines.len() as f32 * self.font.line_height())
    }

    /// Draws the text with its top-left corner at `(x, y)`.
    pub fn draw(self, canvas: &mut Canvas, x: i32, y: i32) {
        let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
        let (x0, y0, x1, y1) = match self.clip {
            Some((cx0, cy0, cx1, cy1)) => (cx0.max(0), cy0.max(0), cx1.min(cw), cy1.min(ch)),
            None => (0, 0, cw, ch),
        };
        let color = self.color;
        let pixels = canvas.pixmap.pixels_mut();

        for line in self.lines() {
            let offset = match self.align {
                Align::Left => 0.0,
                Align::Center => ((self.box_width - line.width) / 2.0).max(0.0).round(),
                Align::Right => (self.box_width - line.width).max(0.0).round(),
            };
            for glyph in line.glyphs {
                let Some(outlined) = self.font.font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                let gx = x + (bounds.min.x + offset).floor() as i32;
                let gy = y + bounds.min.y.floor() as i32;

                outlined.draw(|px, py, c| {
                    let px = gx + px as i32;
                    let py = gy + py as i32;
                    if px < x0 || py < y0 || px >= x1 || py >= y1 {
                        return;
                    }
                    let idx = (py * cw + px) as usize;
                    if let Some(pix) = pixels.get_mut(idx) {
                        *pix = blend(*pix, color, c);
                    }
                });
            }
        }
    }

    /// Lays out glyphs line by line, baseline relative to the block top.
    fn lines(&self) -> Vec<Line> {
        let font = &self.font.font;
        let line_height = self.font.line_height();
        let mut lines = Vec::new();

        for text_line in self.text.split('\n') {
            let mut glyphs: Vec<Glyph> = Vec::new();
            let mut x: f32 = 0.0;
            let mut last = None;

            for c in text_line.chars() {
                let mut glyph = font.scaled_glyph(c);
                if let Some(last) = last {
                    x += font.kern(last, glyph.id);
                }
                glyph.position = point(x.round(), 0.0);
                last = Some(glyph.id);
                x += font.h_advance(glyph.id);
                if c != ' ' {
                    glyphs.push(glyph);
                }
            }
            lines.push(Line {
                glyphs,
                width: x,
            });
        }

        for (n, line) in lines.iter_mut().enumerate() {
            let baseline = (self.font.ascent() + n as f32 * line_height).round();
            for g in &mut line.glyphs {
                g.position.y = baseline;
            }
        }
        lines
    }
}

struct Line {
    glyphs: Vec<Glyph>,
    width: f32,
}

/// Source-over blend of `color` at `coverage` onto a premultiplied pixel.
fn blend(
    dst: tiny_skia::PremultipliedColorU8,
    color: Rgba,
    coverage: f32,
) -> tiny_skia::PremultipliedColorU8 {
    let a = ((coverage * color.a as f32).round() as u32).min(255);
    if a == 0 {
        return dst;
    }
    let inv = 255 - a;
    let channel = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * inv) / 255).min(255) as u8;
    let out_a = (a + dst.alpha() as u32 * inv / 255).min(255) as u8;
    let (r, g, b) = (
        channel(color.r, dst.red()),
        channel(color.g, dst.green()),
        channel(color.b, dst.blue()),
    );
    tiny_skia::PremultipliedColorU8::from_rgba(r.min(out_a), g.min(out_a), b.min(out_a), out_a)
        .unwrap_or(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_reported() {
        let err = Font::load(Some(Path::new("/nonexistent/font.ttf")), false, 1.0);
        assert!(matches!(err, Err(Error::Font(_))));
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(Font::from_bytes(b"not a font".to_vec(), 1.0).is_err());
    }

    #[test]
    fn full_coverage_replaces_the_pixel() {
        let dst = tiny_skia::PremultipliedColorU8::from_rgba(0, 0, 0, 255).unwrap();
        let out = blend(dst, rgb(200, 100, 50), 1.0);
        assert_eq!((out.red(), out.green(), out.blue(), out.alpha()), (200, 100, 50, 255));
        let out = blend(dst, rgb(200, 100, 50), 0.0);
        assert_eq!(out, dst);
    }
}
