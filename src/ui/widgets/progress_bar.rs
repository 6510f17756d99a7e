//! Progress bar widget.

use super::Widget;
use crate::{
    backend::WindowEvent,
    render::{Align, Canvas, Font},
    ui::Colors,
};

const BAR_RADIUS: f32 = 4.0;

/// A horizontal bar with its caption drawn over the middle.
pub(crate) struct ProgressBar {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    progress: f32,
    caption: String,
}

impl ProgressBar {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
            progress: 0.0,
            caption: String::new(),
        }
    }

    /// Sets the fraction (0.0 to 1.0) and the text shown on the bar.
    pub fn set_progress(&mut self, fraction: f64, caption: &str) {
        self.progress = (fraction as f32).clamp(0.0, 1.0);
        self.caption.clear();
        self.caption.push_str(caption);
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }
}

impl Widget for ProgressBar {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn x(&self) -> i32 {
        self.x
    }

    fn y(&self) -> i32 {
        self.y
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    fn process_event(&mut self, _event: &WindowEvent) -> bool {
        false
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let (x, y, w, h) = (self.x as f32, self.y as f32, self.width as f32, self.height as f32);

        canvas.fill_rounded_rect(x, y, w, h, BAR_RADIUS, colors.progress_bg);
        if self.progress > 0.0 {
            let fill_width = (w * self.progress).max(BAR_RADIUS * 2.0).min(w);
            canvas.fill_rounded_rect(x, y, fill_width, h, BAR_RADIUS, colors.progress_fill);
        }
        canvas.stroke_rounded_rect(x, y, w, h, BAR_RADIUS, colors.progress_border, 1.0);

        if !self.caption.is_empty() {
            let text_y = self.y + ((h - font.line_height()) / 2.0).round() as i32;
            font.render(&self.caption)
                .with_color(colors.text)
                .with_align(Align::Center, w)
                .with_clip(self.x, self.y, self.width, self.height)
                .draw(canvas, self.x, text_y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let mut bar = ProgressBar::new(100, 20);
        bar.set_progress(1.7, "170%");
        assert_eq!(bar.progress(), 1.0);
        assert_eq!(bar.caption(), "170%");
        bar.set_progress(-0.2, "");
        assert_eq!(bar.progress(), 0.0);
        assert_eq!(bar.caption(), "");
    }
}
