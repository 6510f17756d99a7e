//! Check boxes and radio buttons.

use super::{Widget, point_in_rect};
use crate::{
    backend::{MouseButton, WindowEvent},
    render::{Canvas, Font},
    ui::Colors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToggleKind {
    Check,
    Radio,
}

/// A labelled check box.
pub(crate) struct Toggle {
    label: String,
    on: bool,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    mark: u32,
    scale: f32,
    pressed: bool,
    toggled: bool,
}

impl Toggle {
    pub fn new(label: &str, on: bool, font: &Font, scale: f32) -> Self {
        let line = font.line_height();
        let mark = mark_size(font);
        let gap = (font.cell_size().xmult).ceil();
        Self {
            label: label.to_string(),
            on,
            x: 0,
            y: 0,
            width: (mark as f32 + gap + font.text_width(label)).ceil() as u32,
            height: line.ceil() as u32,
            mark,
            scale,
            pressed: false,
            toggled: false,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Returns true if the state changed since the last call.
    pub fn was_toggled(&mut self) -> bool {
        std::mem::take(&mut self.toggled)
    }
}

impl Widget for Toggle {
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

    fn process_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::ButtonPress(MouseButton::Left, _) => {
                self.pressed = true;
                false
            }
            WindowEvent::ButtonRelease(MouseButton::Left, _) => std::mem::take(&mut self.pressed),
            _ => false,
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let mark_y = self.y + (self.height as i32 - self.mark as i32) / 2;
        draw_mark(
            canvas,
            ToggleKind::Check,
            self.x,
            mark_y,
            self.on,
            true,
            colors,
            self.mark,
            self.scale,
        );
        let text_x = self.x + self.mark as i32 + font.cell_size().xmult.ceil() as i32;
        font.render(&self.label).with_color(colors.text).draw(canvas, text_x, self.y);
    }
}

impl Toggle {
    /// Feeds a pointer event at `(px, py)`; a press and release inside the
    /// widget flips it. Returns whether it flipped.
    pub fn click(&mut self, event: &WindowEvent, px: i32, py: i32) -> bool {
        let inside = point_in_rect(px, py, self.x, self.y, self.width, self.height);
        match event {
            WindowEvent::ButtonPress(..) if !inside => false,
            WindowEvent::ButtonRelease(..) if !inside => {
                self.pressed = false;
                false
            }
            _ => {
                if self.process_event(event) {
                    self.on = !self.on;
                    self.toggled = true;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Side of the check box or radio circle for `font`.
pub(crate) fn mark_size(font: &Font) -> u32 {
    (font.ascent() * 0.9).ceil() as u32
}

/// Draws a check box or radio circle, greyed out when not `enabled`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_mark(
    canvas: &mut Canvas,
    kind: ToggleKind,
    x: i32,
    y: i32,
    on: bool,
    enabled: bool,
    colors: &Colors,
    size: u32,
    scale: f32,
) {
    let (x, y, s) = (x as f32, y as f32, size as f32);
    let radius = match kind {
        ToggleKind::Check => 3.0 * scale,
        ToggleKind::Radio => s / 2.0,
    };
    let fill = if enabled { colors.input_bg } else { colors.button };

    canvas.fill_rounded_rect(x, y, s, s, radius, fill);
    canvas.stroke_rounded_rect(x, y, s, s, radius, colors.input_border, 1.0);

    if on {
        let color = if enabled { colors.input_border_focused } else { colors.input_border };
        match kind {
            ToggleKind::Check => {
                let inset = (3.0 * scale).round();
                canvas.fill_rounded_rect(
                    x + inset,
                    y + inset,
                    s - inset * 2.0,
                    s - inset * 2.0,
                    2.0 * scale,
                    color,
                );
            }
            ToggleKind::Radio => {
                let r = s / 4.0;
                canvas.fill_rounded_rect(x + s / 2.0 - r, y + s / 2.0 - r, r * 2.0, r * 2.0, r, color);
            }
        }
    }
}
