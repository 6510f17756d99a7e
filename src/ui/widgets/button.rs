//! Button widget.

use super::{Widget, point_in_rect};
use crate::{
    backend::{MouseButton, WindowEvent},
    render::{Align, Canvas, Font},
    ui::Colors,
};

/// A clickable button widget.
pub(crate) struct Button {
    label: String,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    radius: f32,
    hovered: bool,
    pressed: bool,
    clicked: bool,
    focused: bool,
    enabled: bool,
}

const BASE_BUTTON_PADDING: f32 = 2.0;
const BASE_BUTTON_RADIUS: f32 = 4.0;
const MIN_BUTTON_CELLS: f32 = 10.0;

impl Button {
    /// A button sized from the character cell: at least ten cells wide and
    /// one and a half lines high.
    pub fn new(label: &str, font: &Font, scale: f32) -> Self {
        let cell = font.cell_size();
        let text_w = font.text_width(label);
        let width = (text_w + cell.xmult * BASE_BUTTON_PADDING * 2.0)
            .max(cell.xmult * MIN_BUTTON_CELLS)
            .ceil() as u32;
        let height = (cell.ymult * 1.5).ceil() as u32;
        let mut button = Self::sized(label, width, height);
        button.radius = BASE_BUTTON_RADIUS * scale;
        button
    }

    pub(crate) fn sized(label: &str, width: u32, height: u32) -> Self {
        Self {
            label: label.to_string(),
            x: 0,
            y: 0,
            width,
            height,
            radius: BASE_BUTTON_RADIUS,
            hovered: false,
            pressed: false,
            clicked: false,
            focused: false,
            enabled: true,
        }
    }

    /// Returns true if the button was clicked since the last call.
    pub fn was_clicked(&mut self) -> bool {
        std::mem::take(&mut self.clicked)
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    /// A disabled button is greyed out and ignores clicks.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pressed = false;
        }
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Widget for Button {
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
            WindowEvent::CursorMove(pos) | WindowEvent::CursorEnter(pos) => {
                let hovered = point_in_rect(
                    pos.x as i32,
                    pos.y as i32,
                    self.x,
                    self.y,
                    self.width,
                    self.height,
                );
                std::mem::replace(&mut self.hovered, hovered) != hovered
            }
            WindowEvent::CursorLeave => {
                self.hovered = false;
                self.pressed = false;
                true
            }
            WindowEvent::ButtonPress(MouseButton::Left, _) if self.hovered && self.enabled => {
                self.pressed = true;
                true
            }
            WindowEvent::ButtonRelease(MouseButton::Left, _) => {
                if self.pressed && self.hovered {
                    self.clicked = true;
                }
                std::mem::take(&mut self.pressed)
            }
            _ => false,
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let bg_color = if self.pressed {
            colors.button_pressed
        } else if self.hovered {
            colors.button_hover
        } else {
            colors.button
        };
        let (x, y, w, h) = (self.x as f32, self.y as f32, self.width as f32, self.height as f32);

        canvas.fill_rounded_rect(x, y, w, h, self.radius, bg_color);
        let (outline, outline_w) = if self.focused {
            (colors.input_border_focused, 2.0)
        } else {
            (colors.button_outline, 1.0)
        };
        canvas.stroke_rounded_rect(x, y, w, h, self.radius, outline, outline_w);

        let text_y = self.y + ((h - font.line_height()) / 2.0).round() as i32;
        let text = if self.enabled { colors.button_text } else { colors.input_placeholder };
        font.render(&self.label)
            .with_color(text)
            .with_align(Align::Center, w)
            .draw(canvas, self.x, text_y);
    }
}
