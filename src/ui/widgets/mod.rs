//! Reusable UI widgets.

pub(crate) mod button;
pub(crate) mod progress_bar;
pub(crate) mod scrollbar;
pub(crate) mod slider;
pub(crate) mod spin_button;
pub(crate) mod text_area;
pub(crate) mod text_input;
pub(crate) mod text_view;
pub(crate) mod toggle;

use crate::{
    backend::WindowEvent,
    render::{Canvas, Font, Rgba, rgb},
    ui::Colors,
};

/// Trait for UI widgets.
pub(crate) trait Widget {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn x(&self) -> i32;
    fn y(&self) -> i32;
    fn set_position(&mut self, x: i32, y: i32);
    /// Returns true when the widget needs a redraw.
    fn process_event(&mut self, event: &WindowEvent) -> bool;
    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font);

    fn contains(&self, px: i32, py: i32) -> bool {
        point_in_rect(px, py, self.x(), self.y(), self.width(), self.height())
    }
}

/// Check if a point is within a rectangle.
pub(crate) fn point_in_rect(px: i32, py: i32, x: i32, y: i32, w: u32, h: u32) -> bool {
    px >= x && px < x + w as i32 && py >= y && py < y + h as i32
}

pub(crate) fn darken(color: Rgba, amount: f32) -> Rgba {
    rgb(
        (color.r as f32 * (1.0 - amount)) as u8,
        (color.g as f32 * (1.0 - amount)) as u8,
        (color.b as f32 * (1.0 - amount)) as u8,
    )
}
