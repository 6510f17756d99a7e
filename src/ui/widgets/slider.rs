//! Horizontal slider over a bounded value.

use super::{Widget, point_in_rect};
use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keysym},
    render::{Align, Canvas, Font},
    ui::Colors,
    values::Adjustment,
};

const BASE_TRACK_HEIGHT: f32 = 6.0;
const BASE_THUMB_SIZE: f32 = 16.0;
const PAGE: i32 = 10;

pub(crate) struct Slider {
    value: Adjustment,
    x: i32,
    y: i32,
    width: u32,
    /// Height of the value text drawn above the track.
    text_height: u32,
    track_height: u32,
    thumb_size: u32,
    pointer: (i32, i32),
    dragging: bool,
    hovered: bool,
    focused: bool,
}

impl Slider {
    pub fn new(value: Adjustment, font: &Font, scale: f32) -> Self {
        Self::with_sizes(
            value,
            font.line_height().ceil() as u32,
            (BASE_TRACK_HEIGHT * scale).round() as u32,
            (BASE_THUMB_SIZE * scale).round() as u32,
        )
    }

    pub(crate) fn with_sizes(value: Adjustment, text_height: u32, track_height: u32, thumb_size: u32) -> Self {
        Self {
            value,
            x: 0,
            y: 0,
            width: thumb_size * 4,
            text_height,
            track_height,
            thumb_size,
            pointer: (0, 0),
            dragging: false,
            hovered: false,
            focused: false,
        }
    }

    pub fn value(&self) -> &Adjustment {
        &self.value
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width.max(self.thumb_size * 2);
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn thumb_y(&self) -> i32 {
        self.y + self.text_height as i32
    }

    fn thumb_x(&self) -> i32 {
        let travel = self.width.saturating_sub(self.thumb_size) as f32;
        self.x + (self.value.fraction() * travel).round() as i32
    }

    fn on_thumb(&self, px: i32, py: i32) -> bool {
        point_in_rect(px, py, self.thumb_x(), self.thumb_y(), self.thumb_size, self.thumb_size)
    }

    fn on_track(&self, px: i32, py: i32) -> bool {
        point_in_rect(px, py, self.x, self.thumb_y(), self.width, self.thumb_size)
    }

    /// Puts the thumb centre under `px`.
    fn drag_to(&mut self, px: i32) -> bool {
        let start = self.x + self.thumb_size as i32 / 2;
        let travel = self.width.saturating_sub(self.thumb_size);
        if travel == 0 {
            return false;
        }
        self.value.set_fraction((px - start) as f32 / travel as f32)
    }

    fn handle_key(&mut self, keysym: u32) -> bool {
        match keysym {
            keysym::LEFT => self.value.step(-1, false),
            keysym::RIGHT => self.value.step(1, false),
            keysym::PAGE_DOWN => self.value.step(-PAGE, false),
            keysym::PAGE_UP => self.value.step(PAGE, false),
            keysym::HOME => self.value.set(self.value.min()),
            keysym::END => self.value.set(self.value.max()),
            _ => false,
        }
    }
}

impl Widget for Slider {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.text_height + self.thumb_size
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
                self.pointer = (pos.x.into(), pos.y.into());
                let (px, py) = self.pointer;
                if self.dragging {
                    return self.drag_to(px);
                }
                let hovered = self.on_thumb(px, py);
                std::mem::replace(&mut self.hovered, hovered) != hovered
            }
            WindowEvent::ButtonPress(MouseButton::Left, _) => {
                let (px, py) = self.pointer;
                if self.on_thumb(px, py) {
                    self.dragging = true;
                    true
                } else if self.on_track(px, py) {
                    self.dragging = true;
                    self.drag_to(px);
                    true
                } else {
                    false
                }
            }
            WindowEvent::ButtonRelease(MouseButton::Left, _) => std::mem::take(&mut self.dragging),
            WindowEvent::Scroll(direction) if self.contains(self.pointer.0, self.pointer.1) => {
                match direction {
                    ScrollDirection::Up => self.value.step(1, false),
                    ScrollDirection::Down => self.value.step(-1, false),
                }
            }
            WindowEvent::KeyPress(key) if self.focused => self.handle_key(key.keysym),
            _ => false,
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let thumb = self.thumb_size as f32;
        let track_h = self.track_height as f32;
        let track_x = self.x as f32;
        let track_y = self.thumb_y() as f32 + ((thumb - track_h) / 2.0).round();
        let radius = track_h / 2.0;
        canvas.fill_rounded_rect(track_x, track_y, self.width as f32, track_h, radius, colors.progress_bg);

        let thumb_x = self.thumb_x();
        let fill = (thumb_x - self.x) as f32 + thumb / 2.0;
        if fill > 0.0 {
            canvas.fill_rounded_rect(
                track_x,
                track_y,
                fill.min(self.width as f32),
                track_h,
                radius,
                colors.progress_fill,
            );
        }
        let border = if self.focused { colors.input_border_focused } else { colors.progress_border };
        canvas.stroke_rounded_rect(track_x, track_y, self.width as f32, track_h, radius, border, 1.0);

        let thumb_color = if self.dragging {
            colors.button_pressed
        } else if self.hovered {
            colors.button_hover
        } else {
            colors.button
        };
        let ty = self.thumb_y() as f32;
        canvas.fill_rounded_rect(thumb_x as f32, ty, thumb, thumb, thumb / 2.0, thumb_color);
        canvas.stroke_rounded_rect(thumb_x as f32, ty, thumb, thumb, thumb / 2.0, colors.button_outline, 1.0);

        // The value rides above the thumb
        let text = self.value.value().to_string();
        let text_w = font.text_width(&text).ceil() as i32;
        let tx = (thumb_x + self.thumb_size as i32 / 2 - text_w / 2)
            .min(self.x + self.width as i32 - text_w)
            .max(self.x);
        font.render(&text)
            .with_color(colors.text)
            .with_align(Align::Left, text_w as f32)
            .draw(canvas, tx, self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CursorPos, KeyEvent, Modifiers};

    fn slider(min: i32, max: i32, value: i32) -> Slider {
        let mut s = Slider::with_sizes(Adjustment::new(min, max, value), 10, 4, 10);
        s.set_width(110);
        s.set_focus(true);
        s
    }

    fn move_to(s: &mut Slider, x: i16, y: i16) -> bool {
        s.process_event(&WindowEvent::CursorMove(CursorPos {
            x,
            y,
        }))
    }

    fn key(keysym: u32) -> WindowEvent {
        WindowEvent::KeyPress(KeyEvent {
            keysym,
            modifiers: Modifiers::empty(),
        })
    }

    #[test]
    fn keys_stop_at_the_bounds() {
        let mut s = slider(0, 100, 99);
        assert!(s.process_event(&key(keysym::RIGHT)));
        assert!(!s.process_event(&key(keysym::RIGHT)));
        assert!(s.process_event(&key(keysym::PAGE_DOWN)));
        assert_eq!(s.value().value(), 90);
        assert!(s.process_event(&key(keysym::HOME)));
        assert_eq!(s.value().value(), 0);
        s.set_focus(false);
        assert!(!s.process_event(&key(keysym::END)));
    }

    #[test]
    fn clicking_the_track_jumps_and_drags() {
        let mut s = slider(0, 100, 0);
        // the track spans 100 pixels of travel, thumb centres from 5 to 105
        move_to(&mut s, 55, 15);
        assert!(s.process_event(&WindowEvent::ButtonPress(MouseButton::Left, Modifiers::empty())));
        assert_eq!(s.value().value(), 50);
        assert!(move_to(&mut s, 80, 40));
        assert_eq!(s.value().value(), 75);
        assert!(move_to(&mut s, 500, 40));
        assert_eq!(s.value().value(), 100);
        assert!(s.process_event(&WindowEvent::ButtonRelease(MouseButton::Left, Modifiers::empty())));
        assert!(!move_to(&mut s, 5, 40));
        assert_eq!(s.value().value(), 100);
    }

    #[test]
    fn presses_above_the_track_miss() {
        let mut s = slider(0, 100, 0);
        move_to(&mut s, 55, 3);
        assert!(!s.process_event(&WindowEvent::ButtonPress(MouseButton::Left, Modifiers::empty())));
        assert_eq!(s.value().value(), 0);
    }
}
