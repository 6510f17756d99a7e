//! Numeric entry with step arrows.

use super::{Widget, darken, point_in_rect};
use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keysym},
    render::{Align, Canvas, Font},
    ui::Colors,
    values::Adjustment,
};

const RADIUS: f32 = 4.0;
const PADDING: i32 = 6;
const PAGE: i32 = 10;

/// An integer entry. Arrows, keys and the wheel step the value and wrap
/// around at the bounds; digits typed while focused replace it.
pub(crate) struct SpinButton {
    value: Adjustment,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    arrow_width: u32,
    pointer: (i32, i32),
    focused: bool,
    /// Digits typed since the entry took focus.
    typed: Option<String>,
}

impl SpinButton {
    /// Sized for the widest value plus room for the arrows.
    pub fn new(value: Adjustment, font: &Font) -> Self {
        let cell = font.cell_size();
        let digits = value.digits().max(2) as f32;
        let mut spin = Self::with_size(value, 0, (cell.ymult * 1.5).ceil() as u32);
        spin.arrow_width = (cell.xmult * 2.0).ceil() as u32;
        spin.width = ((digits + 2.0) * cell.xmult).ceil() as u32 + spin.arrow_width;
        spin
    }

    /// Arrows take the right `height` pixels (square) of `width`.
    pub(crate) fn with_size(value: Adjustment, width: u32, height: u32) -> Self {
        Self {
            value,
            x: 0,
            y: 0,
            width: width.max(height),
            height,
            arrow_width: height,
            pointer: (0, 0),
            focused: false,
            typed: None,
        }
    }

    pub fn value(&self) -> i32 {
        self.value.value()
    }

    pub fn adjustment(&self) -> &Adjustment {
        &self.value
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
        self.typed = None;
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    fn step(&mut self, delta: i32) -> bool {
        self.typed = None;
        self.value.step(delta, true)
    }

    fn type_char(&mut self, c: char) -> bool {
        let typed = self.typed.get_or_insert_with(String::new);
        match c {
            '0'..='9' => typed.push(c),
            '-' if typed.is_empty() && self.value.min() < 0 => typed.push(c),
            _ => return false,
        }
        if let Ok(n) = typed.parse::<i32>() {
            self.value.set(n);
        }
        true
    }

    fn erase(&mut self) -> bool {
        let Some(typed) = self.typed.as_mut() else {
            return false;
        };
        typed.pop();
        if let Ok(n) = typed.parse::<i32>() {
            self.value.set(n);
        }
        true
    }

    /// Which arrow, if any, sits under `(px, py)`: `1` up, `-1` down.
    fn arrow_at(&self, px: i32, py: i32) -> Option<i32> {
        let ax = self.x + (self.width - self.arrow_width) as i32;
        if !point_in_rect(px, py, ax, self.y, self.arrow_width, self.height) {
            return None;
        }
        Some(if py < self.y + self.height as i32 / 2 { 1 } else { -1 })
    }
}

impl Widget for SpinButton {
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
                self.pointer = (pos.x.into(), pos.y.into());
                false
            }
            WindowEvent::ButtonPress(MouseButton::Left, _) => {
                let (px, py) = self.pointer;
                match self.arrow_at(px, py) {
                    Some(delta) => self.step(delta),
                    None => false,
                }
            }
            WindowEvent::Scroll(direction) if self.contains(self.pointer.0, self.pointer.1) => {
                match direction {
                    ScrollDirection::Up => self.step(1),
                    ScrollDirection::Down => self.step(-1),
                }
            }
            WindowEvent::KeyPress(key) if self.focused => {
                match key.keysym {
                    keysym::UP => self.step(1),
                    keysym::DOWN => self.step(-1),
                    keysym::PAGE_UP => self.step(PAGE),
                    keysym::PAGE_DOWN => self.step(-PAGE),
                    keysym::HOME => {
                        self.typed = None;
                        self.value.set(self.value.min())
                    }
                    keysym::END => {
                        self.typed = None;
                        self.value.set(self.value.max())
                    }
                    keysym::BACKSPACE => self.erase(),
                    _ => false,
                }
            }
            WindowEvent::TextInput(c) if self.focused => self.type_char(*c),
            _ => false,
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let (x, y, w, h) = (self.x as f32, self.y as f32, self.width as f32, self.height as f32);
        let (bg, border) = if self.focused {
            (colors.input_bg_focused, colors.input_border_focused)
        } else {
            (colors.input_bg, colors.input_border)
        };
        canvas.fill_rounded_rect(x, y, w, h, RADIUS, bg);

        let aw = self.arrow_width as f32;
        let ax = x + w - aw;
        canvas.fill_rect(ax, y + 1.0, aw - 1.0, h - 2.0, darken(colors.button, 0.02));
        canvas.hline(ax, y + (h / 2.0).round(), aw, colors.input_border);
        let half = (h / 2.0).round();
        let arrow_y = |top: f32| top + ((half - font.line_height()) / 2.0).round();
        font.render("+")
            .with_color(colors.button_text)
            .with_align(Align::Center, aw)
            .draw(canvas, ax as i32, arrow_y(y) as i32);
        font.render("-")
            .with_color(colors.button_text)
            .with_align(Align::Center, aw)
            .draw(canvas, ax as i32, arrow_y(y + half) as i32);

        let text = match &self.typed {
            Some(typed) if !typed.is_empty() => typed.clone(),
            _ => self.value().to_string(),
        };
        let text_w = (self.width - self.arrow_width) as i32 - 2 * PADDING;
        font.render(&text)
            .with_color(colors.text)
            .with_align(Align::Right, text_w.max(0) as f32)
            .with_clip(self.x, self.y, self.width - self.arrow_width, self.height)
            .draw(canvas, self.x + PADDING, self.y + ((h - font.line_height()) / 2.0).round() as i32);

        canvas.stroke_rounded_rect(x, y, w, h, RADIUS, border, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CursorPos, KeyEvent, Modifiers};

    fn spin(min: i32, max: i32, value: i32) -> SpinButton {
        let mut s = SpinButton::with_size(Adjustment::new(min, max, value), 60, 20);
        s.set_focus(true);
        s
    }

    fn key(keysym: u32) -> WindowEvent {
        WindowEvent::KeyPress(KeyEvent {
            keysym,
            modifiers: Modifiers::empty(),
        })
    }

    #[test]
    fn keys_step_and_wrap() {
        let mut s = spin(0, 59, 58);
        assert!(s.process_event(&key(keysym::UP)));
        assert!(s.process_event(&key(keysym::UP)));
        assert_eq!(s.value(), 0);
        assert!(s.process_event(&key(keysym::DOWN)));
        assert_eq!(s.value(), 59);
        assert!(s.process_event(&key(keysym::HOME)));
        assert_eq!(s.value(), 0);
        assert!(s.process_event(&key(keysym::PAGE_DOWN)));
        assert_eq!(s.value(), 59);
    }

    #[test]
    fn typed_digits_replace_the_value() {
        let mut s = spin(0, 23, 12);
        assert!(s.process_event(&WindowEvent::TextInput('7')));
        assert_eq!(s.value(), 7);
        assert!(s.process_event(&WindowEvent::TextInput('9')));
        assert_eq!(s.value(), 23);
        assert!(s.process_event(&key(keysym::BACKSPACE)));
        assert_eq!(s.value(), 7);
        assert!(!s.process_event(&WindowEvent::TextInput('x')));
        assert!(!s.process_event(&WindowEvent::TextInput('-')));
    }

    #[test]
    fn arrows_under_the_pointer() {
        let mut s = spin(0, 10, 5);
        s.set_focus(false);
        s.process_event(&WindowEvent::CursorMove(CursorPos {
            x: 50,
            y: 3,
        }));
        assert!(s.process_event(&WindowEvent::ButtonPress(MouseButton::Left, Modifiers::empty())));
        assert_eq!(s.value(), 6);
        s.process_event(&WindowEvent::CursorMove(CursorPos {
            x: 50,
            y: 15,
        }));
        s.process_event(&WindowEvent::ButtonPress(MouseButton::Left, Modifiers::empty()));
        s.process_event(&WindowEvent::Scroll(ScrollDirection::Down));
        assert_eq!(s.value(), 4);
        assert!(!s.process_event(&key(keysym::UP)));
    }
}
