//! Text input widget for single-line text entry.

use super::{Widget, point_in_rect};
use crate::{
    backend::{Modifiers, MouseButton, WindowEvent, keysym},
    render::{Canvas, Font},
    ui::Colors,
};

const INPUT_RADIUS: f32 = 5.0;
const INPUT_PADDING: i32 = 6;
const MASK_CHAR: char = '*';

/// A single-line text input widget.
pub(crate) struct TextInput {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    text: String,
    cursor_pos: usize,
    focused: bool,
    masked: bool,
    submitted: bool,
}

impl TextInput {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
            text: String::new(),
            cursor_pos: 0,
            focused: false,
            masked: false,
            submitted: false,
        }
    }

    pub fn with_default_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self.cursor_pos = self.char_count();
        self
    }

    /// Replaces the text and puts the cursor at its end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor_pos = self.char_count();
    }

    /// Shows every character as an asterisk.
    pub fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    /// Returns the current text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if Enter was pressed.
    pub fn was_submitted(&mut self) -> bool {
        std::mem::take(&mut self.submitted)
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    fn display_text(&self) -> String {
        if self.masked {
            std::iter::repeat_n(MASK_CHAR, self.char_count()).collect()
        } else {
            self.text.clone()
        }
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_position(&self, char_pos: usize) -> usize {
        self.text.char_indices().nth(char_pos).map(|(i, _)| i).unwrap_or(self.text.len())
    }

    fn insert_char(&mut self, c: char) {
        let byte_pos = self.byte_position(self.cursor_pos);
        self.text.insert(byte_pos, c);
        self.cursor_pos += 1;
    }

    fn delete_before(&mut self) {
        if self.cursor_pos > 0 {
            let start = self.byte_position(self.cursor_pos - 1);
            let end = self.byte_position(self.cursor_pos);
            self.text.drain(start..end);
            self.cursor_pos -= 1;
        }
    }

    fn delete_after(&mut self) {
        if self.cursor_pos < self.char_count() {
            let start = self.byte_position(self.cursor_pos);
            let end = self.byte_position(self.cursor_pos + 1);
            self.text.drain(start..end);
        }
    }

    fn handle_key(&mut self, key: u32, modifiers: Modifiers) -> bool {
        match key {
            keysym::BACKSPACE => self.delete_before(),
            keysym::DELETE => self.delete_after(),
            keysym::LEFT if modifiers.contains(Modifiers::CTRL) => self.cursor_pos = 0,
            keysym::LEFT => self.cursor_pos = self.cursor_pos.saturating_sub(1),
            keysym::RIGHT if modifiers.contains(Modifiers::CTRL) => {
                self.cursor_pos = self.char_count();
            }
            keysym::RIGHT => self.cursor_pos = (self.cursor_pos + 1).min(self.char_count()),
            keysym::HOME => self.cursor_pos = 0,
            keysym::END => self.cursor_pos = self.char_count(),
            keysym::RETURN | keysym::KP_ENTER => self.submitted = true,
            _ => return false,
        }
        true
    }
}

impl Widget for TextInput {
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
            WindowEvent::ButtonPress(MouseButton::Left, _) => false,
            WindowEvent::TextInput(c) if self.focused => {
                self.insert_char(*c);
                true
            }
            WindowEvent::KeyPress(key) if self.focused => {
                self.handle_key(key.keysym, key.modifiers)
            }
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
        canvas.fill_rounded_rect(x, y, w, h, INPUT_RADIUS, bg);
        canvas.stroke_rounded_rect(x, y, w, h, INPUT_RADIUS, border, 1.0);

        let display = self.display_text();
        let before: String = display.chars().take(self.cursor_pos).collect();
        let cursor_offset = font.text_width(&before).round() as i32;

        // Scroll left far enough to keep the cursor in view
        let room = self.width as i32 - 2 * INPUT_PADDING;
        let scroll = (cursor_offset - room + 1).max(0);
        let text_x = self.x + INPUT_PADDING - scroll;
        let text_y = self.y + ((h - font.line_height()) / 2.0).round() as i32;

        if !display.is_empty() {
            font.render(&display)
                .with_color(colors.text)
                .with_clip(self.x + INPUT_PADDING, self.y, room.max(0) as u32, self.height)
                .draw(canvas, text_x, text_y);
        }

        if self.focused {
            canvas.fill_rect(
                (text_x + cursor_offset) as f32,
                text_y as f32,
                1.0,
                font.line_height(),
                colors.text,
            );
        }
    }
}

impl TextInput {
    /// Focuses the entry when the press lands inside it and blurs it
    /// otherwise. Returns whether the focus changed.
    pub fn focus_on_press(&mut self, px: i32, py: i32) -> bool {
        let inside = point_in_rect(px, py, self.x, self.y, self.width, self.height);
        std::mem::replace(&mut self.focused, inside) != inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::KeyEvent;

    fn key(keysym: u32) -> WindowEvent {
        WindowEvent::KeyPress(KeyEvent {
            keysym,
            modifiers: Modifiers::empty(),
        })
    }

    #[test]
    fn typing_and_editing() {
        let mut input = TextInput::new(100, 20).with_default_text("héllo");
        assert!(!input.process_event(&WindowEvent::TextInput('x')));

        input.set_focus(true);
        input.process_event(&key(keysym::BACKSPACE));
        input.process_event(&key(keysym::HOME));
        input.process_event(&WindowEvent::TextInput('>'));
        input.process_event(&key(keysym::DELETE));
        assert_eq!(input.text(), ">éll");

        input.process_event(&key(keysym::END));
        input.process_event(&WindowEvent::TextInput('!'));
        assert_eq!(input.text(), ">éll!");
    }

    #[test]
    fn return_submits_once() {
        let mut input = TextInput::new(100, 20);
        input.set_focus(true);
        assert!(input.process_event(&key(keysym::KP_ENTER)));
        assert!(input.was_submitted());
        assert!(!input.was_submitted());
    }

    #[test]
    fn set_text_moves_the_cursor_to_the_end() {
        let mut input = TextInput::new(100, 20).with_default_text("old");
        input.set_focus(true);
        input.set_text("pear");
        input.process_event(&WindowEvent::TextInput('s'));
        assert_eq!(input.text(), "pears");
    }

    #[test]
    fn masking_hides_every_character() {
        let mut input = TextInput::new(100, 20).with_default_text("abc");
        input.set_masked(true);
        assert_eq!(input.display_text(), "***");
        assert_eq!(input.text(), "abc");
    }

    #[test]
    fn press_moves_focus() {
        let mut input = TextInput::new(100, 20);
        input.set_position(10, 10);
        assert!(input.focus_on_press(20, 15));
        assert!(input.has_focus());
        assert!(!input.focus_on_press(30, 15));
        assert!(input.focus_on_press(200, 15));
        assert!(!input.has_focus());
    }
}
