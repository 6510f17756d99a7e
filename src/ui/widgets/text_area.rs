//! Multi-line text editor used by the edit box.

use super::{
    Widget,
    scrollbar::{Scroll, WHEEL_STEP},
};
use crate::{
    backend::{Modifiers, MouseButton, ScrollDirection, WindowEvent, keysym},
    render::{Canvas, Font},
    ui::Colors,
};

const PADDING: i32 = 4;
const RADIUS: f32 = 4.0;

pub(crate) struct TextArea {
    lines: Vec<String>,
    /// Line and character of the insertion point.
    row: usize,
    col: usize,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    line_height: f32,
    /// Average advance, used to place the cursor under a click.
    char_width: f32,
    scale: f32,
    scroll: Scroll,
    pointer: (i32, i32),
    focused: bool,
}

impl TextArea {
    pub fn new(font: &Font, scale: f32) -> Self {
        Self::with_metrics(font.line_height().ceil(), font.cell_size().xmult, scale)
    }

    pub(crate) fn with_metrics(line_height: f32, char_width: f32, scale: f32) -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            line_height,
            char_width,
            scale,
            scroll: Scroll {
                offset: 0,
                total: 1,
                visible: 0,
            },
            pointer: (0, 0),
            focused: true,
        }
    }

    /// Replaces the buffer and puts the cursor at its start.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.row = 0;
        self.col = 0;
        self.scroll.set_total(self.lines.len());
        self.scroll.to_start();
    }

    /// The buffer exactly as edited.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Longest line in characters.
    pub fn columns(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let inner = (height as f32 - 2.0 * PADDING as f32).max(0.0);
        let visible = if self.line_height > 0.0 { (inner / self.line_height) as usize } else { 0 };
        self.scroll.set_visible(visible.max(1));
        self.scroll.reveal(self.row);
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    fn byte_at(&self, row: usize, col: usize) -> usize {
        let line = &self.lines[row];
        line.char_indices().nth(col).map_or(line.len(), |(i, _)| i)
    }

    fn moved(&mut self, row: usize, col: usize) -> bool {
        let row = row.min(self.lines.len() - 1);
        let col = col.min(self.line_len(row));
        let changed = (row, col) != (self.row, self.col);
        self.row = row;
        self.col = col;
        self.scroll.reveal(row);
        changed
    }

    fn edited(&mut self) -> bool {
        self.scroll.set_total(self.lines.len());
        self.scroll.reveal(self.row);
        true
    }

    fn insert_char(&mut self, c: char) -> bool {
        let at = self.byte_at(self.row, self.col);
        self.lines[self.row].insert(at, c);
        self.col += 1;
        self.edited()
    }

    fn newline(&mut self) -> bool {
        let at = self.byte_at(self.row, self.col);
        let rest = self.lines[self.row].split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
        self.edited()
    }

    fn delete_before(&mut self) -> bool {
        if self.col > 0 {
            let start = self.byte_at(self.row, self.col - 1);
            let end = self.byte_at(self.row, self.col);
            self.lines[self.row].drain(start..end);
            self.col -= 1;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
        } else {
            return false;
        }
        self.edited()
    }

    fn delete_after(&mut self) -> bool {
        if self.col < self.line_len(self.row) {
            let start = self.byte_at(self.row, self.col);
            let end = self.byte_at(self.row, self.col + 1);
            self.lines[self.row].drain(start..end);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        } else {
            return false;
        }
        self.edited()
    }

    fn handle_key(&mut self, keysym: u32, modifiers: Modifiers) -> bool {
        let ctrl = modifiers.contains(Modifiers::CTRL);
        let page = self.scroll.visible.max(1);
        let (row, col) = (self.row, self.col);
        match keysym {
            keysym::RETURN | keysym::KP_ENTER => self.newline(),
            keysym::BACKSPACE => self.delete_before(),
            keysym::DELETE => self.delete_after(),
            keysym::LEFT if col == 0 && row > 0 => self.moved(row - 1, self.line_len(row - 1)),
            keysym::LEFT => self.moved(row, col.saturating_sub(1)),
            keysym::RIGHT if col == self.line_len(row) => self.moved(row + 1, 0),
            keysym::RIGHT => self.moved(row, col + 1),
            keysym::UP => self.moved(row.saturating_sub(1), col),
            keysym::DOWN => self.moved(row + 1, col),
            keysym::PAGE_UP => self.moved(row.saturating_sub(page), col),
            keysym::PAGE_DOWN => self.moved(row + page, col),
            keysym::HOME if ctrl => self.moved(0, 0),
            keysym::END if ctrl => self.moved(usize::MAX, usize::MAX),
            keysym::HOME => self.moved(row, 0),
            keysym::END => self.moved(row, usize::MAX),
            _ => false,
        }
    }

    fn click(&mut self, px: i32, py: i32) -> bool {
        if !self.contains(px, py) || self.line_height <= 0.0 {
            return false;
        }
        let rel_y = (py - self.y - PADDING).max(0) as f32;
        let row = self.scroll.offset + (rel_y / self.line_height) as usize;
        let rel_x = (px - self.x - PADDING).max(0) as f32;
        let col = if self.char_width > 0.0 { (rel_x / self.char_width).round() as usize } else { 0 };
        self.moved(row, col);
        true
    }
}

impl Widget for TextArea {
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
            WindowEvent::ButtonPress(MouseButton::Left, _) => self.click(self.pointer.0, self.pointer.1),
            WindowEvent::Scroll(direction) if self.contains(self.pointer.0, self.pointer.1) => {
                let delta = match direction {
                    ScrollDirection::Up => -(WHEEL_STEP as isize),
                    ScrollDirection::Down => WHEEL_STEP as isize,
                };
                self.scroll.scroll_by(delta)
            }
            WindowEvent::KeyPress(key) if self.focused => self.handle_key(key.keysym, key.modifiers),
            WindowEvent::TextInput(c) if self.focused && !c.is_control() => self.insert_char(*c),
            _ => false,
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let (x, y, w, h) = (self.x as f32, self.y as f32, self.width as f32, self.height as f32);
        let border = if self.focused { colors.input_border_focused } else { colors.input_border };
        canvas.fill_rounded_rect(x, y, w, h, RADIUS, colors.input_bg);

        let clip_w = (self.width as i32 - 2 * PADDING).max(0) as u32;
        let clip_h = (self.height as i32 - 2 * PADDING).max(0) as u32;
        let (clip_x, clip_y) = (self.x + PADDING, self.y + PADDING);

        // Shift left far enough to keep the cursor in view
        let before: String = self.lines[self.row].chars().take(self.col).collect();
        let cursor_offset = font.text_width(&before).round() as i32;
        let shift = (cursor_offset - clip_w as i32 + 1).max(0);

        let shown = self.lines.iter().enumerate().skip(self.scroll.offset).take(self.scroll.visible);
        for (vi, (ri, line)) in shown.enumerate() {
            let ly = clip_y + (vi as f32 * self.line_height) as i32;
            if !line.is_empty() {
                font.render(line)
                    .with_color(colors.text)
                    .with_clip(clip_x, clip_y, clip_w, clip_h)
                    .draw(canvas, clip_x - shift, ly);
            }
            if self.focused && ri == self.row {
                canvas.fill_rect(
                    (clip_x - shift + cursor_offset) as f32,
                    ly as f32,
                    1.0,
                    self.line_height,
                    colors.text,
                );
            }
        }

        self.scroll.draw(canvas, colors, x + w, clip_y as f32, clip_h as f32, self.scale);
        canvas.stroke_rounded_rect(x, y, w, h, RADIUS, border, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CursorPos, KeyEvent};

    fn area(text: &str) -> TextArea {
        let mut area = TextArea::with_metrics(10.0, 8.0, 1.0);
        area.set_text(text);
        area.set_size(200, 3 * 10 + 2 * PADDING as u32);
        area
    }

    fn key(keysym: u32) -> WindowEvent {
        WindowEvent::KeyPress(KeyEvent {
            keysym,
            modifiers: Modifiers::empty(),
        })
    }

    fn type_str(area: &mut TextArea, text: &str) {
        for c in text.chars() {
            area.process_event(&WindowEvent::TextInput(c));
        }
    }

    #[test]
    fn text_round_trips_with_its_final_newline() {
        assert_eq!(area("one\ntwo\n").text(), "one\ntwo\n");
        assert_eq!(area("").text(), "");
        assert_eq!(area("a\n\nb").line_count(), 3);
    }

    #[test]
    fn return_splits_and_backspace_joins() {
        let mut a = area("hello");
        a.process_event(&key(keysym::END));
        a.process_event(&key(keysym::LEFT));
        a.process_event(&key(keysym::LEFT));
        assert!(a.process_event(&key(keysym::RETURN)));
        assert_eq!(a.text(), "hel\nlo");
        type_str(&mut a, "é");
        assert_eq!(a.text(), "hel\nélo");
        a.process_event(&key(keysym::HOME));
        assert!(a.process_event(&key(keysym::BACKSPACE)));
        assert_eq!(a.text(), "helélo");
        assert!(a.process_event(&key(keysym::DELETE)));
        assert_eq!(a.text(), "hello");
    }

    #[test]
    fn cursor_stays_inside_the_buffer() {
        let mut a = area("long line\nab\nxyz\nlast");
        a.process_event(&key(keysym::END));
        a.process_event(&key(keysym::DOWN));
        assert_eq!((a.row, a.col), (1, 2));
        assert!(a.process_event(&key(keysym::RIGHT)));
        assert_eq!((a.row, a.col), (2, 0));
        assert!(a.handle_key(keysym::END, Modifiers::CTRL));
        assert_eq!((a.row, a.col), (3, 4));
        assert_eq!(a.scroll.offset, 1);
        assert!(!a.process_event(&key(keysym::DOWN)));
        assert!(a.handle_key(keysym::HOME, Modifiers::CTRL));
        assert!(!a.process_event(&key(keysym::BACKSPACE)));
    }

    #[test]
    fn clicks_place_the_cursor() {
        let mut a = area("abcdef\nxy");
        a.process_event(&WindowEvent::CursorMove(CursorPos {
            x: (PADDING + 24) as i16,
            y: (PADDING + 15) as i16,
        }));
        assert!(a.process_event(&WindowEvent::ButtonPress(MouseButton::Left, Modifiers::empty())));
        assert_eq!((a.row, a.col), (1, 2));
        assert!(!a.process_event(&WindowEvent::TextInput('\u{8}')));
    }
}
