//! Read-only scrolling text area used by the tail, log and text boxes.

use super::{
    Widget,
    scrollbar::{Scroll, WHEEL_STEP},
};
use crate::{
    backend::{KeyEvent, ScrollDirection, WindowEvent, keysym},
    render::{Canvas, Font, Rgba},
    ui::Colors,
};

const TAB_STOP: usize = 8;
const PADDING: i32 = 4;
const RADIUS: f32 = 4.0;

/// One line of the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TextRow {
    pub text: String,
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
    /// Drawn in its own column left of the text.
    pub stamp: Option<String>,
}

impl TextRow {
    pub fn plain(text: &str) -> Self {
        Self {
            text: expand_tabs(text),
            ..Default::default()
        }
    }
}

pub(crate) struct TextView {
    rows: Vec<TextRow>,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    line_height: f32,
    scale: f32,
    scroll: Scroll,
}

impl TextView {
    pub fn new(font: &Font, scale: f32) -> Self {
        Self::with_line_height(font.line_height().ceil(), scale)
    }

    pub(crate) fn with_line_height(line_height: f32, scale: f32) -> Self {
        Self {
            rows: vec![TextRow::default()],
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            line_height,
            scale,
            scroll: Scroll::default(),
        }
    }

    /// Replaces the contents.
    pub fn set_text(&mut self, text: &str) {
        self.rows = text.split('\n').map(TextRow::plain).collect();
        if text.ends_with('\n') {
            self.rows.pop();
        }
        if self.rows.is_empty() {
            self.rows.push(TextRow::default());
        }
        self.scroll.set_total(self.rows.len());
        self.scroll.to_start();
    }

    /// Appends raw text at the end, following the tail if the view was
    /// scrolled to the bottom.
    pub fn append_text(&mut self, text: &str) {
        let follow = self.scroll.at_end();
        let mut parts = text.split('\n');
        if let (Some(first), Some(last)) = (parts.next(), self.rows.last_mut()) {
            last.text.push_str(&expand_tabs(first));
        }
        self.rows.extend(parts.map(TextRow::plain));
        self.scroll.set_total(self.rows.len());
        if follow {
            self.scroll.to_end();
        }
    }

    /// Adds a complete row at the bottom, or at the top with `reverse`.
    pub fn push_row(&mut self, mut row: TextRow, reverse: bool) {
        row.text = expand_tabs(&row.text);
        // The view starts with one empty row to type into
        if self.rows.len() == 1 && self.rows[0] == TextRow::default() {
            self.rows.clear();
        }
        if reverse {
            self.rows.insert(0, row);
            self.scroll.set_total(self.rows.len());
            self.scroll.to_start();
        } else {
            let follow = self.scroll.at_end();
            self.rows.push(row);
            self.scroll.set_total(self.rows.len());
            if follow {
                self.scroll.to_end();
            }
        }
    }

    /// Everything shown, one row per line.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let rows = match self.rows.split_last() {
            Some((last, rest)) if *last == TextRow::default() => rest,
            _ => &self.rows[..],
        };
        for row in rows {
            if let Some(stamp) = &row.stamp {
                out.push_str(stamp);
                out.push(' ');
            }
            out.push_str(&row.text);
            out.push('\n');
        }
        out
    }

    pub fn rows(&self) -> &[TextRow] {
        &self.rows
    }

    /// Widest row, in character columns.
    pub fn columns(&self) -> usize {
        self.rows.iter().map(|r| r.text.chars().count()).max().unwrap_or(0)
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let visible = ((height as i32 - 2 * PADDING).max(0) as f32 / self.line_height) as usize;
        self.scroll.set_visible(visible.max(1));
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let page = self.scroll.visible.max(1) as isize;
        match key.keysym {
            keysym::UP => self.scroll.scroll_by(-1),
            keysym::DOWN => self.scroll.scroll_by(1),
            keysym::PAGE_UP => self.scroll.scroll_by(-page),
            keysym::PAGE_DOWN => self.scroll.scroll_by(page),
            keysym::HOME => self.scroll.to_start(),
            keysym::END => self.scroll.to_end(),
            _ => false,
        }
    }
}

impl Widget for TextView {
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
            WindowEvent::Scroll(ScrollDirection::Up) => {
                self.scroll.scroll_by(-(WHEEL_STEP as isize))
            }
            WindowEvent::Scroll(ScrollDirection::Down) => self.scroll.scroll_by(WHEEL_STEP as isize),
            WindowEvent::KeyPress(key) => self.handle_key(key),
            _ => false,
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let (x, y, w, h) = (self.x as f32, self.y as f32, self.width as f32, self.height as f32);
        canvas.fill_rounded_rect(x, y, w, h, RADIUS, colors.input_bg);

        let clip_w = (self.width as i32 - 2 * PADDING).max(0) as u32;
        let clip_h = (self.height as i32 - 2 * PADDING).max(0) as u32;
        let stamp_w = self
            .rows
            .iter()
            .filter_map(|r| r.stamp.as_deref())
            .map(|s| font.text_width(s))
            .fold(0.0, f32::max);
        let stamp_w = if stamp_w > 0.0 { (stamp_w + font.cell_size().xmult).ceil() as i32 } else { 0 };

        let visible = self.rows.iter().skip(self.scroll.offset).take(self.scroll.visible);
        for (i, row) in visible.enumerate() {
            let row_y = self.y + PADDING + (i as f32 * self.line_height) as i32;
            let text_x = self.x + PADDING + stamp_w;
            if let Some(bg) = row.bg {
                canvas.fill_rect(
                    text_x as f32,
                    row_y as f32,
                    (clip_w as i32 - stamp_w).max(0) as f32,
                    self.line_height,
                    bg,
                );
            }
            if let Some(stamp) = &row.stamp {
                font.render(stamp)
                    .with_color(colors.input_placeholder)
                    .with_clip(self.x + PADDING, self.y + PADDING, clip_w, clip_h)
                    .draw(canvas, self.x + PADDING, row_y);
            }
            font.render(&row.text)
                .with_color(row.fg.unwrap_or(colors.text))
                .with_clip(self.x + PADDING, self.y + PADDING, clip_w, clip_h)
                .draw(canvas, text_x, row_y);
        }

        self.scroll.draw(canvas, colors, x + w, y + PADDING as f32, clip_h as f32, self.scale);
        canvas.stroke_rounded_rect(x, y, w, h, RADIUS, colors.input_border, 1.0);
    }
}

/// Replaces tabs with spaces up to the next multiple of eight columns.
pub(crate) fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_STOP);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_STOP - column % TAB_STOP;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> TextView {
        TextView::with_line_height(10.0, 1.0)
    }

    #[test]
    fn tabs_expand_to_the_next_stop() {
        assert_eq!(expand_tabs("a\tb"), "a       b");
        assert_eq!(expand_tabs("\t"), "        ");
        assert_eq!(expand_tabs("12345678\tx"), "12345678        x");
    }

    #[test]
    fn appended_text_continues_the_last_line() {
        let mut v = view();
        v.append_text("one\ntw");
        v.append_text("o\nthree");
        assert_eq!(v.text(), "one\ntwo\nthree\n");
        assert_eq!(v.columns(), 5);
    }

    #[test]
    fn tail_is_followed_only_from_the_bottom() {
        let mut v = view();
        v.set_size(100, 2 * PADDING as u32 + 20);
        for i in 0..5 {
            v.append_text(&format!("line {i}\n"));
        }
        assert!(v.scroll.at_end());
        assert_eq!(v.scroll.offset, 4);

        v.scroll.to_start();
        v.append_text("more\n");
        assert_eq!(v.scroll.offset, 0);
    }

    #[test]
    fn rows_go_on_top_in_reverse() {
        let mut v = view();
        v.push_row(TextRow::plain("first"), true);
        v.push_row(
            TextRow {
                text: "second".to_string(),
                stamp: Some("12:00:00".to_string()),
                ..Default::default()
            },
            true,
        );
        assert_eq!(v.text(), "12:00:00 second\nfirst\n");
    }

    #[test]
    fn set_text_drops_the_final_newline() {
        let mut v = view();
        v.set_text("a\nb\n");
        assert_eq!(v.rows().len(), 2);
        v.set_text("");
        assert_eq!(v.rows().len(), 1);
    }
}
