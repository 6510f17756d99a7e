//! Combo box: an entry over a list of choices.

use std::time::Instant;

use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keysym},
    error::Error,
    render::{Canvas, Font, rgb},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Body, BodyEvent, Context, Dialog, FrameSpec, Rect},
        input::entries_line,
        list::DOUBLE_CLICK,
        widgets::{
            Widget, darken,
            scrollbar::{Scroll, WHEEL_STEP},
            text_input::TextInput,
        },
    },
};

const PADDING: i32 = 6;
const RADIUS: f32 = 5.0;
const MAX_ROWS: usize = 8;
const MIN_COLUMNS: f32 = 30.0;

/// The choices with `default_item`, when given, put first.
fn choices(mut entries: Vec<String>, default_item: Option<&str>) -> Vec<String> {
    if let Some(item) = default_item {
        entries.insert(0, item.to_string());
    }
    entries
}

struct ComboBody {
    input: TextInput,
    entries: Vec<String>,
    /// Typing goes to the entry only when it is editable.
    editable: bool,
    cursor: usize,
    hovered: Option<usize>,
    last_press: Option<(usize, Instant)>,
    scroll: Scroll,
    list: Rect,
    gap: u32,
    row_height: u32,
    line_height: u32,
    scale: f32,
    hint: (u32, u32),
}

impl ComboBody {
    fn new(ctx: &Context<'_>, entries: Vec<String>) -> Self {
        let font = &ctx.font;
        let cell = ctx.metrics.cell;
        let options = ctx.options;
        let line_height = font.line_height().ceil();
        let row_height = (line_height + 4.0).round() as u32;
        let entries = choices(entries, options.default_item.as_deref());
        let input = TextInput::new(0, (cell.ymult * 1.5).round() as u32);

        let widest = entries.iter().map(|e| font.text_width(e).ceil() as u32).max().unwrap_or(0);
        let rows = entries.len().clamp(1, MAX_ROWS) as u32;
        let gap = (cell.ymult / 4.0).round() as u32;
        let width = (widest + 2 * PADDING as u32 + (12.0 * ctx.scale()) as u32)
            .max((MIN_COLUMNS * cell.xmult).round() as u32);
        let height = input.height() + gap + rows * row_height + 2 * PADDING as u32;

        let mut body = Self::with_layout(input, entries, options.editable, row_height, line_height as u32);
        body.gap = gap;
        body.scale = ctx.scale();
        body.hint = (width, height);
        body
    }

    fn with_layout(
        mut input: TextInput,
        entries: Vec<String>,
        editable: bool,
        row_height: u32,
        line_height: u32,
    ) -> Self {
        if let Some(first) = entries.first() {
            input.set_text(first);
        }
        input.set_focus(editable);
        let scroll = Scroll {
            offset: 0,
            total: entries.len(),
            visible: 0,
        };
        Self {
            input,
            entries,
            editable,
            cursor: 0,
            hovered: None,
            last_press: None,
            scroll,
            list: Rect::default(),
            gap: 0,
            row_height,
            line_height,
            scale: 1.0,
            hint: (0, 0),
        }
    }

    /// Makes `row` current and copies it into the entry.
    fn choose(&mut self, row: usize) -> bool {
        let Some(entry) = self.entries.get(row) else {
            return false;
        };
        let changed = self.cursor != row || self.input.text() != entry.as_str();
        self.input.set_text(entry);
        self.cursor = row;
        self.scroll.reveal(row);
        changed
    }

    fn step(&mut self, delta: isize) -> bool {
        let last = self.entries.len().saturating_sub(1);
        let target = self.cursor.saturating_add_signed(delta).min(last);
        self.choose(target)
    }

    fn row_at(&self, px: i32, py: i32) -> Option<usize> {
        if !self.list.contains(px, py) || self.row_height == 0 {
            return None;
        }
        let rel = py - self.list.y - PADDING;
        if rel < 0 {
            return None;
        }
        let row = self.scroll.offset + rel as usize / self.row_height as usize;
        (row < self.entries.len() && row < self.scroll.offset + self.scroll.visible).then_some(row)
    }

    fn press(&mut self, row: usize, now: Instant) -> BodyEvent {
        let double = matches!(
            self.last_press,
            Some((r, at)) if r == row && now.duration_since(at) < DOUBLE_CLICK
        );
        if double {
            self.last_press = None;
            self.choose(row);
            return BodyEvent::Activate;
        }
        self.last_press = Some((row, now));
        self.choose(row);
        BodyEvent::Redraw
    }

    fn text(&self) -> &str {
        self.input.text()
    }
}

impl Body for ComboBody {
    fn size_hint(&self) -> (u32, u32) {
        self.hint
    }

    fn set_rect(&mut self, rect: Rect) {
        self.input.set_position(rect.x, rect.y);
        self.input.set_width(rect.w);
        let top = self.input.height() + self.gap;
        self.list = Rect {
            x: rect.x,
            y: rect.y + top as i32,
            w: rect.w,
            h: rect.h.saturating_sub(top),
        };
        let inner = (self.list.h as i32 - 2 * PADDING).max(0) as u32;
        let visible = if self.row_height > 0 { (inner / self.row_height) as usize } else { 0 };
        self.scroll.set_visible(visible.max(1));
        self.scroll.reveal(self.cursor);
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        self.input.draw(canvas, colors, font);

        let list = self.list;
        let (x, y, w, h) = (list.x as f32, list.y as f32, list.w as f32, list.h as f32);
        canvas.fill_rounded_rect(x, y, w, h, RADIUS, colors.input_bg);
        let clip_w = (list.w as i32 - 2 * PADDING).max(0) as u32;
        let clip_h = (list.h as i32 - 2 * PADDING).max(0) as u32;
        let (clip_x, clip_y) = (list.x + PADDING, list.y + PADDING);
        let text_dy = (self.row_height as i32 - self.line_height as i32) / 2;

        let rows = self.entries.iter().enumerate().skip(self.scroll.offset).take(self.scroll.visible);
        for (vi, (ri, entry)) in rows.enumerate() {
            let ry = clip_y + (vi as u32 * self.row_height) as i32;
            let current = ri == self.cursor;
            if current {
                canvas.fill_rect(
                    clip_x as f32,
                    ry as f32,
                    clip_w as f32,
                    self.row_height as f32,
                    colors.input_border_focused,
                );
            } else if self.hovered == Some(ri) {
                canvas.fill_rect(
                    clip_x as f32,
                    ry as f32,
                    clip_w as f32,
                    self.row_height as f32,
                    darken(colors.input_bg, 0.06),
                );
            }
            let fg = if current { rgb(255, 255, 255) } else { colors.text };
            font.render(entry)
                .with_color(fg)
                .with_clip(clip_x, clip_y, clip_w, clip_h)
                .draw(canvas, clip_x + PADDING / 2, ry + text_dy);
        }
        self.scroll.draw(canvas, colors, x + w, clip_y as f32, clip_h as f32, self.scale);
        canvas.stroke_rounded_rect(x, y, w, h, RADIUS, colors.input_border, 1.0);
    }

    fn process_event(&mut self, event: &WindowEvent, pointer: (i32, i32)) -> BodyEvent {
        let (px, py) = pointer;
        match event {
            WindowEvent::CursorEnter(_) | WindowEvent::CursorMove(_) => {
                let hovered = self.row_at(px, py);
                if std::mem::replace(&mut self.hovered, hovered) != hovered {
                    return BodyEvent::Redraw;
                }
                BodyEvent::Ignored
            }
            WindowEvent::CursorLeave => {
                if self.hovered.take().is_some() { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            WindowEvent::ButtonPress(MouseButton::Left, _) => {
                match self.row_at(px, py) {
                    Some(row) => self.press(row, Instant::now()),
                    None => BodyEvent::Ignored,
                }
            }
            WindowEvent::Scroll(direction) if self.list.contains(px, py) => {
                let delta = match direction {
                    ScrollDirection::Up => -(WHEEL_STEP as isize),
                    ScrollDirection::Down => WHEEL_STEP as isize,
                };
                if self.scroll.scroll_by(delta) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            WindowEvent::KeyPress(key) => {
                let page = self.scroll.visible.max(1) as isize;
                let moved = match key.keysym {
                    keysym::UP => Some(self.step(-1)),
                    keysym::DOWN => Some(self.step(1)),
                    keysym::PAGE_UP => Some(self.step(-page)),
                    keysym::PAGE_DOWN => Some(self.step(page)),
                    _ => None,
                };
                match moved {
                    Some(true) => BodyEvent::Redraw,
                    Some(false) => BodyEvent::Ignored,
                    None if self.editable && self.input.process_event(event) => {
                        if self.input.was_submitted() { BodyEvent::Activate } else { BodyEvent::Redraw }
                    }
                    None => BodyEvent::Ignored,
                }
            }
            WindowEvent::TextInput(_) if self.editable => {
                if self.input.process_event(event) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            _ => BodyEvent::Ignored,
        }
    }

    fn set_focus(&mut self, focused: bool) {
        self.input.set_focus(focused && self.editable);
    }
}

pub(crate) fn combobox(
    ctx: Context<'_>,
    text: &str,
    entries: Vec<String>,
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let body = ComboBody::new(&ctx, entries);
    let buttons = if options.buttons { frame::all_buttons(options, false, true) } else { Vec::new() };
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons,
        check: true,
    };
    let separator = options.separator.as_str();
    let dialog = Dialog::open(ctx, spec, body)?;
    frame::run_accepting(dialog, options, state, |body| entries_line(&[body.text()], separator))
}
