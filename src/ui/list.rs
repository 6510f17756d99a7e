//! Checklist, radiolist and menubox.

use std::{
    io::Write,
    time::{Duration, Instant},
};

use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keysym},
    cli::ListKind,
    error::Error,
    items::{self, ListItem},
    render::{Canvas, Font, rgb},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Action, Body, BodyEvent, Context, Dialog, FrameSpec, Rect, Role},
        widgets::{
            darken,
            scrollbar::{Scroll, WHEEL_STEP},
            toggle::{ToggleKind, draw_mark, mark_size},
        },
    },
};

const PADDING: i32 = 6;
const RADIUS: f32 = 5.0;
pub(crate) const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const MIN_COLUMNS: f32 = 20.0;

/// Extra pixels between rows, on top of the line height.
fn row_spacing(kind: ListKind) -> f32 {
    match kind {
        ListKind::Menu => 4.0,
        _ => 5.0,
    }
}

/// Text shown for a checklist or radiolist row.
pub(crate) fn row_label(item: &ListItem, tags: bool) -> String {
    if tags && !item.tag.is_empty() {
        format!("{}: {}", item.tag, item.name)
    } else {
        item.name.clone()
    }
}

/// Rows shown at once: `list_height` when given, or as many as fit the
/// screen.
pub(crate) fn visible_rows(list_height: i32, items: usize, room: f32, row_height: f32) -> usize {
    if list_height > 0 {
        return list_height as usize;
    }
    let fit = if row_height > 0.0 { (room / row_height).floor().max(1.0) as usize } else { items };
    items.min(fit).max(1)
}

fn widest<'a>(font: &Font, texts: impl Iterator<Item = &'a str>) -> u32 {
    texts.map(|t| font.text_width(t).ceil() as u32).max().unwrap_or(0)
}

struct ListBody {
    kind: ListKind,
    items: Vec<ListItem>,
    labels: Vec<String>,
    /// Width of the tag column of a menubox, zero when tags are hidden.
    tag_width: u32,
    cursor: Option<usize>,
    hovered: Option<usize>,
    last_press: Option<(usize, Instant)>,
    focused: bool,
    /// Shows the tip of the current row under the list.
    status: bool,
    scroll: Scroll,
    rect: Rect,
    row_height: u32,
    line_height: u32,
    mark: u32,
    scale: f32,
    hint: (u32, u32),
}

impl ListBody {
    fn new(ctx: &Context<'_>, kind: ListKind, items: Vec<ListItem>, list_height: i32) -> Self {
        let font = &ctx.font;
        let options = ctx.options;
        let cell = ctx.metrics.cell;
        let line_height = font.line_height().ceil();
        let row_height = (line_height + row_spacing(kind)).round();
        let mark = mark_size(font);

        let labels: Vec<String> = match kind {
            ListKind::Menu => items.iter().map(|i| i.name.clone()).collect(),
            _ => items.iter().map(|i| row_label(i, options.tags)).collect(),
        };
        let tag_width = match kind {
            ListKind::Menu if options.tags => {
                widest(font, items.iter().map(|i| i.tag.as_str())) + cell.xmult.ceil() as u32
            }
            _ => 0,
        };
        let lead = match kind {
            ListKind::Menu => tag_width,
            _ => mark + cell.xmult.ceil() as u32,
        };
        let content_w = lead + widest(font, labels.iter().map(String::as_str));

        let room = ctx.metrics.screen.1 as f32 - 15.0 * cell.ymult;
        let rows = visible_rows(list_height, items.len(), room, row_height);
        let status = options.item_help;
        let mut height = rows as u32 * row_height as u32 + 2 * PADDING as u32;
        if status {
            height += line_height as u32 + PADDING as u32;
        }
        let width = (content_w + 2 * PADDING as u32 + (12.0 * ctx.scale()) as u32)
            .max((MIN_COLUMNS * cell.xmult).round() as u32);

        let mut body = Self::with_layout(kind, items, labels, row_height as u32, line_height as u32);
        body.tag_width = tag_width;
        body.mark = mark;
        body.scale = ctx.scale();
        body.status = status;
        body.hint = (width, height);
        body.cursor = items::initial_index(&body.items, options.default_item.as_deref());
        if let Some(row) = body.cursor {
            body.scroll.reveal(row);
        }
        body
    }

    fn with_layout(
        kind: ListKind,
        mut items: Vec<ListItem>,
        labels: Vec<String>,
        row_height: u32,
        line_height: u32,
    ) -> Self {
        if kind == ListKind::Radiolist {
            items::normalize_radio(&mut items);
        }
        let scroll = Scroll {
            offset: 0,
            total: items.len(),
            visible: 0,
        };
        Self {
            kind,
            items,
            labels,
            tag_width: 0,
            cursor: None,
            hovered: None,
            last_press: None,
            focused: true,
            status: false,
            scroll,
            rect: Rect::default(),
            row_height,
            line_height,
            mark: 0,
            scale: 1.0,
            hint: (0, 0),
        }
    }

    fn list_rect(&self) -> Rect {
        let status_h = if self.status { self.line_height + PADDING as u32 } else { 0 };
        Rect {
            h: self.rect.h.saturating_sub(status_h),
            ..self.rect
        }
    }

    fn row_at(&self, px: i32, py: i32) -> Option<usize> {
        let list = self.list_rect();
        if !list.contains(px, py) || self.row_height == 0 {
            return None;
        }
        let rel = py - list.y - PADDING;
        if rel < 0 {
            return None;
        }
        let row = self.scroll.offset + rel as usize / self.row_height as usize;
        (row < self.items.len() && row < self.scroll.offset + self.scroll.visible).then_some(row)
    }

    /// Marks or selects `row` the way the list kind does.
    fn pick(&mut self, row: usize) -> bool {
        let changed = match self.kind {
            ListKind::Checklist => items::toggle(&mut self.items, row),
            ListKind::Radiolist => items::select_only(&mut self.items, row),
            ListKind::Menu => self.items.get(row).is_some_and(ListItem::is_available),
        };
        if changed || self.kind == ListKind::Menu {
            self.set_cursor(row);
        }
        changed
    }

    fn set_cursor(&mut self, row: usize) {
        if self.items.get(row).is_some_and(ListItem::is_available) {
            self.cursor = Some(row);
            self.scroll.reveal(row);
        }
    }

    /// A left press on `row` at `now`; a second press on the same row
    /// within the double click delay accepts the dialog.
    fn press(&mut self, row: usize, now: Instant) -> BodyEvent {
        let double = matches!(
            self.last_press,
            Some((r, at)) if r == row && now.duration_since(at) < DOUBLE_CLICK
        );
        // The second press of a double click leaves the marks alone
        if double {
            self.last_press = None;
            self.set_cursor(row);
            return BodyEvent::Activate;
        }
        self.last_press = Some((row, now));
        self.pick(row);
        BodyEvent::Redraw
    }

    /// Moves the cursor by `delta` available rows.
    fn step(&mut self, delta: isize) -> bool {
        let Some(start) = self.cursor.or_else(|| items::initial_index(&self.items, None)) else {
            return false;
        };
        let mut target = start;
        let mut row = start;
        let mut left = delta.unsigned_abs();
        while left > 0 {
            row = match row.checked_add_signed(delta.signum()) {
                Some(r) if r < self.items.len() => r,
                _ => break,
            };
            if self.items[row].is_available() {
                target = row;
                left -= 1;
            }
        }
        if Some(target) == self.cursor {
            return false;
        }
        self.set_cursor(target);
        true
    }

    fn edge(&mut self, end: bool) -> bool {
        let found = if end {
            self.items.iter().rposition(ListItem::is_available)
        } else {
            self.items.iter().position(ListItem::is_available)
        };
        match found {
            Some(row) if Some(row) != self.cursor => {
                self.set_cursor(row);
                true
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, keysym: u32) -> bool {
        let page = self.scroll.visible.max(1) as isize;
        match keysym {
            keysym::UP => self.step(-1),
            keysym::DOWN => self.step(1),
            keysym::PAGE_UP => self.step(-page),
            keysym::PAGE_DOWN => self.step(page),
            keysym::HOME => self.edge(false),
            keysym::END => self.edge(true),
            _ => false,
        }
    }

    /// Tip of the row under the pointer, or of the current row.
    fn tip(&self) -> Option<&str> {
        let row = match self.kind {
            ListKind::Menu => self.cursor,
            _ => self.hovered.or(self.cursor),
        };
        row.and_then(|r| self.items.get(r)).and_then(|i| i.tip.as_deref())
    }

    /// Result line of the dialog.
    fn selection(&self, separator: &str, separate_output: bool) -> String {
        match self.kind {
            ListKind::Menu => {
                self.cursor
                    .and_then(|r| self.items.get(r))
                    .map(|i| format!("{}\n", i.tag))
                    .unwrap_or_default()
            }
            _ => items::format_selection(&self.items, separator, separate_output),
        }
    }
}

impl Body for ListBody {
    fn size_hint(&self) -> (u32, u32) {
        self.hint
    }

    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
        let list = self.list_rect();
        let inner = (list.h as i32 - 2 * PADDING).max(0) as u32;
        let visible = if self.row_height > 0 { (inner / self.row_height) as usize } else { 0 };
        self.scroll.set_visible(visible.max(1));
        if let Some(row) = self.cursor {
            self.scroll.reveal(row);
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let list = self.list_rect();
        let (x, y, w, h) = (list.x as f32, list.y as f32, list.w as f32, list.h as f32);
        canvas.fill_rounded_rect(x, y, w, h, RADIUS, colors.input_bg);

        let clip_w = (list.w as i32 - 2 * PADDING).max(0) as u32;
        let clip_h = (list.h as i32 - 2 * PADDING).max(0) as u32;
        let (clip_x, clip_y) = (list.x + PADDING, list.y + PADDING);
        let text_dy = (self.row_height as i32 - self.line_height as i32) / 2;

        let rows = self.items.iter().enumerate().skip(self.scroll.offset).take(self.scroll.visible);
        for (vi, (ri, item)) in rows.enumerate() {
            let ry = clip_y + (vi as u32 * self.row_height) as i32;
            let current = self.cursor == Some(ri);
            let highlighted = self.kind == ListKind::Menu && current;

            let bg = if highlighted {
                Some(colors.input_border_focused)
            } else if self.hovered == Some(ri) && item.is_available() {
                Some(darken(colors.input_bg, 0.06))
            } else {
                None
            };
            if let Some(bg) = bg {
                canvas.fill_rect(clip_x as f32, ry as f32, clip_w as f32, self.row_height as f32, bg);
            }
            if current && self.focused && !highlighted {
                canvas.stroke_rounded_rect(
                    clip_x as f32,
                    ry as f32,
                    clip_w as f32,
                    self.row_height as f32,
                    2.0,
                    colors.input_border_focused,
                    1.0,
                );
            }

            let fg = if highlighted {
                rgb(255, 255, 255)
            } else if item.is_available() {
                colors.text
            } else {
                colors.input_placeholder
            };
            let mut tx = clip_x + PADDING / 2;
            match self.kind {
                ListKind::Menu => {
                    if self.tag_width > 0 {
                        font.render(&item.tag)
                            .with_color(fg)
                            .with_clip(clip_x, clip_y, clip_w, clip_h)
                            .draw(canvas, tx, ry + text_dy);
                        tx += self.tag_width as i32;
                    }
                }
                ListKind::Checklist | ListKind::Radiolist => {
                    let kind = if self.kind == ListKind::Checklist {
                        ToggleKind::Check
                    } else {
                        ToggleKind::Radio
                    };
                    let my = ry + (self.row_height as i32 - self.mark as i32) / 2;
                    draw_mark(
                        canvas,
                        kind,
                        tx,
                        my,
                        item.is_on(),
                        item.is_available(),
                        colors,
                        self.mark,
                        self.scale,
                    );
                    tx += self.mark as i32 + font.cell_size().xmult.ceil() as i32;
                }
            }
            font.render(&self.labels[ri])
                .with_color(fg)
                .with_clip(clip_x, clip_y, clip_w, clip_h)
                .draw(canvas, tx, ry + text_dy);
        }

        self.scroll.draw(canvas, colors, x + w, clip_y as f32, clip_h as f32, self.scale);
        canvas.stroke_rounded_rect(x, y, w, h, RADIUS, colors.input_border, 1.0);

        if self.status {
            let sy = list.y + list.h as i32 + PADDING;
            canvas.hline(x, (sy - PADDING / 2) as f32, w, colors.window_border);
            if let Some(tip) = self.tip() {
                font.render(tip)
                    .with_color(colors.text)
                    .with_clip(list.x, sy, list.w, self.line_height)
                    .draw(canvas, list.x + PADDING, sy);
            }
        }
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
            WindowEvent::Scroll(direction) if self.list_rect().contains(px, py) => {
                let delta = match direction {
                    ScrollDirection::Up => -(WHEEL_STEP as isize),
                    ScrollDirection::Down => WHEEL_STEP as isize,
                };
                if self.scroll.scroll_by(delta) {
                    self.hovered = self.row_at(px, py);
                    BodyEvent::Redraw
                } else {
                    BodyEvent::Ignored
                }
            }
            WindowEvent::KeyPress(key) if self.focused => {
                if self.handle_key(key.keysym) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            WindowEvent::TextInput(' ') if self.focused && self.kind != ListKind::Menu => {
                let Some(row) = self.cursor else {
                    return BodyEvent::Ignored;
                };
                if self.pick(row) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            _ => BodyEvent::Ignored,
        }
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }
}

fn print_selection<W: Write>(
    body: &ListBody,
    separator: &str,
    separate_output: bool,
    state: &mut DialogState<W>,
) -> Result<(), Error> {
    let out = body.selection(separator, separate_output);
    if !out.is_empty() {
        state.output().write_all(out.as_bytes())?;
        state.output().flush()?;
    }
    Ok(())
}

pub(crate) fn list(
    ctx: Context<'_>,
    text: &str,
    kind: ListKind,
    list_height: i32,
    items: Vec<ListItem>,
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let body = ListBody::new(&ctx, kind, items, list_height);
    let buttons = if options.buttons { frame::all_buttons(options, false, true) } else { Vec::new() };
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons,
        check: true,
    };
    let separator = options.separator.as_str();
    let separate_output = options.separate_output;

    let mut dialog = Dialog::open(ctx, spec, body)?;
    if kind != ListKind::Menu {
        if let Some(interval) = options.interval.filter(|i| !i.is_zero()) {
            state.start_timer(interval);
        }
    }
    if let Some(timeout) = options.timeout {
        state.set_timeout(timeout);
    }
    dialog.run(state, |action, body, state| {
        let accept = |state: &mut DialogState| print_selection(body, separator, separate_output, state);
        match action {
            Action::Button(role @ (Role::Ok | Role::Next)) => frame::activate(role, state, accept),
            Action::Button(role) => frame::activate(role, state, |_| Ok(())),
            Action::Activate | Action::Return => frame::activate(Role::Ok, state, accept),
            Action::Tick => accept(state),
        }
    })?;
    dialog.close(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemState;

    fn item(tag: &str, state: ItemState) -> ListItem {
        ListItem {
            tag: tag.to_string(),
            name: format!("{tag} name"),
            tip: Some(format!("about {tag}")),
            state,
        }
    }

    fn body(kind: ListKind, states: &[ItemState]) -> ListBody {
        let items: Vec<ListItem> = states
            .iter()
            .enumerate()
            .map(|(i, s)| item(&format!("t{i}"), *s))
            .collect();
        let labels = items.iter().map(|i| row_label(i, true)).collect();
        let mut body = ListBody::with_layout(kind, items, labels, 20, 16);
        body.set_rect(Rect {
            x: 0,
            y: 0,
            w: 200,
            h: 3 * 20 + 2 * PADDING as u32,
        });
        body.cursor = items::initial_index(&body.items, None);
        body
    }

    use ItemState::{Off, On, Unavailable};

    #[test]
    fn labels_carry_the_tag_unless_hidden() {
        let it = item("a", Off);
        assert_eq!(row_label(&it, true), "a: a name");
        assert_eq!(row_label(&it, false), "a name");
        let untagged = ListItem {
            tag: String::new(),
            ..it
        };
        assert_eq!(row_label(&untagged, true), "a name");
    }

    #[test]
    fn list_height_or_screen_room() {
        assert_eq!(visible_rows(4, 50, 1000.0, 20.0), 4);
        assert_eq!(visible_rows(0, 50, 200.0, 20.0), 10);
        assert_eq!(visible_rows(0, 3, 200.0, 20.0), 3);
        assert_eq!(visible_rows(0, 0, 200.0, 20.0), 1);
    }

    #[test]
    fn checklist_presses_toggle_and_double_click_accepts() {
        let mut b = body(ListKind::Checklist, &[Off, On, Off]);
        let t0 = Instant::now();
        assert_eq!(b.press(0, t0), BodyEvent::Redraw);
        assert!(b.items[0].is_on());
        assert_eq!(b.press(0, t0 + Duration::from_millis(100)), BodyEvent::Activate);
        assert!(b.items[0].is_on());
        assert_eq!(b.selection("/", false), "t0/t1\n");
        assert_eq!(b.selection("/", true), "t0\nt1\n");

        assert_eq!(b.press(2, t0 + Duration::from_secs(1)), BodyEvent::Redraw);
        assert_eq!(b.press(2, t0 + Duration::from_secs(2)), BodyEvent::Redraw);
        assert!(!b.items[2].is_on());
    }

    #[test]
    fn radiolist_keeps_one_and_skips_unavailable() {
        let mut b = body(ListKind::Radiolist, &[On, Unavailable, On]);
        assert!(!b.items[2].is_on());
        assert_eq!(b.cursor, Some(0));

        assert!(b.handle_key(keysym::DOWN));
        assert_eq!(b.cursor, Some(2));
        assert!(!b.handle_key(keysym::DOWN));

        assert_eq!(b.process_event(&WindowEvent::TextInput(' '), (0, 0)), BodyEvent::Redraw);
        assert_eq!(b.selection("/", false), "t2\n");
        assert!(!b.pick(1));
    }

    #[test]
    fn menubox_prints_the_current_tag() {
        let mut b = body(ListKind::Menu, &[Off, Off, Off, Off, Off]);
        assert_eq!(b.selection("/", false), "t0\n");
        assert!(b.handle_key(keysym::END));
        assert_eq!(b.cursor, Some(4));
        assert_eq!(b.scroll.offset, 2);
        assert!(b.handle_key(keysym::UP));
        assert_eq!(b.selection("/", false), "t3\n");
        b.status = true;
        assert_eq!(b.tip(), Some("about t3"));
    }

    #[test]
    fn rows_under_the_pointer() {
        let b = body(ListKind::Menu, &[Off, Off, Off, Off, Off]);
        assert_eq!(b.row_at(10, PADDING + 5), Some(0));
        assert_eq!(b.row_at(10, PADDING + 45), Some(2));
        assert_eq!(b.row_at(10, 1), None);
        assert_eq!(b.row_at(300, PADDING + 5), None);
    }

    #[test]
    fn nothing_selected_prints_nothing() {
        let b = body(ListKind::Checklist, &[Off, Off]);
        let mut state = DialogState::new(Vec::new());
        print_selection(&b, "/", false, &mut state).unwrap();
        assert!(state.into_output().is_empty());
    }
}
