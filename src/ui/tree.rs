//! Tree view: a list whose rows fold under their parents.

use std::time::Instant;

use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keysym},
    error::Error,
    items::{self, TreeItem},
    render::{Canvas, Font, rgb},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Body, BodyEvent, Context, Dialog, FrameSpec, Rect},
        list::{DOUBLE_CLICK, row_label, visible_rows},
        widgets::{
            darken,
            scrollbar::{Scroll, WHEEL_STEP},
        },
    },
};

const PADDING: i32 = 6;
const RADIUS: f32 = 5.0;
const MIN_COLUMNS: f32 = 24.0;

struct TreeBody {
    items: Vec<TreeItem>,
    labels: Vec<String>,
    expanded: Vec<bool>,
    /// Item under the cursor; nothing is selected until the user picks.
    cursor: Option<usize>,
    hovered: Option<usize>,
    last_press: Option<(usize, Instant)>,
    focused: bool,
    status: bool,
    scroll: Scroll,
    rect: Rect,
    row_height: u32,
    line_height: u32,
    indent: u32,
    scale: f32,
    hint: (u32, u32),
}

impl TreeBody {
    fn new(ctx: &Context<'_>, items: Vec<TreeItem>, list_height: i32) -> Self {
        let font = &ctx.font;
        let options = ctx.options;
        let cell = ctx.metrics.cell;
        let line_height = font.line_height().ceil();
        let row_height = (line_height + 4.0).round();
        let indent = (cell.xmult * 2.0).ceil() as u32;

        let labels: Vec<String> = items.iter().map(|t| row_label(&t.item, options.tags)).collect();
        let content_w = items
            .iter()
            .zip(&labels)
            .map(|(t, l)| (t.depth as u32 + 1) * indent + font.text_width(l).ceil() as u32)
            .max()
            .unwrap_or(0);
        let room = ctx.metrics.screen.1 as f32 - 15.0 * cell.ymult;
        let rows = visible_rows(list_height, items.len(), room, row_height);
        let mut height = rows as u32 * row_height as u32 + 2 * PADDING as u32;
        if options.item_help {
            height += line_height as u32 + PADDING as u32;
        }
        let width = (content_w + 2 * PADDING as u32 + (12.0 * ctx.scale()) as u32)
            .max((MIN_COLUMNS * cell.xmult).round() as u32);

        let mut body = Self::with_layout(items, labels, row_height as u32, line_height as u32, indent);
        body.scale = ctx.scale();
        body.status = options.item_help;
        body.hint = (width, height);
        if let Some(tag) = options.default_item.as_deref() {
            body.select_tag(tag);
        }
        body
    }

    fn with_layout(
        items: Vec<TreeItem>,
        labels: Vec<String>,
        row_height: u32,
        line_height: u32,
        indent: u32,
    ) -> Self {
        let expanded = vec![false; items.len()];
        Self {
            items,
            labels,
            expanded,
            cursor: None,
            hovered: None,
            last_press: None,
            focused: true,
            status: false,
            scroll: Scroll::default(),
            rect: Rect::default(),
            row_height,
            line_height,
            indent,
            scale: 1.0,
            hint: (0, 0),
        }
    }

    /// Items on screen: those whose ancestors are all expanded.
    fn shown(&self) -> Vec<usize> {
        let mut rows = Vec::new();
        let mut folded_below: Option<usize> = None;
        for (i, item) in self.items.iter().enumerate() {
            if let Some(depth) = folded_below {
                if item.depth > depth {
                    continue;
                }
                folded_below = None;
            }
            rows.push(i);
            if items::has_children(&self.items, i) && !self.expanded[i] {
                folded_below = Some(item.depth);
            }
        }
        rows
    }

    fn selectable(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|t| t.item.is_available())
    }

    fn refresh(&mut self) {
        let shown = self.shown();
        self.scroll.set_total(shown.len());
        if let Some(row) = self.cursor.and_then(|c| shown.iter().position(|&i| i == c)) {
            self.scroll.reveal(row);
        }
    }

    fn set_cursor(&mut self, index: usize) -> bool {
        if !self.selectable(index) || self.cursor == Some(index) {
            return false;
        }
        self.cursor = Some(index);
        self.refresh();
        true
    }

    /// Selects the item tagged `tag`, unfolding its ancestors.
    fn select_tag(&mut self, tag: &str) {
        let Some(index) = self.items.iter().position(|t| t.item.tag == tag) else {
            return;
        };
        let mut up = items::parent(&self.items, index);
        while let Some(p) = up {
            self.expanded[p] = true;
            up = items::parent(&self.items, p);
        }
        self.set_cursor(index);
    }

    fn set_expanded(&mut self, index: usize, open: bool) -> bool {
        if !items::has_children(&self.items, index) || self.expanded[index] == open {
            return false;
        }
        self.expanded[index] = open;
        // A folded cursor moves up to the row that hid it
        if !open {
            let hidden = self.cursor.is_some_and(|c| c > index && !self.shown().contains(&c));
            if hidden {
                self.cursor = self.selectable(index).then_some(index);
            }
        }
        self.refresh();
        true
    }

    /// Moves the cursor by `delta` selectable shown rows.
    fn step(&mut self, delta: isize) -> bool {
        let shown = self.shown();
        let start = match self.cursor.and_then(|c| shown.iter().position(|&i| i == c)) {
            Some(row) => row,
            None => {
                return match shown.iter().find(|&&i| self.selectable(i)) {
                    Some(&first) => self.set_cursor(first),
                    None => false,
                };
            }
        };
        let mut target = start;
        let mut row = start;
        let mut left = delta.unsigned_abs();
        while left > 0 {
            row = match row.checked_add_signed(delta.signum()) {
                Some(r) if r < shown.len() => r,
                _ => break,
            };
            if self.selectable(shown[row]) {
                target = row;
                left -= 1;
            }
        }
        target != start && self.set_cursor(shown[target])
    }

    fn edge(&mut self, end: bool) -> bool {
        let shown = self.shown();
        let found = if end {
            shown.iter().rev().find(|&&i| self.selectable(i))
        } else {
            shown.iter().find(|&&i| self.selectable(i))
        };
        match found {
            Some(&index) => self.set_cursor(index),
            None => false,
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
            keysym::RIGHT => {
                let Some(c) = self.cursor else {
                    return false;
                };
                if self.set_expanded(c, true) {
                    return true;
                }
                items::has_children(&self.items, c) && self.set_cursor(c + 1)
            }
            keysym::LEFT => {
                let Some(c) = self.cursor else {
                    return false;
                };
                if self.set_expanded(c, false) {
                    return true;
                }
                items::parent(&self.items, c).is_some_and(|p| self.set_cursor(p))
            }
            _ => false,
        }
    }

    fn list_rect(&self) -> Rect {
        let status_h = if self.status { self.line_height + PADDING as u32 } else { 0 };
        Rect {
            h: self.rect.h.saturating_sub(status_h),
            ..self.rect
        }
    }

    /// Item under the pointer and whether the press hit its expander.
    fn row_at(&self, px: i32, py: i32) -> Option<(usize, bool)> {
        let list = self.list_rect();
        if !list.contains(px, py) || self.row_height == 0 {
            return None;
        }
        let rel = py - list.y - PADDING;
        if rel < 0 {
            return None;
        }
        let row = self.scroll.offset + rel as usize / self.row_height as usize;
        if row >= self.scroll.offset + self.scroll.visible {
            return None;
        }
        let index = *self.shown().get(row)?;
        let expander_x = list.x + PADDING + (self.items[index].depth as u32 * self.indent) as i32;
        let on_expander = (expander_x..expander_x + self.indent as i32).contains(&px)
            && items::has_children(&self.items, index);
        Some((index, on_expander))
    }

    fn press(&mut self, index: usize, on_expander: bool, now: Instant) -> BodyEvent {
        if on_expander {
            self.last_press = None;
            let open = !self.expanded[index];
            self.set_expanded(index, open);
            return BodyEvent::Redraw;
        }
        let double = matches!(
            self.last_press,
            Some((i, at)) if i == index && now.duration_since(at) < DOUBLE_CLICK
        );
        if double {
            self.last_press = None;
            if items::has_children(&self.items, index) {
                let open = !self.expanded[index];
                self.set_expanded(index, open);
                return BodyEvent::Redraw;
            }
            if self.selectable(index) {
                return BodyEvent::Activate;
            }
            return BodyEvent::Ignored;
        }
        self.last_press = Some((index, now));
        if self.set_cursor(index) { BodyEvent::Redraw } else { BodyEvent::Ignored }
    }

    fn tip(&self) -> Option<&str> {
        self.hovered
            .or(self.cursor)
            .and_then(|i| self.items.get(i))
            .and_then(|t| t.item.tip.as_deref())
    }

    fn selection(&self) -> String {
        self.cursor.map(|c| format!("{}\n", self.items[c].item.tag)).unwrap_or_default()
    }

    fn draw_expander(&self, canvas: &mut Canvas, colors: &Colors, x: i32, y: i32, open: bool) {
        let side = (self.line_height as f32 * 0.6).round().max(7.0);
        let bx = x as f32 + ((self.indent as f32 - side) / 2.0).round();
        let by = y as f32 + ((self.row_height as f32 - side) / 2.0).round();
        canvas.fill_rect(bx, by, side, side, colors.input_bg);
        canvas.stroke_rounded_rect(bx, by, side, side, 1.0, colors.button_outline, 1.0);
        let mid = (side / 2.0).floor();
        canvas.hline(bx + 2.0, by + mid, side - 4.0, colors.text);
        if !open {
            canvas.fill_rect(bx + mid, by + 2.0, 1.0, side - 4.0, colors.text);
        }
    }
}

impl Body for TreeBody {
    fn size_hint(&self) -> (u32, u32) {
        self.hint
    }

    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
        let list = self.list_rect();
        let inner = (list.h as i32 - 2 * PADDING).max(0) as u32;
        let visible = if self.row_height > 0 { (inner / self.row_height) as usize } else { 0 };
        self.scroll.set_visible(visible.max(1));
        self.refresh();
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let list = self.list_rect();
        let (x, y, w, h) = (list.x as f32, list.y as f32, list.w as f32, list.h as f32);
        canvas.fill_rounded_rect(x, y, w, h, RADIUS, colors.input_bg);

        let clip_w = (list.w as i32 - 2 * PADDING).max(0) as u32;
        let clip_h = (list.h as i32 - 2 * PADDING).max(0) as u32;
        let (clip_x, clip_y) = (list.x + PADDING, list.y + PADDING);
        let text_dy = (self.row_height as i32 - self.line_height as i32) / 2;

        let shown = self.shown();
        let rows = shown.iter().skip(self.scroll.offset).take(self.scroll.visible);
        for (vi, &index) in rows.enumerate() {
            let tree_item = &self.items[index];
            let ry = clip_y + (vi as u32 * self.row_height) as i32;
            let current = self.cursor == Some(index);
            let available = tree_item.item.is_available();

            if current {
                let bg = if self.focused { colors.input_border_focused } else { darken(colors.input_bg, 0.12) };
                canvas.fill_rect(clip_x as f32, ry as f32, clip_w as f32, self.row_height as f32, bg);
            } else if self.hovered == Some(index) && available {
                canvas.fill_rect(
                    clip_x as f32,
                    ry as f32,
                    clip_w as f32,
                    self.row_height as f32,
                    darken(colors.input_bg, 0.06),
                );
            }

            let ex = clip_x + (tree_item.depth as u32 * self.indent) as i32;
            if items::has_children(&self.items, index) {
                self.draw_expander(canvas, colors, ex, ry, self.expanded[index]);
            }
            let fg = if current && self.focused {
                rgb(255, 255, 255)
            } else if available {
                colors.text
            } else {
                colors.input_placeholder
            };
            font.render(&self.labels[index])
                .with_color(fg)
                .with_clip(clip_x, clip_y, clip_w, clip_h)
                .draw(canvas, ex + self.indent as i32, ry + text_dy);
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
                let hovered = self.row_at(px, py).map(|(i, _)| i);
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
                    Some((index, on_expander)) => self.press(index, on_expander, Instant::now()),
                    None => BodyEvent::Ignored,
                }
            }
            WindowEvent::Scroll(direction) if self.list_rect().contains(px, py) => {
                let delta = match direction {
                    ScrollDirection::Up => -(WHEEL_STEP as isize),
                    ScrollDirection::Down => WHEEL_STEP as isize,
                };
                if self.scroll.scroll_by(delta) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            WindowEvent::KeyPress(key) if self.focused => {
                if self.handle_key(key.keysym) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            WindowEvent::TextInput(' ') if self.focused => {
                let Some(c) = self.cursor else {
                    return BodyEvent::Ignored;
                };
                let open = !self.expanded[c];
                if self.set_expanded(c, open) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            _ => BodyEvent::Ignored,
        }
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }
}

pub(crate) fn treeview(
    ctx: Context<'_>,
    text: &str,
    list_height: i32,
    items: Vec<TreeItem>,
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let body = TreeBody::new(&ctx, items, list_height);
    let buttons = if options.buttons { frame::all_buttons(options, false, true) } else { Vec::new() };
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons,
        check: true,
    };
    let dialog = Dialog::open(ctx, spec, body)?;
    frame::run_accepting(dialog, options, state, TreeBody::selection)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::items::{ItemState, ListItem};

    /// `(tag, depth)` rows; tags starting with `x` are unavailable.
    fn body(rows: &[(&str, usize)]) -> TreeBody {
        let items: Vec<TreeItem> = rows
            .iter()
            .map(|&(tag, depth)| TreeItem {
                item: ListItem {
                    tag: tag.to_string(),
                    name: tag.to_uppercase(),
                    tip: None,
                    state: if tag.starts_with('x') { ItemState::Unavailable } else { ItemState::Off },
                },
                depth,
            })
            .collect();
        let labels = items.iter().map(|t| t.item.name.clone()).collect();
        let mut body = TreeBody::with_layout(items, labels, 20, 16, 10);
        body.set_rect(Rect {
            x: 0,
            y: 0,
            w: 200,
            h: 4 * 20 + 2 * PADDING as u32,
        });
        body
    }

    const TREE: &[(&str, usize)] = &[("a", 0), ("a1", 1), ("a1i", 2), ("a2", 1), ("b", 0), ("xc", 0)];

    #[test]
    fn children_stay_folded_until_expanded() {
        let mut b = body(TREE);
        assert_eq!(b.shown(), vec![0, 4, 5]);
        assert_eq!(b.selection(), "");
        assert!(b.set_expanded(0, true));
        assert_eq!(b.shown(), vec![0, 1, 3, 4, 5]);
        assert!(b.set_expanded(1, true));
        assert_eq!(b.shown(), vec![0, 1, 2, 3, 4, 5]);
        assert!(b.set_expanded(0, false));
        assert_eq!(b.shown(), vec![0, 4, 5]);
        assert!(!b.set_expanded(4, true));
    }

    #[test]
    fn arrows_walk_and_fold_the_tree() {
        let mut b = body(TREE);
        assert!(b.handle_key(keysym::DOWN));
        assert_eq!(b.cursor, Some(0));
        assert!(b.handle_key(keysym::RIGHT));
        assert!(b.handle_key(keysym::RIGHT));
        assert_eq!(b.cursor, Some(1));
        assert!(b.handle_key(keysym::LEFT));
        assert_eq!(b.cursor, Some(0));
        assert!(b.handle_key(keysym::END));
        assert_eq!(b.selection(), "b\n");
        assert!(!b.handle_key(keysym::DOWN));
    }

    #[test]
    fn folding_hides_the_cursor_under_its_parent() {
        let mut b = body(TREE);
        b.select_tag("a1i");
        assert_eq!(b.cursor, Some(2));
        assert!(b.expanded[0] && b.expanded[1]);
        assert!(b.set_expanded(0, false));
        assert_eq!(b.cursor, Some(0));
    }

    #[test]
    fn double_clicks_open_parents_and_accept_leaves() {
        let mut b = body(TREE);
        let t0 = Instant::now();
        let later = t0 + Duration::from_millis(100);
        assert_eq!(b.press(0, false, t0), BodyEvent::Redraw);
        assert_eq!(b.press(0, false, later), BodyEvent::Redraw);
        assert!(b.expanded[0]);
        assert_eq!(b.press(3, false, t0), BodyEvent::Redraw);
        assert_eq!(b.press(3, false, later), BodyEvent::Activate);
        assert_eq!(b.selection(), "a2\n");
        assert_eq!(b.press(5, false, t0), BodyEvent::Ignored);
        assert_eq!(b.selection(), "a2\n");
    }

    #[test]
    fn expander_hits() {
        let mut b = body(TREE);
        assert_eq!(b.row_at(PADDING + 2, PADDING + 5), Some((0, true)));
        assert_eq!(b.row_at(PADDING + 30, PADDING + 5), Some((0, false)));
        assert_eq!(b.row_at(PADDING + 2, PADDING + 25), Some((4, false)));
        b.set_expanded(0, true);
        assert_eq!(b.row_at(PADDING + 12, PADDING + 25), Some((1, true)));
    }
}
