//! Build list: items move between an "available" and a "chosen" column.

use std::time::Instant;

use crate::{
    backend::{MouseButton, ScrollDirection, WindowEvent, keysym},
    error::Error,
    items::{BuildList, ListItem},
    render::{Canvas, Font, rgb},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Body, BodyEvent, Context, Dialog, FrameSpec, Rect},
        list::{DOUBLE_CLICK, row_label, visible_rows},
        widgets::{
            Widget,
            button::Button,
            scrollbar::{Scroll, WHEEL_STEP},
        },
    },
};

const PADDING: i32 = 6;
const RADIUS: f32 = 5.0;
const MIN_PANE_COLUMNS: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Available,
    Chosen,
}

impl Pane {
    fn index(self) -> usize {
        match self {
            Pane::Available => 0,
            Pane::Chosen => 1,
        }
    }
}

struct BuildBody {
    model: BuildList,
    labels: Vec<String>,
    pane: Pane,
    /// Row of the cursor in each pane.
    cursors: [usize; 2],
    scrolls: [Scroll; 2],
    panes: [Rect; 2],
    add: Button,
    remove: Button,
    last_press: Option<(Pane, usize, Instant)>,
    focused: bool,
    row_height: u32,
    line_height: u32,
    scale: f32,
    hint: (u32, u32),
}

impl BuildBody {
    fn new(ctx: &Context<'_>, items: Vec<ListItem>, list_height: i32) -> Self {
        let font = &ctx.font;
        let cell = ctx.metrics.cell;
        let line_height = font.line_height().ceil();
        let row_height = (line_height + 5.0).round();
        let labels: Vec<String> = items.iter().map(|i| row_label(i, ctx.options.tags)).collect();
        let widest = labels.iter().map(|l| font.text_width(l).ceil() as u32).max().unwrap_or(0);
        let add = Button::new("Add", font, ctx.scale());
        let remove = Button::new("Remove", font, ctx.scale());

        let room = ctx.metrics.screen.1 as f32 - 15.0 * cell.ymult;
        let rows = visible_rows(list_height, items.len(), room, row_height);
        let pane_w = (widest + 2 * PADDING as u32 + (12.0 * ctx.scale()) as u32)
            .max((MIN_PANE_COLUMNS * cell.xmult).round() as u32);
        let buttons_h = add.height() + remove.height() + PADDING as u32;
        let height = (rows as u32 * row_height as u32 + 2 * PADDING as u32).max(buttons_h);
        let width = 2 * pane_w + add.width().max(remove.width()) + 4 * PADDING as u32;

        let mut body = Self::with_layout(items, labels, add, remove, row_height as u32, line_height as u32);
        body.scale = ctx.scale();
        body.hint = (width, height);
        body
    }

    fn with_layout(
        items: Vec<ListItem>,
        labels: Vec<String>,
        add: Button,
        remove: Button,
        row_height: u32,
        line_height: u32,
    ) -> Self {
        let mut body = Self {
            model: BuildList::new(items),
            labels,
            pane: Pane::Available,
            cursors: [0, 0],
            scrolls: [Scroll::default(); 2],
            panes: [Rect::default(); 2],
            add,
            remove,
            last_press: None,
            focused: true,
            row_height,
            line_height,
            scale: 1.0,
            hint: (0, 0),
        };
        body.sync();
        body
    }

    /// Item indices shown in `pane`, top to bottom.
    fn rows(&self, pane: Pane) -> Vec<usize> {
        match pane {
            Pane::Available => self.model.available(),
            Pane::Chosen => self.model.chosen().to_vec(),
        }
    }

    fn current(&self, pane: Pane) -> Option<usize> {
        self.rows(pane).get(self.cursors[pane.index()]).copied()
    }

    /// Keeps cursors, scroll state and the buttons in step with the model.
    fn sync(&mut self) {
        for pane in [Pane::Available, Pane::Chosen] {
            let len = self.rows(pane).len();
            let i = pane.index();
            self.cursors[i] = self.cursors[i].min(len.saturating_sub(1));
            self.scrolls[i].set_total(len);
            self.scrolls[i].reveal(self.cursors[i]);
        }
        let addable = self.rows(Pane::Available).iter().any(|&n| self.model.items()[n].is_available());
        self.add.set_enabled(addable);
        self.remove.set_enabled(!self.model.chosen().is_empty());
    }

    /// Moves the current item of `pane` to the other column.
    fn transfer(&mut self, pane: Pane) -> bool {
        let Some(item) = self.current(pane) else {
            return false;
        };
        let moved = match pane {
            Pane::Available => self.model.add(item),
            Pane::Chosen => self.model.remove(item),
        };
        if moved {
            self.sync();
        }
        moved
    }

    fn pane_at(&self, px: i32, py: i32) -> Option<Pane> {
        [Pane::Available, Pane::Chosen]
            .into_iter()
            .find(|p| self.panes[p.index()].contains(px, py))
    }

    fn row_at(&self, px: i32, py: i32) -> Option<(Pane, usize)> {
        let pane = self.pane_at(px, py)?;
        let rect = self.panes[pane.index()];
        let rel = py - rect.y - PADDING;
        if rel < 0 || self.row_height == 0 {
            return None;
        }
        let scroll = self.scrolls[pane.index()];
        let row = scroll.offset + rel as usize / self.row_height as usize;
        (row < scroll.total && row < scroll.offset + scroll.visible).then_some((pane, row))
    }

    fn press(&mut self, pane: Pane, row: usize, now: Instant) -> BodyEvent {
        self.pane = pane;
        self.cursors[pane.index()] = row;
        let double = matches!(
            self.last_press,
            Some((p, r, at)) if p == pane && r == row && now.duration_since(at) < DOUBLE_CLICK
        );
        if double {
            self.last_press = None;
            self.transfer(pane);
        } else {
            self.last_press = Some((pane, row, now));
        }
        BodyEvent::Redraw
    }

    fn handle_key(&mut self, keysym: u32) -> bool {
        let i = self.pane.index();
        let len = self.rows(self.pane).len();
        let page = self.scrolls[i].visible.max(1);
        let cursor = self.cursors[i];
        let target = match keysym {
            keysym::LEFT | keysym::RIGHT => {
                let pane = if keysym == keysym::LEFT { Pane::Available } else { Pane::Chosen };
                return std::mem::replace(&mut self.pane, pane) != pane;
            }
            keysym::UP => cursor.saturating_sub(1),
            keysym::DOWN => cursor + 1,
            keysym::PAGE_UP => cursor.saturating_sub(page),
            keysym::PAGE_DOWN => cursor + page,
            keysym::HOME => 0,
            keysym::END => len.saturating_sub(1),
            _ => return false,
        };
        let target = target.min(len.saturating_sub(1));
        if target == cursor {
            return false;
        }
        self.cursors[i] = target;
        self.scrolls[i].reveal(target);
        true
    }

    fn draw_pane(&self, pane: Pane, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let rect = self.panes[pane.index()];
        let scroll = self.scrolls[pane.index()];
        let (x, y, w, h) = (rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32);
        canvas.fill_rounded_rect(x, y, w, h, RADIUS, colors.input_bg);

        let clip_w = (rect.w as i32 - 2 * PADDING).max(0) as u32;
        let clip_h = (rect.h as i32 - 2 * PADDING).max(0) as u32;
        let (clip_x, clip_y) = (rect.x + PADDING, rect.y + PADDING);
        let text_dy = (self.row_height as i32 - self.line_height as i32) / 2;
        let active = self.focused && self.pane == pane;

        let rows = self.rows(pane);
        let shown = rows.iter().enumerate().skip(scroll.offset).take(scroll.visible);
        for (vi, (ri, &item)) in shown.enumerate() {
            let ry = clip_y + (vi as u32 * self.row_height) as i32;
            let current = self.cursors[pane.index()] == ri;
            if current && active {
                canvas.fill_rect(
                    clip_x as f32,
                    ry as f32,
                    clip_w as f32,
                    self.row_height as f32,
                    colors.input_border_focused,
                );
            } else if current {
                canvas.stroke_rounded_rect(
                    clip_x as f32,
                    ry as f32,
                    clip_w as f32,
                    self.row_height as f32,
                    2.0,
                    colors.input_border,
                    1.0,
                );
            }
            let fg = if current && active {
                rgb(255, 255, 255)
            } else if self.model.items()[item].is_available() {
                colors.text
            } else {
                colors.input_placeholder
            };
            font.render(&self.labels[item])
                .with_color(fg)
                .with_clip(clip_x, clip_y, clip_w, clip_h)
                .draw(canvas, clip_x + PADDING / 2, ry + text_dy);
        }

        scroll.draw(canvas, colors, x + w, clip_y as f32, clip_h as f32, self.scale);
        let border = if active { colors.input_border_focused } else { colors.input_border };
        canvas.stroke_rounded_rect(x, y, w, h, RADIUS, border, 1.0);
    }
}

impl Body for BuildBody {
    fn size_hint(&self) -> (u32, u32) {
        self.hint
    }

    fn set_rect(&mut self, rect: Rect) {
        let column = self.add.width().max(self.remove.width()) + 2 * PADDING as u32;
        let pane_w = rect.w.saturating_sub(column) / 2;
        self.panes = [
            Rect {
                w: pane_w,
                ..rect
            },
            Rect {
                x: rect.x + (pane_w + column) as i32,
                w: pane_w,
                ..rect
            },
        ];
        let inner = (rect.h as i32 - 2 * PADDING).max(0) as u32;
        let visible = if self.row_height > 0 { (inner / self.row_height) as usize } else { 0 };
        for scroll in &mut self.scrolls {
            scroll.set_visible(visible.max(1));
        }

        let mid_x = rect.x + pane_w as i32 + PADDING;
        let stack_h = (self.add.height() + self.remove.height()) as i32 + PADDING;
        let top = rect.y + (rect.h as i32 - stack_h) / 2;
        let col_w = (column - 2 * PADDING as u32) as i32;
        self.add.set_position(mid_x + (col_w - self.add.width() as i32) / 2, top);
        self.remove.set_position(
            mid_x + (col_w - self.remove.width() as i32) / 2,
            top + (self.add.height() as i32) + PADDING,
        );
        self.sync();
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        self.draw_pane(Pane::Available, canvas, colors, font);
        self.draw_pane(Pane::Chosen, canvas, colors, font);
        self.add.draw(canvas, colors, font);
        self.remove.draw(canvas, colors, font);
    }

    fn process_event(&mut self, event: &WindowEvent, pointer: (i32, i32)) -> BodyEvent {
        let mut redraw = self.add.process_event(event);
        redraw |= self.remove.process_event(event);
        let clicked = if self.add.was_clicked() {
            Some(Pane::Available)
        } else if self.remove.was_clicked() {
            Some(Pane::Chosen)
        } else {
            None
        };
        if let Some(pane) = clicked {
            self.pane = pane;
            self.transfer(pane);
            return BodyEvent::Redraw;
        }

        let (px, py) = pointer;
        let handled = match event {
            WindowEvent::ButtonPress(MouseButton::Left, _) => {
                match self.row_at(px, py) {
                    Some((pane, row)) => return self.press(pane, row, Instant::now()),
                    None => false,
                }
            }
            WindowEvent::Scroll(direction) => {
                let delta = match direction {
                    ScrollDirection::Up => -(WHEEL_STEP as isize),
                    ScrollDirection::Down => WHEEL_STEP as isize,
                };
                match self.pane_at(px, py) {
                    Some(pane) => self.scrolls[pane.index()].scroll_by(delta),
                    None => false,
                }
            }
            WindowEvent::KeyPress(key) if self.focused => self.handle_key(key.keysym),
            WindowEvent::TextInput(' ') if self.focused => self.transfer(self.pane),
            _ => false,
        };
        if handled || redraw { BodyEvent::Redraw } else { BodyEvent::Ignored }
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }
}

pub(crate) fn buildlist(
    ctx: Context<'_>,
    text: &str,
    list_height: i32,
    items: Vec<ListItem>,
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let body = BuildBody::new(&ctx, items, list_height);
    let buttons = if options.buttons { frame::all_buttons(options, false, true) } else { Vec::new() };
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons,
        check: true,
    };
    let separator = options.separator.as_str();
    let dialog = Dialog::open(ctx, spec, body)?;
    frame::run_accepting(dialog, options, state, |body| body.model.format_chosen(separator))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        backend::{KeyEvent, Modifiers},
        items::ItemState,
    };

    fn button(label: &str) -> Button {
        Button::sized(label, 40, 20)
    }

    fn body(states: &[ItemState]) -> BuildBody {
        let items: Vec<ListItem> = states
            .iter()
            .enumerate()
            .map(|(i, s)| ListItem {
                tag: format!("t{i}"),
                name: format!("n{i}"),
                tip: None,
                state: *s,
            })
            .collect();
        let labels = items.iter().map(|i| i.name.clone()).collect();
        let mut body = BuildBody::with_layout(items, labels, button("Add"), button("Remove"), 20, 16);
        body.set_rect(Rect {
            x: 0,
            y: 0,
            w: 252,
            h: 3 * 20 + 2 * PADDING as u32,
        });
        body
    }

    fn key(keysym: u32) -> WindowEvent {
        WindowEvent::KeyPress(KeyEvent {
            keysym,
            modifiers: Modifiers::empty(),
        })
    }

    use ItemState::{Off, On, Unavailable};

    #[test]
    fn marked_items_start_chosen() {
        let b = body(&[Off, On, Off]);
        assert_eq!(b.rows(Pane::Available), vec![0, 2]);
        assert_eq!(b.rows(Pane::Chosen), vec![1]);
        assert_eq!(b.model.format_chosen("/"), "t1\n");
    }

    #[test]
    fn space_moves_the_current_item_across() {
        let mut b = body(&[Off, Off, Off]);
        assert!(b.handle_key(keysym::DOWN));
        assert_eq!(b.process_event(&WindowEvent::TextInput(' '), (0, 0)), BodyEvent::Redraw);
        assert_eq!(b.process_event(&WindowEvent::TextInput(' '), (0, 0)), BodyEvent::Redraw);
        assert_eq!(b.model.format_chosen("/"), "t1/t2\n");
        assert_eq!(b.cursors[0], 0);

        assert!(b.handle_key(keysym::RIGHT));
        assert!(!b.handle_key(keysym::RIGHT));
        assert_eq!(b.process_event(&WindowEvent::TextInput(' '), (0, 0)), BodyEvent::Redraw);
        assert_eq!(b.model.format_chosen("/"), "t2\n");
        assert_eq!(b.rows(Pane::Available), vec![0, 1]);
    }

    #[test]
    fn buttons_follow_what_can_move() {
        let mut b = body(&[Unavailable, On]);
        assert!(!b.add.is_enabled());
        assert!(b.remove.is_enabled());
        assert!(!b.transfer(Pane::Available));
        b.pane = Pane::Chosen;
        assert!(b.transfer(Pane::Chosen));
        assert!(!b.remove.is_enabled());
        assert!(b.add.is_enabled());
        assert_eq!(b.model.format_chosen("/"), "");
    }

    #[test]
    fn double_click_moves_a_row() {
        let mut b = body(&[Off, Off]);
        let (pane, row) = b.row_at(10, PADDING + 25).unwrap();
        assert_eq!((pane, row), (Pane::Available, 1));
        let t0 = Instant::now();
        b.press(pane, row, t0);
        assert!(b.model.chosen().is_empty());
        b.press(pane, row, t0 + Duration::from_millis(100));
        assert_eq!(b.model.chosen(), &[1]);
        assert_eq!(b.row_at(250, PADDING + 5), Some((Pane::Chosen, 0)));
    }
}
