//! Calendar box: a month grid with ISO week numbers.

use std::time::Instant;

use chrono::{Datelike, NaiveDate};

use crate::{
    backend::{MouseButton, WindowEvent, keysym},
    datetime::{self, DAY_NAMES},
    error::Error,
    render::{Align, Canvas, Font, Rgba, rgb},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Body, BodyEvent, Context, Dialog, FrameSpec, Rect},
        list::DOUBLE_CLICK,
        widgets::darken,
    },
};

const RADIUS: f32 = 5.0;
/// Week number column plus seven days.
const COLUMNS: u32 = 8;
const ROWS: u32 = 6;
/// Header, day names and the weeks.
const GRID_ROWS: u32 = ROWS + 2;

/// What sits under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    /// A header arrow moving by this many months.
    Shift(i32),
    Day(NaiveDate),
}

struct CalendarBody {
    date: NaiveDate,
    today: NaiveDate,
    hovered: Option<NaiveDate>,
    last_press: Option<(NaiveDate, Instant)>,
    cell: u32,
    line_height: u32,
    origin: (i32, i32),
}

impl CalendarBody {
    fn new(ctx: &Context<'_>, date: NaiveDate, today: NaiveDate) -> Self {
        let cell = ctx.metrics.cell;
        let line_height = ctx.font.line_height().ceil();
        let size = (cell.xmult * 4.0).max(line_height * 1.6).round() as u32;
        Self::with_cell(date, today, size, line_height as u32)
    }

    fn with_cell(date: NaiveDate, today: NaiveDate, cell: u32, line_height: u32) -> Self {
        Self {
            date,
            today,
            hovered: None,
            last_press: None,
            cell,
            line_height,
            origin: (0, 0),
        }
    }

    fn grid_size(&self) -> (u32, u32) {
        (COLUMNS * self.cell, GRID_ROWS * self.cell)
    }

    /// Date shown at `row`, `col` of the week grid, if it is in the month.
    fn date_at(&self, row: u32, col: u32) -> Option<NaiveDate> {
        let (year, month) = (self.date.year(), self.date.month());
        let index = (row * 7 + col) as i64 - datetime::leading_blanks(year, month) as i64;
        if index < 0 || index >= datetime::days_in_month(year, month) as i64 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, index as u32 + 1)
    }

    fn hit(&self, px: i32, py: i32) -> Option<Hit> {
        let (x0, y0) = self.origin;
        let (w, h) = self.grid_size();
        let cell = self.cell as i32;
        if self.cell == 0 || px < x0 || py < y0 || px >= x0 + w as i32 || py >= y0 + h as i32 {
            return None;
        }
        let col = ((px - x0) / cell) as u32;
        let row = ((py - y0) / cell) as u32;
        match (row, col) {
            (0, 0) => Some(Hit::Shift(-12)),
            (0, 1) => Some(Hit::Shift(-1)),
            (0, c) if c == COLUMNS - 2 => Some(Hit::Shift(1)),
            (0, c) if c == COLUMNS - 1 => Some(Hit::Shift(12)),
            (0 | 1, _) | (_, 0) => None,
            (r, c) => self.date_at(r - 2, c - 1).map(Hit::Day),
        }
    }

    fn select(&mut self, date: NaiveDate) -> bool {
        std::mem::replace(&mut self.date, date) != date
    }

    fn press(&mut self, hit: Hit, now: Instant) -> BodyEvent {
        match hit {
            Hit::Shift(months) => {
                self.last_press = None;
                self.select(datetime::shift_months(self.date, months));
                BodyEvent::Redraw
            }
            Hit::Day(day) => {
                let double = matches!(
                    self.last_press,
                    Some((d, at)) if d == day && now.duration_since(at) < DOUBLE_CLICK
                );
                if double {
                    self.last_press = None;
                    return BodyEvent::Activate;
                }
                self.last_press = Some((day, now));
                self.select(day);
                BodyEvent::Redraw
            }
        }
    }

    fn handle_key(&mut self, keysym: u32) -> bool {
        let date = self.date;
        let target = match keysym {
            keysym::LEFT => datetime::shift_days(date, -1),
            keysym::RIGHT => datetime::shift_days(date, 1),
            keysym::UP => datetime::shift_days(date, -7),
            keysym::DOWN => datetime::shift_days(date, 7),
            keysym::PAGE_UP => datetime::shift_months(date, -1),
            keysym::PAGE_DOWN => datetime::shift_months(date, 1),
            keysym::HOME => date.with_day(1).unwrap_or(date),
            keysym::END => {
                let last = datetime::days_in_month(date.year(), date.month());
                date.with_day(last).unwrap_or(date)
            }
            _ => return false,
        };
        self.select(target)
    }

    fn draw_cell_text(&self, canvas: &mut Canvas, font: &Font, text: &str, color: Rgba, x: i32, y: i32) {
        let dy = (self.cell as i32 - self.line_height as i32) / 2;
        font.render(text)
            .with_color(color)
            .with_align(Align::Center, self.cell as f32)
            .draw(canvas, x, y + dy);
    }
}

impl Body for CalendarBody {
    fn size_hint(&self) -> (u32, u32) {
        self.grid_size()
    }

    fn expands(&self) -> bool {
        false
    }

    fn set_rect(&mut self, rect: Rect) {
        let (w, _) = self.grid_size();
        self.origin = (rect.x + (rect.w.saturating_sub(w) / 2) as i32, rect.y);
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        let (x0, y0) = self.origin;
        let (w, h) = self.grid_size();
        let cell = self.cell as i32;
        canvas.fill_rounded_rect(x0 as f32, y0 as f32, w as f32, h as f32, RADIUS, colors.input_bg);

        let header_bg = darken(colors.input_bg, 0.03);
        canvas.fill_rect(x0 as f32 + 1.0, y0 as f32 + 1.0, w as f32 - 2.0, cell as f32 - 1.0, header_bg);
        for (col, arrow) in [(0, "<<"), (1, "<"), (COLUMNS - 2, ">"), (COLUMNS - 1, ">>")] {
            self.draw_cell_text(canvas, font, arrow, colors.text, x0 + col as i32 * cell, y0);
        }
        let title = format!("{} {}", datetime::month_name(self.date.month()), self.date.year());
        let dy = (cell - self.line_height as i32) / 2;
        font.render(&title)
            .with_color(colors.text)
            .with_align(Align::Center, (w - 4 * self.cell) as f32)
            .draw(canvas, x0 + 2 * cell, y0 + dy);

        let muted = rgb(140, 140, 140);
        let names_y = y0 + cell;
        for (i, name) in DAY_NAMES.iter().enumerate() {
            self.draw_cell_text(canvas, font, name, muted, x0 + (i as i32 + 1) * cell, names_y);
        }
        canvas.hline(x0 as f32, (names_y + cell) as f32, w as f32, colors.input_border);

        let (year, month) = (self.date.year(), self.date.month());
        for row in 0..ROWS {
            let ry = y0 + (row as i32 + 2) * cell;
            let in_month = (0..7).any(|col| self.date_at(row, col).is_some());
            if !in_month {
                continue;
            }
            let week = datetime::week_number(year, month, row).to_string();
            self.draw_cell_text(canvas, font, &week, muted, x0, ry);

            for col in 0..7 {
                let Some(day) = self.date_at(row, col) else {
                    continue;
                };
                let cx = x0 + (col as i32 + 1) * cell;
                let selected = day == self.date;
                let inset = 2.0;
                let side = self.cell as f32 - 2.0 * inset;
                if selected {
                    canvas.fill_rounded_rect(
                        cx as f32 + inset,
                        ry as f32 + inset,
                        side,
                        side,
                        4.0,
                        colors.input_border_focused,
                    );
                } else if self.hovered == Some(day) {
                    canvas.fill_rounded_rect(
                        cx as f32 + inset,
                        ry as f32 + inset,
                        side,
                        side,
                        4.0,
                        darken(colors.input_bg, 0.08),
                    );
                }
                if day == self.today && !selected {
                    canvas.stroke_rounded_rect(
                        cx as f32 + inset,
                        ry as f32 + inset,
                        side,
                        side,
                        4.0,
                        colors.input_border_focused,
                        1.5,
                    );
                }
                let color = if selected {
                    rgb(255, 255, 255)
                } else if datetime::is_weekend(day) {
                    rgb(200, 100, 100)
                } else {
                    colors.text
                };
                self.draw_cell_text(canvas, font, &day.day().to_string(), color, cx, ry);
            }
        }

        canvas.stroke_rounded_rect(x0 as f32, y0 as f32, w as f32, h as f32, RADIUS, colors.input_border, 1.0);
    }

    fn process_event(&mut self, event: &WindowEvent, pointer: (i32, i32)) -> BodyEvent {
        let (px, py) = pointer;
        match event {
            WindowEvent::CursorEnter(_) | WindowEvent::CursorMove(_) => {
                let hovered = match self.hit(px, py) {
                    Some(Hit::Day(day)) => Some(day),
                    _ => None,
                };
                if std::mem::replace(&mut self.hovered, hovered) != hovered {
                    BodyEvent::Redraw
                } else {
                    BodyEvent::Ignored
                }
            }
            WindowEvent::CursorLeave => {
                if self.hovered.take().is_some() { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            WindowEvent::ButtonPress(MouseButton::Left, _) => {
                match self.hit(px, py) {
                    Some(hit) => self.press(hit, Instant::now()),
                    None => BodyEvent::Ignored,
                }
            }
            WindowEvent::KeyPress(key) => {
                if self.handle_key(key.keysym) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            _ => BodyEvent::Ignored,
        }
    }
}

pub(crate) fn calendar(
    ctx: Context<'_>,
    text: &str,
    day: u32,
    month: u32,
    year: i32,
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let today = chrono::Local::now().date_naive();
    let date = datetime::initial_date(day, month, year, today);
    log::debug!("calendar opens on {date}");
    let body = CalendarBody::new(&ctx, date, today);
    let buttons = if options.buttons { frame::all_buttons(options, false, true) } else { Vec::new() };
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons,
        check: true,
    };
    let dialog = Dialog::open(ctx, spec, body)?;
    frame::run_accepting(dialog, options, state, |body| datetime::format_date(body.date))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::{KeyEvent, Modifiers};

    const CELL: i32 = 20;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn body(on: NaiveDate) -> CalendarBody {
        let mut body = CalendarBody::with_cell(on, on, CELL as u32, 16);
        body.set_rect(Rect {
            x: 0,
            y: 0,
            w: COLUMNS * CELL as u32,
            h: GRID_ROWS * CELL as u32,
        });
        body
    }

    /// Centre of day column `col` (0 is Sunday) in week row `row`.
    fn at(row: i32, col: i32) -> (i32, i32) {
        ((col + 1) * CELL + CELL / 2, (row + 2) * CELL + CELL / 2)
    }

    fn key(keysym: u32) -> WindowEvent {
        WindowEvent::KeyPress(KeyEvent {
            keysym,
            modifiers: Modifiers::empty(),
        })
    }

    #[test]
    fn grid_cells_map_to_days() {
        // February 2023 starts on a Wednesday
        let b = body(date(2023, 2, 10));
        let (x, y) = at(0, 3);
        assert_eq!(b.hit(x, y), Some(Hit::Day(date(2023, 2, 1))));
        let (x, y) = at(0, 2);
        assert_eq!(b.hit(x, y), None);
        let (x, y) = at(4, 2);
        assert_eq!(b.hit(x, y), Some(Hit::Day(date(2023, 2, 28))));
        let (x, y) = at(4, 3);
        assert_eq!(b.hit(x, y), None);
        assert_eq!(b.hit(CELL / 2, CELL / 2), Some(Hit::Shift(-12)));
        assert_eq!(b.hit(7 * CELL + 1, 1), Some(Hit::Shift(12)));
        assert_eq!(b.hit(CELL / 2, 3 * CELL), None);
    }

    #[test]
    fn keys_move_the_selection() {
        let mut b = body(date(2024, 1, 31));
        assert!(b.handle_key(keysym::RIGHT));
        assert_eq!(b.date, date(2024, 2, 1));
        assert!(b.handle_key(keysym::UP));
        assert_eq!(b.date, date(2024, 1, 25));
        assert!(b.handle_key(keysym::END));
        assert!(b.handle_key(keysym::PAGE_DOWN));
        assert_eq!(b.date, date(2024, 2, 29));
        assert!(b.handle_key(keysym::HOME));
        assert!(!b.handle_key(keysym::HOME));
        assert_eq!(b.process_event(&key(keysym::TAB), (0, 0)), BodyEvent::Ignored);
    }

    #[test]
    fn click_selects_and_double_click_accepts() {
        let mut b = body(date(2023, 2, 10));
        let t0 = Instant::now();
        let day = Hit::Day(date(2023, 2, 14));
        assert_eq!(b.press(day, t0), BodyEvent::Redraw);
        assert_eq!(datetime::format_date(b.date), "14/02/2023\n");
        assert_eq!(b.press(day, t0 + Duration::from_millis(100)), BodyEvent::Activate);
        assert_eq!(b.press(Hit::Shift(1), t0), BodyEvent::Redraw);
        assert_eq!(b.date, date(2023, 3, 14));
    }
}
