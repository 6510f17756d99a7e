//! Range box: one to three sliders.

use crate::{
    backend::{MouseButton, WindowEvent, keysym},
    error::Error,
    render::{Canvas, Font},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Body, BodyEvent, Context, Dialog, FrameSpec, Rect},
        widgets::{Widget, slider::Slider},
    },
    values::{self, Adjustment},
};

const MIN_SLIDER_COLUMNS: f32 = 30.0;

struct Row {
    label: Option<String>,
    slider: Slider,
}

struct RangeBody {
    rows: Vec<Row>,
    current: usize,
    label_width: u32,
    gap: u32,
    min_width: u32,
}

impl RangeBody {
    fn new(ctx: &Context<'_>, ranges: Vec<Adjustment>) -> Self {
        let font = &ctx.font;
        let cell = ctx.metrics.cell;
        let rows = ranges
            .into_iter()
            .map(|range| Row {
                label: range.label.clone(),
                slider: Slider::new(range, font, ctx.scale()),
            })
            .collect();
        let mut body = Self::with_rows(rows, (cell.ymult / 2.0).round() as u32);
        body.label_width = body
            .rows
            .iter()
            .filter_map(|r| r.label.as_deref())
            .map(|l| (font.text_width(l) + cell.xmult).ceil() as u32)
            .max()
            .unwrap_or(0);
        body.min_width = (MIN_SLIDER_COLUMNS * cell.xmult).round() as u32;
        body
    }

    fn with_rows(rows: Vec<Row>, gap: u32) -> Self {
        let mut body = Self {
            rows,
            current: 0,
            label_width: 0,
            gap,
            min_width: 0,
        };
        body.focus(0);
        body
    }

    fn focus(&mut self, index: usize) {
        self.current = index;
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.slider.set_focus(i == index);
        }
    }

    fn values(&self) -> Vec<Adjustment> {
        self.rows.iter().map(|r| r.slider.value().clone()).collect()
    }
}

impl Body for RangeBody {
    fn size_hint(&self) -> (u32, u32) {
        let height: u32 = self.rows.iter().map(|r| r.slider.height() + self.gap).sum();
        (self.label_width + self.min_width, height)
    }

    fn expands(&self) -> bool {
        false
    }

    fn set_rect(&mut self, rect: Rect) {
        let mut y = rect.y;
        let width = rect.w.saturating_sub(self.label_width);
        for row in &mut self.rows {
            row.slider.set_position(rect.x + self.label_width as i32, y);
            row.slider.set_width(width);
            y += (row.slider.height() + self.gap) as i32;
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        for row in &self.rows {
            if let Some(label) = &row.label {
                let x = row.slider.x() - self.label_width as i32;
                let y = row.slider.y() + (row.slider.height() as f32 - font.line_height()) as i32;
                font.render(label).with_color(colors.text).draw(canvas, x, y);
            }
            row.slider.draw(canvas, colors, font);
        }
    }

    fn process_event(&mut self, event: &WindowEvent, pointer: (i32, i32)) -> BodyEvent {
        if let WindowEvent::ButtonPress(MouseButton::Left, _) = event {
            let (px, py) = pointer;
            if let Some(i) = self.rows.iter().position(|r| r.slider.contains(px, py)) {
                if i != self.current {
                    self.focus(i);
                }
            }
        }
        let mut redraw = false;
        for row in &mut self.rows {
            redraw |= row.slider.process_event(event);
        }
        if !redraw {
            if let WindowEvent::KeyPress(key) = event {
                let last = self.rows.len().saturating_sub(1);
                match key.keysym {
                    keysym::UP if self.current > 0 => {
                        self.focus(self.current - 1);
                        redraw = true;
                    }
                    keysym::DOWN if self.current < last => {
                        self.focus(self.current + 1);
                        redraw = true;
                    }
                    _ => {}
                }
            }
        }
        if redraw { BodyEvent::Redraw } else { BodyEvent::Ignored }
    }

    fn set_focus(&mut self, focused: bool) {
        if focused {
            self.focus(self.current);
        } else {
            for row in &mut self.rows {
                row.slider.set_focus(false);
            }
        }
    }
}

pub(crate) fn rangebox(
    ctx: Context<'_>,
    text: &str,
    ranges: Vec<Adjustment>,
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let body = RangeBody::new(&ctx, ranges);
    let buttons = if options.buttons { frame::all_buttons(options, false, true) } else { Vec::new() };
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons,
        check: true,
    };
    let separator = options.separator.clone();
    let dialog = Dialog::open(ctx, spec, body)?;
    frame::run_accepting(dialog, options, state, |body| values::format_values(&body.values(), &separator))
}
