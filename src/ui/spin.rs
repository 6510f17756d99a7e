//! Spin box and time box: a row of spin buttons.

use crate::{
    backend::{MouseButton, WindowEvent, keysym},
    datetime,
    error::Error,
    render::{Canvas, Font},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Body, BodyEvent, Context, Dialog, FrameSpec, Rect},
        widgets::{Widget, spin_button::SpinButton},
    },
    values::{self, Adjustment},
};

const TIME_HEADING: &str = "Time (hh:mm:ss)";

struct Spin {
    button: SpinButton,
    /// Text after the button.
    caption: Option<String>,
    caption_width: u32,
}

struct SpinBody {
    spins: Vec<Spin>,
    heading: Option<String>,
    current: usize,
    line_height: u32,
    gap: u32,
}

impl SpinBody {
    fn new(ctx: &Context<'_>, values: Vec<Adjustment>, heading: Option<&str>) -> Self {
        let font = &ctx.font;
        let gap = (ctx.metrics.cell.xmult / 2.0).round() as u32;
        let spins = values
            .into_iter()
            .map(|value| {
                let caption = value.label.clone();
                let caption_width = caption.as_deref().map_or(0, |c| font.text_width(c).ceil() as u32);
                Spin {
                    button: SpinButton::new(value, font),
                    caption,
                    caption_width,
                }
            })
            .collect();
        Self::with_spins(spins, heading, font.line_height().ceil() as u32, gap)
    }

    fn with_spins(spins: Vec<Spin>, heading: Option<&str>, line_height: u32, gap: u32) -> Self {
        let mut body = Self {
            spins,
            heading: heading.map(str::to_string),
            current: 0,
            line_height,
            gap,
        };
        body.focus(0);
        body
    }

    fn focus(&mut self, index: usize) {
        self.current = index;
        for (i, spin) in self.spins.iter_mut().enumerate() {
            spin.button.set_focus(i == index);
        }
    }

    fn heading_height(&self) -> u32 {
        if self.heading.is_some() { self.line_height + self.gap } else { 0 }
    }

    fn values(&self) -> Vec<i32> {
        self.spins.iter().map(|s| s.button.value()).collect()
    }

    fn spin_line(&self, separator: &str) -> String {
        let values: Vec<Adjustment> = self.spins.iter().map(|s| s.button.adjustment().clone()).collect();
        values::format_values(&values, separator)
    }

    fn time_line(&self) -> String {
        let mut time = [0u32; 3];
        for (slot, value) in time.iter_mut().zip(self.values()) {
            *slot = value.max(0) as u32;
        }
        datetime::format_time(time)
    }
}

impl Body for SpinBody {
    fn size_hint(&self) -> (u32, u32) {
        let width: u32 = self
            .spins
            .iter()
            .map(|s| s.button.width() + s.caption_width + 2 * self.gap)
            .sum();
        let height = self.spins.iter().map(|s| s.button.height()).max().unwrap_or(0);
        (width, height + self.heading_height())
    }

    fn expands(&self) -> bool {
        false
    }

    fn set_rect(&mut self, rect: Rect) {
        let (content_w, _) = self.size_hint();
        let mut x = rect.x + (rect.w.saturating_sub(content_w) / 2) as i32;
        let y = rect.y + self.heading_height() as i32;
        let gap = self.gap as i32;
        for spin in &mut self.spins {
            x += gap;
            spin.button.set_position(x, y);
            x += (spin.button.width() + spin.caption_width) as i32 + gap;
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        if let (Some(heading), Some(first)) = (&self.heading, self.spins.first()) {
            let y = first.button.y() - self.heading_height() as i32;
            font.render(heading).with_color(colors.text).draw(canvas, first.button.x(), y);
        }
        for spin in &self.spins {
            spin.button.draw(canvas, colors, font);
            if let Some(caption) = &spin.caption {
                let x = spin.button.x() + spin.button.width() as i32 + self.gap as i32 / 2;
                let y = spin.button.y() + ((spin.button.height() as f32 - font.line_height()) / 2.0) as i32;
                font.render(caption).with_color(colors.text).draw(canvas, x, y);
            }
        }
    }

    fn process_event(&mut self, event: &WindowEvent, pointer: (i32, i32)) -> BodyEvent {
        let mut redraw = false;
        if let WindowEvent::ButtonPress(MouseButton::Left, _) = event {
            let (px, py) = pointer;
            if let Some(i) = self.spins.iter().position(|s| s.button.contains(px, py)) {
                if i != self.current || !self.spins[i].button.has_focus() {
                    self.focus(i);
                    redraw = true;
                }
            }
        }
        for spin in &mut self.spins {
            redraw |= spin.button.process_event(event);
        }
        if !redraw {
            if let WindowEvent::KeyPress(key) = event {
                let last = self.spins.len().saturating_sub(1);
                match key.keysym {
                    keysym::LEFT if self.current > 0 => {
                        self.focus(self.current - 1);
                        redraw = true;
                    }
                    keysym::RIGHT if self.current < last => {
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
            for spin in &mut self.spins {
                spin.button.set_focus(false);
            }
        }
    }
}

fn frame_spec(ctx: &Context<'_>, text: &str) -> FrameSpec {
    let options = ctx.options;
    let buttons = if options.buttons { frame::all_buttons(options, false, true) } else { Vec::new() };
    FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons,
        check: true,
    }
}

pub(crate) fn spinbox(
    ctx: Context<'_>,
    text: &str,
    spins: Vec<Adjustment>,
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let body = SpinBody::new(&ctx, spins, None);
    let spec = frame_spec(&ctx, text);
    let separator = options.separator.as_str();
    let dialog = Dialog::open(ctx, spec, body)?;
    frame::run_accepting(dialog, options, state, |body| body.spin_line(separator))
}

pub(crate) fn timebox(
    ctx: Context<'_>,
    text: &str,
    time: Option<(u32, u32, u32)>,
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let now = chrono::Local::now().time();
    let [h, m, s] = datetime::initial_time(time, now);
    let clock = vec![
        Adjustment::new(0, 23, h as i32).with_label(":"),
        Adjustment::new(0, 59, m as i32).with_label(":"),
        Adjustment::new(0, 59, s as i32),
    ];
    let body = SpinBody::new(&ctx, clock, Some(TIME_HEADING));
    let spec = frame_spec(&ctx, text);
    let dialog = Dialog::open(ctx, spec, body)?;
    frame::run_accepting(dialog, options, state, SpinBody::time_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{KeyEvent, Modifiers};

    fn body(values: &[(i32, i32, i32)]) -> SpinBody {
        let spins = values
            .iter()
            .map(|&(min, max, value)| Spin {
                button: SpinButton::with_size(Adjustment::new(min, max, value), 40, 20),
                caption: None,
                caption_width: 0,
            })
            .collect();
        let mut body = SpinBody::with_spins(spins, None, 16, 4);
        body.set_rect(Rect {
            x: 0,
            y: 0,
            w: 200,
            h: 40,
        });
        body
    }

    fn key(keysym: u32) -> WindowEvent {
        WindowEvent::KeyPress(KeyEvent {
            keysym,
            modifiers: Modifiers::empty(),
        })
    }

    #[test]
    fn left_and_right_move_between_spins() {
        let mut b = body(&[(0, 10, 1), (0, 10, 2), (0, 10, 3)]);
        assert_eq!(b.process_event(&key(keysym::LEFT), (0, 0)), BodyEvent::Ignored);
        assert_eq!(b.process_event(&key(keysym::RIGHT), (0, 0)), BodyEvent::Redraw);
        assert_eq!(b.process_event(&key(keysym::UP), (0, 0)), BodyEvent::Redraw);
        assert_eq!(b.process_event(&key(keysym::RIGHT), (0, 0)), BodyEvent::Redraw);
        assert_eq!(b.process_event(&WindowEvent::TextInput('9'), (0, 0)), BodyEvent::Redraw);
        assert_eq!(b.spin_line("/"), "1/3/9\n");
    }

    #[test]
    fn time_wraps_per_field() {
        let mut b = body(&[(0, 23, 23), (0, 59, 59), (0, 59, 0)]);
        b.process_event(&key(keysym::UP), (0, 0));
        assert_eq!(b.time_line(), "00:59:00\n");
        b.focus(2);
        b.process_event(&key(keysym::DOWN), (0, 0));
        assert_eq!(b.time_line(), "00:59:59\n");
    }
}
