//! Input boxes with one to three entries.

use std::io::Write;

use crate::{
    backend::{MouseButton, WindowEvent, keysym},
    cli::InputField,
    error::Error,
    render::{Canvas, Font},
    state::{DialogState, MAX_LABEL_LENGTH},
    text::trim_string,
    ui::{
        Colors,
        frame::{self, Action, Body, BodyEvent, Context, Dialog, FrameSpec, Rect, Role},
        widgets::{Widget, text_input::TextInput, toggle::Toggle},
    },
};

const HIDE_TYPING: &str = "Hide typing";
const MIN_ENTRY_COLUMNS: f32 = 30.0;

struct Entry {
    label: Option<String>,
    input: TextInput,
    masked: bool,
}

struct InputBody {
    entries: Vec<Entry>,
    hide: Option<Toggle>,
    current: usize,
    line_height: u32,
    gap: u32,
    min_width: u32,
    label_width: u32,
}

impl InputBody {
    fn new(ctx: &Context<'_>, fields: &[InputField]) -> Self {
        let font = &ctx.font;
        let cell = ctx.metrics.cell;
        let masking = ctx.options.password;
        let count = fields.len();
        let entry_height = (cell.ymult * 1.5).round() as u32;

        let entries: Vec<Entry> = fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let mut input = TextInput::new(0, entry_height).with_default_text(&field.init);
                let masked = masking.hides(i, count);
                input.set_masked(masked);
                input.set_focus(i == 0);
                let label = field.label.as_deref();
                Entry {
                    label: label.map(|l| trim_string(l, ctx.options.cr_wrap, MAX_LABEL_LENGTH)),
                    input,
                    masked,
                }
            })
            .collect();

        let hide = masking
            .has_toggle(count)
            .then(|| Toggle::new(HIDE_TYPING, true, font, ctx.scale()));
        let label_width = entries
            .iter()
            .filter_map(|e| e.label.as_deref())
            .map(|l| font.render(l).measure().0.ceil() as u32)
            .max()
            .unwrap_or(0);

        Self {
            entries,
            hide,
            current: 0,
            line_height: font.line_height().ceil() as u32,
            gap: (cell.ymult / 4.0).round() as u32,
            min_width: (MIN_ENTRY_COLUMNS * cell.xmult).round() as u32,
            label_width,
        }
    }

    fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.input.text()).collect()
    }

    fn apply_mask(&mut self, hidden: bool) {
        for entry in &mut self.entries {
            if entry.masked {
                entry.input.set_masked(hidden);
            }
        }
    }

    fn focus(&mut self, index: usize) {
        self.current = index;
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.input.set_focus(i == index);
        }
    }
}

impl Body for InputBody {
    fn size_hint(&self) -> (u32, u32) {
        let mut height = 0;
        for entry in &self.entries {
            if entry.label.is_some() {
                height += self.line_height + self.gap;
            }
            height += entry.input.height() + self.gap;
        }
        let mut width = self.min_width.max(self.label_width);
        if let Some(toggle) = &self.hide {
            height += toggle.height() + self.gap;
            width = width.max(toggle.width());
        }
        (width, height)
    }

    fn expands(&self) -> bool {
        false
    }

    fn set_rect(&mut self, rect: Rect) {
        let mut y = rect.y;
        for entry in &mut self.entries {
            if entry.label.is_some() {
                y += (self.line_height + self.gap) as i32;
            }
            entry.input.set_position(rect.x, y);
            entry.input.set_width(rect.w);
            y += (entry.input.height() + self.gap) as i32;
        }
        if let Some(toggle) = self.hide.as_mut() {
            toggle.set_position(rect.x, y);
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        for entry in &self.entries {
            if let Some(label) = &entry.label {
                let y = entry.input.y() - (self.line_height + self.gap) as i32;
                font.render(label).with_color(colors.text).draw(canvas, entry.input.x(), y);
            }
            entry.input.draw(canvas, colors, font);
        }
        if let Some(toggle) = &self.hide {
            toggle.draw(canvas, colors, font);
        }
    }

    fn process_event(&mut self, event: &WindowEvent, pointer: (i32, i32)) -> BodyEvent {
        let mut redraw = false;
        if let Some(toggle) = self.hide.as_mut() {
            if toggle.click(event, pointer.0, pointer.1) && toggle.was_toggled() {
                let hidden = toggle.is_on();
                self.apply_mask(hidden);
                return BodyEvent::Redraw;
            }
        }

        if let WindowEvent::ButtonPress(MouseButton::Left, _) = event {
            let (px, py) = pointer;
            if let Some(i) = self.entries.iter().position(|e| e.input.contains(px, py)) {
                self.focus(i);
                redraw = true;
            }
        }

        if let Some(entry) = self.entries.get_mut(self.current) {
            if entry.input.process_event(event) {
                if entry.input.was_submitted() {
                    return BodyEvent::Activate;
                }
                return BodyEvent::Redraw;
            }
        }

        if let WindowEvent::KeyPress(key) = event {
            let last = self.entries.len().saturating_sub(1);
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
        if redraw { BodyEvent::Redraw } else { BodyEvent::Ignored }
    }

    fn set_focus(&mut self, focused: bool) {
        if focused {
            self.focus(self.current);
        } else {
            for entry in &mut self.entries {
                entry.input.set_focus(false);
            }
        }
    }
}

/// The line printed for the entries: their texts joined by `separator`.
pub(crate) fn entries_line(texts: &[&str], separator: &str) -> String {
    let mut line = texts.join(separator);
    line.push('\n');
    line
}

fn print_entries<W: Write>(
    body: &InputBody,
    separator: &str,
    state: &mut DialogState<W>,
) -> Result<(), Error> {
    let line = entries_line(&body.texts(), separator);
    state.output().write_all(line.as_bytes())?;
    state.output().flush()?;
    Ok(())
}

pub(crate) fn inputbox(
    ctx: Context<'_>,
    text: &str,
    fields: &[InputField],
    state: &mut DialogState,
) -> Result<(), Error> {
    let options = ctx.options;
    let body = InputBody::new(&ctx, fields);
    let buttons = if options.buttons { frame::all_buttons(options, false, true) } else { Vec::new() };
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons,
        check: true,
    };
    let separator = options.separator.as_str();
    let default_no = options.default_no;

    let mut dialog = Dialog::open(ctx, spec, body)?;
    if let Some(interval) = options.interval.filter(|i| !i.is_zero()) {
        state.start_timer(interval);
    }
    if let Some(timeout) = options.timeout {
        state.set_timeout(timeout);
    }
    dialog.run(state, |action, body, state| {
        match action {
            Action::Button(role @ (Role::Ok | Role::Next)) => {
                frame::activate(role, state, |state| print_entries(body, separator, state))
            }
            Action::Button(role) => frame::activate(role, state, |_| Ok(())),
            Action::Activate | Action::Return => {
                if default_no {
                    state.exit_cancel();
                } else {
                    print_entries(body, separator, state)?;
                    state.exit_ok();
                }
                Ok(())
            }
            Action::Tick => print_entries(body, separator, state),
        }
    })?;
    dialog.close(state)
}
