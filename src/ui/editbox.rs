//! Editable view of a whole file; OK prints the edited buffer.

use crate::{
    backend::{CursorShape, WindowEvent},
    error::Error,
    render::{Canvas, Font},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Action, Body, BodyEvent, Context, Dialog, FrameSpec, Rect, Role},
        textbox::{print_text, read_source},
        widgets::{Widget, text_area::TextArea},
    },
};

/// Columns added around the widest line.
const MARGIN_COLUMNS: f32 = 4.0;

struct EditBody {
    area: TextArea,
    hint: (u32, u32),
}

impl Body for EditBody {
    fn size_hint(&self) -> (u32, u32) {
        self.hint
    }

    fn set_rect(&mut self, rect: Rect) {
        self.area.set_position(rect.x, rect.y);
        self.area.set_size(rect.w, rect.h);
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        self.area.draw(canvas, colors, font);
    }

    // Return is a newline here, so it never reaches the default button
    fn process_event(&mut self, event: &WindowEvent, _pointer: (i32, i32)) -> BodyEvent {
        if self.area.process_event(event) { BodyEvent::Redraw } else { BodyEvent::Ignored }
    }

    fn set_focus(&mut self, focused: bool) {
        self.area.set_focus(focused);
    }

    fn cursor_shape(&self, x: i32, y: i32) -> CursorShape {
        if self.area.contains(x, y) { CursorShape::Text } else { CursorShape::Default }
    }
}

pub(crate) fn editbox(ctx: Context<'_>, path: &str, state: &mut DialogState) -> Result<(), Error> {
    let text = read_source(path)?;
    let options = ctx.options;
    let printer = options.printer.as_deref();

    let mut area = TextArea::new(&ctx.font, ctx.scale());
    area.set_text(&text);

    let cell = ctx.metrics.cell;
    let (screen_w, screen_h) = ctx.metrics.screen;
    let line_height = ctx.font.line_height().ceil();
    let width = ((area.columns() as f32 + MARGIN_COLUMNS) * cell.xmult)
        .min(screen_w as f32 - 4.0 * cell.xmult);
    let height = (area.line_count() as f32 * line_height + 8.0).min(screen_h as f32 - 10.0 * cell.ymult);
    let hint = (width.max(20.0 * cell.xmult).round() as u32, height.max(3.0 * line_height).round() as u32);
    log::debug!("editing {} lines from {path}", area.line_count());

    let buttons = if options.buttons { frame::all_buttons(options, true, true) } else { Vec::new() };
    let spec = FrameSpec {
        label: String::new(),
        separator: false,
        buttons,
        check: true,
    };
    let mut dialog = Dialog::open(ctx, spec, EditBody {
        area,
        hint,
    })?;
    if let Some(interval) = options.interval.filter(|i| !i.is_zero()) {
        state.start_timer(interval);
    }
    if let Some(timeout) = options.timeout {
        state.set_timeout(timeout);
    }
    dialog.run(state, |action, body, state| {
        let accept = |state: &mut DialogState| frame::write_result(state, &body.area.text());
        match action {
            Action::Button(Role::Print) => {
                if let Some(printer) = printer {
                    print_text(&body.area.text(), printer);
                }
                Ok(())
            }
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
    use crate::backend::{KeyEvent, Modifiers, keysym};

    fn body(text: &str) -> EditBody {
        let mut area = TextArea::with_metrics(10.0, 8.0, 1.0);
        area.set_text(text);
        let mut body = EditBody {
            area,
            hint: (200, 100),
        };
        body.set_rect(Rect {
            x: 0,
            y: 0,
            w: 200,
            h: 100,
        });
        body
    }

    #[test]
    fn return_edits_instead_of_accepting() {
        let mut body = body("first\n");
        let enter = WindowEvent::KeyPress(KeyEvent {
            keysym: keysym::RETURN,
            modifiers: Modifiers::empty(),
        });
        assert!(matches!(body.process_event(&enter, (0, 0)), BodyEvent::Redraw));
        for c in "top".chars() {
            body.process_event(&WindowEvent::TextInput(c), (0, 0));
        }
        assert_eq!(body.area.text(), "\ntopfirst\n");
    }

    #[test]
    fn unfocused_buffer_ignores_typing() {
        let mut body = body("keep");
        body.set_focus(false);
        assert!(matches!(body.process_event(&WindowEvent::TextInput('x'), (0, 0)), BodyEvent::Ignored));
        assert_eq!(body.area.text(), "keep");
        assert_eq!(body.cursor_shape(5, 5), CursorShape::Text);
        assert_eq!(body.cursor_shape(300, 5), CursorShape::Default);
    }
}
