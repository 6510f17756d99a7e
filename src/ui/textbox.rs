//! Read-only viewer for a whole file.

use std::{
    io::{Read, Write},
    path::PathBuf,
    process::{Command, Stdio},
};

use crate::{
    backend::WindowEvent,
    error::Error,
    render::{Canvas, Font},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Action, Body, BodyEvent, Context, Dialog, FrameSpec, Rect, Role},
        widgets::{Widget, text_view::TextView},
    },
};

/// Columns added around the widest line.
const MARGIN_COLUMNS: f32 = 4.0;

struct TextBody {
    view: TextView,
    hint: (u32, u32),
}

impl Body for TextBody {
    fn size_hint(&self) -> (u32, u32) {
        self.hint
    }

    fn set_rect(&mut self, rect: Rect) {
        self.view.set_position(rect.x, rect.y);
        self.view.set_size(rect.w, rect.h);
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        self.view.draw(canvas, colors, font);
    }

    fn process_event(&mut self, event: &WindowEvent, _pointer: (i32, i32)) -> BodyEvent {
        if self.view.process_event(event) { BodyEvent::Redraw } else { BodyEvent::Ignored }
    }
}

/// Reads `path`, or standard input for `-`.
pub(crate) fn read_source(path: &str) -> Result<String, Error> {
    let mut bytes = Vec::new();
    let result = if path == "-" {
        std::io::stdin().lock().read_to_end(&mut bytes)
    } else {
        std::fs::File::open(path).and_then(|mut f| f.read_to_end(&mut bytes))
    };
    result.map_err(|source| {
        Error::Open {
            path: PathBuf::from(path),
            source,
        }
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Sends `text` to `lpr`, with `-P<printer>` unless `printer` is empty.
/// Failures are logged and otherwise ignored.
pub(crate) fn print_text(text: &str, printer: &str) {
    let mut command = Command::new("lpr");
    if !printer.is_empty() {
        command.arg(format!("-P{printer}"));
    }
    let child = command.stdin(Stdio::piped()).stdout(Stdio::null()).spawn();
    let mut child = match child {
        Ok(child) => child,
        Err(e) => {
            log::warn!("cannot run lpr: {e}");
            return;
        }
    };
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            log::warn!("cannot send text to lpr: {e}");
        }
    }
    match child.wait() {
        Ok(status) if !status.success() => log::warn!("lpr exited with {status}"),
        Ok(_) => log::debug!("printed {} bytes", text.len()),
        Err(e) => log::warn!("cannot wait for lpr: {e}"),
    }
}

pub(crate) fn textbox(ctx: Context<'_>, path: &str, state: &mut DialogState) -> Result<(), Error> {
    let text = read_source(path)?;
    let options = ctx.options;
    let printer = options.printer.as_deref();

    let mut view = TextView::new(&ctx.font, ctx.scale());
    view.set_text(&text);

    let cell = ctx.metrics.cell;
    let (screen_w, screen_h) = ctx.metrics.screen;
    let line_height = ctx.font.line_height().ceil();
    let width = ((view.columns() as f32 + MARGIN_COLUMNS) * cell.xmult)
        .min(screen_w as f32 - 4.0 * cell.xmult);
    let height = (view.rows().len() as f32 * line_height + 8.0).min(screen_h as f32 - 10.0 * cell.ymult);
    let hint = (width.max(cell.xmult).round() as u32, height.max(line_height).round() as u32);

    let mut framed = options.clone();
    if ctx.env.dialog_compat {
        framed.cancel_button = false;
    }
    let buttons = if framed.buttons { frame::all_buttons(&framed, true, true) } else { Vec::new() };
    let default_no = options.default_no;

    let spec = FrameSpec {
        label: String::new(),
        separator: false,
        buttons,
        check: true,
    };
    let mut dialog = Dialog::open(ctx, spec, TextBody {
        view,
        hint,
    })?;
    if let Some(timeout) = options.timeout {
        state.set_timeout(timeout);
    }
    dialog.run(state, |action, body, state| {
        match action {
            Action::Button(Role::Print) => {
                if let Some(printer) = printer {
                    print_text(&body.view.text(), printer);
                }
                Ok(())
            }
            Action::Button(role) => frame::activate(role, state, |_| Ok(())),
            Action::Return => {
                if default_no {
                    state.exit_cancel();
                } else {
                    state.exit_ok();
                }
                Ok(())
            }
            Action::Activate | Action::Tick => Ok(()),
        }
    })?;
    dialog.close(state)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn reads_files_lossily() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"caf\xe9\nline two\n").unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(read_source(path).unwrap(), "caf\u{fffd}\nline two\n");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_source("/nonexistent/xdialog-textbox").unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/xdialog-textbox"));
    }
}
