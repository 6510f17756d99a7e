//! xdialog - Xdialog-compatible dialog boxes for shell scripts.
//!
//! The core (input readers, dialog state, text reflow, list items and the
//! live widget state machines) is independent of the window system and
//! usable on its own; [`run`] opens the X11 window for a parsed command
//! line.

pub mod cli;
pub mod config;
pub mod datetime;
pub mod error;
pub mod input;
pub mod items;
pub mod live;
pub mod state;
pub mod text;
pub mod values;

pub(crate) mod backend;
pub(crate) mod render;
pub(crate) mod ui;

pub use cli::{Command, Invocation, Widget};
pub use config::{Env, Options};
pub use error::Error;
pub use state::{DialogState, ExitStatus};
pub use ui::{Colors, THEME_DARK, THEME_LIGHT};

use ui::{
    buildlist, calendar, combobox, editbox, frame::Context, input as input_box, list, live as live_box, message,
    scale, spin, textbox, tree,
};

/// Whether `widget` shows the `--check` button.
fn has_check(widget: &Widget) -> bool {
    !matches!(widget, Widget::Infobox { .. } | Widget::Gauge { .. } | Widget::Progress { .. })
}

/// Shows the dialog described by `invocation` and returns its exit status.
///
/// When the dialog exits through its Help button the `--help` text is shown
/// in a message box afterwards; the status stays [`ExitStatus::Help`].
pub fn run(invocation: Invocation, env: &Env) -> Result<ExitStatus, Error> {
    let Invocation {
        mut options,
        text,
        size,
        widget,
    } = invocation;
    options.apply_env(env);

    let mut state = DialogState::new(options.output.sink());
    if let Some(check) = options.check.as_ref().filter(|_| has_check(&widget)) {
        state = state.with_check(check.on);
    }

    let ctx = Context::open(&options, env, size)?;
    match widget {
        Widget::Message {
            yesno,
        } => message::message(ctx, &text, yesno, &mut state)?,
        Widget::Infobox {
            timeout,
        } => live_box::infobox(ctx, &text, timeout, &mut state)?,
        Widget::Gauge {
            percent,
        } => live_box::gauge(ctx, &text, percent, &mut state)?,
        Widget::Progress {
            maxdots,
            msglen,
        } => live_box::progress(ctx, &text, maxdots, msglen, &mut state)?,
        Widget::Tailbox => live_box::tailbox(ctx, &text, &mut state)?,
        Widget::Logbox => live_box::logbox(ctx, &text, &mut state)?,
        Widget::Textbox => textbox::textbox(ctx, &text, &mut state)?,
        Widget::Input {
            fields,
        } => input_box::inputbox(ctx, &text, &fields, &mut state)?,
        Widget::List {
            kind,
            list_height,
            items,
        } => list::list(ctx, &text, kind, list_height, items, &mut state)?,
        Widget::Buildlist {
            list_height,
            items,
        } => buildlist::buildlist(ctx, &text, list_height, items, &mut state)?,
        Widget::Treeview {
            list_height,
            items,
        } => tree::treeview(ctx, &text, list_height, items, &mut state)?,
        Widget::Editbox => editbox::editbox(ctx, &text, &mut state)?,
        Widget::Combobox {
            entries,
        } => combobox::combobox(ctx, &text, entries, &mut state)?,
        Widget::Rangebox {
            ranges,
        } => scale::rangebox(ctx, &text, ranges, &mut state)?,
        Widget::Spinbox {
            spins,
        } => spin::spinbox(ctx, &text, spins, &mut state)?,
        Widget::Calendar {
            day,
            month,
            year,
        } => calendar::calendar(ctx, &text, day, month, year, &mut state)?,
        Widget::Timebox {
            time,
        } => spin::timebox(ctx, &text, time, &mut state)?,
    }

    let status = state.exit_status();
    log::debug!("dialog finished with {status:?}");
    if status == ExitStatus::Help {
        if let Some(help) = options.help.as_deref() {
            message::help_box(&options, env, help)?;
        }
    }
    Ok(status)
}
