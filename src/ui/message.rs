//! Message and yes/no boxes, and the box showing `--help` text.

use crate::{
    cli::BoxSize,
    config::{Env, Options},
    error::Error,
    state::DialogState,
    ui::frame::{self, Action, Context, Dialog, FrameSpec},
};

pub(crate) fn message(
    ctx: Context<'_>,
    text: &str,
    yesno: bool,
    state: &mut DialogState,
) -> Result<(), Error> {
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons: frame::message_buttons(ctx.options, yesno),
        check: true,
    };
    if let Some(timeout) = ctx.options.timeout {
        state.set_timeout(timeout);
    }
    let mut dialog = Dialog::open(ctx, spec, ())?;
    dialog.run(state, |action, _, state| {
        match action {
            Action::Button(role) => frame::activate(role, state, |_| Ok(())),
            Action::Return => {
                state.exit_ok();
                Ok(())
            }
            Action::Activate | Action::Tick => Ok(()),
        }
    })?;
    dialog.close(state)
}

/// Options for the box showing the help text of a dialog that exited
/// through its Help button.
pub(crate) fn help_options(options: &Options) -> Options {
    Options {
        help: None,
        check: None,
        timeout: None,
        backtitle: None,
        wizard: false,
        extra_button: false,
        ok_label: None,
        beep_before: false,
        ..options.clone()
    }
}

/// Shows `text` in a plain message box. Nothing is printed and the exit
/// status of the dialog that asked for help is kept.
pub(crate) fn help_box(options: &Options, env: &Env, text: &str) -> Result<(), Error> {
    let options = help_options(options);
    let ctx = Context::open(&options, env, BoxSize::default())?;
    let mut state = DialogState::new(options.output.sink());
    message(ctx, text, false, &mut state)
}
