//! Per-dialog state and the exit paths shared by every dialog.

use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

/// Upper bound of the label-span accumulator, in bytes.
pub const MAX_LABEL_LENGTH: usize = 2048;

/// Token that opens and closes a label span.
pub const LABEL_DELIMITER: &str = "XXX";

/// Token that terminates a live dialog.
pub const TERMINATOR: &str = "XXXX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// OK, Yes or Next.
    Ok,
    /// Cancel or No.
    Cancel,
    Help,
    /// Extra button or Previous.
    Extra,
    /// Window closed, timeout or error.
    Closed,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Cancel => 1,
            ExitStatus::Help => 2,
            ExitStatus::Extra => 3,
            ExitStatus::Closed => 255,
        }
    }
}

/// Where results are printed.
pub enum Sink {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
}

impl Sink {
    pub fn stdout() -> Self {
        Sink::Stdout(io::stdout())
    }

    pub fn stderr() -> Self {
        Sink::Stderr(io::stderr())
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout(s) => s.write(buf),
            Sink::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout(s) => s.flush(),
            Sink::Stderr(s) => s.flush(),
        }
    }
}

/// Accumulates the words between two `XXX` tokens.
#[derive(Debug, Default)]
pub struct LabelSpan {
    open: bool,
    text: String,
}

impl LabelSpan {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens a span, or closes the current one and returns its text.
    pub fn toggle(&mut self) -> Option<String> {
        if self.open {
            self.open = false;
            Some(std::mem::take(&mut self.text))
        } else {
            self.open = true;
            self.text.clear();
            None
        }
    }

    /// Appends a word. `\n` appends a line break. Words that would overflow
    /// [`MAX_LABEL_LENGTH`] are dropped.
    pub fn push(&mut self, token: &str) {
        let (piece, sep) = if token == "\\n" {
            ("\n", "")
        } else if self.text.is_empty() || self.text.ends_with('\n') {
            (token, "")
        } else {
            (token, " ")
        };

        if self.text.len() + sep.len() + piece.len() > MAX_LABEL_LENGTH {
            log::debug!("label span full, dropping {} bytes", piece.len());
            return;
        }
        self.text.push_str(sep);
        self.text.push_str(piece);
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Mutable state of one running dialog.
pub struct DialogState<W = Sink> {
    output: W,
    label: LabelSpan,
    timer: Option<Duration>,
    deadline: Option<Instant>,
    check: Option<bool>,
    exit: ExitStatus,
    finished: bool,
}

impl<W: Write> DialogState<W> {
    /// A fresh dialog. Until an exit path runs the status is
    /// [`ExitStatus::Closed`].
    pub fn new(output: W) -> Self {
        Self {
            output,
            label: LabelSpan::default(),
            timer: None,
            deadline: None,
            check: None,
            exit: ExitStatus::Closed,
            finished: false,
        }
    }

    /// Shows a check button in the given initial state.
    pub fn with_check(mut self, checked: bool) -> Self {
        self.check = Some(checked);
        self
    }

    pub fn start_timer(&mut self, interval: Duration) {
        if !self.finished {
            self.timer = Some(interval);
        }
    }

    pub fn cancel_timer(&mut self) {
        self.timer = None;
    }

    pub fn timer(&self) -> Option<Duration> {
        self.timer
    }

    pub fn timer_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Arms the `--timeout` deadline.
    pub fn set_timeout(&mut self, after: Duration) {
        self.deadline = Some(Instant::now() + after);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn timed_out(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn checked(&self) -> Option<bool> {
        self.check
    }

    pub fn set_checked(&mut self, checked: bool) {
        if self.check.is_some() {
            self.check = Some(checked);
        }
    }

    pub fn label(&self) -> &LabelSpan {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut LabelSpan {
        &mut self.label
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.exit
    }

    pub fn exit_ok(&mut self) {
        self.finish_with_check(ExitStatus::Ok);
    }

    pub fn exit_extra(&mut self) {
        self.finish_with_check(ExitStatus::Extra);
    }

    pub fn exit_cancel(&mut self) {
        self.finish(ExitStatus::Cancel);
    }

    pub fn exit_help(&mut self) {
        self.finish(ExitStatus::Help);
    }

    /// The wizard's Previous button.
    pub fn exit_previous(&mut self) {
        self.finish(ExitStatus::Extra);
    }

    pub fn timeout_exit(&mut self) {
        if !self.finished {
            log::debug!("dialog timed out");
        }
        self.finish(ExitStatus::Closed);
    }

    pub fn window_closed(&mut self) {
        self.finish(ExitStatus::Closed);
    }

    fn finish_with_check(&mut self, status: ExitStatus) {
        if self.finished {
            return;
        }
        if let Some(checked) = self.check {
            let word = if checked { "checked" } else { "unchecked" };
            if let Err(e) = writeln!(self.output, "{word}") {
                log::warn!("cannot print check button state: {e}");
            }
        }
        self.finish(status);
    }

    fn finish(&mut self, status: ExitStatus) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.exit = status;
        self.timer = None;
        if let Err(e) = self.output.flush() {
            log::warn!("cannot flush output: {e}");
        }
    }
}
