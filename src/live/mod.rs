//! Live dialogs: widgets updated from a stream while the window is open.
//!
//! Each widget is a small state machine driven by a periodic tick. A tick
//! first lets the window process its pending events (which may run an exit
//! path), then consumes whatever input is available without blocking and
//! pushes the result to the [`Surface`].

mod gauge;
mod infobox;
mod logbox;
mod progress;
mod tailbox;

use std::{io::Write, time::Duration};

pub use gauge::{Gauge, initial_percent};
pub use infobox::Infobox;
pub use logbox::{
    AnsiColor, LOG_LINE_MAX, LogOptions, LogRow, Logbox, StampFormat, parse_vt_colors, strip_vt,
};
pub use progress::Progress;
pub use tailbox::{TAIL_CHUNK, Tailbox};

use crate::{
    error::Error,
    input::ByteSource,
    state::{DialogState, LABEL_DELIMITER},
};

/// Default tick interval.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// The display side of a live dialog.
pub trait Surface<W: Write> {
    /// Processes pending window events and returns whether the dialog timer
    /// is still registered.
    fn pump(&mut self, state: &mut DialogState<W>) -> Result<bool, Error>;

    fn set_label(&mut self, text: &str);

    fn set_progress(&mut self, fraction: f64, caption: &str);

    fn append_text(&mut self, text: &str);

    fn push_log(&mut self, row: LogRow, reverse: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

pub enum LiveWidget<S> {
    Infobox(Infobox<S>),
    Gauge(Gauge<S>),
    Progress(Progress<S>),
    Tailbox(Tailbox<S>),
    Logbox(Logbox<S>),
}

impl<S: ByteSource> LiveWidget<S> {
    pub fn tick<W: Write>(
        &mut self,
        state: &mut DialogState<W>,
        surface: &mut impl Surface<W>,
    ) -> Result<Tick, Error> {
        match self {
            LiveWidget::Infobox(w) => w.tick(state, surface),
            LiveWidget::Gauge(w) => w.tick(state, surface),
            LiveWidget::Progress(w) => w.tick(state, surface),
            LiveWidget::Tailbox(w) => w.tick(state, surface),
            LiveWidget::Logbox(w) => w.tick(state, surface),
        }
    }

    /// Interval to register the timer with when the dialog opens.
    pub fn interval(&self) -> Duration {
        match self {
            LiveWidget::Infobox(w) => w.timeout().unwrap_or(TICK_INTERVAL),
            _ => TICK_INTERVAL,
        }
    }
}

/// Feeds a word to the label span. Closing the span updates the label.
fn label_word<W: Write>(word: &str, state: &mut DialogState<W>, surface: &mut impl Surface<W>) {
    if word == LABEL_DELIMITER {
        if let Some(text) = state.label_mut().toggle() {
            log::debug!("new label: {text:?}");
            surface.set_label(&text);
        }
    } else {
        state.label_mut().push(word);
    }
}
