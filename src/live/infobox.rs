use std::{io::Write, time::Duration};

use super::{Surface, Tick, label_word};
use crate::{
    error::Error,
    input::{ByteSource, LineReader, Poll},
    state::{DialogState, TERMINATOR},
};

/// An information box that either disappears after a timeout or takes its
/// label updates from standard input.
pub struct Infobox<S> {
    reader: LineReader<S>,
    timeout: Option<Duration>,
    ignore_eof: bool,
}

impl<S: ByteSource> Infobox<S> {
    /// A zero timeout means the box is driven by its input.
    pub fn new(reader: LineReader<S>, timeout: Duration, ignore_eof: bool) -> Self {
        Self {
            reader,
            timeout: (!timeout.is_zero()).then_some(timeout),
            ignore_eof,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(super) fn tick<W: Write>(
        &mut self,
        state: &mut DialogState<W>,
        surface: &mut impl Surface<W>,
    ) -> Result<Tick, Error> {
        if self.timeout.is_some() {
            state.exit_ok();
            return Ok(Tick::Stop);
        }
        if !surface.pump(state)? {
            return Ok(Tick::Stop);
        }

        let word = match self.reader.poll_token() {
            Poll::Ready(word) => word,
            Poll::Eof if !self.ignore_eof => {
                state.exit_ok();
                return Ok(Tick::Stop);
            }
            Poll::Eof | Poll::WouldBlock => return Ok(Tick::Continue),
        };

        if word == TERMINATOR {
            state.exit_ok();
            return Ok(Tick::Stop);
        }
        label_word(&word, state, surface);
        Ok(Tick::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::{ScriptedSource, Split},
        live::{LiveWidget, testing::Recorder},
        state::ExitStatus,
    };

    fn infobox(source: ScriptedSource, ignore_eof: bool) -> LiveWidget<ScriptedSource> {
        LiveWidget::Infobox(Infobox::new(
            LineReader::new(source, Split::Words),
            Duration::ZERO,
            ignore_eof,
        ))
    }

    fn run(
        widget: &mut LiveWidget<ScriptedSource>,
        state: &mut DialogState<Vec<u8>>,
        surface: &mut Recorder,
        max_ticks: usize,
    ) -> usize {
        state.start_timer(widget.interval());
        for n in 1..=max_ticks {
            if widget.tick(state, surface).unwrap() == Tick::Stop {
                return n;
            }
        }
        max_ticks
    }

    #[test]
    fn timeout_closes_on_first_tick() {
        let reader = LineReader::new(ScriptedSource::new().chunk("XXX"), Split::Words);
        let mut widget = LiveWidget::Infobox(Infobox::new(reader, Duration::from_secs(2), false));
        assert_eq!(widget.interval(), Duration::from_secs(2));

        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::default();
        assert_eq!(run(&mut widget, &mut state, &mut surface, 5), 1);
        assert_eq!(state.exit_status(), ExitStatus::Ok);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn label_spans_update_the_label() {
        let source = ScriptedSource::new()
            .chunk("XXX\nHello\nthere\nXXX\n")
            .would_block()
            .chunk("XXX second XXX\nXXXX\n");
        let mut widget = infobox(source, false);
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::default();

        run(&mut widget, &mut state, &mut surface, 50);
        assert_eq!(surface.labels(), ["Hello there", "second"]);
        assert_eq!(state.exit_status(), ExitStatus::Ok);
        assert!(!state.timer_active());
    }

    #[test]
    fn terminator_wins_over_open_span() {
        let source = ScriptedSource::new().chunk("XXX partial XXXX more").would_block();
        let mut widget = infobox(source, false);
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::default();

        run(&mut widget, &mut state, &mut surface, 50);
        assert!(surface.labels().is_empty());
        assert_eq!(state.exit_status(), ExitStatus::Ok);
    }

    #[test]
    fn eof_closes_unless_ignored() {
        let mut widget = infobox(ScriptedSource::new().chunk("word"), false);
        let mut state = DialogState::new(Vec::new());
        run(&mut widget, &mut state, &mut Recorder::default(), 10);
        assert!(state.is_finished());

        let mut widget = infobox(ScriptedSource::new().chunk("word"), true);
        let mut state = DialogState::new(Vec::new());
        run(&mut widget, &mut state, &mut Recorder::default(), 10);
        assert!(!state.is_finished());
        assert!(state.timer_active());
    }

    #[test]
    fn cancelled_timer_stops_before_reading() {
        let source = ScriptedSource::new().chunk("XXX a XXX\n");
        let mut widget = infobox(source, true);
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::cancelling_at(1);

        assert_eq!(run(&mut widget, &mut state, &mut surface, 10), 1);
        assert_eq!(state.exit_status(), ExitStatus::Cancel);
        assert!(surface.calls.is_empty());
    }
}
