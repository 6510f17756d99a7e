use std::io::Write;

use super::{Surface, Tick, label_word};
use crate::{
    error::Error,
    input::{ByteSource, LineReader, Poll},
    state::{DialogState, LABEL_DELIMITER, TERMINATOR},
};

/// A percentage bar fed with numbers on standard input.
pub struct Gauge<S> {
    reader: LineReader<S>,
    ignore_eof: bool,
}

impl<S: ByteSource> Gauge<S> {
    pub fn new(reader: LineReader<S>, ignore_eof: bool) -> Self {
        Self {
            reader,
            ignore_eof,
        }
    }

    pub(super) fn tick<W: Write>(
        &mut self,
        state: &mut DialogState<W>,
        surface: &mut impl Surface<W>,
    ) -> Result<Tick, Error> {
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
        if word == LABEL_DELIMITER || state.label().is_open() {
            label_word(&word, state, surface);
            return Ok(Tick::Continue);
        }

        match parse_percent(&word) {
            Some(value) => {
                surface.set_progress(value / 100.0, &format!("{value}%"));
                Ok(Tick::Continue)
            }
            None => {
                log::debug!("gauge closed by {word:?}");
                state.exit_ok();
                Ok(Tick::Stop)
            }
        }
    }
}

/// Bar fraction and caption for the percentage given on the command line,
/// clamped to `0..=100`.
pub fn initial_percent(percent: i32) -> (f64, String) {
    let percent = percent.clamp(0, 100);
    (f64::from(percent) / 100.0, format!("{percent}%"))
}

fn parse_percent(word: &str) -> Option<f64> {
    let value: f64 = word.parse().ok()?;
    (0.0..=100.0).contains(&value).then_some(value)
}
