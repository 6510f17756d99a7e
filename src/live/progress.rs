use std::io::Write;

use super::{Surface, Tick, label_word};
use crate::{
    error::Error,
    input::{ByteSource, LineReader, Poll},
    state::{DialogState, LABEL_DELIMITER, TERMINATOR},
};

/// Default number of dots for a full bar.
pub const DEFAULT_MAXDOTS: i32 = 100;

/// Raw bytes consumed before the word protocol starts.
enum Prelude {
    /// Append printable bytes to the label.
    Keep(usize),
    Skip(usize),
    Done,
}

/// A progress bar advanced by dots (any non-numeric word) or set by
/// percentages.
pub struct Progress<S> {
    reader: LineReader<S>,
    maxdots: f64,
    dots: f64,
    label: String,
    prelude: Prelude,
}

impl<S: ByteSource> Progress<S> {
    /// `msglen` bytes of leading message are read first: shown in the label
    /// when positive, discarded when negative.
    pub fn new(reader: LineReader<S>, label: &str, maxdots: i32, msglen: i32) -> Self {
        let maxdots = if maxdots > 0 { maxdots } else { DEFAULT_MAXDOTS };
        let len = msglen.unsigned_abs() as usize;
        let prelude = match msglen {
            0 => Prelude::Done,
            m if m > 0 => Prelude::Keep(len),
            _ => Prelude::Skip(len),
        };

        Self {
            reader,
            maxdots: f64::from(maxdots),
            dots: 0.0,
            label: label.to_string(),
            prelude,
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

        if !matches!(self.prelude, Prelude::Done) {
            self.read_prelude(surface);
            return Ok(Tick::Continue);
        }

        let word = match self.reader.poll_token() {
            Poll::Ready(word) => word,
            Poll::Eof => {
                state.exit_ok();
                return Ok(Tick::Stop);
            }
            Poll::WouldBlock => return Ok(Tick::Continue),
        };

        if word == TERMINATOR {
            state.exit_ok();
            return Ok(Tick::Stop);
        }
        if word == LABEL_DELIMITER || state.label().is_open() {
            label_word(&word, state, surface);
            return Ok(Tick::Continue);
        }

        if word.starts_with(|c: char| c.is_ascii_digit()) {
            self.dots = leading_number(&word) * self.maxdots / 100.0;
        } else {
            self.dots += word.chars().count() as f64;
        }

        if !(0.0..=self.maxdots).contains(&self.dots) {
            log::debug!("progress closed at {} of {} dots", self.dots, self.maxdots);
            state.exit_ok();
            return Ok(Tick::Stop);
        }

        // The caption truncates like the bar's own percentage display
        let percent = (self.dots * 100.0 / self.maxdots) as i32;
        surface.set_progress(self.dots / self.maxdots, &format!("{percent}%"));
        Ok(Tick::Continue)
    }

    fn read_prelude<W: Write>(&mut self, surface: &mut impl Surface<W>) {
        let (remaining, keep) = match self.prelude {
            Prelude::Keep(n) => (n, true),
            Prelude::Skip(n) => (n, false),
            Prelude::Done => return,
        };

        let bytes = match self.reader.poll_bytes(remaining) {
            Poll::Ready(bytes) => bytes,
            Poll::WouldBlock => return,
            Poll::Eof => {
                self.prelude = Prelude::Done;
                return;
            }
        };

        if keep {
            let text: Vec<u8> =
                bytes.iter().copied().filter(|&b| b >= b' ' || b == b'\n').collect();
            self.label.push_str(&String::from_utf8_lossy(&text));
            surface.set_label(&self.label);
        }

        let left = remaining - bytes.len().min(remaining);
        self.prelude = match (left, keep) {
            (0, _) => Prelude::Done,
            (n, true) => Prelude::Keep(n),
            (n, false) => Prelude::Skip(n),
        };
    }
}

/// Value of the leading decimal number of `word`, `0` if there is none.
fn leading_number(word: &str) -> f64 {
    let end = word
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (c == '.' && !word[..i].contains('.'))))
        .map_or(word.len(), |(i, _)| i);
    word[..end].trim_end_matches('.').parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::{ScriptedSource, Split},
        live::{LiveWidget, testing::Recorder},
        state::ExitStatus,
    };

    fn run(source: ScriptedSource, maxdots: i32, msglen: i32) -> (DialogState<Vec<u8>>, Recorder) {
        let reader = LineReader::new(source, Split::Words);
        let mut widget = LiveWidget::Progress(Progress::new(reader, "Working", maxdots, msglen));
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::default();
        state.start_timer(widget.interval());
        for _ in 0..200 {
            if widget.tick(&mut state, &mut surface).unwrap() == Tick::Stop {
                break;
            }
        }
        (state, surface)
    }

    #[test]
    fn leading_numbers() {
        assert_eq!(leading_number("42"), 42.0);
        assert_eq!(leading_number("12.5%"), 12.5);
        assert_eq!(leading_number("7abc"), 7.0);
        assert_eq!(leading_number("3.2.1"), 3.2);
        assert_eq!(leading_number("5."), 5.0);
    }

    #[test]
    fn dots_advance_by_step() {
        let (state, surface) = run(ScriptedSource::new().chunk(". .. ."), 4, 0);
        assert_eq!(surface.progress(), [(0.25, "25%"), (0.75, "75%"), (1.0, "100%")]);
        // End of stream closes.
        assert_eq!(state.exit_status(), ExitStatus::Ok);
    }

    #[test]
    fn one_hundred_dots_fill_the_default_bar() {
        let input = ". ".repeat(100);
        let (state, surface) = run(ScriptedSource::new().chunk(input).would_block(), 0, 0);
        let last = surface.progress().last().copied();
        assert_eq!(last, Some((1.0, "100%")));
        assert_eq!(surface.progress().len(), 100);
        assert_eq!(state.exit_status(), ExitStatus::Ok);
    }

    #[test]
    fn percentages_set_the_bar() {
        let (_, surface) = run(ScriptedSource::new().chunk("30 . 50%"), 10, 0);
        assert_eq!(surface.progress(), [(0.3, "30%"), (0.4, "40%"), (0.5, "50%")]);
    }

    #[test]
    fn overflow_closes_with_ok() {
        let (state, surface) = run(ScriptedSource::new().chunk("... ..").would_block(), 4, 0);
        assert_eq!(surface.progress(), [(0.75, "75%")]);
        assert_eq!(state.exit_status(), ExitStatus::Ok);
    }

    #[test]
    fn label_spans_are_not_dots() {
        let source = ScriptedSource::new().chunk("XXX Copying files XXX 40").would_block();
        let (state, surface) = run(source, 10, 0);
        assert_eq!(surface.labels(), ["Copying files"]);
        assert_eq!(surface.progress(), [(0.4, "40%")]);
        assert_eq!(state.exit_status(), ExitStatus::Ok);
    }

    #[test]
    fn captions_truncate() {
        let (_, surface) = run(ScriptedSource::new().chunk(". . .").would_block(), 3, 0);
        let captions: Vec<&str> = surface.progress().iter().map(|(_, c)| *c).collect();
        assert_eq!(captions, ["33%", "66%", "100%"]);
    }

    #[test]
    fn terminator_closes() {
        let (state, surface) = run(ScriptedSource::new().chunk("XXXX .").would_block(), 4, 0);
        assert!(surface.progress().is_empty());
        assert_eq!(state.exit_status(), ExitStatus::Ok);
    }

    #[test]
    fn positive_msglen_extends_the_label() {
        let source = ScriptedSource::new().chunk(" on disk\x07").would_block().chunk("25");
        let (_, surface) = run(source, 0, 9);
        assert_eq!(surface.labels(), ["Working on disk"]);
        assert_eq!(surface.progress(), [(0.25, "25%")]);
    }

    #[test]
    fn negative_msglen_skips_bytes() {
        let source = ScriptedSource::new().chunk("garbage 50");
        let (_, surface) = run(source, 0, -8);
        assert!(surface.labels().is_empty());
        assert_eq!(surface.progress(), [(0.5, "50%")]);
    }
}
