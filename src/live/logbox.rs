use std::io::Write;

use chrono::{Local, NaiveDateTime};

use super::{Surface, Tick};
use crate::{
    error::Error,
    input::{ByteSource, LineReader, Poll},
    state::{DialogState, MAX_LABEL_LENGTH},
};

/// Longest log line; longer lines are split.
pub const LOG_LINE_MAX: usize = MAX_LABEL_LENGTH;

const COLOR_INTRO: &str = "\x1b[1;";
const CSI: &str = "\x1b[";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl AnsiColor {
    fn from_index(index: u8) -> Option<Self> {
        Some(match index {
            0 => AnsiColor::Black,
            1 => AnsiColor::Red,
            2 => AnsiColor::Green,
            3 => AnsiColor::Yellow,
            4 => AnsiColor::Blue,
            5 => AnsiColor::Magenta,
            6 => AnsiColor::Cyan,
            7 => AnsiColor::White,
            _ => return None,
        })
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            AnsiColor::Black => (0, 0, 0),
            AnsiColor::Red => (0xff, 0, 0),
            AnsiColor::Green => (0, 0xff, 0),
            AnsiColor::Yellow => (0xff, 0xff, 0),
            AnsiColor::Blue => (0, 0, 0xff),
            AnsiColor::Magenta => (0xff, 0, 0xff),
            AnsiColor::Cyan => (0, 0xff, 0xff),
            AnsiColor::White => (0xff, 0xff, 0xff),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampFormat {
    Time,
    DateTime,
}

impl StampFormat {
    pub fn render(self, at: NaiveDateTime) -> String {
        match self {
            StampFormat::Time => at.format("%H:%M:%S").to_string(),
            StampFormat::DateTime => at.format("%d/%m/%Y %H:%M:%S").to_string(),
        }
    }
}

/// One row of the log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub text: String,
    pub fg: Option<AnsiColor>,
    pub bg: Option<AnsiColor>,
    pub stamp: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    /// New rows go on top.
    pub reverse: bool,
    /// Colours carry over to following lines until changed.
    pub keep_colors: bool,
    pub stamp: Option<StampFormat>,
}

/// Applies the colour codes of the first `ESC[1;...m` sequence in `line`.
/// Returns whether such a sequence was found.
pub fn parse_vt_colors(
    line: &str,
    fg: &mut Option<AnsiColor>,
    bg: &mut Option<AnsiColor>,
) -> bool {
    let Some(start) = line.find(COLOR_INTRO) else {
        return false;
    };
    let rest = &line[start + COLOR_INTRO.len()..];
    let params = rest.split('m').next().unwrap_or_default();

    for code in params.split(';').filter_map(|p| p.trim().parse::<u8>().ok()) {
        match code {
            30..=37 => *fg = AnsiColor::from_index(code - 30),
            38 => *fg = None,
            40..=47 => *bg = AnsiColor::from_index(code - 40),
            48 => *bg = None,
            _ => {}
        }
    }
    true
}

/// Removes every `ESC[...m` sequence. An unterminated sequence runs to the
/// end of the line.
pub fn strip_vt(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find(CSI) {
        out.push_str(&rest[..start]);
        rest = match rest[start..].find('m') {
            Some(end) => &rest[start + end + 1..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

/// Appends lines from a file or standard input to a list of log rows.
pub struct Logbox<S> {
    reader: LineReader<S>,
    options: LogOptions,
    pending_initial: u64,
    fg: Option<AnsiColor>,
    bg: Option<AnsiColor>,
}

impl<S: ByteSource> Logbox<S> {
    /// The reader should split lines and hold [`LOG_LINE_MAX`] bytes.
    pub fn new(reader: LineReader<S>, initial_len: u64, options: LogOptions) -> Self {
        Self {
            reader,
            options,
            pending_initial: initial_len,
            fg: None,
            bg: None,
        }
    }

    pub(super) fn tick<W: Write>(
        &mut self,
        state: &mut DialogState<W>,
        surface: &mut impl Surface<W>,
    ) -> Result<Tick, Error> {
        if !surface.pump(state)? && self.pending_initial == 0 {
            return Ok(Tick::Stop);
        }

        loop {
            let before = self.reader.consumed();
            let Poll::Ready(line) = self.reader.poll_token() else {
                break;
            };
            let used = self.reader.consumed() - before;
            self.pending_initial = self.pending_initial.saturating_sub(used);
            let row = self.row(&line, Local::now().naive_local());
            surface.push_log(row, self.options.reverse);

            if !surface.pump(state)? && self.pending_initial == 0 {
                return Ok(Tick::Stop);
            }
        }
        Ok(Tick::Continue)
    }

    fn row(&mut self, line: &str, now: NaiveDateTime) -> LogRow {
        let mut fg = if self.options.keep_colors { self.fg } else { None };
        let mut bg = if self.options.keep_colors { self.bg } else { None };

        let text = if line.contains(CSI) {
            parse_vt_colors(line, &mut fg, &mut bg);
            strip_vt(line)
        } else {
            line.to_string()
        };

        self.fg = fg;
        self.bg = bg;

        LogRow {
            text,
            fg,
            bg,
            stamp: self.options.stamp.map(|s| s.render(now)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        input::{ScriptedSource, Split},
        live::{LiveWidget, testing::Recorder},
    };

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap().and_hms_opt(9, 5, 2).unwrap()
    }

    fn logbox(source: ScriptedSource, options: LogOptions) -> Logbox<ScriptedSource> {
        Logbox::new(LineReader::with_capacity(source, Split::Lines, LOG_LINE_MAX), 0, options)
    }

    #[test]
    fn colour_codes() {
        let (mut fg, mut bg) = (None, None);
        assert!(parse_vt_colors("\x1b[1;31;44mError\x1b[0m", &mut fg, &mut bg));
        assert_eq!(fg, Some(AnsiColor::Red));
        assert_eq!(bg, Some(AnsiColor::Blue));

        assert!(parse_vt_colors("\x1b[1;38;48m", &mut fg, &mut bg));
        assert_eq!((fg, bg), (None, None));

        assert!(!parse_vt_colors("\x1b[0;32mplain", &mut fg, &mut bg));
        assert_eq!(fg, None);
    }

    #[test]
    fn sequences_are_stripped() {
        assert_eq!(strip_vt("\x1b[1;31mError\x1b[0m: disk"), "Error: disk");
        assert_eq!(strip_vt("no colour"), "no colour");
        assert_eq!(strip_vt("cut \x1b[1;3"), "cut ");
    }

    #[test]
    fn stamps() {
        assert_eq!(StampFormat::Time.render(at()), "09:05:02");
        assert_eq!(StampFormat::DateTime.render(at()), "07/03/2024 09:05:02");
    }

    #[test]
    fn rows_carry_colours_only_when_kept() {
        let mut plain = logbox(ScriptedSource::new(), LogOptions::default());
        let first = plain.row("\x1b[1;32mok\x1b[0m", at());
        assert_eq!(first.fg, Some(AnsiColor::Green));
        assert_eq!(first.text, "ok");
        assert_eq!(plain.row("next", at()).fg, None);

        let mut kept = logbox(
            ScriptedSource::new(),
            LogOptions {
                keep_colors: true,
                ..LogOptions::default()
            },
        );
        kept.row("\x1b[1;33;40mwarn", at());
        let next = kept.row("next", at());
        assert_eq!(next.fg, Some(AnsiColor::Yellow));
        assert_eq!(next.bg, Some(AnsiColor::Black));
    }

    #[test]
    fn rows_get_stamped() {
        let mut widget = logbox(
            ScriptedSource::new(),
            LogOptions {
                stamp: Some(StampFormat::Time),
                ..LogOptions::default()
            },
        );
        assert_eq!(widget.row("line", at()).stamp.as_deref(), Some("09:05:02"));
    }

    #[test]
    fn every_line_becomes_a_row() {
        let source = ScriptedSource::new()
            .chunk("one\ntw")
            .would_block()
            .chunk("o\n\x1b[1;31mthree\n");
        let options = LogOptions {
            reverse: true,
            ..LogOptions::default()
        };
        let mut widget = LiveWidget::Logbox(logbox(source, options));
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::default();
        state.start_timer(widget.interval());

        for _ in 0..5 {
            assert_eq!(widget.tick(&mut state, &mut surface).unwrap(), Tick::Continue);
        }
        let texts: Vec<_> = surface.logs().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
        assert_eq!(surface.logs()[2].fg, Some(AnsiColor::Red));
        assert!(!state.is_finished());
    }

    #[test]
    fn initial_content_is_counted_in_raw_bytes() {
        // Replacement characters are wider than the bytes they stand for and
        // forced splits consume no newline.
        let content: &[u8] = b"\xff\xff\xff\nabcdefgh\n";
        let source = ScriptedSource::new().chunk(content);
        let reader = LineReader::with_capacity(source, Split::Lines, 4);
        let logbox = Logbox::new(reader, content.len() as u64, LogOptions::default());
        let mut widget = LiveWidget::Logbox(logbox);
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::cancelling_at(1);
        state.start_timer(widget.interval());

        assert_eq!(widget.tick(&mut state, &mut surface).unwrap(), Tick::Stop);
        let texts: Vec<_> = surface.logs().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["\u{fffd}\u{fffd}\u{fffd}", "abcd", "efgh", ""]);
    }

    #[test]
    fn cancel_stops_reading() {
        let source = ScriptedSource::new().chunk("one\ntwo\nthree\n");
        let mut widget = LiveWidget::Logbox(logbox(source, LogOptions::default()));
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::cancelling_at(2);
        state.start_timer(widget.interval());

        assert_eq!(widget.tick(&mut state, &mut surface).unwrap(), Tick::Stop);
        assert_eq!(surface.logs().len(), 1);
    }
}
