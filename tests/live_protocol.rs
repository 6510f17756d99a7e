//! Drives the live widgets through the public API with scripted and
//! file-backed input.

use std::{fs::OpenOptions, io::Write, time::Duration};

use xdialog::{
    DialogState, Error, ExitStatus,
    input::{InputSource, LineReader, Poll, ScriptedSource, Split},
    live::{
        AnsiColor, Gauge, Infobox, LOG_LINE_MAX, LiveWidget, LogOptions, LogRow, Logbox, Progress,
        Surface, Tailbox, Tick,
    },
};

/// Keeps everything the widgets show. Closes the window on pump
/// `close_at` when set.
#[derive(Default)]
struct Screen {
    labels: Vec<String>,
    captions: Vec<String>,
    text: String,
    rows: Vec<(LogRow, bool)>,
    pumps: usize,
    close_at: Option<usize>,
}

impl Surface<Vec<u8>> for Screen {
    fn pump(&mut self, state: &mut DialogState<Vec<u8>>) -> Result<bool, Error> {
        self.pumps += 1;
        if self.close_at == Some(self.pumps) {
            state.window_closed();
        }
        Ok(state.timer_active())
    }

    fn set_label(&mut self, text: &str) {
        self.labels.push(text.to_string());
    }

    fn set_progress(&mut self, _fraction: f64, caption: &str) {
        self.captions.push(caption.to_string());
    }

    fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn push_log(&mut self, row: LogRow, reverse: bool) {
        self.rows.push((row, reverse));
    }
}

fn drive<S: xdialog::input::ByteSource>(
    widget: &mut LiveWidget<S>,
    state: &mut DialogState<Vec<u8>>,
    screen: &mut Screen,
    max_ticks: usize,
) -> usize {
    state.start_timer(widget.interval());
    for n in 1..=max_ticks {
        if widget.tick(state, screen).unwrap() == Tick::Stop {
            return n;
        }
    }
    max_ticks
}

#[test]
fn tokens_survive_partial_writes() {
    let mut reader = LineReader::new(ScriptedSource::new(), Split::Lines);
    reader.get_mut().push_chunk("ab");
    assert_eq!(reader.poll_token(), Poll::WouldBlock);
    reader.get_mut().push_would_block();
    assert_eq!(reader.poll_token(), Poll::WouldBlock);
    assert_eq!(reader.buffered(), 2);

    reader.get_mut().push_chunk("c\n");
    assert_eq!(reader.poll_token(), Poll::Ready("abc".to_string()));
    assert!(reader.poll_token().is_eof());
}

#[test]
fn gauge_session_prints_the_check_state() {
    let source = ScriptedSource::new()
        .chunk("10 XXX Copying files XXX 60\n")
        .would_block()
        .chunk("XXXX\n");
    let mut widget = LiveWidget::Gauge(Gauge::new(LineReader::new(source, Split::Words), false));
    let mut state = DialogState::new(Vec::new()).with_check(true);
    let mut screen = Screen::default();

    drive(&mut widget, &mut state, &mut screen, 50);
    assert_eq!(screen.captions, ["10%", "60%"]);
    assert_eq!(screen.labels, ["Copying files"]);
    assert_eq!(state.exit_status(), ExitStatus::Ok);
    assert!(!state.timer_active());
    assert_eq!(state.into_output(), b"checked\n");
}

#[test]
fn progress_reads_its_message_before_the_dots() {
    let source = ScriptedSource::new().chunk("copy. .. 50 XXXX\n");
    let reader = LineReader::new(source, Split::Words);
    let mut widget = LiveWidget::Progress(Progress::new(reader, "Step: ", 10, 4));
    let mut state = DialogState::new(Vec::new());
    let mut screen = Screen::default();

    drive(&mut widget, &mut state, &mut screen, 50);
    assert_eq!(screen.labels, ["Step: copy"]);
    assert_eq!(screen.captions, ["10%", "30%", "50%"]);
    assert_eq!(state.exit_status(), ExitStatus::Ok);
}

#[test]
fn infobox_ignoring_eof_stays_until_the_timer_goes() {
    let source = ScriptedSource::new().chunk("XXX first XXX XXX second label XXX");
    let reader = LineReader::new(source, Split::Words);
    let mut widget = LiveWidget::Infobox(Infobox::new(reader, Duration::ZERO, true));
    let mut state = DialogState::new(Vec::new());
    let mut screen = Screen::default();

    assert_eq!(drive(&mut widget, &mut state, &mut screen, 30), 30);
    assert_eq!(screen.labels, ["first", "second label"]);
    assert!(!state.is_finished());

    state.cancel_timer();
    assert_eq!(widget.tick(&mut state, &mut screen).unwrap(), Tick::Stop);
    assert_eq!(state.exit_status(), ExitStatus::Closed);
}

#[test]
fn tailbox_follows_a_growing_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "hello").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let source = InputSource::open(&path).unwrap();
    assert_eq!(source.initial_len(), 6);
    let initial = source.initial_len();
    let reader = LineReader::new(source, Split::Lines);
    let mut widget = LiveWidget::Tailbox(Tailbox::new(reader, initial));
    let mut state = DialogState::new(Vec::new());
    let mut screen = Screen::default();

    assert_eq!(drive(&mut widget, &mut state, &mut screen, 3), 3);
    assert_eq!(screen.text, "hello\n");

    let mut writer = OpenOptions::new().append(true).open(file.path()).unwrap();
    writeln!(writer, "world").unwrap();
    writer.flush().unwrap();

    assert_eq!(widget.tick(&mut state, &mut screen).unwrap(), Tick::Continue);
    assert_eq!(screen.text, "hello\nworld\n");
    assert!(!state.is_finished());
}

#[test]
fn logbox_shows_existing_lines_even_when_closed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "\x1b[1;31mfailed\x1b[0m\nplain").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let source = InputSource::open(&path).unwrap();
    let initial = source.initial_len();
    let reader = LineReader::with_capacity(source, Split::Lines, LOG_LINE_MAX);
    let options = LogOptions {
        reverse: true,
        ..LogOptions::default()
    };
    let mut widget = LiveWidget::Logbox(Logbox::new(reader, initial, options));
    let mut state = DialogState::new(Vec::new());
    let mut screen = Screen {
        close_at: Some(1),
        ..Screen::default()
    };

    assert_eq!(drive(&mut widget, &mut state, &mut screen, 5), 1);
    let rows: Vec<(&str, Option<AnsiColor>, bool)> =
        screen.rows.iter().map(|(r, rev)| (r.text.as_str(), r.fg, *rev)).collect();
    assert_eq!(rows, [("failed", Some(AnsiColor::Red), true), ("plain", None, true)]);
    assert!(screen.rows.iter().all(|(r, _)| r.stamp.is_none()));
    assert_eq!(state.exit_status(), ExitStatus::Closed);
}

#[test]
fn missing_input_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.log");
    let err = InputSource::open(path.to_str().unwrap()).err().unwrap();
    assert!(matches!(err, Error::Open { .. }));
}
