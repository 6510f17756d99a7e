//! Window side of the live dialogs: infobox, gauge, progress, tailbox and
//! logbox.

use std::{
    io::Write,
    thread,
    time::{Duration, Instant},
};

use crate::{
    backend::WindowEvent,
    error::Error,
    input::{ByteSource, InputSource, LineReader, Split, StdinSource},
    live::{
        Gauge, Infobox, LOG_LINE_MAX, LiveWidget, LogOptions, LogRow, Logbox, Progress,
        StampFormat, Surface, TICK_INTERVAL, Tailbox, Tick, initial_percent,
    },
    render::{Canvas, Font, rgb},
    state::DialogState,
    ui::{
        Colors,
        frame::{self, Action, Body, BodyEvent, Context, Dialog, FrameSpec, Rect, Role},
        textbox::print_text,
        widgets::{
            Widget,
            progress_bar::ProgressBar,
            text_view::{TextRow, TextView},
        },
    },
};

/// Infobox shown for this long unless told otherwise.
pub(crate) const DEFAULT_INFOBOX_TIMEOUT: Duration = Duration::from_millis(1000);

/// Bar width as a share of the window.
const BAR_SHARE: f32 = 0.8;
const MIN_BAR_COLUMNS: i32 = 30;
const TAIL_MIN_COLUMNS: i32 = 40;
const TAIL_MIN_ROWS: i32 = 15;
const LOG_ROWS: i32 = 10;

/// What sits under the label of a live dialog.
pub(crate) enum LiveBody {
    Empty,
    Bar {
        bar: ProgressBar,
        margin: u32,
        min_width: u32,
    },
    Text {
        view: TextView,
        min_size: (u32, u32),
    },
}

impl LiveBody {
    fn bar(ctx: &Context<'_>) -> Self {
        let ymult = ctx.metrics.cell.ymult;
        let height = (ymult * 1.2).round() as u32;
        LiveBody::Bar {
            bar: ProgressBar::new(0, height),
            margin: (ymult / 2.0).round() as u32,
            min_width: ctx.metrics.columns(MIN_BAR_COLUMNS),
        }
    }

    fn text(ctx: &Context<'_>, min_size: (u32, u32)) -> Self {
        LiveBody::Text {
            view: TextView::new(&ctx.font, ctx.scale()),
            min_size,
        }
    }

    fn view(&self) -> Option<&TextView> {
        match self {
            LiveBody::Text {
                view, ..
            } => Some(view),
            _ => None,
        }
    }
}

impl Body for LiveBody {
    fn size_hint(&self) -> (u32, u32) {
        match self {
            LiveBody::Empty => (0, 0),
            LiveBody::Bar {
                bar,
                margin,
                min_width,
            } => (*min_width, bar.height() + 2 * margin),
            LiveBody::Text {
                min_size, ..
            } => *min_size,
        }
    }

    fn expands(&self) -> bool {
        matches!(self, LiveBody::Text { .. })
    }

    fn set_rect(&mut self, rect: Rect) {
        match self {
            LiveBody::Empty => {}
            LiveBody::Bar {
                bar,
                margin,
                ..
            } => {
                let width = (rect.w as f32 * BAR_SHARE).round() as u32;
                bar.set_width(width);
                bar.set_position(rect.x + (rect.w - width) as i32 / 2, rect.y + *margin as i32);
            }
            LiveBody::Text {
                view, ..
            } => {
                view.set_position(rect.x, rect.y);
                view.set_size(rect.w, rect.h);
            }
        }
    }

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font) {
        match self {
            LiveBody::Empty => {}
            LiveBody::Bar {
                bar, ..
            } => bar.draw(canvas, colors, font),
            LiveBody::Text {
                view, ..
            } => view.draw(canvas, colors, font),
        }
    }

    fn process_event(&mut self, event: &WindowEvent, _pointer: (i32, i32)) -> BodyEvent {
        match self {
            LiveBody::Text {
                view, ..
            } => {
                if view.process_event(event) { BodyEvent::Redraw } else { BodyEvent::Ignored }
            }
            _ => BodyEvent::Ignored,
        }
    }
}

/// How button presses and Return are handled while the widget runs.
#[derive(Clone, Copy)]
struct Keys<'a> {
    default_no: bool,
    /// Return without a default button closes the dialog.
    return_closes: bool,
    printer: Option<&'a str>,
}

fn on_action<W: Write>(
    action: Action,
    body: &mut LiveBody,
    state: &mut DialogState<W>,
    keys: Keys<'_>,
) -> Result<(), Error> {
    match action {
        Action::Button(Role::Print) => {
            if let (Some(view), Some(printer)) = (body.view(), keys.printer) {
                print_text(&view.text(), printer);
            }
            Ok(())
        }
        Action::Button(role) => frame::activate(role, state, |_| Ok(())),
        Action::Return if keys.return_closes => {
            if keys.default_no {
                state.exit_cancel();
            } else {
                state.exit_ok();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// The open window as seen by a live widget.
struct Window<'a, 'k> {
    dialog: &'a mut Dialog<LiveBody>,
    keys: Keys<'k>,
    /// Redraw after every appended chunk instead of once per tick.
    smooth: bool,
    appended: bool,
}

impl Window<'_, '_> {
    fn end_tick(&mut self) {
        if std::mem::take(&mut self.appended) {
            self.dialog.invalidate();
        }
    }
}

impl<W: Write> Surface<W> for Window<'_, '_> {
    fn pump(&mut self, state: &mut DialogState<W>) -> Result<bool, Error> {
        let keys = self.keys;
        self.dialog.pump(state, &mut |action, body, state| on_action(action, body, state, keys))?;
        Ok(state.timer_active())
    }

    fn set_label(&mut self, text: &str) {
        self.dialog.set_label(text);
    }

    fn set_progress(&mut self, fraction: f64, caption: &str) {
        if let LiveBody::Bar {
            bar, ..
        } = &mut self.dialog.body
        {
            bar.set_progress(fraction, caption);
            self.dialog.invalidate();
        }
    }

    fn append_text(&mut self, text: &str) {
        if let LiveBody::Text {
            view, ..
        } = &mut self.dialog.body
        {
            view.append_text(text);
            if self.smooth {
                self.dialog.invalidate();
            } else {
                self.appended = true;
            }
        }
    }

    fn push_log(&mut self, row: LogRow, reverse: bool) {
        if let LiveBody::Text {
            view, ..
        } = &mut self.dialog.body
        {
            let color = |c: crate::live::AnsiColor| {
                let (r, g, b) = c.rgb();
                rgb(r, g, b)
            };
            view.push_row(
                TextRow {
                    text: row.text,
                    fg: row.fg.map(color),
                    bg: row.bg.map(color),
                    stamp: row.stamp,
                },
                reverse,
            );
            self.dialog.invalidate();
        }
    }
}

/// Opens the window and ticks `widget` until the dialog finishes.
#[allow(clippy::too_many_arguments)]
fn run<S: ByteSource>(
    ctx: Context<'_>,
    spec: FrameSpec,
    body: LiveBody,
    mut widget: LiveWidget<S>,
    keys: Keys<'_>,
    timeout: Option<Duration>,
    state: &mut DialogState,
    init: impl FnOnce(&mut Dialog<LiveBody>),
) -> Result<(), Error> {
    let smooth = ctx.options.smooth;
    let mut dialog = Dialog::open(ctx, spec, body)?;
    init(&mut dialog);
    if let Some(timeout) = timeout {
        state.set_timeout(timeout);
    }

    let interval = widget.interval();
    state.start_timer(interval);
    let mut next_tick = Instant::now() + interval;
    log::debug!("live dialog ticking every {interval:?}");

    let mut window = Window {
        dialog: &mut dialog,
        keys,
        smooth,
        appended: false,
    };
    loop {
        window.pump(state)?;
        if state.is_finished() {
            break;
        }
        let now = Instant::now();
        if state.timed_out(now) {
            state.timeout_exit();
            break;
        }
        if now >= next_tick {
            let tick = widget.tick(state, &mut window)?;
            window.end_tick();
            if tick == Tick::Stop || state.is_finished() {
                break;
            }
            next_tick = Instant::now() + state.timer().unwrap_or(interval);
        }
        thread::sleep(next_tick.saturating_duration_since(Instant::now()).min(TICK_INTERVAL));
    }

    // The widget may stop while the user still has to close the window
    if !state.is_finished() {
        dialog.run(state, |action, body, state| on_action(action, body, state, keys))?;
    }
    dialog.close(state)
}

pub(crate) fn infobox(
    ctx: Context<'_>,
    text: &str,
    timeout: Option<Duration>,
    state: &mut DialogState,
) -> Result<(), Error> {
    let timeout = timeout.or(ctx.env.infobox_timeout).unwrap_or(DEFAULT_INFOBOX_TIMEOUT);
    let reader = LineReader::new(StdinSource::new(), Split::Words);
    let widget = LiveWidget::Infobox(Infobox::new(reader, timeout, ctx.options.ignore_eof));

    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons: frame::infobox_buttons(ctx.options, ctx.env.dialog_compat, !timeout.is_zero()),
        check: false,
    };
    let keys = Keys {
        default_no: ctx.options.default_no,
        return_closes: false,
        printer: None,
    };
    run(ctx, spec, LiveBody::Empty, widget, keys, None, state, |_| {})
}

pub(crate) fn gauge(
    ctx: Context<'_>,
    text: &str,
    percent: i32,
    state: &mut DialogState,
) -> Result<(), Error> {
    let reader = LineReader::new(StdinSource::new(), Split::Words);
    let widget = LiveWidget::Gauge(Gauge::new(reader, ctx.options.ignore_eof));
    let (fraction, caption) = initial_percent(percent);

    let body = LiveBody::bar(&ctx);
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons: Vec::new(),
        check: false,
    };
    run(ctx, spec, body, widget, no_keys(), None, state, |dialog| {
        if let LiveBody::Bar {
            bar, ..
        } = &mut dialog.body
        {
            bar.set_progress(fraction, &caption);
        }
    })
}

pub(crate) fn progress(
    ctx: Context<'_>,
    text: &str,
    maxdots: i32,
    msglen: i32,
    state: &mut DialogState,
) -> Result<(), Error> {
    let reader = LineReader::new(StdinSource::new(), Split::Words);
    let widget = LiveWidget::Progress(Progress::new(reader, text, maxdots, msglen));

    let body = LiveBody::bar(&ctx);
    let spec = FrameSpec {
        label: text.to_string(),
        separator: true,
        buttons: Vec::new(),
        check: false,
    };
    run(ctx, spec, body, widget, no_keys(), None, state, |_| {})
}

pub(crate) fn tailbox(ctx: Context<'_>, path: &str, state: &mut DialogState) -> Result<(), Error> {
    let options = ctx.options;
    let printer = options.printer.as_deref();
    let source = InputSource::open(path)?;
    let initial_len = source.initial_len();
    let widget = LiveWidget::Tailbox(Tailbox::new(LineReader::new(source, Split::Lines), initial_len));

    let mut framed = options.clone();
    if ctx.env.dialog_compat {
        framed.cancel_button = false;
    }
    let buttons = if framed.buttons {
        frame::all_buttons(&framed, true, framed.ok_button)
    } else {
        Vec::new()
    };

    let cell = ctx.metrics.cell;
    let min_size = (
        (TAIL_MIN_COLUMNS as f32 * cell.xmult).round() as u32,
        (TAIL_MIN_ROWS as f32 * cell.ymult).round() as u32,
    );
    let body = LiveBody::text(&ctx, min_size);

    let spec = FrameSpec {
        label: String::new(),
        separator: false,
        buttons,
        check: true,
    };
    let keys = Keys {
        default_no: options.default_no,
        return_closes: true,
        printer,
    };
    run(ctx, spec, body, widget, keys, options.timeout, state, |_| {})
}

pub(crate) fn logbox(ctx: Context<'_>, path: &str, state: &mut DialogState) -> Result<(), Error> {
    let options = ctx.options;
    let source = InputSource::open(path)?;
    let initial_len = source.initial_len();
    let stamp = if options.date_stamp {
        Some(StampFormat::DateTime)
    } else if options.time_stamp {
        Some(StampFormat::Time)
    } else {
        None
    };
    let log_options = LogOptions {
        reverse: options.reverse,
        keep_colors: options.keep_colors,
        stamp,
    };
    let reader = LineReader::with_capacity(source, Split::Lines, LOG_LINE_MAX);
    let widget = LiveWidget::Logbox(Logbox::new(reader, initial_len, log_options));

    let buttons = if options.buttons {
        frame::all_buttons(options, false, options.ok_button)
    } else {
        Vec::new()
    };

    let columns = match stamp {
        Some(StampFormat::DateTime) => 59,
        Some(StampFormat::Time) => 48,
        None => TAIL_MIN_COLUMNS,
    };
    let cell = ctx.metrics.cell;
    let min_size = (
        (columns as f32 * cell.xmult).round() as u32,
        (LOG_ROWS as f32 * (cell.ymult + 2.0)).round() as u32,
    );
    let body = LiveBody::text(&ctx, min_size);

    let spec = FrameSpec {
        label: String::new(),
        separator: false,
        buttons,
        check: true,
    };
    let keys = Keys {
        default_no: options.default_no,
        return_closes: true,
        printer: None,
    };
    run(ctx, spec, body, widget, keys, options.timeout, state, |_| {})
}

fn no_keys() -> Keys<'static> {
    Keys {
        default_no: false,
        return_closes: false,
        printer: None,
    }
}
