//! The frame every dialog shares: back title, label, body, check button and
//! button row, and the event loop mapping them onto the exit paths.

use std::{
    io::Write,
    thread,
    time::{Duration, Instant},
};

use crate::{
    backend::{
        self, CursorShape, DisplayConnection, Modifiers, MouseButton, Window, WindowEvent,
        keysym,
        x11::{Connection, X11Window},
    },
    cli::BoxSize,
    config::{Env, Justify, Options, Placement},
    error::Error,
    live::TICK_INTERVAL,
    render::{Align, Canvas, CellSize, Font},
    state::{DialogState, ExitStatus, MAX_LABEL_LENGTH},
    text::{backslash_n_to_linefeed, trim_string, wrap_text},
    ui::{
        Colors, detect_theme,
        widgets::{Widget, button::Button, toggle::Toggle},
    },
};

/// What a button does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// OK or Yes.
    Ok,
    /// Cancel or No.
    Cancel,
    Help,
    Extra,
    Previous,
    Next,
    Print,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ButtonSpec {
    pub role: Role,
    pub label: String,
    pub default: bool,
}

impl ButtonSpec {
    fn new(role: Role, label: String, default: bool) -> Self {
        Self {
            role,
            label,
            default,
        }
    }
}

fn custom(label: &Option<String>, fallback: &str) -> String {
    label.as_deref().filter(|l| !l.is_empty()).unwrap_or(fallback).to_string()
}

fn ok_button(options: &Options, text: &str, default: bool) -> ButtonSpec {
    ButtonSpec::new(Role::Ok, custom(&options.ok_label, text), default)
}

fn cancel_button(options: &Options, text: &str, default: bool) -> ButtonSpec {
    ButtonSpec::new(Role::Cancel, custom(&options.cancel_label, text), default)
}

fn extra_button(options: &Options, default: bool) -> ButtonSpec {
    ButtonSpec::new(Role::Extra, custom(&options.extra_label, "Extra"), default)
}

fn plain(role: Role, label: &str) -> ButtonSpec {
    ButtonSpec::new(role, label.to_string(), role == Role::Next)
}

/// Only the last button flagged as default keeps the flag.
fn single_default(mut specs: Vec<ButtonSpec>) -> Vec<ButtonSpec> {
    if let Some(last) = specs.iter().rposition(|s| s.default) {
        for (i, spec) in specs.iter_mut().enumerate() {
            spec.default = i == last;
        }
    }
    specs
}

/// Buttons of a message box, or of a yes/no box.
pub(crate) fn message_buttons(options: &Options, yesno: bool) -> Vec<ButtonSpec> {
    let mut specs = Vec::new();
    if yesno {
        if options.wizard {
            specs.push(plain(Role::Previous, "Previous"));
            if options.cancel_button {
                specs.push(cancel_button(options, "Cancel", false));
            }
            specs.push(plain(Role::Next, "Next"));
        } else {
            specs.push(ok_button(options, "Yes", !options.default_no));
            specs.push(cancel_button(options, "No", options.default_no));
        }
        if options.extra_button {
            specs.push(extra_button(options, false));
        }
    } else {
        specs.push(ok_button(options, "OK", true));
    }
    if options.help.is_some() {
        specs.push(plain(Role::Help, "Help"));
    }
    single_default(specs)
}

/// The standard button row. `print` adds a Print button when a printer
/// was given; `ok` adds the OK button.
pub(crate) fn all_buttons(options: &Options, print: bool, ok: bool) -> Vec<ButtonSpec> {
    let mut specs = Vec::new();
    if options.wizard {
        specs.push(plain(Role::Previous, "Previous"));
    } else {
        if options.extra_button {
            specs.push(extra_button(options, !options.default_no));
        }
        if ok {
            specs.push(ok_button(options, "OK", !options.default_no));
        }
    }
    if options.cancel_button {
        specs.push(cancel_button(options, "Cancel", options.default_no && !options.wizard));
    }
    if options.wizard {
        specs.push(plain(Role::Next, "Next"));
    }
    if options.help.is_some() {
        specs.push(plain(Role::Help, "Help"));
    }
    if print && options.printer.is_some() {
        specs.push(plain(Role::Print, "Print"));
    }
    single_default(specs)
}

/// An infobox shows OK when it closes by itself and Cancel otherwise.
pub(crate) fn infobox_buttons(options: &Options, compat: bool, timed: bool) -> Vec<ButtonSpec> {
    if !options.buttons || compat {
        return Vec::new();
    }
    if timed {
        vec![ok_button(options, "OK", true)]
    } else {
        vec![cancel_button(options, "Cancel", true)]
    }
}

/// Escape closes the dialog only when it has a Cancel (or No) button.
pub(crate) fn escape_cancels(specs: &[ButtonSpec]) -> bool {
    specs.iter().any(|s| s.role == Role::Cancel)
}

/// Runs the exit path of `role`. OK and Next take the caller's `accept`
/// first; Print is left to the caller.
pub(crate) fn activate<W: Write>(
    role: Role,
    state: &mut DialogState<W>,
    accept: impl FnOnce(&mut DialogState<W>) -> Result<(), Error>,
) -> Result<(), Error> {
    match role {
        Role::Ok | Role::Next => {
            accept(state)?;
            state.exit_ok();
        }
        Role::Cancel => state.exit_cancel(),
        Role::Help => state.exit_help(),
        Role::Extra => state.exit_extra(),
        Role::Previous => state.exit_previous(),
        Role::Print => {}
    }
    Ok(())
}

/// Writes `result` to the sink unless it is empty.
pub(crate) fn write_result<W: Write>(state: &mut DialogState<W>, result: &str) -> Result<(), Error> {
    if !result.is_empty() {
        state.output().write_all(result.as_bytes())?;
        state.output().flush()?;
    }
    Ok(())
}

/// Runs a box whose OK button, accept gesture and `--interval` ticks all
/// print `result`, then closes it.
pub(crate) fn run_accepting<B, F>(
    mut dialog: Dialog<B>,
    options: &Options,
    state: &mut DialogState,
    result: F,
) -> Result<(), Error>
where
    B: Body,
    F: Fn(&B) -> String,
{
    if let Some(interval) = options.interval.filter(|i| !i.is_zero()) {
        state.start_timer(interval);
    }
    if let Some(timeout) = options.timeout {
        state.set_timeout(timeout);
    }
    dialog.run(state, |action, body, state| {
        let accept = |state: &mut DialogState| write_result(state, &result(body));
        match action {
            Action::Button(role @ (Role::Ok | Role::Next)) => activate(role, state, accept),
            Action::Button(role) => activate(role, state, |_| Ok(())),
            Action::Activate | Action::Return => activate(Role::Ok, state, accept),
            Action::Tick => accept(state),
        }
    })?;
    dialog.close(state)
}

/// Character cell and screen geometry used to turn box sizes into pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Metrics {
    pub cell: CellSize,
    pub screen: (u32, u32),
    pub in_pixels: bool,
}

impl Metrics {
    pub fn border(&self) -> f32 {
        (self.cell.xmult / 2.0).round()
    }

    /// Window size asked for on the command line; `None` sizes the window
    /// to its contents.
    pub fn requested_size(&self, size: BoxSize) -> Option<(u32, u32)> {
        if size.width <= 0 || size.height <= 0 {
            return None;
        }
        Some((self.columns(size.width), self.rows(size.height)))
    }

    pub fn columns(&self, n: i32) -> u32 {
        if self.in_pixels {
            n.max(0) as u32
        } else {
            (n.max(0) as f32 * self.cell.xmult).round() as u32
        }
    }

    pub fn rows(&self, n: i32) -> u32 {
        if self.in_pixels {
            n.max(0) as u32
        } else {
            (n.max(0) as f32 * self.cell.ymult).round() as u32
        }
    }

    /// Pixel budget labels are wrapped to.
    pub fn wrap_width(&self, size: BoxSize) -> f32 {
        let CellSize {
            xmult,
            ymult,
        } = self.cell;
        let reserved = 2.0 * ymult / 3.0;
        let budget = if size.width > 0 {
            self.columns(size.width) as f32 - reserved - 4.0 * xmult
        } else {
            self.screen.0 as f32 - reserved - 6.0 * xmult
        };
        budget.max(xmult)
    }

    /// Scales a positive `--begin` origin from cells to pixels.
    pub fn placement(&self, placement: Placement) -> Placement {
        match placement {
            Placement::Origin {
                x,
                y,
            } if !self.in_pixels => {
                let scale = |v: i32, mult: f32| {
                    if v > 0 { (v as f32 * mult).round() as i32 } else { v }
                };
                Placement::Origin {
                    x: scale(x, self.cell.xmult),
                    y: scale(y, self.cell.ymult),
                }
            }
            other => other,
        }
    }

    /// Room the window manager's frame takes, for origins counted from the
    /// far edges.
    pub fn decoration(&self) -> (i32, i32) {
        ((2.0 * self.cell.xmult).round() as i32, (3.0 * self.cell.ymult).round() as i32)
    }
}

/// Trims and, when asked to, wraps the label text.
pub(crate) fn label_text(text: &str, options: &Options, env: &Env, width: f32, font: &Font) -> String {
    let text = trim_string(text, options.cr_wrap, MAX_LABEL_LENGTH);
    if options.wraps(env) || options.justify == Justify::Fill {
        wrap_text(&text, width, font)
    } else {
        text
    }
}

pub(crate) fn backtitle_text(
    text: &str,
    options: &Options,
    env: &Env,
    width: f32,
    font: &Font,
) -> String {
    let text = if env.dialog_compat {
        backslash_n_to_linefeed(text)
    } else {
        trim_string(text, options.cr_wrap, MAX_LABEL_LENGTH)
    };
    if options.wraps(env) { wrap_text(&text, width, font) } else { text }
}

fn align(justify: Justify) -> Align {
    match justify {
        Justify::Left | Justify::Fill => Align::Left,
        Justify::Right => Align::Right,
        Justify::Center => Align::Center,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn contains(&self, px: i32, py: i32) -> bool {
        crate::ui::widgets::point_in_rect(px, py, self.x, self.y, self.w, self.h)
    }
}

/// Outcome of an event offered to the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyEvent {
    Ignored,
    Redraw,
    /// The body's own accept gesture: Return in an entry, a double click on
    /// a list row.
    Activate,
}

/// The dialog specific part between the label and the buttons.
pub(crate) trait Body {
    /// Preferred size in pixels.
    fn size_hint(&self) -> (u32, u32);

    /// Whether the body takes the extra height of a large window.
    fn expands(&self) -> bool {
        true
    }

    fn set_rect(&mut self, rect: Rect);

    fn draw(&self, canvas: &mut Canvas, colors: &Colors, font: &Font);

    fn process_event(&mut self, event: &WindowEvent, pointer: (i32, i32)) -> BodyEvent;

    /// Keyboard focus moved to (or away from) the button row.
    fn set_focus(&mut self, _focused: bool) {}

    fn cursor_shape(&self, _x: i32, _y: i32) -> CursorShape {
        CursorShape::Default
    }
}

/// Message boxes have nothing between the label and the buttons.
impl Body for () {
    fn size_hint(&self) -> (u32, u32) {
        (0, 0)
    }

    fn expands(&self) -> bool {
        false
    }

    fn set_rect(&mut self, _rect: Rect) {}

    fn draw(&self, _canvas: &mut Canvas, _colors: &Colors, _font: &Font) {}

    fn process_event(&mut self, _event: &WindowEvent, _pointer: (i32, i32)) -> BodyEvent {
        BodyEvent::Ignored
    }
}

/// What a dialog asks its frame for.
pub(crate) struct FrameSpec {
    /// Raw label text.
    pub label: String,
    /// Draws a separator under the back title.
    pub separator: bool,
    pub buttons: Vec<ButtonSpec>,
    /// Shows the `--check` button, if one was given.
    pub check: bool,
}

/// Everything a dialog needs before its window exists.
pub(crate) struct Context<'a> {
    pub conn: Connection,
    pub font: Font,
    pub colors: &'static Colors,
    pub metrics: Metrics,
    pub options: &'a Options,
    pub env: &'a Env,
    pub size: BoxSize,
}

impl<'a> Context<'a> {
    pub fn open(options: &'a Options, env: &'a Env, size: BoxSize) -> Result<Self, Error> {
        let conn = backend::connect()?;
        let font = Font::load(env.font.as_deref(), options.fixed_font, backend::DEFAULT_SCALE)?;
        let metrics = Metrics {
            cell: font.cell_size(),
            screen: conn.screen_size(),
            in_pixels: options.size_in_pixels,
        };
        log::debug!("cell {:?}, screen {:?}", metrics.cell, metrics.screen);

        let size = if env.force_autosize { BoxSize::default() } else { size };
        Ok(Self {
            conn,
            font,
            colors: detect_theme(),
            metrics,
            options,
            env,
            size,
        })
    }

    pub fn scale(&self) -> f32 {
        backend::DEFAULT_SCALE
    }

    pub fn wrap_width(&self) -> f32 {
        self.metrics.wrap_width(self.size)
    }
}

struct FrameButton {
    role: Role,
    default: bool,
    button: Button,
}

struct Frame {
    font: Font,
    colors: &'static Colors,
    backtitle: Option<String>,
    separator: bool,
    label: String,
    align: Align,
    wraps: bool,
    wrap_width: f32,
    buttons: Vec<FrameButton>,
    check: Option<Toggle>,
    width: u32,
    height: u32,
    backtitle_rect: Rect,
    separator_y: Option<i32>,
    label_rect: Rect,
    body_rect: Rect,
    check_lines: Option<(i32, i32)>,
}

impl Frame {
    fn new(ctx: Context<'_>, spec: FrameSpec) -> Self {
        let options = ctx.options;
        let wrap_width = ctx.wrap_width();
        let backtitle = options
            .backtitle
            .as_deref()
            .map(|t| backtitle_text(t, options, ctx.env, wrap_width, &ctx.font));
        let label = label_text(&spec.label, options, ctx.env, wrap_width, &ctx.font);

        let buttons = spec
            .buttons
            .into_iter()
            .map(|s| {
                FrameButton {
                    role: s.role,
                    default: s.default,
                    button: Button::new(&s.label, &ctx.font, ctx.scale()),
                }
            })
            .collect();

        let check = match &options.check {
            Some(check) if spec.check => {
                let label = trim_string(&check.label, false, MAX_LABEL_LENGTH);
                Some(Toggle::new(&label, check.on, &ctx.font, ctx.scale()))
            }
            _ => None,
        };

        Self {
            separator: spec.separator && backtitle.is_some(),
            backtitle,
            label,
            align: align(options.justify),
            wraps: options.wraps(ctx.env) || options.justify == Justify::Fill,
            wrap_width,
            buttons,
            check,
            width: 0,
            height: 0,
            backtitle_rect: Rect::default(),
            separator_y: None,
            label_rect: Rect::default(),
            body_rect: Rect::default(),
            check_lines: None,
            font: ctx.font,
            colors: ctx.colors,
        }
    }

    fn block_size(&self, text: &str) -> (u32, u32) {
        if text.is_empty() {
            return (0, 0);
        }
        let (w, h) = self.font.render(text).measure();
        (w.ceil() as u32, h.ceil() as u32)
    }

    /// Places every part and returns the window size.
    fn layout(
        &mut self,
        body: &mut dyn Body,
        metrics: &Metrics,
        requested: Option<(u32, u32)>,
    ) -> (u32, u32) {
        let ymult = metrics.cell.ymult;
        let border = metrics.border() as u32;
        let third = (ymult / 3.0).round() as u32;
        let quarter = (ymult / 4.0).round() as u32;
        let button_gap = (2.0 * metrics.cell.xmult).round() as u32;

        let backtitle = self.backtitle.as_deref().map(|t| self.block_size(t));
        let label = self.block_size(&self.label);
        let (body_w, body_h) = body.size_hint();
        let check = self.check.as_ref().map(|t| (t.width(), t.height()));
        let buttons_w = self.buttons.iter().map(|b| b.button.width()).sum::<u32>()
            + button_gap * self.buttons.len().saturating_sub(1) as u32;
        let button_h = self.buttons.iter().map(|b| b.button.height()).max();

        // Everything but the body and the label's share of extra room
        let mut fixed = 2 * border;
        if let Some((_, h)) = backtitle {
            fixed += h + if self.separator { 2 * quarter + 1 } else { third };
        }
        let label_shown = label.1 > 0 || !body.expands();
        if label_shown {
            fixed += label.1 + 2 * third;
        }
        if let Some((_, h)) = check {
            fixed += h + 4 * quarter + 2;
        }
        if let Some(h) = button_h {
            fixed += quarter + h;
        }

        let content_w = [
            backtitle.map_or(0, |b| b.0),
            label.0,
            body_w,
            check.map_or(0, |c| c.0),
            buttons_w,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        let (req_w, req_h) = requested.unwrap_or((0, 0));
        let cap = |v: u32, screen: u32| if screen > 0 { v.min(screen) } else { v };
        let width = cap((content_w + 2 * border).max(req_w), metrics.screen.0).max(1);
        let height = cap((fixed + body_h).max(req_h), metrics.screen.1).max(1);

        let inner_w = width.saturating_sub(2 * border);
        let room = height.saturating_sub(fixed);
        let (body_h, label_area) = if body.expands() {
            (room, label.1)
        } else {
            (body_h, label.1 + room.saturating_sub(body_h))
        };

        let x = border as i32;
        let mut y = border as i32;
        if let Some((_, h)) = backtitle {
            self.backtitle_rect = Rect {
                x,
                y,
                w: inner_w,
                h,
            };
            y += h as i32;
            if self.separator {
                y += quarter as i32;
                self.separator_y = Some(y);
                y += 1 + quarter as i32;
            } else {
                y += third as i32;
            }
        }
        if label_shown {
            y += third as i32;
            self.label_rect = Rect {
                x,
                y,
                w: inner_w,
                h: label_area,
            };
            y += (label_area + third) as i32;
        }

        self.body_rect = Rect {
            x,
            y,
            w: inner_w,
            h: body_h,
        };
        body.set_rect(self.body_rect);
        y += body_h as i32;

        if let Some(toggle) = self.check.as_mut() {
            y += quarter as i32;
            let top = y;
            y += 1 + quarter as i32;
            toggle.set_position(x, y);
            y += (toggle.height() + quarter) as i32;
            self.check_lines = Some((top, y));
            y += 1;
        }

        if !self.buttons.is_empty() {
            y += quarter as i32;
            let slot = inner_w / self.buttons.len() as u32;
            for (i, b) in self.buttons.iter_mut().enumerate() {
                let bx = x + (slot * i as u32) as i32 + (slot as i32 - b.button.width() as i32) / 2;
                b.button.set_position(bx, y);
            }
        }

        self.width = width;
        self.height = height;
        (width, height)
    }

    fn set_label(&mut self, text: &str) {
        self.label = if self.wraps {
            wrap_text(text, self.wrap_width, &self.font)
        } else {
            text.to_string()
        };
    }

    fn draw(&self, canvas: &mut Canvas) {
        let colors = self.colors;
        canvas.fill_dialog_bg(colors.window_bg, colors.window_border);

        if let Some(text) = &self.backtitle {
            let r = self.backtitle_rect;
            self.font
                .render(text)
                .with_color(colors.text)
                .with_align(Align::Center, r.w as f32)
                .draw(canvas, r.x, r.y);
        }
        if let Some(y) = self.separator_y {
            self.separator(canvas, y);
        }

        if !self.label.is_empty() {
            let r = self.label_rect;
            let (_, text_h) = self.block_size(&self.label);
            let y = r.y + (r.h as i32 - text_h as i32).max(0) / 2;
            self.font
                .render(&self.label)
                .with_color(colors.text)
                .with_align(self.align, r.w as f32)
                .with_clip(r.x, r.y, r.w, r.h)
                .draw(canvas, r.x, y);
        }

        if let (Some(toggle), Some((top, bottom))) = (&self.check, self.check_lines) {
            self.separator(canvas, top);
            toggle.draw(canvas, colors, &self.font);
            self.separator(canvas, bottom);
        }

        for b in &self.buttons {
            b.button.draw(canvas, colors, &self.font);
        }
    }

    fn separator(&self, canvas: &mut Canvas, y: i32) {
        let r = self.body_rect;
        canvas.hline(r.x as f32, y as f32, r.w as f32, self.colors.window_border);
    }
}

/// What the dialog's handler is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Button(Role),
    /// The body's accept gesture.
    Activate,
    /// Return with no default button.
    Return,
    /// The dialog timer (`--interval`) elapsed.
    Tick,
}

/// An open dialog window.
pub(crate) struct Dialog<B> {
    window: X11Window,
    frame: Frame,
    pub body: B,
    canvas: Canvas,
    pointer: (i32, i32),
    /// Button with keyboard focus; `None` leaves the keys to the body.
    focus: Option<usize>,
    dirty: bool,
    no_close: bool,
    beep_after: bool,
    escape_cancels: bool,
    next_tick: Option<Instant>,
}

impl<B: Body> Dialog<B> {
    /// Lays out, places and maps the window.
    pub fn open(ctx: Context<'_>, spec: FrameSpec, mut body: B) -> Result<Self, Error> {
        let options = ctx.options;
        let metrics = ctx.metrics;
        let requested = metrics.requested_size(ctx.size);
        let escape_cancels = escape_cancels(&spec.buttons);
        let conn = ctx.conn.clone();

        let mut frame = Frame::new(ctx, spec);
        let (width, height) = frame.layout(&mut body, &metrics, requested);
        log::debug!("window {width}x{height}, requested {requested:?}");

        let clamp = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
        let mut window = conn.create_window(clamp(width), clamp(height))?;
        window.set_title(&options.title)?;
        window.set_class(&options.wmclass)?;

        let pointer = match options.placement {
            Placement::Mouse => window.pointer_position()?,
            _ => (0, 0),
        };
        let origin = backend::window_origin(
            metrics.placement(options.placement),
            window.screen_size(),
            (width, height),
            pointer,
            metrics.decoration(),
        );
        if let Some((x, y)) = origin {
            window.move_to(x, y)?;
        }

        let mut dialog = Self {
            canvas: Canvas::new(width, height)?,
            window,
            frame,
            body,
            pointer: (0, 0),
            focus: None,
            dirty: true,
            no_close: options.no_close,
            beep_after: options.beep_after,
            escape_cancels,
            next_tick: None,
        };
        dialog.update_button_focus();
        dialog.redraw()?;
        dialog.window.show()?;
        if options.beep_before {
            dialog.window.beep()?;
        }
        Ok(dialog)
    }

    pub fn set_label(&mut self, text: &str) {
        self.frame.set_label(text);
        self.dirty = true;
    }

    /// Marks the window for a redraw after the body changed.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Handles every pending event without blocking, then redraws if
    /// needed.
    pub fn pump<W, F>(&mut self, state: &mut DialogState<W>, on: &mut F) -> Result<(), Error>
    where
        W: Write,
        F: FnMut(Action, &mut B, &mut DialogState<W>) -> Result<(), Error>,
    {
        while let Some(event) = self.window.poll_for_event()? {
            self.dispatch(event, state, on)?;
            if state.is_finished() {
                return Ok(());
            }
        }
        if self.dirty {
            self.redraw()?;
        }
        Ok(())
    }

    /// Runs until an exit path finishes the dialog. Blocks on the X
    /// connection unless a timer or the `--timeout` deadline is armed.
    pub fn run<W, F>(&mut self, state: &mut DialogState<W>, mut on: F) -> Result<(), Error>
    where
        W: Write,
        F: FnMut(Action, &mut B, &mut DialogState<W>) -> Result<(), Error>,
    {
        while !state.is_finished() {
            let idle = state.timer().is_none() && state.deadline().is_none();
            if idle {
                let event = self.window.wait_for_event()?;
                self.dispatch(event, state, &mut on)?;
            }
            self.pump(state, &mut on)?;
            if state.is_finished() {
                break;
            }

            let now = Instant::now();
            if state.timed_out(now) {
                state.timeout_exit();
                break;
            }
            if let Some(interval) = state.timer() {
                if self.tick_due(now, interval) {
                    on(Action::Tick, &mut self.body, state)?;
                }
            }
            if !idle {
                thread::sleep(TICK_INTERVAL);
            }
        }
        Ok(())
    }

    fn tick_due(&mut self, now: Instant, interval: Duration) -> bool {
        match self.next_tick {
            Some(at) if now < at => false,
            Some(_) => {
                self.next_tick = Some(now + interval);
                true
            }
            None => {
                self.next_tick = Some(now + interval);
                false
            }
        }
    }

    /// Rings the closing bell when asked to.
    pub fn close<W: Write>(mut self, state: &DialogState<W>) -> Result<(), Error> {
        if self.beep_after && state.exit_status() != ExitStatus::Help {
            self.window.beep()?;
        }
        Ok(())
    }

    fn dispatch<W, F>(
        &mut self,
        event: WindowEvent,
        state: &mut DialogState<W>,
        on: &mut F,
    ) -> Result<(), Error>
    where
        W: Write,
        F: FnMut(Action, &mut B, &mut DialogState<W>) -> Result<(), Error>,
    {
        match &event {
            WindowEvent::CloseRequested => {
                if !self.no_close {
                    state.window_closed();
                }
                return Ok(());
            }
            WindowEvent::RedrawRequested => {
                self.dirty = true;
                return Ok(());
            }
            WindowEvent::CursorEnter(pos) | WindowEvent::CursorMove(pos) => {
                self.pointer = (pos.x.into(), pos.y.into());
                let shape = self.body.cursor_shape(self.pointer.0, self.pointer.1);
                self.window.set_cursor(shape)?;
            }
            WindowEvent::KeyPress(key) if key.keysym == keysym::ESCAPE => {
                if self.escape_cancels {
                    state.exit_cancel();
                }
                return Ok(());
            }
            WindowEvent::ButtonPress(MouseButton::Left, _) if self.focus.is_some() => {
                if self.frame.body_rect.contains(self.pointer.0, self.pointer.1) {
                    self.set_focus(None);
                }
            }
            _ => {}
        }

        let mut clicked = None;
        for b in &mut self.frame.buttons {
            self.dirty |= b.button.process_event(&event);
            if b.button.was_clicked() {
                clicked = Some(b.role);
            }
        }
        if let Some(toggle) = self.frame.check.as_mut() {
            if toggle.click(&event, self.pointer.0, self.pointer.1) && toggle.was_toggled() {
                state.set_checked(toggle.is_on());
                self.dirty = true;
            }
        }
        if let Some(role) = clicked {
            return on(Action::Button(role), &mut self.body, state);
        }

        if let WindowEvent::KeyPress(key) = &event {
            match key.keysym {
                keysym::TAB | keysym::ISO_LEFT_TAB if !self.frame.buttons.is_empty() => {
                    let back = key.keysym == keysym::ISO_LEFT_TAB
                        || key.modifiers.contains(Modifiers::SHIFT);
                    self.cycle_focus(back);
                    return Ok(());
                }
                keysym::RETURN | keysym::KP_ENTER => {
                    if let Some(role) = self.focused_role() {
                        return on(Action::Button(role), &mut self.body, state);
                    }
                }
                keysym::LEFT | keysym::RIGHT if self.focus.is_some() => {
                    self.cycle_focus(key.keysym == keysym::LEFT);
                    return Ok(());
                }
                _ if self.focus.is_some() => return Ok(()),
                _ => {}
            }
        }
        if let WindowEvent::TextInput(c) = &event {
            if let Some(role) = self.focused_role() {
                if *c == ' ' {
                    return on(Action::Button(role), &mut self.body, state);
                }
                return Ok(());
            }
        }

        match self.body.process_event(&event, self.pointer) {
            BodyEvent::Redraw => self.dirty = true,
            BodyEvent::Activate => {
                self.dirty = true;
                return on(Action::Activate, &mut self.body, state);
            }
            BodyEvent::Ignored => {
                if let WindowEvent::KeyPress(key) = &event {
                    if matches!(key.keysym, keysym::RETURN | keysym::KP_ENTER) {
                        let action = self.default_role().map_or(Action::Return, Action::Button);
                        return on(action, &mut self.body, state);
                    }
                }
            }
        }
        Ok(())
    }

    fn focused_role(&self) -> Option<Role> {
        self.focus.and_then(|i| self.frame.buttons.get(i)).map(|b| b.role)
    }

    fn default_role(&self) -> Option<Role> {
        self.frame.buttons.iter().find(|b| b.default).map(|b| b.role)
    }

    /// Tab walks the body and then every button.
    fn cycle_focus(&mut self, back: bool) {
        let n = self.frame.buttons.len();
        let next = match (self.focus, back) {
            (None, false) => Some(0),
            (None, true) => n.checked_sub(1),
            (Some(i), false) if i + 1 < n => Some(i + 1),
            (Some(i), true) if i > 0 => Some(i - 1),
            (Some(_), _) => None,
        };
        self.set_focus(next);
    }

    fn set_focus(&mut self, focus: Option<usize>) {
        self.focus = focus;
        self.body.set_focus(focus.is_none());
        self.update_button_focus();
        self.dirty = true;
    }

    /// The focused button is outlined, or the default one while the body
    /// has the keys.
    fn update_button_focus(&mut self) {
        let focus = self.focus;
        for (i, b) in self.frame.buttons.iter_mut().enumerate() {
            b.button.set_focus(focus.map_or(b.default, |f| f == i));
        }
    }

    fn redraw(&mut self) -> Result<(), Error> {
        self.frame.draw(&mut self.canvas);
        self.body.draw(&mut self.canvas, self.frame.colors, &self.frame.font);
        self.window.set_contents(&self.canvas)?;
        self.dirty = false;
        Ok(())
    }
}
