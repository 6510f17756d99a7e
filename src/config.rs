//! Dialog options shared by every box, and the environment switches.

use std::{path::PathBuf, time::Duration};

use log::LevelFilter;

use crate::state::Sink;

/// Label text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    Left,
    Right,
    #[default]
    Center,
    /// Left aligned, with long lines broken to the label width.
    Fill,
}

/// Where the window opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Center,
    Mouse,
    /// Explicit origin; negative values count from the right/bottom edge.
    Origin {
        x: i32,
        y: i32,
    },
    /// Left to the window manager.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    Stdout,
    #[default]
    Stderr,
}

impl Output {
    pub fn sink(self) -> Sink {
        match self {
            Output::Stdout => Sink::stdout(),
            Output::Stderr => Sink::stderr(),
        }
    }
}

/// Which input box entries start masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Masking {
    #[default]
    Off,
    /// The last `n` entries (`--password` given `n` times).
    Last(usize),
    /// Only entry `n`, counted from 1 (`--password=n`).
    Only(usize),
}

impl Masking {
    /// Whether entry `index` (from 0) of `entries` is masked.
    pub fn hides(self, index: usize, entries: usize) -> bool {
        match self {
            Masking::Off => false,
            Masking::Last(n) => n > 0 && index < entries && index + n >= entries,
            Masking::Only(n) => index + 1 == n,
        }
    }

    /// Whether a "Hide typing" toggle goes with the entries.
    pub fn has_toggle(self, entries: usize) -> bool {
        match self {
            Masking::Off => false,
            Masking::Last(n) => n > 0,
            Masking::Only(n) => (1..=entries).contains(&n),
        }
    }

    /// One more `--password`.
    pub fn bump(self) -> Self {
        match self {
            Masking::Last(n) => Masking::Last(n + 1),
            _ => Masking::Last(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOption {
    pub label: String,
    pub on: bool,
}

/// Options common to all boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub title: String,
    pub backtitle: Option<String>,
    pub wmclass: String,
    pub justify: Justify,
    pub wrap: bool,
    pub cr_wrap: bool,
    pub output: Output,
    pub separator: String,
    pub separate_output: bool,
    pub tags: bool,
    pub item_help: bool,
    pub default_item: Option<String>,
    pub ok_button: bool,
    pub cancel_button: bool,
    pub buttons: bool,
    pub default_no: bool,
    pub wizard: bool,
    /// Text of `--help`; shows a Help button.
    pub help: Option<String>,
    pub extra_button: bool,
    pub ok_label: Option<String>,
    pub cancel_label: Option<String>,
    pub extra_label: Option<String>,
    /// `Some("")` prints on the default printer.
    pub printer: Option<String>,
    pub check: Option<CheckOption>,
    pub beep_before: bool,
    pub beep_after: bool,
    pub placement: Placement,
    pub size_in_pixels: bool,
    pub ignore_eof: bool,
    pub smooth: bool,
    /// Periodic output of input and list boxes.
    pub interval: Option<Duration>,
    /// Closes the dialog with 255 after this long.
    pub timeout: Option<Duration>,
    pub no_close: bool,
    pub reverse: bool,
    pub keep_colors: bool,
    pub time_stamp: bool,
    pub date_stamp: bool,
    pub fixed_font: bool,
    pub password: Masking,
    /// The combobox entry takes typing.
    pub editable: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            title: String::new(),
            backtitle: None,
            wmclass: "Xdialog".to_string(),
            justify: Justify::default(),
            wrap: false,
            cr_wrap: false,
            output: Output::default(),
            separator: "/".to_string(),
            separate_output: false,
            tags: true,
            item_help: false,
            default_item: None,
            ok_button: true,
            cancel_button: true,
            buttons: true,
            default_no: false,
            wizard: false,
            help: None,
            extra_button: false,
            ok_label: None,
            cancel_label: None,
            extra_label: None,
            printer: None,
            check: None,
            beep_before: false,
            beep_after: false,
            placement: Placement::default(),
            size_in_pixels: false,
            ignore_eof: false,
            smooth: false,
            interval: None,
            timeout: None,
            no_close: false,
            reverse: false,
            keep_colors: false,
            time_stamp: false,
            date_stamp: false,
            fixed_font: false,
            password: Masking::default(),
            editable: false,
        }
    }
}

impl Options {
    /// Applies the environment switches that override command line choices.
    pub fn apply_env(&mut self, env: &Env) {
        if env.dialog_compat {
            self.fixed_font = true;
        }
    }

    /// Whether labels are wrapped to the window width.
    pub fn wraps(&self, env: &Env) -> bool {
        self.wrap || env.dialog_compat
    }
}

/// Settings read from `XDIALOG_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    /// Behave like `dialog` where Xdialog differs.
    pub dialog_compat: bool,
    /// Ignore the height/width arguments.
    pub force_autosize: bool,
    /// Default infobox timeout.
    pub infobox_timeout: Option<Duration>,
    pub font: Option<PathBuf>,
    pub log_level: Option<LevelFilter>,
}

impl Env {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| lookup(key).is_some_and(|v| is_true(&v));

        let infobox_timeout = lookup("XDIALOG_INFOBOX_TIMEOUT").and_then(|v| {
            match v.trim().parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(e) => {
                    // The logger is not installed yet
                    eprintln!("xdialog: ignoring XDIALOG_INFOBOX_TIMEOUT={v:?}: {e}");
                    None
                }
            }
        });

        let log_level = lookup("XDIALOG_LOG").and_then(|v| match v.trim().parse() {
            Ok(level) => Some(level),
            Err(_) => {
                eprintln!("xdialog: ignoring XDIALOG_LOG={v:?}");
                None
            }
        });

        Self {
            dialog_compat: flag("XDIALOG_HIGH_DIALOG_COMPAT"),
            force_autosize: flag("XDIALOG_FORCE_AUTOSIZE"),
            infobox_timeout,
            font: lookup("XDIALOG_FONT").filter(|v| !v.is_empty()).map(PathBuf::from),
            log_level,
        }
    }
}

fn is_true(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}
