//! Command line parsing.
//!
//! The syntax follows `dialog`: common options first, then exactly one box
//! option with its text (or file), height and width, followed by the
//! arguments particular to that box.

use std::{ffi::OsString, time::Duration};

use lexopt::{Parser, prelude::*};

use crate::{
    config::{CheckOption, Justify, Masking, Options, Output, Placement},
    error::Error,
    items::{ItemLayout, ListItem, TreeItem, parse_items, parse_tree_items},
    values::Adjustment,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, PartialEq)]
pub enum Command {
    Run(Invocation),
    Usage,
    /// Print the version on the given stream.
    Version(Output),
}

/// Height and width, in characters (or pixels with `--size-in-pixels`).
/// `0 0` sizes the window to its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxSize {
    pub height: i32,
    pub width: i32,
}

#[derive(Debug, PartialEq)]
pub struct Invocation {
    pub options: Options,
    /// Label text, or the file name of tailbox/logbox/textbox/editbox.
    pub text: String,
    pub size: BoxSize,
    pub widget: Widget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Checklist,
    Radiolist,
    Menu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub label: Option<String>,
    pub init: String,
}

#[derive(Debug, PartialEq)]
pub enum Widget {
    Message {
        yesno: bool,
    },
    Infobox {
        /// `None` when not given on the command line.
        timeout: Option<Duration>,
    },
    Gauge {
        percent: i32,
    },
    Progress {
        maxdots: i32,
        msglen: i32,
    },
    Tailbox,
    Logbox,
    Textbox,
    Input {
        fields: Vec<InputField>,
    },
    List {
        kind: ListKind,
        list_height: i32,
        items: Vec<ListItem>,
    },
    Buildlist {
        list_height: i32,
        items: Vec<ListItem>,
    },
    Treeview {
        list_height: i32,
        items: Vec<TreeItem>,
    },
    Editbox,
    Combobox {
        entries: Vec<String>,
    },
    /// One to three sliders.
    Rangebox {
        ranges: Vec<Adjustment>,
    },
    /// One to three spin buttons.
    Spinbox {
        spins: Vec<Adjustment>,
    },
    /// Zero components default to today.
    Calendar {
        day: u32,
        month: u32,
        year: i32,
    },
    /// `None` opens on the current time.
    Timebox {
        time: Option<(u32, u32, u32)>,
    },
}

/// Boxes whose trailing arguments are item rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemBox {
    List(ListKind),
    Build,
    Tree,
}

/// A box with its arguments read. Items are grouped once all options are
/// known, as `--item-help` may come late.
enum Pending {
    Ready(Widget),
    Items {
        target: ItemBox,
        list_height: i32,
        args: Vec<String>,
    },
}

pub fn parse_env() -> Result<Command, Error> {
    parse_parser(Parser::from_env())
}

pub fn parse<I>(args: I) -> Result<Command, Error>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    parse_parser(Parser::from_args(args))
}

fn parse_parser(mut parser: Parser) -> Result<Command, Error> {
    let mut options = Options::default();
    let mut found: Option<(String, BoxSize, Pending)> = None;
    let mut seen_any = false;

    while let Some(arg) = parser.next()? {
        seen_any = true;
        let kind = match arg {
            Long("version") => return Ok(Command::Version(Output::Stdout)),
            Long("print-version") => return Ok(Command::Version(options.output)),
            Long("help") => {
                let text = match parser.optional_value() {
                    Some(text) => Some(text.string()?),
                    None => optional(&mut parser, |s| !is_option(s))?,
                };
                match text {
                    Some(text) => options.help = Some(text),
                    None => return Ok(Command::Usage),
                }
                None
            }

            // Boxes
            Long("msgbox") => Some(BoxKind::Message(false)),
            Long("yesno") => Some(BoxKind::Message(true)),
            Long("infobox") => Some(BoxKind::Infobox),
            Long("gauge") => Some(BoxKind::Gauge),
            Long("progress") => Some(BoxKind::Progress),
            Long("tailbox") => Some(BoxKind::Tailbox),
            Long("logbox") => Some(BoxKind::Logbox),
            Long("textbox") => Some(BoxKind::Textbox),
            Long("inputbox") => Some(BoxKind::Input(1)),
            Long("2inputsbox") => Some(BoxKind::Input(2)),
            Long("3inputsbox") => Some(BoxKind::Input(3)),
            Long("passwordbox") => {
                if options.password == Masking::Off {
                    options.password = Masking::Last(1);
                }
                Some(BoxKind::Input(1))
            }
            Long("checklist") => Some(BoxKind::List(ListKind::Checklist)),
            Long("radiolist") => Some(BoxKind::List(ListKind::Radiolist)),
            Long("menubox") | Long("menu") => Some(BoxKind::List(ListKind::Menu)),
            Long("buildlist") => Some(BoxKind::Items(ItemBox::Build)),
            Long("treeview") => Some(BoxKind::Items(ItemBox::Tree)),
            Long("editbox") => Some(BoxKind::Editbox),
            Long("combobox") => Some(BoxKind::Combobox),
            Long("rangebox") => Some(BoxKind::Range(1)),
            Long("2rangesbox") => Some(BoxKind::Range(2)),
            Long("3rangesbox") => Some(BoxKind::Range(3)),
            Long("spinbox") => Some(BoxKind::Spin(1)),
            Long("2spinsbox") => Some(BoxKind::Spin(2)),
            Long("3spinsbox") => Some(BoxKind::Spin(3)),
            Long("calendar") => Some(BoxKind::Calendar),
            Long("timebox") => Some(BoxKind::Timebox),

            // Common options
            Long("title") => {
                options.title = parser.value()?.string()?;
                None
            }
            Long("backtitle") => {
                options.backtitle = Some(parser.value()?.string()?);
                None
            }
            Long("wmclass") => {
                options.wmclass = parser.value()?.string()?;
                None
            }
            Long("left") => set(&mut options.justify, Justify::Left),
            Long("right") => set(&mut options.justify, Justify::Right),
            Long("center") => set(&mut options.justify, Justify::Center),
            Long("fill") => set(&mut options.justify, Justify::Fill),
            Long("wrap") => set(&mut options.wrap, true),
            Long("no-wrap") => set(&mut options.wrap, false),
            Long("cr-wrap") => set(&mut options.cr_wrap, true),
            Long("no-cr-wrap") => set(&mut options.cr_wrap, false),
            Long("stdout") => set(&mut options.output, Output::Stdout),
            Long("stderr") => set(&mut options.output, Output::Stderr),
            Long("separator") => {
                options.separator = parser.value()?.string()?;
                None
            }
            Long("separate-output") => set(&mut options.separate_output, true),
            Long("no-tags") => set(&mut options.tags, false),
            Long("item-help") => set(&mut options.item_help, true),
            Long("default-item") => {
                options.default_item = Some(parser.value()?.string()?);
                None
            }
            Long("no-ok") => set(&mut options.ok_button, false),
            Long("no-cancel") | Long("nocancel") => set(&mut options.cancel_button, false),
            Long("no-buttons") => set(&mut options.buttons, false),
            Long("default-no") => set(&mut options.default_no, true),
            Long("wizard") => set(&mut options.wizard, true),
            Long("extra-button") => set(&mut options.extra_button, true),
            Long("ok-label") => {
                options.ok_label = Some(parser.value()?.string()?);
                None
            }
            Long("cancel-label") => {
                options.cancel_label = Some(parser.value()?.string()?);
                None
            }
            Long("extra-label") => {
                options.extra_label = Some(parser.value()?.string()?);
                None
            }
            Long("print") => {
                options.printer = Some(parser.value()?.string()?);
                None
            }
            Long("check") => {
                let label = parser.value()?.string()?;
                let status = optional(&mut parser, |s| {
                    ["on", "off", "checked", "unchecked"].iter().any(|w| s.eq_ignore_ascii_case(w))
                })?;
                let on = status.is_some_and(|s| {
                    s.eq_ignore_ascii_case("on") || s.eq_ignore_ascii_case("checked")
                });
                options.check = Some(CheckOption {
                    label,
                    on,
                });
                None
            }
            Long("beep") => set(&mut options.beep_before, true),
            Long("beep-after") => set(&mut options.beep_after, true),
            Long("begin") => {
                let y = parser.value()?.parse()?;
                let x = parser.value()?.parse()?;
                set(&mut options.placement, Placement::Origin {
                    x,
                    y,
                })
            }
            Long("screen-center") => set(&mut options.placement, Placement::Center),
            Long("under-mouse") => set(&mut options.placement, Placement::Mouse),
            Long("auto-placement") => set(&mut options.placement, Placement::Auto),
            Long("size-in-pixels") => set(&mut options.size_in_pixels, true),
            Long("ignore-eof") => set(&mut options.ignore_eof, true),
            Long("smooth") => set(&mut options.smooth, true),
            Long("interval") => {
                let ms: u64 = parser.value()?.parse()?;
                options.interval = (ms > 0).then(|| Duration::from_millis(ms));
                None
            }
            Long("timeout") => {
                let secs: u64 = parser.value()?.parse()?;
                options.timeout = (secs > 0).then(|| Duration::from_secs(secs));
                None
            }
            Long("no-close") => set(&mut options.no_close, true),
            Long("reverse") => set(&mut options.reverse, true),
            Long("keep-colors") => set(&mut options.keep_colors, true),
            Long("time-stamp") => set(&mut options.time_stamp, true),
            Long("date-stamp") => {
                options.time_stamp = true;
                set(&mut options.date_stamp, true)
            }
            Long("fixed-font") => set(&mut options.fixed_font, true),
            Long("editable") => set(&mut options.editable, true),
            Long("password") => {
                options.password = match parser.optional_value() {
                    Some(n) => match n.parse::<usize>()? {
                        n @ 1..=3 => Masking::Only(n),
                        n => {
                            return Err(Error::Usage(format!(
                                "--password={n}: entry number must be 1, 2 or 3"
                            )));
                        }
                    },
                    None => options.password.bump(),
                };
                None
            }

            _ => return Err(arg.unexpected().into()),
        };

        if let Some(kind) = kind {
            if found.is_some() {
                return Err(Error::Usage("only one box option may be given".to_string()));
            }
            let text = parser.value()?.string()?;
            let size = BoxSize {
                height: parser.value()?.parse()?,
                width: parser.value()?.parse()?,
            };
            found = Some((text, size, box_arguments(&mut parser, kind)?));
        }
    }

    if !seen_any {
        return Ok(Command::Usage);
    }

    let Some((text, size, pending)) = found else {
        return Err(Error::Usage("no box option given (try --help)".to_string()));
    };

    let widget = match pending {
        Pending::Ready(widget) => widget,
        Pending::Items {
            target,
            list_height,
            args,
        } => item_widget(target, list_height, &args, options.item_help)?,
    };

    Ok(Command::Run(Invocation {
        options,
        text,
        size,
        widget,
    }))
}

fn item_widget(target: ItemBox, list_height: i32, args: &[String], help: bool) -> Result<Widget, Error> {
    let widget = match target {
        ItemBox::List(kind) => {
            let layout = ItemLayout {
                status: kind != ListKind::Menu,
                help,
            };
            Widget::List {
                kind,
                list_height,
                items: parse_items(args, layout)?,
            }
        }
        ItemBox::Build => {
            let layout = ItemLayout {
                status: true,
                help,
            };
            Widget::Buildlist {
                list_height,
                items: parse_items(args, layout)?,
            }
        }
        ItemBox::Tree => Widget::Treeview {
            list_height,
            items: parse_tree_items(args, help)?,
        },
    };
    Ok(widget)
}

/// A box option; its own arguments follow text, height and width.
#[derive(Clone, Copy)]
enum BoxKind {
    Message(bool),
    Infobox,
    Gauge,
    Progress,
    Tailbox,
    Logbox,
    Textbox,
    Editbox,
    Input(usize),
    List(ListKind),
    Items(ItemBox),
    Combobox,
    Range(usize),
    Spin(usize),
    Calendar,
    Timebox,
}

fn box_arguments(parser: &mut Parser, kind: BoxKind) -> Result<Pending, Error> {
    let widget = match kind {
        BoxKind::Message(yesno) => Widget::Message {
            yesno,
        },
        BoxKind::Tailbox => Widget::Tailbox,
        BoxKind::Logbox => Widget::Logbox,
        BoxKind::Textbox => Widget::Textbox,
        BoxKind::Editbox => Widget::Editbox,
        BoxKind::Infobox => Widget::Infobox {
            timeout: optional_number::<u64>(parser)?.map(Duration::from_millis),
        },
        BoxKind::Gauge => Widget::Gauge {
            percent: optional_number(parser)?.unwrap_or(0),
        },
        BoxKind::Progress => {
            let maxdots = optional_number(parser)?;
            let msglen = match maxdots {
                Some(_) => optional_number(parser)?,
                None => None,
            };
            Widget::Progress {
                maxdots: maxdots.unwrap_or(0),
                msglen: msglen.unwrap_or(0),
            }
        }
        BoxKind::Input(1) => Widget::Input {
            fields: vec![InputField {
                label: None,
                init: optional(parser, |s| !is_option(s))?.unwrap_or_default(),
            }],
        },
        BoxKind::Input(n) => {
            let mut fields = Vec::with_capacity(n);
            for _ in 0..n {
                fields.push(InputField {
                    label: Some(parser.value()?.string()?),
                    init: parser.value()?.string()?,
                });
            }
            Widget::Input {
                fields,
            }
        }
        BoxKind::List(kind) => return item_rows(parser, ItemBox::List(kind)),
        BoxKind::Items(target) => return item_rows(parser, target),
        BoxKind::Combobox => {
            let entries = trailing(parser)?;
            if entries.is_empty() {
                return Err(Error::Usage("--combobox needs at least one item".to_string()));
            }
            Widget::Combobox {
                entries,
            }
        }
        BoxKind::Range(1) => {
            let min = parser.value()?.parse()?;
            let max = parser.value()?.parse()?;
            let value = optional_number(parser)?.unwrap_or(min);
            Widget::Rangebox {
                ranges: vec![Adjustment::new(min, max, value)],
            }
        }
        BoxKind::Range(n) => {
            let mut ranges = Vec::with_capacity(n);
            for _ in 0..n {
                let label = parser.value()?.string()?;
                let min = parser.value()?.parse()?;
                let max = parser.value()?.parse()?;
                let value = parser.value()?.parse()?;
                ranges.push(Adjustment::new(min, max, value).with_label(&label));
            }
            Widget::Rangebox {
                ranges,
            }
        }
        BoxKind::Spin(n) => {
            let mut spins = Vec::with_capacity(n);
            for _ in 0..n {
                let min = parser.value()?.parse()?;
                let max = parser.value()?.parse()?;
                let value = parser.value()?.parse()?;
                let label = parser.value()?.string()?;
                spins.push(Adjustment::new(min, max, value).with_label(&label));
            }
            Widget::Spinbox {
                spins,
            }
        }
        BoxKind::Calendar => Widget::Calendar {
            day: parser.value()?.parse()?,
            month: parser.value()?.parse()?,
            year: parser.value()?.parse()?,
        },
        BoxKind::Timebox => {
            let time = match optional_number(parser)? {
                Some(hours) => {
                    Some((hours, parser.value()?.parse()?, parser.value()?.parse()?))
                }
                None => None,
            };
            Widget::Timebox {
                time,
            }
        }
    };
    Ok(Pending::Ready(widget))
}

fn item_rows(parser: &mut Parser, target: ItemBox) -> Result<Pending, Error> {
    let list_height = parser.value()?.parse()?;
    Ok(Pending::Items {
        target,
        list_height,
        args: trailing(parser)?,
    })
}

/// Every argument up to the next long option.
fn trailing(parser: &mut Parser) -> Result<Vec<String>, Error> {
    let mut args = Vec::new();
    let mut raw = parser.raw_args()?;
    while let Some(arg) = raw.next_if(|a| a.to_str().is_none_or(|s| !is_option(s))) {
        args.push(arg.string()?);
    }
    Ok(args)
}

fn set<T>(slot: &mut T, value: T) -> Option<BoxKind> {
    *slot = value;
    None
}

fn is_option(arg: &str) -> bool {
    arg.len() > 2 && arg.starts_with("--")
}

/// Takes the next argument if `accept` says it belongs to the current
/// option.
fn optional(parser: &mut Parser, accept: impl FnOnce(&str) -> bool) -> Result<Option<String>, Error> {
    let mut raw = parser.raw_args()?;
    let Some(arg) = raw.next_if(|a| a.to_str().is_some_and(accept)) else {
        return Ok(None);
    };
    Ok(Some(arg.string()?))
}

fn optional_number<T: std::str::FromStr>(parser: &mut Parser) -> Result<Option<T>, Error> {
    let Some(arg) = optional(parser, |s| s.trim().parse::<T>().is_ok())? else {
        return Ok(None);
    };
    arg.trim()
        .parse()
        .map(Some)
        .map_err(|_| Error::Usage(format!("invalid number {arg:?}")))
}

pub fn print_help() {
    println!(
        r#"xdialog {VERSION} - display dialog boxes from shell scripts

USAGE:
    xdialog [OPTIONS] --<box> <text|file> <height> <width> [BOX ARGUMENTS]

BOXES:
    --msgbox      text h w
    --yesno       text h w
    --infobox     text h w [timeout]
    --gauge       text h w [percent]
    --progress    text h w [maxdots [[-]msglen]]
    --tailbox     file h w
    --logbox      file h w
    --textbox     file h w
    --inputbox    text h w [init]
    --2inputsbox  text h w label1 init1 label2 init2
    --3inputsbox  text h w label1 init1 label2 init2 label3 init3
    --passwordbox text h w [init]
    --checklist   text h w list_height {{tag item status [help]}}...
    --radiolist   text h w list_height {{tag item status [help]}}...
    --menubox     text h w menu_height {{tag item [help]}}...
    --buildlist   text h w list_height {{tag item status [help]}}...
    --treeview    text h w list_height {{tag item status depth [help]}}...
    --editbox     file h w
    --combobox    text h w item...
    --rangebox    text h w min max [default]
    --2rangesbox  text h w {{label min max default}} x2
    --3rangesbox  text h w {{label min max default}} x3
    --spinbox     text h w min max default label
    --2spinsbox   text h w {{min max default label}} x2
    --3spinsbox   text h w {{min max default label}} x3
    --calendar    text h w day month year
    --timebox     text h w [hours minutes seconds]

COMMON OPTIONS:
    --title <text>            --backtitle <text>         --wmclass <name>
    --left | --right | --center | --fill                 --wrap | --no-wrap
    --cr-wrap                 --stdout | --stderr        --separator <str>
    --separate-output         --no-tags                  --item-help
    --default-item <tag>      --no-ok                    --no-cancel
    --no-buttons              --default-no               --wizard
    --help <text>             --extra-button             --extra-label <text>
    --ok-label <text>         --cancel-label <text>      --print <printer>
    --check <label> [on|off]  --beep                     --beep-after
    --begin <y> <x>           --screen-center            --under-mouse
    --auto-placement          --size-in-pixels           --ignore-eof
    --smooth                  --interval <ms>            --timeout <s>
    --no-close                --reverse                  --keep-colors
    --time-stamp              --date-stamp               --fixed-font
    --password[=1|2|3]        --editable                 --version
    --print-version

EXIT CODES:
    0    OK, Yes or Next
    1    Cancel or No
    2    Help
    3    Extra or Previous
    255  Window closed, timeout or error
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemState;

    fn run(args: &[&str]) -> Invocation {
        match parse(args.iter().copied()).unwrap() {
            Command::Run(invocation) => invocation,
            other => panic!("expected a box, got {other:?}"),
        }
    }

    #[test]
    fn msgbox_with_common_options() {
        let inv = run(&["--title", "T", "--stdout", "--wrap", "--msgbox", "Hello", "10", "40"]);
        assert_eq!(inv.options.title, "T");
        assert_eq!(inv.options.output, Output::Stdout);
        assert!(inv.options.wrap);
        assert_eq!(inv.text, "Hello");
        assert_eq!(inv.size, BoxSize {
            height: 10,
            width: 40
        });
        assert_eq!(inv.widget, Widget::Message {
            yesno: false
        });
    }

    #[test]
    fn infobox_timeout_is_optional() {
        let inv = run(&["--infobox", "wait", "0", "0", "3000"]);
        assert_eq!(inv.widget, Widget::Infobox {
            timeout: Some(Duration::from_millis(3000))
        });
        let inv = run(&["--infobox", "wait", "0", "0", "--no-buttons"]);
        assert_eq!(inv.widget, Widget::Infobox {
            timeout: None
        });
        assert!(!inv.options.buttons);
    }

    #[test]
    fn progress_accepts_negative_msglen() {
        let inv = run(&["--progress", "Copying", "0", "0", "50", "-12"]);
        assert_eq!(inv.widget, Widget::Progress {
            maxdots: 50,
            msglen: -12
        });
        let inv = run(&["--progress", "Copying", "0", "0"]);
        assert_eq!(inv.widget, Widget::Progress {
            maxdots: 0,
            msglen: 0
        });
    }

    #[test]
    fn gauge_percent() {
        let inv = run(&["--gauge", "x", "8", "40", "35"]);
        assert_eq!(inv.widget, Widget::Gauge {
            percent: 35
        });
    }

    #[test]
    fn input_boxes() {
        let inv = run(&["--inputbox", "Name?", "0", "0", "bob"]);
        assert_eq!(inv.widget, Widget::Input {
            fields: vec![InputField {
                label: None,
                init: "bob".into()
            }]
        });

        let inv = run(&["--2inputsbox", "Login", "0", "0", "User", "me", "Pass", ""]);
        let Widget::Input {
            fields,
        } = inv.widget
        else {
            panic!("not an input box");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].label.as_deref(), Some("Pass"));
        assert_eq!(fields[1].init, "");
    }

    #[test]
    fn passwordbox_masks_its_entry() {
        let inv = run(&["--passwordbox", "Secret", "0", "0"]);
        assert_eq!(inv.options.password, Masking::Last(1));

        let inv = run(&["--password", "--password", "--3inputsbox", "t", "0", "0", "a", "", "b",
            "", "c", ""]);
        assert_eq!(inv.options.password, Masking::Last(2));

        let inv = run(&["--password=2", "--2inputsbox", "t", "0", "0", "a", "", "b", ""]);
        assert_eq!(inv.options.password, Masking::Only(2));
        assert!(parse(["--password=7", "--inputbox", "t", "0", "0"]).is_err());
    }

    #[test]
    fn checklist_items() {
        let inv = run(&[
            "--separator", ":", "--checklist", "Pick", "0", "0", "3", "1", "One", "on", "2",
            "Two", "off",
        ]);
        assert_eq!(inv.options.separator, ":");
        let Widget::List {
            kind,
            list_height,
            items,
        } = inv.widget
        else {
            panic!("not a list");
        };
        assert_eq!(kind, ListKind::Checklist);
        assert_eq!(list_height, 3);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].state, ItemState::On);
    }

    #[test]
    fn menu_items_with_help_and_trailing_option() {
        let inv = run(&[
            "--item-help", "--menubox", "Go", "0", "0", "2", "a", "Alpha", "tip a", "b", "Beta",
            "tip b", "--stdout",
        ]);
        assert_eq!(inv.options.output, Output::Stdout);
        let Widget::List {
            items, ..
        } = inv.widget
        else {
            panic!("not a list");
        };
        assert_eq!(items[1].tip.as_deref(), Some("tip b"));
    }

    #[test]
    fn wrong_item_count_is_an_error() {
        let err = parse(["--radiolist", "t", "0", "0", "2", "a", "b"]).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[test]
    fn help_with_and_without_text() {
        assert_eq!(parse(["--help"]).unwrap(), Command::Usage);
        assert_eq!(parse(Vec::<String>::new()).unwrap(), Command::Usage);
        let inv = run(&["--help", "Some help", "--msgbox", "x", "0", "0"]);
        assert_eq!(inv.options.help.as_deref(), Some("Some help"));
    }

    #[test]
    fn check_button_and_placement() {
        let inv = run(&["--check", "Remember", "on", "--begin", "-10", "20", "--yesno", "?", "0",
            "0"]);
        assert_eq!(inv.options.check, Some(CheckOption {
            label: "Remember".into(),
            on: true
        }));
        assert_eq!(inv.options.placement, Placement::Origin {
            x: 20,
            y: -10
        });

        let inv = run(&["--check", "Remember", "--msgbox", "x", "0", "0"]);
        assert_eq!(inv.options.check.map(|c| c.on), Some(false));
    }

    #[test]
    fn timers() {
        let inv = run(&["--interval", "500", "--timeout", "5", "--msgbox", "x", "0", "0"]);
        assert_eq!(inv.options.interval, Some(Duration::from_millis(500)));
        assert_eq!(inv.options.timeout, Some(Duration::from_secs(5)));
        let inv = run(&["--timeout", "0", "--msgbox", "x", "0", "0"]);
        assert_eq!(inv.options.timeout, None);
    }

    #[test]
    fn version_goes_to_the_selected_stream() {
        assert_eq!(parse(["--version"]).unwrap(), Command::Version(Output::Stdout));
        assert_eq!(parse(["--print-version"]).unwrap(), Command::Version(Output::Stderr));
        assert_eq!(
            parse(["--stdout", "--print-version"]).unwrap(),
            Command::Version(Output::Stdout)
        );
    }

    #[test]
    fn usage_errors() {
        assert!(matches!(parse(["--title", "x"]), Err(Error::Usage(_))));
        assert!(matches!(parse(["--bogus"]), Err(Error::Usage(_))));
        assert!(matches!(parse(["--msgbox", "x", "ten", "0"]), Err(Error::Usage(_))));
        assert!(matches!(
            parse(["--msgbox", "x", "0", "0", "--yesno", "y", "0", "0"]),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn build_and_tree_lists() {
        let inv = run(&["--buildlist", "Pick", "0", "0", "4", "a", "Alpha", "on", "b", "Beta",
            "off"]);
        let Widget::Buildlist {
            list_height,
            items,
        } = inv.widget
        else {
            panic!("not a build list");
        };
        assert_eq!(list_height, 4);
        assert_eq!(items.len(), 2);
        assert!(items[0].is_on());

        let inv = run(&["--treeview", "Tree", "0", "0", "0", "r", "Root", "off", "0", "l",
            "Leaf", "on", "1", "--stdout"]);
        assert!(matches!(inv.widget, Widget::Treeview { .. }));
        assert_eq!(inv.options.output, Output::Stdout);
        let inv = run(&["--item-help", "--treeview", "Tree", "0", "0", "0", "r", "Root", "off",
            "0", "tip"]);
        let Widget::Treeview {
            items, ..
        } = inv.widget
        else {
            panic!("not a tree");
        };
        assert_eq!(items[0].item.tip.as_deref(), Some("tip"));
    }

    #[test]
    fn range_boxes() {
        let inv = run(&["--rangebox", "Volume", "0", "0", "0", "100", "30"]);
        assert_eq!(inv.widget, Widget::Rangebox {
            ranges: vec![Adjustment::new(0, 100, 30)]
        });
        let inv = run(&["--rangebox", "Volume", "0", "0", "5", "10"]);
        assert_eq!(inv.widget, Widget::Rangebox {
            ranges: vec![Adjustment::new(5, 10, 5)]
        });

        let inv = run(&["--2rangesbox", "Mix", "0", "0", "Left", "0", "10", "2", "Right", "-5",
            "5", "0"]);
        let Widget::Rangebox {
            ranges,
        } = inv.widget
        else {
            panic!("not a rangebox");
        };
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].label.as_deref(), Some("Right"));
        assert_eq!(ranges[1].min(), -5);
    }

    #[test]
    fn spin_boxes() {
        let inv = run(&["--2spinsbox", "Size", "0", "0", "1", "80", "24", "rows", "1", "200",
            "80", "columns"]);
        let Widget::Spinbox {
            spins,
        } = inv.widget
        else {
            panic!("not a spinbox");
        };
        assert_eq!(spins[0].value(), 24);
        assert_eq!(spins[1].label.as_deref(), Some("columns"));
        assert!(parse(["--spinbox", "x", "0", "0", "1", "2", "3"]).is_err());
    }

    #[test]
    fn calendar_and_timebox() {
        let inv = run(&["--calendar", "When?", "0", "0", "0", "12", "2024"]);
        assert_eq!(inv.widget, Widget::Calendar {
            day: 0,
            month: 12,
            year: 2024
        });
        let inv = run(&["--timebox", "At?", "0", "0"]);
        assert_eq!(inv.widget, Widget::Timebox {
            time: None
        });
        let inv = run(&["--timebox", "At?", "0", "0", "8", "30", "0", "--stdout"]);
        assert_eq!(inv.widget, Widget::Timebox {
            time: Some((8, 30, 0))
        });
        assert_eq!(inv.options.output, Output::Stdout);
        assert!(parse(["--timebox", "At?", "0", "0", "8"]).is_err());
    }

    #[test]
    fn combobox_and_editbox() {
        let inv = run(&["--editable", "--combobox", "Fruit", "0", "0", "apple", "pear",
            "--default-item", "fig"]);
        assert!(inv.options.editable);
        assert_eq!(inv.options.default_item.as_deref(), Some("fig"));
        assert_eq!(inv.widget, Widget::Combobox {
            entries: vec!["apple".into(), "pear".into()]
        });
        assert!(matches!(parse(["--combobox", "x", "0", "0"]), Err(Error::Usage(_))));

        let inv = run(&["--editbox", "/tmp/notes", "20", "60"]);
        assert_eq!(inv.text, "/tmp/notes");
        assert_eq!(inv.widget, Widget::Editbox);
    }
}
