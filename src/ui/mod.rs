//! Dialog windows.

pub(crate) mod buildlist;
pub(crate) mod calendar;
pub(crate) mod combobox;
pub(crate) mod editbox;
pub(crate) mod frame;
pub(crate) mod input;
pub(crate) mod list;
pub(crate) mod live;
pub(crate) mod message;
pub(crate) mod scale;
pub(crate) mod spin;
pub(crate) mod textbox;
pub(crate) mod tree;
pub(crate) mod widgets;

use std::process::Command;

use crate::render::{Rgba, rgb};

/// Palette shared by the frame and every widget.
#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub window_bg: Rgba,
    pub text: Rgba,
    pub button: Rgba,
    pub button_hover: Rgba,
    pub button_pressed: Rgba,
    pub button_outline: Rgba,
    pub button_text: Rgba,
    pub input_bg: Rgba,
    pub input_bg_focused: Rgba,
    pub input_border: Rgba,
    pub input_border_focused: Rgba,
    pub input_placeholder: Rgba,
    pub progress_bg: Rgba,
    pub progress_fill: Rgba,
    pub progress_border: Rgba,
    pub window_border: Rgba,
}

/// Grey palette of the classic GTK dialogs.
pub static THEME_LIGHT: Colors = Colors {
    window_bg: rgb(237, 236, 235),
    text: rgb(30, 30, 30),
    button: rgb(224, 223, 222),
    button_hover: rgb(214, 213, 212),
    button_pressed: rgb(196, 195, 194),
    button_outline: rgb(168, 167, 166),
    button_text: rgb(30, 30, 30),
    input_bg: rgb(255, 255, 255),
    input_bg_focused: rgb(255, 255, 255),
    input_border: rgb(200, 200, 200),
    input_border_focused: rgb(100, 150, 200),
    input_placeholder: rgb(150, 150, 150),
    progress_bg: rgb(230, 230, 230),
    progress_fill: rgb(70, 140, 220),
    progress_border: rgb(200, 200, 200),
    window_border: rgb(180, 180, 180),
};

/// Used when the desktop asks for a dark theme.
pub static THEME_DARK: Colors = Colors {
    window_bg: rgb(45, 45, 45),
    text: rgb(230, 230, 230),
    button: rgb(70, 70, 70),
    button_hover: rgb(80, 80, 80),
    button_pressed: rgb(60, 60, 60),
    button_outline: rgb(100, 100, 100),
    button_text: rgb(230, 230, 230),
    input_bg: rgb(60, 60, 60),
    input_bg_focused: rgb(65, 65, 65),
    input_border: rgb(90, 90, 90),
    input_border_focused: rgb(100, 150, 200),
    input_placeholder: rgb(120, 120, 120),
    progress_bg: rgb(60, 60, 60),
    progress_fill: rgb(70, 140, 220),
    progress_border: rgb(90, 90, 90),
    window_border: rgb(70, 70, 70),
};

/// Picks the palette from `GTK_THEME`, then from the GNOME colour scheme.
/// Dialogs are light unless a dark theme is asked for.
pub fn detect_theme() -> &'static Colors {
    let gtk_theme = std::env::var("GTK_THEME").ok();
    let scheme = if gtk_theme.is_none() { color_scheme() } else { None };
    let colors = theme_for(gtk_theme.as_deref(), scheme.as_deref());
    log::debug!("dark theme: {}", std::ptr::eq(colors, &THEME_DARK));
    colors
}

fn color_scheme() -> Option<String> {
    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .ok()?;
    output.status.success().then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}

fn theme_for(gtk_theme: Option<&str>, color_scheme: Option<&str>) -> &'static Colors {
    let dark = match (gtk_theme, color_scheme) {
        (Some(theme), _) => theme.to_lowercase().contains("dark"),
        (None, Some(scheme)) => scheme.contains("dark"),
        (None, None) => false,
    };
    if dark { &THEME_DARK } else { &THEME_LIGHT }
}
