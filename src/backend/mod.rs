pub(crate) mod x11;

use bitflags::bitflags;

use crate::{config::Placement, error::Error, render::Canvas};

/// Default scale factor for rendering
pub(crate) const DEFAULT_SCALE: f32 = 1.0;

/// Trait for connecting to a display server.
pub(crate) trait DisplayConnection: Sized {
    type Window: Window;

    fn connect() -> Result<Self, Error>;
    /// Size of the default screen in pixels.
    fn screen_size(&self) -> (u32, u32);
    fn create_window(&self, width: u16, height: u16) -> Result<Self::Window, Error>;
}

/// Cursor shape types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CursorShape {
    /// Default arrow cursor.
    #[default]
    Default,
    /// Text input (I-beam) cursor.
    Text,
}

/// Trait for interacting with a window.
pub(crate) trait Window {
    fn set_title(&mut self, title: &str) -> Result<(), Error>;
    fn set_class(&mut self, class: &str) -> Result<(), Error>;
    fn set_contents(&mut self, canvas: &Canvas) -> Result<(), Error>;
    /// Moves the (not yet mapped) window to `(x, y)` on the screen.
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), Error>;
    fn show(&mut self) -> Result<(), Error>;
    fn wait_for_event(&mut self) -> Result<WindowEvent, Error>;
    fn poll_for_event(&mut self) -> Result<Option<WindowEvent>, Error>;
    fn scale_factor(&self) -> f32;
    fn set_cursor(&mut self, shape: CursorShape) -> Result<(), Error>;
    fn beep(&mut self) -> Result<(), Error>;
    fn screen_size(&self) -> (u32, u32);
    /// Pointer position in screen coordinates.
    fn pointer_position(&self) -> Result<(i32, i32), Error>;
}

/// Events that can be emitted by a window.
#[derive(Debug, Clone)]
pub(crate) enum WindowEvent {
    CloseRequested,
    RedrawRequested,
    CursorEnter(CursorPos),
    CursorMove(CursorPos),
    CursorLeave,
    ButtonPress(MouseButton, Modifiers),
    ButtonRelease(MouseButton, Modifiers),
    Scroll(ScrollDirection),
    KeyPress(KeyEvent),
    TextInput(char),
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CursorPos {
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub(crate) struct KeyEvent {
    pub keysym: u32,
    pub modifiers: Modifiers,
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub(crate) struct Modifiers: u8 {
        const SHIFT = 0x01;
        const CTRL  = 0x02;
        const ALT   = 0x04;
        const SUPER = 0x08;
    }
}

// XKB keysyms used by the dialogs.
pub(crate) mod keysym {
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const HOME: u32 = 0xff50;
    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
    pub const PAGE_UP: u32 = 0xff55;
    pub const PAGE_DOWN: u32 = 0xff56;
    pub const END: u32 = 0xff57;
    pub const KP_ENTER: u32 = 0xff8d;
    pub const ISO_LEFT_TAB: u32 = 0xfe20;
    pub const DELETE: u32 = 0xffff;
}

/// Connects to the X server named by `DISPLAY`.
pub(crate) fn connect() -> Result<x11::Connection, Error> {
    x11::Connection::connect()
}

/// Screen position for a window of `size` under `placement`, or `None` to
/// let the window manager decide.
///
/// Negative origins count from the right and bottom edges; `decoration`
/// accounts for the frame the window manager adds around the window.
pub(crate) fn window_origin(
    placement: Placement,
    screen: (u32, u32),
    size: (u32, u32),
    pointer: (i32, i32),
    decoration: (i32, i32),
) -> Option<(i32, i32)> {
    let (sw, sh) = (screen.0 as i32, screen.1 as i32);
    let (w, h) = (size.0 as i32, size.1 as i32);
    let clamp = |v: i32, room: i32| v.clamp(0, room.max(0));

    match placement {
        Placement::Auto => None,
        Placement::Center => Some((clamp((sw - w) / 2, sw - w), clamp((sh - h) / 2, sh - h))),
        Placement::Mouse => Some((
            clamp(pointer.0 - w / 2, sw - w),
            clamp(pointer.1 - h / 2, sh - h),
        )),
        Placement::Origin {
            x,
            y,
        } => {
            let x = if x < 0 { sw + x - w - decoration.0 } else { x };
            let y = if y < 0 { sh + y - h - decoration.1 } else { y };
            Some((x, y))
        }
    }
}
