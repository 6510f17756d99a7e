//! X11 backend implementation.

use std::{ops::Deref, rc::Rc};

use kbvm::{lookup::LookupTable, xkb::x11::KbvmX11Ext};
use x11rb::{
    connection::Connection as X11rbConnection,
    properties::{WmSizeHints, WmSizeHintsSpecification},
    protocol::{
        Event,
        xproto::{
            self, AtomEnum, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt as _,
            CreateWindowAux, EventMask, ImageFormat, KeyButMask, PropMode, StackMode, VisualClass,
            WindowClass,
        },
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
};

use super::{
    CursorPos, CursorShape, DisplayConnection, KeyEvent, Modifiers, MouseButton, ScrollDirection,
    Window, WindowEvent,
};
use crate::{
    error::{Error, X11Error},
    render::Canvas,
};

x11rb::atom_manager! {
    pub Atoms: AtomCookie {
        UTF8_STRING,

        WM_PROTOCOLS,
        WM_DELETE_WINDOW,

        _NET_WM_NAME,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DIALOG,
    }
}

#[derive(Clone)]
pub(crate) struct Connection {
    inner: Rc<RustConnection>,
    screen: usize,
}

impl Deref for Connection {
    type Target = RustConnection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DisplayConnection for Connection {
    type Window = X11Window;

    fn connect() -> Result<Self, Error> {
        let (conn, screen) = match x11rb::connect(None) {
            Ok(c) => c,
            Err(x11rb::errors::ConnectError::DisplayParsingError(_)) => {
                return Err(Error::NoDisplay);
            }
            Err(e) => return Err(e.into()),
        };
        log::debug!("connected to X server, screen {screen}");
        Ok(Self {
            inner: Rc::new(conn),
            screen,
        })
    }

    fn screen_size(&self) -> (u32, u32) {
        self.inner
            .setup()
            .roots
            .get(self.screen)
            .map(|s| (s.width_in_pixels.into(), s.height_in_pixels.into()))
            .unwrap_or((0, 0))
    }

    fn create_window(&self, width: u16, height: u16) -> Result<Self::Window, Error> {
        X11Window::create(self.clone(), width, height)
    }
}

// Glyphs of the X cursor font.
const XC_XTERM: u16 = 152;

/// Bell volume, relative to the base volume of the keyboard.
const BELL_PERCENT: i8 = 0;

pub(crate) struct X11Window {
    atoms: Atoms,
    conn: Connection,
    window: xproto::Window,
    root: xproto::Window,
    screen_size: (u32, u32),
    size: (u16, u16),
    gc: xproto::Gcontext,
    lookup_table: LookupTable,
    xkb_group: u8,
    cursor_text: xproto::Cursor,
    current_cursor: CursorShape,
}

impl X11Window {
    fn create(conn: Connection, width: u16, height: u16) -> Result<Self, Error> {
        let atoms = Atoms::new(&conn.inner)?.reply()?;

        let screen = conn
            .inner
            .setup()
            .roots
            .get(conn.screen)
            .ok_or(Error::X11(X11Error::NoVisual))?;
        let root = screen.root;
        let screen_size = (screen.width_in_pixels.into(), screen.height_in_pixels.into());

        // Find a 24-bit TrueColor visual
        let vid = screen
            .allowed_depths
            .iter()
            .filter(|d| d.depth == 24)
            .flat_map(|d| d.visuals.iter())
            .find(|vty| {
                vty.class == VisualClass::TRUE_COLOR
                    && vty.red_mask == 0xff0000
                    && vty.green_mask == 0xff00
                    && vty.blue_mask == 0xff
            })
            .map(|vty| vty.visual_id)
            .ok_or(Error::X11(X11Error::NoVisual))?;

        let attrs = CreateWindowAux::new()
            .event_mask(
                EventMask::EXPOSURE
                    | EventMask::STRUCTURE_NOTIFY
                    | EventMask::KEY_PRESS
                    | EventMask::POINTER_MOTION
                    | EventMask::ENTER_WINDOW
                    | EventMask::LEAVE_WINDOW
                    | EventMask::BUTTON_PRESS
                    | EventMask::BUTTON_RELEASE,
            )
            .border_pixel(0)
            .colormap(0);

        let window = conn.generate_id()?;
        conn.inner
            .create_window(
                24,
                window,
                root,
                0,
                0,
                width,
                height,
                0,
                WindowClass::INPUT_OUTPUT,
                vid,
                &attrs,
            )?
            .check()?;

        let gc = conn.generate_id()?;
        conn.create_gc(gc, window, &xproto::CreateGCAux::new().graphics_exposures(0))?;

        // Closing through the window manager arrives as a ClientMessage.
        conn.change_property32(
            PropMode::REPLACE,
            window,
            atoms.WM_PROTOCOLS,
            AtomEnum::ATOM,
            &[atoms.WM_DELETE_WINDOW],
        )?;

        conn.setup_xkb_extension().map_err(|_| Error::X11(X11Error::NoKeymap))?;
        let device_id = conn.get_xkb_core_device_id().map_err(|_| Error::X11(X11Error::NoKeymap))?;
        let keymap = conn.get_xkb_keymap(device_id).map_err(|_| Error::X11(X11Error::NoKeymap))?;
        let lookup_table = keymap.to_builder().build_lookup_table();

        // Only the I-beam is created; the default pointer is left to the
        // window manager so it follows the cursor theme.
        let cursor_font = conn.generate_id()?;
        conn.open_font(cursor_font, b"cursor")?;
        let cursor_text = conn.generate_id()?;
        conn.create_glyph_cursor(
            cursor_text,
            cursor_font,
            cursor_font,
            XC_XTERM,
            XC_XTERM + 1,
            0,
            0,
            0,
            0xffff,
            0xffff,
            0xffff,
        )?;
        conn.close_font(cursor_font)?;

        let win = X11Window {
            atoms,
            conn,
            window,
            root,
            screen_size,
            size: (width, height),
            gc,
            lookup_table,
            xkb_group: 0,
            cursor_text,
            current_cursor: CursorShape::Default,
        };
        win.set_size_hints(None)?;
        win.set_dialog_type()?;

        Ok(win)
    }

    /// Fixes the window size, and the position once one is chosen.
    fn set_size_hints(&self, position: Option<(i32, i32)>) -> Result<(), Error> {
        let (width, height) = (i32::from(self.size.0), i32::from(self.size.1));
        WmSizeHints {
            position: position.map(|(x, y)| (WmSizeHintsSpecification::UserSpecified, x, y)),
            max_size: Some((width, height)),
            min_size: Some((width, height)),
            ..Default::default()
        }
        .set_normal_hints(&self.conn.inner, self.window)?
        .check()?;
        Ok(())
    }

    fn set_dialog_type(&self) -> Result<(), Error> {
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_WINDOW_TYPE,
                AtomEnum::ATOM,
                &[self.atoms._NET_WM_WINDOW_TYPE_DIALOG],
            )?
            .check()?;
        Ok(())
    }

    fn cvt_event(&mut self, ev: Event) -> Option<WindowEvent> {
        Some(match ev {
            Event::ClientMessage(msg) if msg.data.as_data32()[0] == self.atoms.WM_DELETE_WINDOW => {
                WindowEvent::CloseRequested
            }
            Event::KeyPress(press) if press.event == self.window => {
                let (modifiers, xkb_mods) = held_modifiers(press.state);
                let keycode = kbvm::Keycode::from_x11(press.detail.into());
                let group = kbvm::GroupIndex(self.xkb_group as u32);
                let lookup = self.lookup_table.lookup(group, xkb_mods, keycode);
                let keysym = lookup.clone().into_iter().next().map(|p| p.keysym().0).unwrap_or(0);

                // Printable characters arrive as text; Escape, Return and
                // friends are control characters and stay key presses.
                let ch = lookup.into_iter().flat_map(|p| p.char()).next();
                if let Some(c) = ch {
                    if !c.is_control() && !modifiers.contains(Modifiers::CTRL) {
                        return Some(WindowEvent::TextInput(c));
                    }
                }

                WindowEvent::KeyPress(KeyEvent {
                    keysym,
                    modifiers,
                })
            }
            Event::Expose(ex) if ex.count == 0 => WindowEvent::RedrawRequested,
            Event::EnterNotify(e) => {
                WindowEvent::CursorEnter(CursorPos {
                    x: e.event_x,
                    y: e.event_y,
                })
            }
            Event::LeaveNotify(_) => WindowEvent::CursorLeave,
            Event::MotionNotify(e) => {
                WindowEvent::CursorMove(CursorPos {
                    x: e.event_x,
                    y: e.event_y,
                })
            }
            // Wheel notches come as presses of buttons 4 and 5; their
            // releases carry nothing.
            Event::ButtonPress(e) if e.detail == 4 => WindowEvent::Scroll(ScrollDirection::Up),
            Event::ButtonPress(e) if e.detail == 5 => WindowEvent::Scroll(ScrollDirection::Down),
            Event::ButtonPress(e) => {
                WindowEvent::ButtonPress(mouse_button(e.detail)?, convert_modifiers(e.state))
            }
            Event::ButtonRelease(e) if matches!(e.detail, 4 | 5) => return None,
            Event::ButtonRelease(e) => {
                WindowEvent::ButtonRelease(mouse_button(e.detail)?, convert_modifiers(e.state))
            }
            _ => return None,
        })
    }
}

/// Core protocol modifier bits with their toolkit and keymap counterparts.
const MODIFIER_MAP: [(KeyButMask, Modifiers, kbvm::ModifierMask); 4] = [
    (KeyButMask::SHIFT, Modifiers::SHIFT, kbvm::ModifierMask::SHIFT),
    (KeyButMask::CONTROL, Modifiers::CTRL, kbvm::ModifierMask::CONTROL),
    (KeyButMask::MOD1, Modifiers::ALT, kbvm::ModifierMask::MOD1),
    (KeyButMask::MOD4, Modifiers::SUPER, kbvm::ModifierMask::MOD4),
];

fn held_modifiers(state: KeyButMask) -> (Modifiers, kbvm::ModifierMask) {
    MODIFIER_MAP
        .iter()
        .filter(|(bit, ..)| state.contains(*bit))
        .fold((Modifiers::empty(), kbvm::ModifierMask::NONE), |(ours, xkb), &(_, m, k)| {
            (ours | m, xkb | k)
        })
}

fn convert_modifiers(state: KeyButMask) -> Modifiers {
    held_modifiers(state).0
}

/// `WM_CLASS` holds the instance and class names, each NUL terminated.
fn wm_class_property(class: &str) -> Vec<u8> {
    let instance = class.to_lowercase();
    let mut value = Vec::with_capacity(instance.len() + class.len() + 2);
    value.extend_from_slice(instance.as_bytes());
    value.push(0);
    value.extend_from_slice(class.as_bytes());
    value.push(0);
    value
}

impl Window for X11Window {
    fn set_title(&mut self, title: &str) -> Result<(), Error> {
        let title = title.trim_end_matches('\0');

        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                title.as_bytes(),
            )?
            .check()?;
        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_NAME,
                self.atoms.UTF8_STRING,
                title.as_bytes(),
            )?
            .check()?;

        Ok(())
    }

    fn set_class(&mut self, class: &str) -> Result<(), Error> {
        self.conn
            .change_property8(
                PropMode::REPLACE,
                self.window,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                &wm_class_property(class),
            )?
            .check()?;
        Ok(())
    }

    fn set_contents(&mut self, canvas: &Canvas) -> Result<(), Error> {
        let data = canvas.as_argb();
        let width = u16::try_from(canvas.width()).unwrap_or(u16::MAX);
        let height = u16::try_from(canvas.height()).unwrap_or(u16::MAX);
        self.conn
            .put_image(
                ImageFormat::Z_PIXMAP,
                self.window,
                self.gc,
                width,
                height,
                0,
                0,
                0,
                24,
                &data,
            )?
            .check()?;
        Ok(())
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), Error> {
        self.set_size_hints(Some((x, y)))?;
        self.conn.configure_window(self.window, &ConfigureWindowAux::new().x(x).y(y))?;
        Ok(())
    }

    fn show(&mut self) -> Result<(), Error> {
        self.conn.map_window(self.window)?;
        self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        self.conn.flush()?;
        Ok(())
    }

    fn wait_for_event(&mut self) -> Result<WindowEvent, Error> {
        loop {
            let ev = self.conn.wait_for_event()?;
            if let Some(ev) = self.cvt_event(ev) {
                return Ok(ev);
            }
        }
    }

    fn poll_for_event(&mut self) -> Result<Option<WindowEvent>, Error> {
        while let Some(ev) = self.conn.poll_for_event()? {
            if let Some(ev) = self.cvt_event(ev) {
                return Ok(Some(ev));
            }
        }
        Ok(None)
    }

    fn scale_factor(&self) -> f32 {
        super::DEFAULT_SCALE
    }

    fn set_cursor(&mut self, shape: CursorShape) -> Result<(), Error> {
        if self.current_cursor == shape {
            return Ok(());
        }

        // Cursor 0 hands the pointer back to the window manager's theme.
        let cursor_id = match shape {
            CursorShape::Text => self.cursor_text,
            CursorShape::Default => 0,
        };

        self.conn.change_window_attributes(
            self.window,
            &ChangeWindowAttributesAux::new().cursor(cursor_id),
        )?;
        self.conn.flush()?;

        self.current_cursor = shape;
        Ok(())
    }

    fn beep(&mut self) -> Result<(), Error> {
        self.conn.bell(BELL_PERCENT)?;
        self.conn.flush()?;
        Ok(())
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen_size
    }

    fn pointer_position(&self) -> Result<(i32, i32), Error> {
        let pointer = self.conn.query_pointer(self.root)?.reply()?;
        Ok((pointer.root_x.into(), pointer.root_y.into()))
    }
}

impl Drop for X11Window {
    fn drop(&mut self) {
        // The connection outlives the window when the help box follows.
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.flush();
    }
}

fn mouse_button(detail: u8) -> Option<MouseButton> {
    Some(match detail {
        1 => MouseButton::Left,
        2 => MouseButton::Middle,
        3 => MouseButton::Right,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wm_class_carries_instance_and_class() {
        assert_eq!(wm_class_property("Xdialog"), b"xdialog\0Xdialog\0");
    }

    #[test]
    fn modifier_masks() {
        let mods = convert_modifiers(KeyButMask::SHIFT | KeyButMask::CONTROL);
        assert_eq!(mods, Modifiers::SHIFT | Modifiers::CTRL);
        assert!(convert_modifiers(KeyButMask::BUTTON1).is_empty());
    }
}
