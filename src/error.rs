use std::{fmt, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    X11(X11Error),
    NoDisplay,
    Io(std::io::Error),
    /// No usable font file was found or the file could not be parsed.
    Font(String),
    Canvas {
        width: u32,
        height: u32,
    },
    /// A tailbox, logbox or textbox source could not be opened.
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Malformed command line.
    Usage(String),
}

#[derive(Debug)]
pub enum X11Error {
    Connect(x11rb::errors::ConnectError),
    Connection(x11rb::errors::ConnectionError),
    Reply(x11rb::errors::ReplyError),
    NoVisual,
    NoKeymap,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::X11(e) => write!(f, "X11 error: {e}"),
            Error::NoDisplay => write!(f, "no X display available"),
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Font(msg) => write!(f, "font error: {msg}"),
            Error::Canvas {
                width,
                height,
            } => write!(f, "invalid canvas size {width}x{height}"),
            Error::Open {
                path,
                source,
            } => write!(f, "can't open {}: {source}", path.display()),
            Error::Usage(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Open {
                source, ..
            } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for X11Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            X11Error::Connect(e) => write!(f, "connect: {e}"),
            X11Error::Connection(e) => write!(f, "connection: {e}"),
            X11Error::Reply(e) => write!(f, "reply: {e}"),
            X11Error::NoVisual => write!(f, "no suitable visual found"),
            X11Error::NoKeymap => write!(f, "XKB keymap unavailable"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<lexopt::Error> for Error {
    fn from(e: lexopt::Error) -> Self {
        Error::Usage(e.to_string())
    }
}

impl From<x11rb::errors::ConnectError> for Error {
    fn from(e: x11rb::errors::ConnectError) -> Self {
        Error::X11(X11Error::Connect(e))
    }
}

impl From<x11rb::errors::ConnectionError> for Error {
    fn from(e: x11rb::errors::ConnectionError) -> Self {
        Error::X11(X11Error::Connection(e))
    }
}

impl From<x11rb::errors::ReplyError> for Error {
    fn from(e: x11rb::errors::ReplyError) -> Self {
        Error::X11(X11Error::Reply(e))
    }
}

impl From<x11rb::errors::ReplyOrIdError> for Error {
    fn from(e: x11rb::errors::ReplyOrIdError) -> Self {
        match e {
            x11rb::errors::ReplyOrIdError::ConnectionError(e) => {
                Error::X11(X11Error::Connection(e))
            }
            x11rb::errors::ReplyOrIdError::X11Error(e) => Error::X11(X11Error::Reply(e.into())),
            x11rb::errors::ReplyOrIdError::IdsExhausted => Error::X11(X11Error::NoVisual),
        }
    }
}

impl Error {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> u8 {
        255
    }
}
