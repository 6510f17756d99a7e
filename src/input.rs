//! Non-blocking input for the live dialogs.
//!
//! Live dialogs poll their input from the timer ticks of a single-threaded
//! event loop, so a read must never block. [`LineReader`] keeps a fixed-size
//! buffer alive across ticks and hands out at most one token per call,
//! reporting "nothing yet" and "stream closed" as distinct outcomes.

use std::{
    collections::VecDeque,
    fs::File,
    io::{self, Read},
    path::Path,
};

use crate::error::Error;

/// Default capacity of a [`LineReader`] buffer.
pub const INPUT_BUFFER_SIZE: usize = 256;

/// Result of a non-blocking poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll<T> {
    /// A complete token (or chunk) is available.
    Ready(T),
    /// No complete token yet; poll again on a later tick.
    WouldBlock,
    /// The stream was closed or the descriptor is unusable.
    Eof,
}

impl<T> Poll<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Poll<U> {
        match self {
            Poll::Ready(t) => Poll::Ready(f(t)),
            Poll::WouldBlock => Poll::WouldBlock,
            Poll::Eof => Poll::Eof,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Poll::Eof)
    }
}

/// A byte stream that can be read without blocking.
///
/// `Ok(0)` means the stream is closed. "Nothing available right now" must be
/// reported as an error of kind [`io::ErrorKind::WouldBlock`] (or
/// `Interrupted`); every other error is treated like a closed stream.
pub trait ByteSource {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Standard input switched to non-blocking mode.
///
/// The previous descriptor flags are restored on drop; the descriptor is
/// shared with the parent shell.
pub struct StdinSource {
    saved_flags: Option<libc::c_int>,
}

impl StdinSource {
    pub fn new() -> Self {
        let fd = libc::STDIN_FILENO;
        // SAFETY: F_GETFL/F_SETFL only touch the status flags of fd 0.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags < 0 {
            log::debug!("stdin flags unavailable: {}", io::Error::last_os_error());
            return Self {
                saved_flags: None,
            };
        }

        // SAFETY: see above.
        let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
        if rc < 0 {
            log::warn!("cannot make stdin non-blocking: {}", io::Error::last_os_error());
            return Self {
                saved_flags: None,
            };
        }

        Self {
            saved_flags: Some(flags),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSource for StdinSource {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(n as usize)
        }
    }
}

impl Drop for StdinSource {
    fn drop(&mut self) {
        if let Some(flags) = self.saved_flags {
            // SAFETY: restores the flags read in `new`.
            unsafe {
                libc::fcntl(libc::STDIN_FILENO, libc::F_SETFL, flags);
            }
        }
    }
}

/// A regular file. Reads never block; reading at the end of the file reports
/// a closed stream until more data is appended.
pub struct FileSource {
    file: File,
}

impl FileSource {
    pub fn new(file: File) -> Self {
        Self {
            file,
        }
    }
}

impl ByteSource for FileSource {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// Input of a tailbox or logbox: standard input (`-`) or a file.
pub enum InputSource {
    Stdin(StdinSource),
    File {
        source: FileSource,
        initial_len: u64,
    },
}

impl InputSource {
    /// Opens `path`, `-` meaning standard input.
    ///
    /// For files the current length is recorded so that content written
    /// before the dialog opened is shown in full.
    pub fn open(path: &str) -> Result<Self, Error> {
        if path == "-" {
            return Ok(InputSource::Stdin(StdinSource::new()));
        }

        let open_err = |source| Error::Open {
            path: Path::new(path).to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let initial_len = file.metadata().map_err(open_err)?.len();
        log::debug!("opened {path} ({initial_len} bytes already present)");

        Ok(InputSource::File {
            source: FileSource::new(file),
            initial_len,
        })
    }

    /// Bytes already present when the source was opened.
    pub fn initial_len(&self) -> u64 {
        match self {
            InputSource::Stdin(_) => 0,
            InputSource::File {
                initial_len, ..
            } => *initial_len,
        }
    }
}

impl ByteSource for InputSource {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputSource::Stdin(s) => s.read_nonblocking(buf),
            InputSource::File {
                source, ..
            } => source.read_nonblocking(buf),
        }
    }
}

/// In-memory source replaying a fixed sequence of reads.
///
/// Each scripted chunk is delivered by one read (split further if the
/// reader's free space is smaller), each gap reports would-block, and the
/// end of the script reports a closed stream.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
}

#[derive(Debug)]
enum Step {
    Data(Vec<u8>),
    Block,
    Fail,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk(mut self, bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref();
        if !bytes.is_empty() {
            self.steps.push_back(Step::Data(bytes.to_vec()));
        }
        self
    }

    pub fn would_block(mut self) -> Self {
        self.steps.push_back(Step::Block);
        self
    }

    /// A read failing with `EBADF`.
    pub fn bad_descriptor(mut self) -> Self {
        self.steps.push_back(Step::Fail);
        self
    }

    /// Appends more scripted reads; used to simulate a producer that keeps
    /// writing while the dialog is open.
    pub fn push_chunk(&mut self, bytes: impl AsRef<[u8]>) {
        let bytes = bytes.as_ref();
        if !bytes.is_empty() {
            self.steps.push_back(Step::Data(bytes.to_vec()));
        }
    }

    pub fn push_would_block(&mut self) {
        self.steps.push_back(Step::Block);
    }
}

impl ByteSource for ScriptedSource {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            Some(Step::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.steps.push_front(Step::Data(bytes[n..].to_vec()));
                }
                Ok(n)
            }
            Some(Step::Block) => Err(io::ErrorKind::WouldBlock.into()),
            Some(Step::Fail) => Err(io::Error::from_raw_os_error(libc::EBADF)),
            None => Ok(0),
        }
    }
}

/// How a [`LineReader`] splits its input into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Newline-terminated lines; empty lines are tokens.
    Lines,
    /// Runs of non-whitespace; whitespace only separates.
    Words,
}

enum Fill {
    Data,
    WouldBlock,
    Eof,
}

/// Incremental tokenizer over a non-blocking [`ByteSource`].
///
/// When the buffer fills up without a delimiter, its whole content is
/// delivered as one token; long lines come out in buffer-sized pieces.
pub struct LineReader<S> {
    source: S,
    buf: Box<[u8]>,
    filled: usize,
    split: Split,
    consumed: u64,
}

impl<S: ByteSource> LineReader<S> {
    pub fn new(source: S, split: Split) -> Self {
        Self::with_capacity(source, split, INPUT_BUFFER_SIZE)
    }

    pub fn with_capacity(source: S, split: Split, capacity: usize) -> Self {
        Self {
            source,
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
            filled: 0,
            split,
            consumed: 0,
        }
    }

    /// Returns the next token, decoded as lossy UTF-8.
    pub fn poll_token(&mut self) -> Poll<String> {
        self.poll_raw().map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Returns the next token as raw bytes, without its delimiter.
    pub fn poll_raw(&mut self) -> Poll<Vec<u8>> {
        if let Some(token) = self.take_token() {
            return Poll::Ready(token);
        }
        if self.filled == self.buf.len() {
            return Poll::Ready(self.take(self.filled, 0));
        }

        match self.fill() {
            Fill::Data => {
                if let Some(token) = self.take_token() {
                    Poll::Ready(token)
                } else if self.filled == self.buf.len() {
                    Poll::Ready(self.take(self.filled, 0))
                } else {
                    Poll::WouldBlock
                }
            }
            Fill::WouldBlock => Poll::WouldBlock,
            Fill::Eof => {
                // Trailing token without a delimiter.
                if let Some(token) = self.take_token() {
                    return Poll::Ready(token);
                }
                if self.filled > 0 {
                    return Poll::Ready(self.take(self.filled, 0));
                }
                Poll::Eof
            }
        }
    }

    /// Returns up to `max` raw bytes, buffered bytes first.
    pub fn poll_bytes(&mut self, max: usize) -> Poll<Vec<u8>> {
        if max == 0 {
            return Poll::Ready(Vec::new());
        }
        if self.filled > 0 {
            let n = self.filled.min(max);
            return Poll::Ready(self.take(n, 0));
        }

        let mut chunk = vec![0; max];
        match self.source.read_nonblocking(&mut chunk) {
            Ok(0) => Poll::Eof,
            Ok(n) => {
                chunk.truncate(n.min(max));
                self.consumed += chunk.len() as u64;
                Poll::Ready(chunk)
            }
            Err(e) => classify(e),
        }
    }

    /// Number of bytes read but not yet handed out.
    pub fn buffered(&self) -> usize {
        self.filled
    }

    /// Raw bytes handed out or skipped so far, delimiters included.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn fill(&mut self) -> Fill {
        let filled = self.filled;
        match self.source.read_nonblocking(&mut self.buf[filled..]) {
            Ok(0) => Fill::Eof,
            Ok(n) => {
                self.filled = (filled + n).min(self.buf.len());
                Fill::Data
            }
            Err(e) => match classify::<()>(e) {
                Poll::WouldBlock => Fill::WouldBlock,
                _ => Fill::Eof,
            },
        }
    }

    fn take_token(&mut self) -> Option<Vec<u8>> {
        match self.split {
            Split::Lines => {
                let end = self.buf[..self.filled].iter().position(|&b| b == b'\n')?;
                Some(self.take(end, 1))
            }
            Split::Words => {
                let start = self.buf[..self.filled]
                    .iter()
                    .position(|b| !b.is_ascii_whitespace())
                    .unwrap_or(self.filled);
                if start > 0 {
                    self.consume(start);
                }
                let end = self.buf[..self.filled]
                    .iter()
                    .position(|b| b.is_ascii_whitespace())?;
                Some(self.take(end, 1))
            }
        }
    }

    /// Removes `len` token bytes plus `skip` delimiter bytes from the front.
    fn take(&mut self, len: usize, skip: usize) -> Vec<u8> {
        let token = self.buf[..len].to_vec();
        self.consume(len + skip);
        token
    }

    fn consume(&mut self, n: usize) {
        let n = n.min(self.filled);
        self.buf.copy_within(n..self.filled, 0);
        self.filled -= n;
        self.consumed += n as u64;
    }
}

fn classify<T>(e: io::Error) -> Poll<T> {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Poll::WouldBlock,
        _ => {
            log::debug!("input closed: {e}");
            Poll::Eof
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn drain(reader: &mut LineReader<ScriptedSource>) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut blocked = 0;
        loop {
            match reader.poll_token() {
                Poll::Ready(t) => tokens.push(t),
                Poll::WouldBlock => {
                    blocked += 1;
                    assert!(blocked < 10_000, "reader never reached end of stream");
                }
                Poll::Eof => return tokens,
            }
        }
    }

    fn chunked(input: &[u8], size: usize) -> ScriptedSource {
        let mut source = ScriptedSource::new();
        for piece in input.chunks(size) {
            source = source.chunk(piece).would_block();
        }
        source
    }

    #[test]
    fn lines_are_split_on_newline() {
        let source = ScriptedSource::new().chunk("first\nsecond\n\nthird\n");
        let mut reader = LineReader::new(source, Split::Lines);
        assert_eq!(drain(&mut reader), ["first", "second", "", "third"]);
    }

    #[test]
    fn words_skip_runs_of_whitespace() {
        let source = ScriptedSource::new().chunk("  10\t20\n\n XXX  hello\n");
        let mut reader = LineReader::new(source, Split::Words);
        assert_eq!(drain(&mut reader), ["10", "20", "XXX", "hello"]);
    }

    #[test]
    fn tokens_do_not_depend_on_chunking() {
        let input = b"50\nXXX\nDownloading  file \\n two\nXXX\n75 100\nXXXX\n";
        for split in [Split::Lines, Split::Words] {
            let mut whole = LineReader::new(ScriptedSource::new().chunk(input), split);
            let expected = drain(&mut whole);
            for size in 1..=input.len() {
                let mut reader = LineReader::new(chunked(input, size), split);
                assert_eq!(drain(&mut reader), expected, "chunk size {size}, {split:?}");
            }
        }
    }

    #[test]
    fn chunking_invariance_holds_with_small_buffers() {
        let input = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\nbb\ncccccccccccccccc";
        let mut whole =
            LineReader::with_capacity(ScriptedSource::new().chunk(input), Split::Lines, 8);
        let expected = drain(&mut whole);
        for size in 1..=input.len() {
            let mut reader = LineReader::with_capacity(chunked(input, size), Split::Lines, 8);
            assert_eq!(drain(&mut reader), expected, "chunk size {size}");
        }
    }

    #[test]
    fn would_block_is_not_end_of_stream() {
        let source = ScriptedSource::new().chunk("par").would_block().chunk("tial\n");
        let mut reader = LineReader::new(source, Split::Lines);

        assert_eq!(reader.poll_token(), Poll::WouldBlock);
        assert_eq!(reader.poll_token(), Poll::WouldBlock);
        assert_eq!(reader.poll_token(), Poll::Ready("partial".to_string()));
        assert_eq!(reader.poll_token(), Poll::Eof);
    }

    #[test]
    fn closed_stream_is_not_would_block() {
        let mut reader = LineReader::new(ScriptedSource::new(), Split::Lines);
        assert_eq!(reader.poll_token(), Poll::Eof);
        assert_eq!(reader.poll_token(), Poll::Eof);
    }

    #[test]
    fn bad_descriptor_reads_as_end_of_stream() {
        let source = ScriptedSource::new().bad_descriptor();
        let mut reader = LineReader::new(source, Split::Words);
        assert_eq!(reader.poll_token(), Poll::Eof);
    }

    #[test]
    fn unterminated_token_is_flushed_at_end_of_stream() {
        let source = ScriptedSource::new().chunk("one\ntwo");
        let mut reader = LineReader::new(source, Split::Lines);
        assert_eq!(reader.poll_token(), Poll::Ready("one".to_string()));
        assert_eq!(reader.poll_token(), Poll::Ready("two".to_string()));
        assert_eq!(reader.poll_token(), Poll::Eof);
    }

    #[test]
    fn overlong_line_is_split_at_capacity() {
        let source = ScriptedSource::new().chunk("abcdefghij\nk\n");
        let mut reader = LineReader::with_capacity(source, Split::Lines, 4);
        assert_eq!(drain(&mut reader), ["abcd", "efgh", "ij", "k"]);
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn overlong_word_is_split_at_capacity() {
        let source = ScriptedSource::new().chunk("   123456789 x");
        let mut reader = LineReader::with_capacity(source, Split::Words, 4);
        assert_eq!(drain(&mut reader), ["1234", "5678", "9", "x"]);
    }

    #[test]
    fn buffered_token_is_returned_without_reading() {
        let source = ScriptedSource::new().chunk("a\nb\n").bad_descriptor();
        let mut reader = LineReader::new(source, Split::Lines);
        assert_eq!(reader.poll_token(), Poll::Ready("a".to_string()));
        // "b" is already buffered, so the failing read is not reached yet.
        assert_eq!(reader.poll_token(), Poll::Ready("b".to_string()));
        assert_eq!(reader.poll_token(), Poll::Eof);
    }

    #[test]
    fn consumed_counts_delimiters_and_skipped_space() {
        let source = ScriptedSource::new().chunk("  ab  c").chunk("def");
        let mut reader = LineReader::new(source, Split::Words);
        assert_eq!(reader.poll_token(), Poll::Ready("ab".to_string()));
        assert_eq!(reader.consumed(), 5);
        assert_eq!(reader.poll_bytes(1), Poll::Ready(b" ".to_vec()));
        assert_eq!(reader.poll_bytes(10), Poll::Ready(b"c".to_vec()));
        assert_eq!(reader.poll_bytes(10), Poll::Ready(b"def".to_vec()));
        assert_eq!(reader.consumed(), 10);
    }

    #[test]
    fn bytes_are_served_from_the_buffer_first() {
        let source = ScriptedSource::new().chunk("ab\ncdef").chunk("gh");
        let mut reader = LineReader::new(source, Split::Lines);
        assert_eq!(reader.poll_token(), Poll::Ready("ab".to_string()));
        assert_eq!(reader.poll_bytes(2), Poll::Ready(b"cd".to_vec()));
        assert_eq!(reader.poll_bytes(10), Poll::Ready(b"ef".to_vec()));
        assert_eq!(reader.poll_bytes(10), Poll::Ready(b"gh".to_vec()));
        assert_eq!(reader.poll_bytes(10), Poll::Eof);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let source = ScriptedSource::new().chunk(b"caf\xe9\n");
        let mut reader = LineReader::new(source, Split::Lines);
        assert_eq!(reader.poll_token(), Poll::Ready("caf\u{fffd}".to_string()));
    }

    #[test]
    fn file_source_reports_initial_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"line one\nline two\n").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let source = InputSource::open(&path).unwrap();
        assert_eq!(source.initial_len(), 18);

        let mut reader = LineReader::new(source, Split::Lines);
        assert_eq!(reader.poll_token(), Poll::Ready("line one".to_string()));
        assert_eq!(reader.poll_token(), Poll::Ready("line two".to_string()));
        assert_eq!(reader.poll_token(), Poll::Eof);

        // A followed file delivers data appended after the first end of file.
        file.write_all(b"line three\n").unwrap();
        assert_eq!(reader.poll_token(), Poll::Ready("line three".to_string()));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.log");
        match InputSource::open(path.to_str().unwrap()) {
            Err(Error::Open {
                path: p, ..
            }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other.map(|s| s.initial_len())),
        }
    }
}
