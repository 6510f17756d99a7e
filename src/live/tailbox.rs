use std::io::Write;

use super::{Surface, Tick};
use crate::{
    error::Error,
    input::{ByteSource, LineReader, Poll},
    state::DialogState,
};

/// Size of one bulk read.
pub const TAIL_CHUNK: usize = 1024;

/// Follows a file (or standard input) and appends everything to a text view.
pub struct Tailbox<S> {
    reader: LineReader<S>,
    pending_initial: u64,
    carry: Vec<u8>,
}

impl<S: ByteSource> Tailbox<S> {
    /// `initial_len` bytes are shown even if the window is closed while they
    /// are being read.
    pub fn new(reader: LineReader<S>, initial_len: u64) -> Self {
        Self {
            reader,
            pending_initial: initial_len,
            carry: Vec::new(),
        }
    }

    pub(super) fn tick<W: Write>(
        &mut self,
        state: &mut DialogState<W>,
        surface: &mut impl Surface<W>,
    ) -> Result<Tick, Error> {
        loop {
            let active = surface.pump(state)?;
            if !active && self.pending_initial == 0 {
                return Ok(Tick::Stop);
            }

            let chunk = match self.reader.poll_bytes(TAIL_CHUNK) {
                Poll::Ready(chunk) => chunk,
                Poll::WouldBlock | Poll::Eof => break,
            };

            self.pending_initial = self.pending_initial.saturating_sub(chunk.len() as u64);
            let text = decode(&mut self.carry, &chunk);
            if !text.is_empty() {
                surface.append_text(&text);
            }
            if chunk.len() < TAIL_CHUNK {
                break;
            }
        }
        Ok(Tick::Continue)
    }
}

/// Decodes `chunk`, keeping an incomplete UTF-8 sequence at its end for the
/// next call.
fn decode(carry: &mut Vec<u8>, chunk: &[u8]) -> String {
    carry.extend_from_slice(chunk);
    let keep = match std::str::from_utf8(carry) {
        Ok(_) => 0,
        Err(e) if e.error_len().is_none() => carry.len() - e.valid_up_to(),
        Err(_) => {
            // Invalid bytes somewhere; only hold back a truncated tail.
            let tail = carry.len().saturating_sub(3);
            (tail..carry.len())
                .find(|&i| std::str::from_utf8(&carry[i..]).is_err_and(|e| e.error_len().is_none()))
                .map_or(0, |i| carry.len() - i)
        }
    };

    let rest = carry.split_off(carry.len() - keep);
    let text = String::from_utf8_lossy(carry).into_owned();
    *carry = rest;
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::{ScriptedSource, Split},
        live::{LiveWidget, testing::Recorder},
        state::ExitStatus,
    };

    fn tailbox(source: ScriptedSource, initial_len: u64) -> LiveWidget<ScriptedSource> {
        LiveWidget::Tailbox(Tailbox::new(LineReader::new(source, Split::Lines), initial_len))
    }

    #[test]
    fn appends_everything_and_keeps_following() {
        let big = "x".repeat(TAIL_CHUNK * 2 + 10);
        let source = ScriptedSource::new().chunk(&big).would_block().chunk("tail\n");
        let mut widget = tailbox(source, 0);
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::default();
        state.start_timer(widget.interval());

        for _ in 0..10 {
            assert_eq!(widget.tick(&mut state, &mut surface).unwrap(), Tick::Continue);
        }
        assert_eq!(surface.text(), format!("{big}tail\n"));
        // End of stream does not close a followed file.
        assert!(!state.is_finished());
    }

    #[test]
    fn one_tick_reads_until_short_read() {
        let big = "y".repeat(TAIL_CHUNK * 3);
        let source = ScriptedSource::new().chunk(&big).chunk("z");
        let mut widget = tailbox(source, 0);
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::default();
        state.start_timer(widget.interval());

        widget.tick(&mut state, &mut surface).unwrap();
        assert_eq!(surface.text().len(), TAIL_CHUNK * 3 + 1);
        assert_eq!(surface.pumps, 4);
    }

    #[test]
    fn cancel_waits_for_initial_content() {
        let content = "a".repeat(TAIL_CHUNK * 2 + 5);
        let source = ScriptedSource::new().chunk(&content).chunk("later");
        let mut widget = tailbox(source, content.len() as u64);
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::cancelling_at(1);
        state.start_timer(widget.interval());

        assert_eq!(widget.tick(&mut state, &mut surface).unwrap(), Tick::Continue);
        assert_eq!(surface.text(), content);
        assert_eq!(state.exit_status(), ExitStatus::Cancel);

        assert_eq!(widget.tick(&mut state, &mut surface).unwrap(), Tick::Stop);
        assert_eq!(surface.text(), content);
    }

    #[test]
    fn cancel_without_initial_content_stops_at_once() {
        let mut widget = tailbox(ScriptedSource::new().chunk("data"), 0);
        let mut state = DialogState::new(Vec::new());
        let mut surface = Recorder::cancelling_at(1);
        state.start_timer(widget.interval());

        assert_eq!(widget.tick(&mut state, &mut surface).unwrap(), Tick::Stop);
        assert!(surface.text().is_empty());
    }

    #[test]
    fn split_utf8_sequences_are_joined() {
        let mut carry = Vec::new();
        let bytes = "héllo".as_bytes();
        assert_eq!(decode(&mut carry, &bytes[..2]), "h");
        assert_eq!(decode(&mut carry, &bytes[2..]), "éllo");
        assert!(carry.is_empty());
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut carry = Vec::new();
        assert_eq!(decode(&mut carry, b"a\xffb"), "a\u{fffd}b");
        assert!(carry.is_empty());
    }
}
