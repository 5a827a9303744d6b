//! CR/LF line framing over the receive stream.
//!
//! A line ends at either `\r` or `\n`. A terminator with nothing
//! accumulated (the second byte of `\r\n`, or blank lines) emits nothing,
//! so `\r\n`, `\n` and `\r` all yield one line per sentence.
//!
//! The accumulator is bounded. Once a line outgrows it, the partial line is
//! dropped and every byte up to the next terminator is discarded, so the
//! tail of an overlong sentence never surfaces as a line of its own.

use heapless::Vec;

use crate::rxbuf::{RxBuffers, RxGrant, RxReady};

/// Maximum line length in bytes (NMEA caps sentences at 82)
pub const LINE_CAPACITY: usize = 128;

/// A complete line without its terminator
pub type Line = Vec<u8, LINE_CAPACITY>;

/// Errors surfaced by [`LineFramer::feed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerError {
    /// No receive buffer could be handed back to the transport
    Stalled,
}

/// Line accumulator that persists across receive buffers
#[derive(Debug, Clone)]
pub struct LineFramer<const CAP: usize = LINE_CAPACITY> {
    acc: Vec<u8, CAP>,
    discarding: bool,
}

impl<const CAP: usize> Default for LineFramer<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_terminator(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

impl<const CAP: usize> LineFramer<CAP> {
    /// Create an empty framer
    pub const fn new() -> Self {
        Self {
            acc: Vec::new(),
            discarding: false,
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.acc.clear();
        self.discarding = false;
    }

    /// Bytes accumulated towards the current line
    pub fn pending(&self) -> usize {
        self.acc.len()
    }

    /// Feed a single byte
    ///
    /// Returns the completed line when `byte` terminates a non-empty one.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8, CAP>> {
        if is_terminator(byte) {
            let overflowed = core::mem::replace(&mut self.discarding, false);
            if overflowed || self.acc.is_empty() {
                self.acc.clear();
                return None;
            }
            return Some(core::mem::take(&mut self.acc));
        }

        if self.discarding {
            return None;
        }

        if self.acc.push(byte).is_err() {
            self.acc.clear();
            self.discarding = true;
        }
        None
    }

    /// Feed a run of bytes, calling `emit` for every completed line
    ///
    /// Returns the number of lines emitted.
    pub fn feed_bytes(&mut self, bytes: &[u8], mut emit: impl FnMut(Vec<u8, CAP>)) -> usize {
        let mut lines = 0;
        for &byte in bytes {
            if let Some(line) = self.push(byte) {
                emit(line);
                lines += 1;
            }
        }
        lines
    }

    /// Scan one completed receive buffer
    ///
    /// The next buffer is requested for the transport first, then bytes
    /// `offset..offset + len` of `ready` are scanned (never past the length
    /// the transport reported) and `ready` is released.
    ///
    /// Returns the grant to hand to the transport. [`FramerError::Stalled`]
    /// means no slot was free; reception cannot resume and the caller must
    /// treat it as fatal.
    pub fn feed<const N: usize>(
        &mut self,
        buffers: &mut RxBuffers<N>,
        ready: RxReady,
        offset: usize,
        len: usize,
        emit: impl FnMut(Vec<u8, CAP>),
    ) -> Result<RxGrant, FramerError> {
        let next = buffers.request_next_buffer();

        let data = buffers.received(&ready);
        let start = offset.min(data.len());
        let end = offset.saturating_add(len).min(data.len());
        self.feed_bytes(&data[start..end], emit);

        buffers.release(ready);
        next.ok_or(FramerError::Stalled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rxbuf::SlotOwner;
    use proptest::prelude::*;

    type Collected = std::vec::Vec<std::vec::Vec<u8>>;

    fn collect<const CAP: usize>(framer: &mut LineFramer<CAP>, bytes: &[u8]) -> Collected {
        let mut out = Collected::new();
        framer.feed_bytes(bytes, |line| out.push(line.to_vec()));
        out
    }

    #[test]
    fn test_crlf_is_one_line() {
        let mut framer = LineFramer::<32>::new();
        let lines = collect(&mut framer, b"$GNGGA,1\r\n$GNRMC,2\r\n");
        assert_eq!(lines, vec![b"$GNGGA,1".to_vec(), b"$GNRMC,2".to_vec()]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_bare_terminators_emit_nothing() {
        let mut framer = LineFramer::<32>::new();
        assert!(collect(&mut framer, b"\r\n\n\r").is_empty());
    }

    #[test]
    fn test_partial_line_carries_over() {
        let mut framer = LineFramer::<32>::new();
        assert!(collect(&mut framer, b"$GPG").is_empty());
        assert_eq!(framer.pending(), 4);
        let lines = collect(&mut framer, b"SV\n");
        assert_eq!(lines, vec![b"$GPGSV".to_vec()]);
    }

    #[test]
    fn test_line_at_capacity_is_kept() {
        let mut framer = LineFramer::<4>::new();
        let lines = collect(&mut framer, b"ABCD\n");
        assert_eq!(lines, vec![b"ABCD".to_vec()]);
    }

    #[test]
    fn test_overflow_discards_line_and_recovers() {
        let mut framer = LineFramer::<8>::new();
        let lines = collect(&mut framer, b"0123456789ABCDEF\r\n$OK\r\n");
        assert_eq!(lines, vec![b"$OK".to_vec()]);
    }

    #[test]
    fn test_overflow_without_terminator_then_new_line() {
        let mut framer = LineFramer::<8>::new();
        assert!(collect(&mut framer, b"0123456789").is_empty());
        assert_eq!(framer.pending(), 0);
        let lines = collect(&mut framer, b"XY\n$GOOD\n");
        assert_eq!(lines, vec![b"$GOOD".to_vec()]);
    }

    #[test]
    fn test_reset_drops_partial() {
        let mut framer = LineFramer::<8>::new();
        collect(&mut framer, b"abc");
        framer.reset();
        let lines = collect(&mut framer, b"d\n");
        assert_eq!(lines, vec![b"d".to_vec()]);
    }

    #[test]
    fn test_feed_hands_back_next_buffer() {
        let mut rx = RxBuffers::<16>::new();
        let mut framer = LineFramer::<32>::new();
        let mut lines = Collected::new();

        let grant = rx.request_next_buffer().unwrap();
        rx.transport_buf(&grant)[..6].copy_from_slice(b"$A,1\r\n");
        let ready = rx.complete(grant, 6);

        let next = framer
            .feed(&mut rx, ready, 0, 6, |l| lines.push(l.to_vec()))
            .unwrap();

        assert_eq!(lines, vec![b"$A,1".to_vec()]);
        assert_eq!(next.slot(), 1);
        assert_eq!(rx.owner(0), SlotOwner::Free);
        assert_eq!(rx.owner(1), SlotOwner::Transport);
    }

    #[test]
    fn test_feed_respects_offset_and_valid_length() {
        let mut rx = RxBuffers::<16>::new();
        let mut framer = LineFramer::<32>::new();
        let mut lines = Collected::new();

        let grant = rx.request_next_buffer().unwrap();
        rx.transport_buf(&grant).copy_from_slice(b"xx$B\nstale\nstale");
        let ready = rx.complete(grant, 5);

        // Asks for more than was received: only the valid range is scanned
        let _next = framer
            .feed(&mut rx, ready, 2, 100, |l| lines.push(l.to_vec()))
            .unwrap();
        assert_eq!(lines, vec![b"$B".to_vec()]);
    }

    #[test]
    fn test_feed_reports_stall() {
        let mut rx = RxBuffers::<4>::new();
        let mut framer = LineFramer::<8>::new();

        let a = rx.request_next_buffer().unwrap();
        let _lost = rx.request_next_buffer().unwrap();
        let ready = rx.complete(a, 0);

        let result = framer.feed(&mut rx, ready, 0, 0, |_| {});
        assert_eq!(result, Err(FramerError::Stalled));
        // The scanned slot is still released
        assert_eq!(rx.owner(0), SlotOwner::Free);
    }

    fn stream() -> impl Strategy<Value = std::vec::Vec<u8>> {
        proptest::collection::vec(
            prop_oneof![
                4 => b'A'..=b'Z',
                1 => Just(b','),
                1 => Just(b'\r'),
                1 => Just(b'\n'),
            ],
            0..400,
        )
    }

    proptest! {
        #[test]
        fn prop_chunking_invariance(
            bytes in stream(),
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
        ) {
            let whole = collect(&mut LineFramer::<32>::new(), &bytes);

            let mut points: std::vec::Vec<usize> =
                cuts.iter().map(|c| c.index(bytes.len() + 1)).collect();
            points.sort_unstable();

            let mut framer = LineFramer::<32>::new();
            let mut chunked = Collected::new();
            let mut start = 0;
            for p in points.into_iter().chain(core::iter::once(bytes.len())) {
                chunked.extend(collect(&mut framer, &bytes[start..p]));
                start = p;
            }

            prop_assert_eq!(whole, chunked);
        }

        #[test]
        fn prop_feed_through_buffers_matches_single_scan(
            bytes in stream(),
            sizes in proptest::collection::vec(1usize..=16, 1..64),
        ) {
            let whole = collect(&mut LineFramer::<32>::new(), &bytes);

            let mut rx = RxBuffers::<16>::new();
            let mut framer = LineFramer::<32>::new();
            let mut chunked = Collected::new();
            let mut grant = rx.request_next_buffer().unwrap();
            let mut pos = 0;
            let mut size = sizes.iter().cycle();

            while pos < bytes.len() {
                let n = (*size.next().unwrap()).min(bytes.len() - pos);
                rx.transport_buf(&grant)[..n].copy_from_slice(&bytes[pos..pos + n]);
                let ready = rx.complete(grant, n);
                grant = framer
                    .feed(&mut rx, ready, 0, n, |l| chunked.push(l.to_vec()))
                    .unwrap();
                pos += n;
            }

            prop_assert_eq!(whole, chunked);
        }
    }
}
