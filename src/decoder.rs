//! Stream driver: wires the ring transport to the event parser.
//!
//! Bytes go in through [`StreamDecoder::push`] or
//! [`StreamDecoder::fill_from`]; decoded events come out of
//! [`StreamDecoder::next_event`]. Each event borrows its payload straight
//! out of the ring's read view -- the bytes are only released on the next
//! call, so there is never a copy between the wire and the consumer.

use std::io::Read;

use tracing::{debug, trace};

use corrente_midi::{EventParser, MidiEvent};
use corrente_ring::RingBuffer;

use crate::error::{Error, Result};

/// Incremental decoder for one MIDI byte stream, with its own buffering.
pub struct StreamDecoder {
    ring: RingBuffer,
    parser: EventParser,
    at_end: bool,
    /// Bytes consumed by the last returned event, released lazily so the
    /// event's payload stays valid until the caller moves on.
    pending_release: usize,
}

impl StreamDecoder {
    /// `has_timing` is true for file-style streams carrying delta-times
    /// and meta events, false for live wire streams.
    pub fn new(has_timing: bool) -> Result<Self> {
        let ring = RingBuffer::new()?;
        debug!(capacity = ring.capacity(), has_timing, "stream decoder ready");
        Ok(Self {
            ring,
            parser: EventParser::new(has_timing),
            at_end: false,
            pending_release: 0,
        })
    }

    /// Copies as much of `bytes` as currently fits into the ring; returns
    /// how many were accepted. The rest must be re-offered once events
    /// have been drained.
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        self.release_consumed();
        let view = self.ring.write_view();
        let n = bytes.len().min(view.len());
        view[..n].copy_from_slice(&bytes[..n]);
        self.ring.commit(n);
        n
    }

    /// One read from `reader` into the ring. Returns the byte count; 0
    /// means the ring is full or the source is exhausted.
    pub fn fill_from(&mut self, reader: &mut impl Read) -> Result<usize> {
        self.release_consumed();
        let view = self.ring.write_view();
        if view.is_empty() {
            return Ok(0);
        }
        let n = reader.read(view)?;
        self.ring.commit(n);
        Ok(n)
    }

    /// Declares that no further input will arrive. Lets the parser
    /// resolve system messages still waiting for a terminator, and turns
    /// "need more bytes" into [`Error::TruncatedStream`].
    pub fn finish(&mut self) {
        self.at_end = true;
    }

    /// The next decoded event, or `Ok(None)` when more input is needed.
    ///
    /// The returned event borrows from the internal buffer; it stays
    /// valid until the next method call on this decoder.
    pub fn next_event(&mut self) -> Result<Option<MidiEvent<'_>>> {
        self.release_consumed();
        let filled = self.ring.len();
        let capacity = self.ring.capacity();
        let view = self.ring.read_view();
        // Advance a local offset across no-event progress instead of
        // discarding from the ring mid-loop: the ring is only released
        // lazily through `pending_release`, so the event returned below can
        // keep borrowing `view` without a mutable ring borrow in the loop.
        let mut offset = 0;
        loop {
            let corrente_midi::Parsed { consumed, event } =
                self.parser.parse(&view[offset..], self.at_end)?;
            match event {
                Some(event) => {
                    self.pending_release = offset + consumed;
                    trace!(
                        kind = event.kind.name(),
                        time = event.time,
                        len = event.data.len(),
                        "decoded event"
                    );
                    return Ok(Some(event));
                }
                None if consumed > 0 => {
                    offset += consumed;
                }
                None => {
                    // Bytes still buffered after releasing this progress.
                    let remaining = filled - offset;
                    self.pending_release = offset;
                    if self.at_end && remaining > 0 {
                        return Err(Error::TruncatedStream { remaining });
                    }
                    if !self.at_end && remaining == capacity {
                        return Err(Error::MessageTooLarge { capacity });
                    }
                    return Ok(None);
                }
            }
        }
    }

    /// Accumulated timestamp in delta-time units.
    #[inline]
    pub fn time(&self) -> u64 {
        self.parser.time()
    }

    /// Bytes buffered and not yet decoded.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.ring.len() - self.pending_release
    }

    /// Fixed capacity of the internal ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    fn release_consumed(&mut self) {
        let n = std::mem::take(&mut self.pending_release);
        self.ring.discard(n);
    }
}
