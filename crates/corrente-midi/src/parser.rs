//! Resumable MIDI stream parser.
//!
//! [`EventParser::parse`] consumes bytes from a caller-supplied contiguous
//! window, produces at most one event per call, and reports exactly how
//! many bytes it consumed so the caller can release them. Window
//! boundaries may land anywhere, including mid-field: a call that runs out
//! of input leaves the parser able to resume at the same point once the
//! unconsumed bytes are re-presented with more appended.
//!
//! The parser is strict: a status position with its high bit clear (i.e.
//! running status), an unterminated length prefix, or an unbounded system
//! message is fatal to the stream. Insufficient input is never an error.

use tracing::warn;

use crate::error::{DecodeError, Result};
use crate::event::MidiEvent;
use crate::message::{Channel, Message, CHANNEL_VOICE_BASE, SYSTEM_BASE};
use crate::vlq;

/// Longest sysex/meta payload emitted inline. Messages declaring more are
/// skipped in full without producing an event.
pub const MAX_INLINE_PAYLOAD: u32 = 254;

/// Scan bound for system common/realtime messages, which carry no length
/// field: the payload ends at the next byte with its high bit set.
pub const MAX_SYSTEM_SCAN: usize = 32;

/// Where the parser stands between calls. Each variant carries only the
/// fields that state needs.
#[derive(Clone, Copy, Debug)]
enum State {
    /// Before an event's delta-time (skipped for live streams).
    Timing,
    /// Before an event's status byte.
    EventType,
    /// Inside a sysex block, before its length prefix.
    Sysex { kind: Message },
    /// Inside a meta event, before its length prefix.
    Meta { kind: Message },
    /// Draining an oversized payload.
    Skip { remaining: u32 },
}

/// Progress report of one [`EventParser::parse`] call.
#[derive(Debug, PartialEq, Eq)]
pub struct Parsed<'a> {
    /// Bytes consumed from the window; release exactly this many.
    pub consumed: usize,
    /// The event produced by this call, if any. Borrows from the window.
    pub event: Option<MidiEvent<'a>>,
}

/// Incremental decoder for one MIDI byte stream.
pub struct EventParser {
    time: u64,
    has_timing: bool,
    state: State,
}

impl EventParser {
    /// `has_timing` is fixed per stream: true for file-style streams with
    /// delta-times and meta events, false for live wire streams.
    pub fn new(has_timing: bool) -> Self {
        Self {
            time: 0,
            has_timing,
            state: State::Timing,
        }
    }

    /// Accumulated timestamp in delta-time units.
    #[inline]
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Decodes as far as one event. `at_end` tells the parser no bytes
    /// will ever follow `bytes`, which resolves system messages that are
    /// otherwise waiting for a terminator.
    ///
    /// On `Ok`, the caller must process `event` (which borrows from
    /// `bytes`) before invalidating the window, then release exactly
    /// `consumed` bytes and re-present the rest on the next call.
    pub fn parse<'a>(&mut self, bytes: &'a [u8], at_end: bool) -> Result<Parsed<'a>> {
        let mut window = bytes;
        let event = loop {
            match self.state {
                State::Timing => {
                    if self.has_timing {
                        match vlq::decode(window)? {
                            Some((delta, size)) => {
                                self.time += u64::from(delta);
                                window = &window[size..];
                            }
                            None => break None,
                        }
                    }
                    self.state = State::EventType;
                }

                State::EventType => {
                    if window.len() < 2 {
                        break None;
                    }
                    let status = window[0];
                    if status & 0x80 == 0 {
                        return Err(DecodeError::StatusHighBitClear(status));
                    }
                    match status {
                        0xF0 | 0xF7 => {
                            let kind = if status == 0xF0 {
                                Message::SystemExclusive
                            } else {
                                Message::EndOfExclusive
                            };
                            self.state = State::Sysex { kind };
                            window = &window[1..];
                        }
                        0xFF if self.has_timing => {
                            let meta = window[1];
                            if meta & 0x80 != 0 {
                                return Err(DecodeError::DataHighBitSet(meta));
                            }
                            self.state = State::Meta {
                                kind: Message::from_meta(meta),
                            };
                            window = &window[2..];
                        }
                        _ if status & 0xF0 != 0xF0 => {
                            let channel = Channel::from_index(status & 0x0F);
                            let kind = Message::from_code(
                                u16::from((status & 0x70) >> 4) | CHANNEL_VOICE_BASE,
                            );
                            let needed = match kind {
                                Message::ProgramChange | Message::ChannelPressure => 2,
                                _ => 3,
                            };
                            if window.len() < needed {
                                break None;
                            }
                            let (kind, data) = if kind == Message::ControlChange {
                                // The controller byte is the tag; only the
                                // value byte is payload.
                                let controller = window[1];
                                if controller & 0x80 != 0 {
                                    return Err(DecodeError::DataHighBitSet(controller));
                                }
                                (Message::from_controller(controller), &window[2..3])
                            } else {
                                (kind, &window[1..needed])
                            };
                            window = &window[needed..];
                            self.state = State::Timing;
                            break Some(self.emit(kind, Some(channel), data));
                        }
                        _ => {
                            // System common/realtime (and 0xFF on live
                            // streams): no length field, payload runs to
                            // the next byte with its high bit set.
                            let kind =
                                Message::from_code(u16::from(status & 0x0F) | SYSTEM_BASE);
                            let bound = window.len().min(MAX_SYSTEM_SCAN);
                            let mut end = 1;
                            while end < bound && window[end] & 0x80 == 0 {
                                end += 1;
                            }
                            if end == MAX_SYSTEM_SCAN {
                                return Err(DecodeError::SystemOverrun);
                            }
                            if end == window.len() && !at_end {
                                break None;
                            }
                            let data = &window[1..end];
                            window = &window[end..];
                            self.state = State::Timing;
                            break Some(self.emit(kind, None, data));
                        }
                    }
                }

                State::Sysex { kind } | State::Meta { kind } => match vlq::decode(window)? {
                    None => break None,
                    Some((length, size)) => {
                        if length > MAX_INLINE_PAYLOAD {
                            warn!(kind = kind.name(), length, "skipping oversized payload");
                            self.state = State::Skip { remaining: length };
                            window = &window[size..];
                        } else {
                            let length = length as usize;
                            if window.len() - size < length {
                                break None;
                            }
                            let data = &window[size..size + length];
                            window = &window[size + length..];
                            self.state = State::Timing;
                            break Some(self.emit(kind, None, data));
                        }
                    }
                },

                State::Skip { remaining } => {
                    let take = (remaining as usize).min(window.len());
                    window = &window[take..];
                    let remaining = remaining - take as u32;
                    if remaining == 0 {
                        self.state = State::Timing;
                    } else {
                        self.state = State::Skip { remaining };
                        break None;
                    }
                }
            }
            if window.is_empty() {
                break None;
            }
        };
        Ok(Parsed {
            consumed: bytes.len() - window.len(),
            event,
        })
    }

    #[inline]
    fn emit<'a>(&self, kind: Message, channel: Option<Channel>, data: &'a [u8]) -> MidiEvent<'a> {
        MidiEvent {
            kind,
            channel,
            time: self.time,
            data,
        }
    }
}
