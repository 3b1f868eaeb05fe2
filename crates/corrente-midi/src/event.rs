//! Decoded event type.

use crate::message::{Channel, Message};

/// One decoded MIDI event.
///
/// `data` borrows from the byte window the event was parsed out of: the
/// parser never copies or retains payload bytes. Process (or copy) the
/// payload before mutating, discarding, or overwriting that window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent<'a> {
    /// What kind of message this is.
    pub kind: Message,
    /// The channel, for tags below the system band.
    pub channel: Option<Channel>,
    /// Accumulated delta-time units at the start of this event (always 0
    /// for live streams without timing).
    pub time: u64,
    /// Borrowed payload bytes; may be empty.
    pub data: &'a [u8],
}
