//! Incremental MIDI stream decoding.
//!
//! A resumable state machine that turns raw MIDI bytes -- live wire
//! traffic or file-embedded track data -- into discrete, timestamped
//! events without copying payload bytes. The parser works on whatever
//! contiguous window the caller can supply (typically a
//! `corrente-ring` read view), reports exactly how many bytes it
//! consumed, and picks up mid-field on the next call when a window ends
//! early.

pub mod error;
pub use error::{DecodeError, Result};

mod event;
pub use event::MidiEvent;

pub mod message;
pub use message::{Channel, Message};

mod parser;
pub use parser::{EventParser, Parsed, MAX_INLINE_PAYLOAD, MAX_SYSTEM_SCAN};

pub mod vlq;
