//! # Corrente - Streaming MIDI Decoder
//!
//! Incremental decoding of raw MIDI byte streams (live or file-embedded)
//! into discrete, timestamped events, built from two subsystems:
//!
//! - **corrente-ring** - zero-copy circular byte transport whose read and
//!   write views are always contiguous, via a four-fold virtual-memory
//!   alias of one physical region (with a copy-on-straddle fallback on
//!   platforms without fixed-address mapping)
//! - **corrente-midi** - resumable MIDI event parser producing events
//!   whose payloads borrow straight from the input window
//!
//! The umbrella crate adds [`StreamDecoder`], which owns one of each and
//! keeps the zero-copy contract across the seam: an event's payload lives
//! in the ring until the caller asks for the next event.
//!
//! ## Quick start
//!
//! ```no_run
//! use corrente::StreamDecoder;
//!
//! # fn main() -> corrente::Result<()> {
//! let mut decoder = StreamDecoder::new(true)?;
//! decoder.push(&[0x00, 0x90, 0x40, 0x64]);
//! decoder.finish();
//! while let Some(event) = decoder.next_event()? {
//!     println!("{} @ {}: {:?}", event.kind, event.time, event.data);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

mod decoder;
pub use decoder::StreamDecoder;

/// Re-export of the parser subsystem for direct access.
pub use corrente_midi as midi;
/// Re-export of the ring transport for direct access.
pub use corrente_ring as ring;

pub use corrente_midi::{Channel, DecodeError, EventParser, Message, MidiEvent, Parsed};
pub use corrente_ring::{RingBuffer, RingError};
