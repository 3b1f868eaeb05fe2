//! Centralized error type for the corrente umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate
//! boundaries, and adds the two stall conditions only the driver can
//! detect.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Ring(#[from] corrente_ring::RingError),

    #[error("decode: {0}")]
    Decode(#[from] corrente_midi::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A single message needs more contiguous bytes than the ring can
    /// ever hold, so no amount of further input will make progress.
    #[error("message larger than the {capacity}-byte stream buffer")]
    MessageTooLarge { capacity: usize },

    /// Input ended in the middle of an event.
    #[error("stream ended mid-event with {remaining} bytes undecoded")]
    TruncatedStream { remaining: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
