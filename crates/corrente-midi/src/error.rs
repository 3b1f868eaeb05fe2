//! Decoder error taxonomy.
//!
//! Only byte-level contract violations are errors, and all of them are
//! fatal to the stream -- there is no resynchronization heuristic. Running
//! out of input is not an error; it is reported through
//! [`Parsed::consumed`](crate::Parsed) so the caller supplies more bytes
//! and retries.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A status position held a byte with its high bit clear. Running
    /// status (omitting a repeated status byte) is not accepted.
    #[error("expected a status byte, found {0:#04x}")]
    StatusHighBitClear(u8),

    /// A data position held a byte with its high bit set.
    #[error("data byte {0:#04x} has its high bit set")]
    DataHighBitSet(u8),

    /// A variable-length quantity ran past its 4-byte cap without
    /// terminating.
    #[error("unterminated variable-length quantity")]
    VlqOverflow,

    /// A system common/realtime message had no terminating status byte
    /// within the 32-byte scan bound.
    #[error("system message exceeds the 32-byte scan bound")]
    SystemOverrun,
}

pub type Result<T> = std::result::Result<T, DecodeError>;
