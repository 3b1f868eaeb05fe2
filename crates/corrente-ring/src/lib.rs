//! Zero-copy circular byte transport for streaming decoders.
//!
//! A fixed-capacity ring buffer whose read and write views are always one
//! contiguous slice, no matter where the logical window sits relative to
//! the physical wrap point. A naive ring forces readers to reassemble
//! wrapped windows through a scratch copy; here the backing page is
//! aliased four times in virtual memory ([`MagicBuffer`]) so a wrapped
//! window is simply read through the next alias. Platforms without
//! fixed-address mapping get the same contract from [`CompactBuffer`],
//! which copies only when a view would otherwise straddle the wrap point.
//!
//! Producers write into `write_view` and `commit`; consumers read
//! `read_view` and `discard`. Single producer, single consumer, externally
//! synchronized -- the buffer itself does no locking.

pub mod error;
pub use error::{Result, RingError};

mod compact;
pub use compact::CompactBuffer;

#[cfg(unix)]
mod magic;
#[cfg(unix)]
pub use magic::MagicBuffer;

/// Smallest capacity a buffer is created with; platform page granularity
/// is rounded up to this.
pub const MIN_CAPACITY: usize = 4096;

/// Platform default backend: aliased mapping where available, the
/// copy-on-straddle fallback elsewhere.
#[cfg(unix)]
pub type RingBuffer = MagicBuffer;

/// Platform default backend: aliased mapping where available, the
/// copy-on-straddle fallback elsewhere.
#[cfg(not(unix))]
pub type RingBuffer = CompactBuffer;
