//! Portable fallback backend.
//!
//! Same external contract as the aliased mapping: both views are always a
//! single contiguous slice. Retained bytes live linearly in one heap
//! allocation; they are moved back to the front only when the write view
//! would otherwise straddle the physical end, so steady-state traffic that
//! drains promptly never copies.

use crate::error::Result;
use crate::MIN_CAPACITY;

/// Copy-on-straddle ring buffer for platforms without fixed-address
/// memory mapping.
#[derive(Debug)]
pub struct CompactBuffer {
    buf: Box<[u8]>,
    start: usize,
    filled: usize,
}

impl CompactBuffer {
    /// Infallible in practice; returns `Result` for parity with the
    /// aliased backend so `RingBuffer::new()?` works on every platform.
    pub fn new() -> Result<Self> {
        Ok(Self {
            buf: vec![0u8; MIN_CAPACITY].into_boxed_slice(),
            start: 0,
            filled: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes committed and not yet discarded.
    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Contiguous view of all unread bytes.
    #[inline]
    pub fn read_view(&self) -> &[u8] {
        &self.buf[self.start..self.start + self.filled]
    }

    /// Releases `count` bytes (clamped to the unread length) from the
    /// front of the read view.
    pub fn discard(&mut self, count: usize) {
        let count = count.min(self.filled);
        self.start += count;
        self.filled -= count;
        if self.filled == 0 {
            self.start = 0;
        }
    }

    /// Contiguous view of all free space. Compacts first if the free
    /// space is split by the physical end of the allocation.
    pub fn write_view(&mut self) -> &mut [u8] {
        let available = self.capacity() - self.filled;
        let tail = self.capacity() - (self.start + self.filled);
        if tail < available {
            self.buf.copy_within(self.start..self.start + self.filled, 0);
            self.start = 0;
        }
        let begin = self.start + self.filled;
        &mut self.buf[begin..begin + available]
    }

    /// Marks `count` freshly written bytes (clamped to the space the last
    /// `write_view` handed out) as readable.
    pub fn commit(&mut self, count: usize) {
        self.filled = (self.filled + count).min(self.capacity() - self.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut rb = CompactBuffer::new().unwrap();
        rb.write_view()[..5].copy_from_slice(b"hello");
        rb.commit(5);
        assert_eq!(rb.read_view(), b"hello");
        rb.discard(2);
        assert_eq!(rb.read_view(), b"llo");
    }

    #[test]
    fn test_compacts_only_on_straddle() {
        let mut rb = CompactBuffer::new().unwrap();
        let cap = rb.capacity();

        rb.write_view()[..cap - 4].fill(1);
        rb.commit(cap - 4);
        rb.discard(cap - 8);
        // 4 retained bytes near the end; free space is split, so asking
        // for the write view must move them to the front.
        assert_eq!(rb.read_view().len(), 4);
        assert_eq!(rb.write_view().len(), cap - 4);
        assert_eq!(rb.read_view().len(), 4);
    }

    #[test]
    fn test_capacity_conservation() {
        let mut rb = CompactBuffer::new().unwrap();
        let cap = rb.capacity();
        for (commit, discard) in [(64, 10), (cap, cap - 3), (100, 200)] {
            let room = rb.write_view().len();
            rb.commit(commit.min(room));
            rb.discard(discard);
            assert_eq!(rb.read_view().len() + rb.write_view().len(), cap);
        }
    }

    #[test]
    fn test_clamping() {
        let mut rb = CompactBuffer::new().unwrap();
        rb.commit(usize::MAX);
        assert_eq!(rb.len(), rb.capacity());
        rb.discard(usize::MAX);
        assert_eq!(rb.len(), 0);
    }
}
