//! Aliased-mapping ring buffer backend (Unix).
//!
//! One page-backed physical region is mapped at four consecutive virtual
//! offsets `0, c, 2c, 3c`. The read view always starts inside the second
//! alias, so a window of up to `c` bytes reads the same physical bytes
//! through the following aliases instead of hitting a wrap discontinuity.
//! This costs 4x virtual address space per buffer, not 4x physical memory.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::ptr::NonNull;
use std::slice;

use tracing::debug;

use crate::error::{Result, RingError};
use crate::MIN_CAPACITY;

/// Platform page size rounded up to [`MIN_CAPACITY`].
fn aligned_capacity() -> usize {
    // SAFETY: sysconf has no preconditions.
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    (page - 1 + MIN_CAPACITY) / page * page
}

/// Anonymous page-backed file the aliases map.
#[cfg(target_os = "linux")]
fn backing_file() -> io::Result<File> {
    use std::os::unix::io::FromRawFd;

    let fd = unsafe {
        libc::memfd_create(
            b"corrente-ring\0".as_ptr().cast::<libc::c_char>(),
            libc::MFD_CLOEXEC,
        )
    };
    if fd == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: the fd is freshly created and owned by no one else.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// No memfd outside Linux; an unlinked temp file gives the same lifetime.
#[cfg(not(target_os = "linux"))]
fn backing_file() -> io::Result<File> {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let path = std::env::temp_dir().join(format!(
        "corrente-ring-{}-{}",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&path)?;
    std::fs::remove_file(&path)?;
    Ok(file)
}

/// Ring buffer whose views never wrap, backed by the four-alias mapping.
pub struct MagicBuffer {
    base: NonNull<u8>,
    capacity: usize,
    read_offset: usize,
    filled: usize,
}

// SAFETY: the mapping is exclusively owned by this value; `&self` only
// exposes reads and all mutation goes through `&mut self`.
unsafe impl Send for MagicBuffer {}
unsafe impl Sync for MagicBuffer {}

impl MagicBuffer {
    /// Establishes the four-alias mapping. On any failure the partially
    /// acquired resources are released before returning.
    pub fn new() -> Result<Self> {
        let capacity = aligned_capacity();
        let span = capacity * 4;

        let file = backing_file().map_err(|source| RingError::Allocation {
            stage: "backing file",
            source,
        })?;
        file.set_len(capacity as u64)
            .map_err(|source| RingError::Allocation {
                stage: "sizing backing file",
                source,
            })?;

        // Reserve four consecutive capacity-sized slots of address space.
        // SAFETY: a fresh anonymous reservation touches no existing mapping.
        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                span,
                libc::PROT_NONE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(RingError::last_os_error("address space reservation"));
        }
        let base = base.cast::<u8>();

        // Replace each slot with the same physical region. The first two
        // aliases take writes (write view), the last two are read-only
        // (read-view margin).
        let fd = file.as_raw_fd();
        for (index, prot) in [
            libc::PROT_READ | libc::PROT_WRITE,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::PROT_READ,
            libc::PROT_READ,
        ]
        .into_iter()
        .enumerate()
        {
            // SAFETY: the target range lies wholly inside the reservation
            // we own; MAP_FIXED replaces it in place.
            let mapped = unsafe {
                libc::mmap(
                    base.add(index * capacity).cast(),
                    capacity,
                    prot,
                    libc::MAP_SHARED | libc::MAP_FIXED,
                    fd,
                    0,
                )
            };
            if mapped == libc::MAP_FAILED {
                let err = RingError::last_os_error("alias mapping");
                // SAFETY: the reservation (now partially replaced) is ours.
                unsafe { libc::munmap(base.cast(), span) };
                return Err(err);
            }
        }
        // The aliases keep the region alive; the fd can go.
        drop(file);

        debug!(capacity, "established four-alias ring mapping");

        Ok(Self {
            // SAFETY: mmap success never returns null.
            base: unsafe { NonNull::new_unchecked(base) },
            capacity,
            read_offset: 0,
            filled: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
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

    /// Contiguous view of all unread bytes, valid until the buffer is
    /// next mutated.
    #[inline]
    pub fn read_view(&self) -> &[u8] {
        // SAFETY: the view starts inside the second alias and `filled`
        // never exceeds `capacity`, so it ends before the fourth alias
        // does; the whole range is mapped readable.
        unsafe {
            slice::from_raw_parts(
                self.base.as_ptr().add(self.capacity + self.read_offset),
                self.filled,
            )
        }
    }

    /// Releases `count` bytes (clamped to the unread length) from the
    /// front of the read view.
    pub fn discard(&mut self, count: usize) {
        let count = count.min(self.filled);
        self.filled -= count;
        self.read_offset += count;
        if self.read_offset >= self.capacity {
            self.read_offset -= self.capacity;
        }
    }

    /// Contiguous view of all free space. Bytes written here become
    /// readable once `commit`ted.
    #[inline]
    pub fn write_view(&mut self) -> &mut [u8] {
        let mut offset = self.read_offset + self.filled;
        if offset >= self.capacity {
            offset -= self.capacity;
        }
        // SAFETY: `offset < capacity` and the view is at most `capacity`
        // bytes, so it stays inside the first two (writable) aliases.
        unsafe {
            slice::from_raw_parts_mut(
                self.base.as_ptr().add(offset),
                self.capacity - self.filled,
            )
        }
    }

    /// Marks `count` freshly written bytes (clamped to the free space) as
    /// readable.
    pub fn commit(&mut self, count: usize) {
        self.filled = (self.filled + count).min(self.capacity);
    }
}

impl Drop for MagicBuffer {
    fn drop(&mut self) {
        // SAFETY: we own the whole four-alias reservation.
        unsafe { libc::munmap(self.base.as_ptr().cast(), self.capacity * 4) };
    }
}

impl std::fmt::Debug for MagicBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagicBuffer")
            .field("capacity", &self.capacity)
            .field("read_offset", &self.read_offset)
            .field("filled", &self.filled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_page_aligned() {
        let rb = MagicBuffer::new().unwrap();
        assert!(rb.capacity() >= MIN_CAPACITY);
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        assert_eq!(rb.capacity() % page, 0);
    }

    #[test]
    fn test_view_is_contiguous_across_physical_wrap() {
        let mut rb = MagicBuffer::new().unwrap();
        let cap = rb.capacity();

        // Park the logical window just before the physical end.
        let pad = cap - 8;
        rb.write_view()[..pad].fill(0);
        rb.commit(pad);
        rb.discard(pad);

        // This write straddles the physical boundary.
        let payload: Vec<u8> = (0..64u8).collect();
        rb.write_view()[..payload.len()].copy_from_slice(&payload);
        rb.commit(payload.len());

        let view = rb.read_view();
        assert_eq!(view.len(), payload.len());
        assert_eq!(view, &payload[..]);
    }

    #[test]
    fn test_aliases_share_physical_bytes() {
        let mut rb = MagicBuffer::new().unwrap();
        rb.write_view()[..4].copy_from_slice(b"ring");
        rb.commit(4);
        // The read view goes through a different alias than the write.
        assert_eq!(rb.read_view(), b"ring");
    }

    #[test]
    fn test_clamping() {
        let mut rb = MagicBuffer::new().unwrap();
        let cap = rb.capacity();

        rb.discard(cap * 2);
        assert_eq!(rb.len(), 0);

        rb.commit(cap * 2);
        assert_eq!(rb.len(), cap);
        assert_eq!(rb.write_view().len(), 0);
    }

    #[test]
    fn test_capacity_conservation() {
        let mut rb = MagicBuffer::new().unwrap();
        let cap = rb.capacity();
        for (commit, discard) in [(100, 30), (cap - 50, cap - 100), (17, 17)] {
            rb.commit(commit);
            rb.discard(discard);
            assert_eq!(rb.read_view().len() + rb.write_view().len(), cap);
        }
    }

    #[test]
    fn test_create_drop_cycles() {
        for _ in 0..64 {
            let rb = MagicBuffer::new().unwrap();
            assert!(rb.is_empty());
        }
    }
}
