//! Buffer management and alignment for high-performance IO
//!
//! This module provides memory-aligned buffers required for O_DIRECT operations.
//! Workers own one buffer each; the RAM target is one large zeroed buffer.

use crate::Result;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;

/// Fallback when the page size cannot be queried
const DEFAULT_PAGE_SIZE: usize = 4096;

/// System page size, used as the buffer alignment for direct IO
pub fn page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 && (size as usize).is_power_of_two() {
        size as usize
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Memory-aligned buffer suitable for O_DIRECT operations
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    size: usize,
    layout: Layout,
}

impl AlignedBuffer {
    /// Allocate a zeroed buffer of `size` bytes
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero, `alignment` is not a power of two,
    /// or the allocator is out of memory.
    pub fn new(size: usize, alignment: usize) -> Result<Self> {
        if size == 0 {
            anyhow::bail!("Buffer size must be greater than 0");
        }
        if !alignment.is_power_of_two() {
            anyhow::bail!("Alignment must be a power of 2, got {}", alignment);
        }

        let layout = Layout::from_size_align(size, alignment)
            .map_err(|e| anyhow::anyhow!("Invalid layout parameters: {}", e))?;

        // SAFETY: layout has a non-zero size. Zeroed memory keeps large
        // regions as untouched zero pages until first written.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw)
            .ok_or_else(|| anyhow::anyhow!("Failed to allocate {} byte aligned buffer", size))?;

        Ok(AlignedBuffer {
            ptr,
            size,
            layout,
        })
    }

    /// Get the buffer as a slice
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for size bytes and zero-initialised at allocation
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }

    /// Get the buffer as a mutable slice
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees exclusive access
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }

    /// Raw base pointer, for owners that manage their own access discipline
    #[inline(always)]
    pub(crate) fn as_raw(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Get the size of the buffer in bytes
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fill the buffer with deterministic pseudo-random bytes derived from `seed`
    pub fn fill_random(&mut self, seed: u64) {
        // Simple LCG
        let mut state = seed;
        for byte in self.as_mut_slice().iter_mut() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            *byte = (state >> 33) as u8;
        }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with exactly this layout
        unsafe {
            dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

// AlignedBuffer is Send because it owns its memory
unsafe impl Send for AlignedBuffer {}
