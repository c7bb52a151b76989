//! In-memory target
//!
//! Stands in for storage with a zeroed, page-aligned heap region so the
//! benchmark measures memory copy throughput under the same worker model.
//! Workers copy in and out of the region with no synchronisation at all;
//! overlapping writes from different workers may tear. Contents are never
//! interpreted, only moved.

use super::{check_bounds, Target};
use crate::util::buffer::{page_size, AlignedBuffer};
use crate::Result;
use std::io;
use std::ptr;

/// Heap region shared by all workers
pub struct RamTarget {
    region: AlignedBuffer,
}

impl RamTarget {
    /// Allocate a zeroed region of `size` bytes
    pub fn new(size: u64) -> Result<Self> {
        let len = usize::try_from(size)
            .map_err(|_| anyhow::anyhow!("RAM target size {} does not fit in memory", size))?;
        let region = AlignedBuffer::new(len, page_size())?;
        Ok(Self { region })
    }
}

// SAFETY: the region is only reached through raw pointer copies bounded by
// check_bounds. Concurrent copies may race on the same bytes; the bytes are
// plain u8 data with no invariants, and no reference into the region is ever
// handed out while workers run.
unsafe impl Sync for RamTarget {}

impl Target for RamTarget {
    fn size(&self) -> u64 {
        self.region.size() as u64
    }

    #[inline]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let start = check_bounds(self.size(), offset, buf.len())?;
        // SAFETY: [start, start + len) lies inside the region; buf is a
        // distinct allocation owned by the caller
        unsafe {
            ptr::copy_nonoverlapping(self.region.as_raw().add(start), buf.as_mut_ptr(), buf.len());
        }
        Ok(buf.len())
    }

    #[inline]
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        let start = check_bounds(self.size(), offset, buf.len())?;
        // SAFETY: as in read_at
        unsafe {
            ptr::copy_nonoverlapping(buf.as_ptr(), self.region.as_raw().add(start), buf.len());
        }
        Ok(buf.len())
    }

    fn describe(&self) -> String {
        format!("ram:{}", self.region.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_is_zeroed() {
        let target = RamTarget::new(64 * 1024).unwrap();
        let mut buf = vec![0xFFu8; 4096];
        assert_eq!(target.read_at(&mut buf, 60 * 1024).unwrap(), 4096);
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(target.describe(), "ram:65536");
    }

    #[test]
    fn test_write_then_read() {
        let target = RamTarget::new(64 * 1024).unwrap();
        let data: Vec<u8> = (0..4096).map(|i| (i % 251) as u8).collect();

        assert_eq!(target.write_at(&data, 1024).unwrap(), 4096);
        let mut buf = vec![0u8; 4096];
        target.read_at(&mut buf, 1024).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn test_out_of_bounds() {
        let target = RamTarget::new(8192).unwrap();
        let mut buf = vec![0u8; 4096];
        assert_eq!(target.read_at(&mut buf, 4096).unwrap(), 4096);

        let err = target.read_at(&mut buf, 4097).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(target.write_at(&buf, 8192).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(RamTarget::new(0).is_err());
    }

    #[test]
    fn test_concurrent_disjoint_writes() {
        let target = RamTarget::new(16 * 4096).unwrap();

        thread::scope(|s| {
            for id in 0..16u8 {
                let target = &target;
                s.spawn(move || {
                    let data = vec![id; 4096];
                    target.write_at(&data, id as u64 * 4096).unwrap();
                });
            }
        });

        let mut buf = vec![0u8; 4096];
        for id in 0..16u8 {
            target.read_at(&mut buf, id as u64 * 4096).unwrap();
            assert!(buf.iter().all(|&b| b == id));
        }
    }
}
