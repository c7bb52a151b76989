//! Offset generation
//!
//! Produces the byte offset of each request for one worker. Three policies are
//! supported:
//!
//! - **Sequential**: strided walk from a cursor, wrapping modulo the target size
//! - **Random**: uniform byte offsets in `[0, size - io_size)`
//! - **RandomBlock**: uniform offsets on [`BLOCK_SIZE`] boundaries
//!
//! Whatever the policy, the final offset is truncated down to a multiple of
//! [`OFFSET_ALIGNMENT`]. For RandomBlock that truncation is a no-op; for small
//! sequential strides it folds neighbouring offsets onto the same 1 KiB
//! boundary. Both effects are kept as-is.
//!
//! # Example
//!
//! ```
//! use pario::config::IoPattern;
//! use pario::offset::OffsetGenerator;
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
//! let mut offsets = OffsetGenerator::new(IoPattern::Sequential, 16384, 4096).unwrap();
//!
//! assert_eq!(offsets.next_offset(&mut rng), 0);
//! assert_eq!(offsets.next_offset(&mut rng), 4096);
//! ```

pub mod sequential;
pub mod uniform;

use crate::config::IoPattern;
use crate::config::validator::validate_target_size;
use crate::error::ConfigError;
use rand::Rng;

/// Granularity of RandomBlock offsets
pub const BLOCK_SIZE: u64 = 4096;

/// Every offset is truncated down to a multiple of this
pub const OFFSET_ALIGNMENT: u64 = 1024;

/// Compute one offset and the cursor to use for the next call
///
/// `cursor` only matters for [`IoPattern::Sequential`]; the random policies
/// hand it back unchanged. Callers must ensure `file_size > io_size`
/// ([`OffsetGenerator::new`] enforces it); a degenerate range yields offset 0
/// rather than panicking.
#[inline]
pub fn next_offset<R: Rng + ?Sized>(
    pattern: IoPattern,
    file_size: u64,
    io_size: u64,
    cursor: u64,
    rng: &mut R,
) -> (u64, u64) {
    let span = file_size.saturating_sub(io_size);

    let (offset, next_cursor) = match pattern {
        IoPattern::Sequential => sequential::advance(cursor, io_size, file_size),
        IoPattern::Random => (uniform::random_offset(span, rng), cursor),
        IoPattern::RandomBlock => (uniform::random_block_offset(span, BLOCK_SIZE, rng), cursor),
    };

    (align_down(offset), next_cursor)
}

/// Truncate an offset to the 1 KiB boundary at or below it
#[inline(always)]
pub fn align_down(offset: u64) -> u64 {
    offset / OFFSET_ALIGNMENT * OFFSET_ALIGNMENT
}

/// Per-worker offset source
///
/// Owns the sequential cursor; randomness comes from the worker's generator
/// so one seed drives both offsets and read/write decisions.
#[derive(Debug, Clone)]
pub struct OffsetGenerator {
    pattern: IoPattern,
    file_size: u64,
    io_size: u64,
    cursor: u64,
}

impl OffsetGenerator {
    /// Create a generator starting at cursor 0
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TargetTooSmall`] if `file_size <= io_size`.
    pub fn new(pattern: IoPattern, file_size: u64, io_size: usize) -> Result<Self, ConfigError> {
        validate_target_size(file_size, io_size)?;
        Ok(Self {
            pattern,
            file_size,
            io_size: io_size as u64,
            cursor: 0,
        })
    }

    /// Start the sequential walk from another position
    pub fn with_cursor(mut self, cursor: u64) -> Self {
        self.cursor = cursor % self.file_size;
        self
    }

    #[inline]
    pub fn next_offset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u64 {
        let (offset, cursor) = next_offset(self.pattern, self.file_size, self.io_size, self.cursor, rng);
        self.cursor = cursor;
        offset
    }

    pub fn pattern(&self) -> IoPattern {
        self.pattern
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}
