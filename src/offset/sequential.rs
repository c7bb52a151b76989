//! Sequential offset walk
//!
//! Returns the cursor, then moves it forward by one request, wrapping modulo
//! the target size. Strides that do not divide the size keep their remainder
//! across the wrap, so later passes are shifted rather than restarted at 0.

/// Return `(offset, next_cursor)` for one sequential step
#[inline(always)]
pub fn advance(cursor: u64, io_size: u64, file_size: u64) -> (u64, u64) {
    debug_assert!(file_size > 0);
    (cursor, (cursor + io_size) % file_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_basic() {
        assert_eq!(advance(0, 4096, 16384), (0, 4096));
        assert_eq!(advance(4096, 4096, 16384), (4096, 8192));
    }

    #[test]
    fn test_advance_wraparound() {
        assert_eq!(advance(12288, 4096, 16384), (12288, 0));
        assert_eq!(advance(9000, 4096, 10000), (9000, 3096));
    }

    #[test]
    fn test_advance_full_coverage() {
        let file_size = 1024 * 1024;
        let io_size = 4096;
        let mut cursor = 0;
        let mut seen = std::collections::HashSet::new();

        for _ in 0..file_size / io_size {
            let (offset, next) = advance(cursor, io_size, file_size);
            assert!(seen.insert(offset), "offset {} visited twice", offset);
            cursor = next;
        }
        assert_eq!(cursor, 0);
        assert_eq!(seen.len() as u64, file_size / io_size);
    }
}
