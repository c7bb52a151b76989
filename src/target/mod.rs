//! Target abstraction
//!
//! A target is the storage every worker hammers: one open file or block
//! device, or one in-process memory region. Exactly one target exists per run.
//! The harness owns it and lends `&dyn Target` to the workers, so it cannot be
//! closed while any worker is still running.
//!
//! # Target Types
//!
//! - **File**: regular files and block devices, optionally with direct IO
//! - **Ram**: a zeroed, page-aligned memory region
//! - **Mock**: in-memory target with fault injection, for tests
//!
//! # Example
//!
//! ```
//! use pario::target::{Target, ram::RamTarget};
//!
//! let target = RamTarget::new(1024 * 1024).unwrap();
//! let data = [7u8; 4096];
//! assert_eq!(target.write_at(&data, 8192).unwrap(), 4096);
//!
//! let mut buf = [0u8; 4096];
//! assert_eq!(target.read_at(&mut buf, 8192).unwrap(), 4096);
//! assert_eq!(buf, data);
//! ```

pub mod file;
pub mod mock;
pub mod ram;

use crate::config::TargetConfig;
use crate::Result;
use std::io;
use tracing::{debug, info};

/// Shared storage under test
///
/// Implementations must accept concurrent calls from many threads. No ordering
/// between concurrent requests is promised; overlapping writes may interleave.
pub trait Target: Send + Sync {
    /// Size in bytes; bounds every offset
    fn size(&self) -> u64;

    /// Positioned read of up to `buf.len()` bytes at `offset`
    ///
    /// Returns the byte count actually transferred. A single call is made; a
    /// short count is reported back, not retried.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Positioned write of up to `buf.len()` bytes at `offset`
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize>;

    /// Short human-readable name for logs and reports
    fn describe(&self) -> String;
}

/// Acquire the target described by the configuration
///
/// For files, every listed path must report a positive size; only the first
/// one is opened.
///
/// # Errors
///
/// [`crate::error::ConfigError`] when a size is missing or not positive,
/// [`crate::error::TargetOpenError`] when the file cannot be opened read-write.
pub fn open_target(config: &TargetConfig) -> Result<Box<dyn Target>> {
    match config {
        TargetConfig::Files { paths, direct } => {
            let first = paths.first().ok_or(crate::error::ConfigError::MissingTarget)?;
            for path in paths {
                let size = file::discover_size(path)?;
                debug!(path = %path.display(), size, "discovered target size");
            }

            let target = file::FileTarget::open(first, *direct)?;
            info!(target = %target.describe(), size = target.size(), direct = *direct, "opened target");
            Ok(Box::new(target))
        }
        TargetConfig::Ram { size } => {
            let target = ram::RamTarget::new(*size)?;
            info!(size = *size, "allocated RAM target");
            Ok(Box::new(target))
        }
    }
}

/// Reject requests that would run past the end of a target
pub(crate) fn check_bounds(size: u64, offset: u64, len: usize) -> io::Result<usize> {
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= size => Ok(offset as usize),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("request [{}, +{}) exceeds target size {}", offset, len, size),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, TargetOpenError};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_open_ram_target() {
        let target = open_target(&TargetConfig::Ram { size: 1 << 20 }).unwrap();
        assert_eq!(target.size(), 1 << 20);
    }

    #[test]
    fn test_open_file_target() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 64 * 1024]).unwrap();
        file.flush().unwrap();

        let config = TargetConfig::Files { paths: vec![file.path().to_path_buf()], direct: false };
        let target = open_target(&config).unwrap();
        assert_eq!(target.size(), 64 * 1024);
    }

    #[test]
    fn test_every_path_must_have_size() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        first.write_all(&[1u8; 8192]).unwrap();
        let empty = tempfile::NamedTempFile::new().unwrap();

        let config = TargetConfig::Files {
            paths: vec![first.path().to_path_buf(), empty.path().to_path_buf()],
            direct: false,
        };
        let err = open_target(&config).err().unwrap();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::NonPositiveSize { .. })));
    }

    #[test]
    fn test_missing_file() {
        let config = TargetConfig::Files {
            paths: vec![PathBuf::from("/nonexistent/pario-target")],
            direct: false,
        };
        let err = open_target(&config).err().unwrap();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::SizeUnknown { .. })));
        assert!(err.downcast_ref::<TargetOpenError>().is_none());
    }

    #[test]
    fn test_no_paths() {
        let config = TargetConfig::Files { paths: vec![], direct: false };
        let err = open_target(&config).err().unwrap();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::MissingTarget)));
    }

    #[test]
    fn test_check_bounds() {
        assert_eq!(check_bounds(8192, 4096, 4096).unwrap(), 4096);
        assert!(check_bounds(8192, 4097, 4096).is_err());
        assert!(check_bounds(8192, u64::MAX, 1).is_err());
    }
}
