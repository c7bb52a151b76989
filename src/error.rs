//! Error taxonomy
//!
//! Configuration and open errors abort a run before any worker starts. Request
//! errors are per-operation: workers log and count them, then move on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid or incomplete benchmark configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unrecognized I/O pattern '{0}' (expected sequential, random or random_block)")]
    UnknownPattern(String),

    #[error("no I/O pattern specified (use --pattern or set `pattern` in the config file)")]
    MissingPattern,

    #[error("no target given: pass at least one PATH or use --ram-io")]
    MissingTarget,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("read ratio must be within [0, 1], got {0}")]
    ReadRatio(f64),

    #[error("failed to determine size of {}", path.display())]
    SizeUnknown {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("size of {} must be positive, got {size}", path.display())]
    NonPositiveSize { path: PathBuf, size: u64 },

    #[error("target size {size} must be larger than the I/O size {io_size}")]
    TargetTooSmall { size: u64, io_size: u64 },
}

/// The benchmark target could not be opened for read-write access
#[derive(Debug, Error)]
#[error("failed to open {} for read-write", path.display())]
pub struct TargetOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A single positioned read or write that did not complete as requested
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("short transfer: {actual} of {expected} bytes")]
    ShortTransfer { expected: usize, actual: usize },
}

impl RequestError {
    /// OS error number, if the failure came from a syscall
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            RequestError::Io(err) => err.raw_os_error(),
            RequestError::ShortTransfer { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_errno() {
        let err = RequestError::from(io::Error::from_raw_os_error(libc::EIO));
        assert_eq!(err.raw_os_error(), Some(libc::EIO));

        let short = RequestError::ShortTransfer { expected: 4096, actual: 512 };
        assert_eq!(short.raw_os_error(), None);
        assert_eq!(short.to_string(), "short transfer: 512 of 4096 bytes");
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::TargetTooSmall { size: 4096, io_size: 4096 };
        assert!(err.to_string().contains("larger than the I/O size"));

        let err = ConfigError::UnknownPattern("zigzag".to_string());
        assert!(err.to_string().contains("zigzag"));
    }
}
