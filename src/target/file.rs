//! File and block device target
//!
//! Opens an existing file or block device read-write and serves positioned
//! reads and writes with `pread`/`pwrite`. Nothing is created, truncated or
//! pre-allocated: the benchmark runs against whatever is already there.
//!
//! Direct IO maps to `O_DIRECT` on Linux and `F_NOCACHE` on macOS. With direct
//! IO the kernel rejects requests whose buffer, offset or length are not
//! aligned to the device's logical block size; such requests fail
//! individually and are counted as request errors.
//!
//! Requests that would reach past the size discovered at open are rejected
//! before the syscall, so a write never extends the file.

use super::{check_bounds, Target};
use crate::error::{ConfigError, TargetOpenError};
use crate::Result;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::{FileExt, FileTypeExt};
use std::path::{Path, PathBuf};

// ioctl request code for getting block device size
#[cfg(target_os = "linux")]
const BLKGETSIZE64: libc::c_ulong = 0x80081272;

/// Open file or block device shared by all workers
#[derive(Debug)]
pub struct FileTarget {
    path: PathBuf,
    file: File,
    size: u64,
}

impl FileTarget {
    /// Open `path` read-write, bypassing the page cache when `direct` is set
    ///
    /// # Errors
    ///
    /// [`TargetOpenError`] if the open fails, [`ConfigError`] if the size
    /// cannot be determined or is zero.
    pub fn open(path: &Path, direct: bool) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true);

        #[cfg(target_os = "linux")]
        if direct {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_DIRECT);
        }

        let file = options.open(path).map_err(|source| TargetOpenError {
            path: path.to_path_buf(),
            source,
        })?;

        #[cfg(target_os = "macos")]
        if direct {
            disable_cache(&file).map_err(|source| TargetOpenError {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let size = size_of_open(&file).map_err(|source| ConfigError::SizeUnknown {
            path: path.to_path_buf(),
            source,
        })?;
        if size == 0 {
            return Err(ConfigError::NonPositiveSize { path: path.to_path_buf(), size }.into());
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
        })
    }
}

impl Target for FileTarget {
    fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        check_bounds(self.size, offset, buf.len())?;
        self.file.read_at(buf, offset)
    }

    #[inline]
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        check_bounds(self.size, offset, buf.len())?;
        self.file.write_at(buf, offset)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Determine the size of a file or block device without opening it for writing
///
/// # Errors
///
/// [`ConfigError::SizeUnknown`] if the path cannot be inspected,
/// [`ConfigError::NonPositiveSize`] if it reports zero bytes.
pub fn discover_size(path: &Path) -> Result<u64, ConfigError> {
    let unknown = |source| ConfigError::SizeUnknown { path: path.to_path_buf(), source };

    let metadata = std::fs::metadata(path).map_err(unknown)?;
    let size = if metadata.file_type().is_block_device() {
        let file = File::open(path).map_err(unknown)?;
        size_of_open(&file).map_err(unknown)?
    } else {
        metadata.len()
    };

    if size == 0 {
        return Err(ConfigError::NonPositiveSize { path: path.to_path_buf(), size });
    }
    Ok(size)
}

/// Size of an open handle; block devices report 0 in metadata
fn size_of_open(file: &File) -> io::Result<u64> {
    let metadata = file.metadata()?;
    if metadata.file_type().is_block_device() {
        block_device_size(file)
    } else {
        Ok(metadata.len())
    }
}

#[cfg(target_os = "linux")]
fn block_device_size(file: &File) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    let mut size: u64 = 0;
    // SAFETY: BLKGETSIZE64 writes exactly one u64 through the pointer
    let result = unsafe { libc::ioctl(file.as_raw_fd(), BLKGETSIZE64 as _, &mut size) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(size)
}

#[cfg(not(target_os = "linux"))]
fn block_device_size(file: &File) -> io::Result<u64> {
    use std::io::{Seek, SeekFrom};

    let mut handle = file;
    handle.seek(SeekFrom::End(0))
}

#[cfg(target_os = "macos")]
fn disable_cache(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: F_NOCACHE takes an int argument and touches no memory
    let result = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_NOCACHE, 1) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    fn temp_file(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0xABu8; len]).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_open_and_size() {
        let file = temp_file(1024 * 1024);
        let target = FileTarget::open(file.path(), false).unwrap();

        assert_eq!(target.size(), 1024 * 1024);
        assert_eq!(target.describe(), file.path().display().to_string());
    }

    #[test]
    fn test_positioned_io() {
        let file = temp_file(64 * 1024);
        let target = FileTarget::open(file.path(), false).unwrap();

        let data = vec![0x5Au8; 4096];
        assert_eq!(target.write_at(&data, 8192).unwrap(), 4096);

        let mut buf = vec![0u8; 4096];
        assert_eq!(target.read_at(&mut buf, 8192).unwrap(), 4096);
        assert_eq!(buf, data);

        assert_eq!(target.read_at(&mut buf, 0).unwrap(), 4096);
        assert!(buf.iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_request_past_end_rejected() {
        let file = temp_file(6000);
        let target = FileTarget::open(file.path(), false).unwrap();

        let mut buf = vec![0u8; 4096];
        let err = target.read_at(&mut buf, 4096).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err = target.write_at(&buf, 4096).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 6000);

        // The last full request still fits
        assert_eq!(target.write_at(&buf, 6000 - 4096).unwrap(), 4096);
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let err = FileTarget::open(file.path(), false).unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::NonPositiveSize { size: 0, .. })));
        assert!(matches!(discover_size(file.path()), Err(ConfigError::NonPositiveSize { .. })));
    }

    #[test]
    fn test_open_failure_is_target_open_error() {
        let err = FileTarget::open(Path::new("/nonexistent/dir/file"), false).unwrap_err();
        let open_err = err.downcast_ref::<TargetOpenError>().unwrap();
        assert_eq!(open_err.path, PathBuf::from("/nonexistent/dir/file"));
    }

    #[test]
    fn test_read_only_file_cannot_be_opened() {
        // root bypasses permission bits
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let file = temp_file(8192);
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o444)).unwrap();

        let err = FileTarget::open(file.path(), false).unwrap_err();
        assert!(err.downcast_ref::<TargetOpenError>().is_some());
    }

    #[test]
    fn test_discover_size() {
        let file = temp_file(12345);
        assert_eq!(discover_size(file.path()).unwrap(), 12345);
        assert!(matches!(
            discover_size(Path::new("/nonexistent/file")),
            Err(ConfigError::SizeUnknown { .. })
        ));
    }
}
