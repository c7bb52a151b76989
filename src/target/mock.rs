//! Mock target for testing
//!
//! In-memory target that records every request and can be told to fail
//! specific ones, either with an OS error or with a short transfer. Request
//! numbers count calls across all threads, starting at 0.
//!
//! # Example
//!
//! ```
//! use pario::target::Target;
//! use pario::target::mock::{Fault, MockTarget};
//!
//! let target = MockTarget::new(1024 * 1024);
//! target.inject(1, Fault::Short(512));
//!
//! let buf = [0u8; 4096];
//! assert_eq!(target.write_at(&buf, 0).unwrap(), 4096);
//! assert_eq!(target.write_at(&buf, 0).unwrap(), 512);
//! assert_eq!(target.records().len(), 2);
//! ```

use super::{check_bounds, Target};
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Failure to inject into one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail with this OS error number
    Errno(i32),
    /// Transfer only this many bytes
    Short(usize),
}

/// Record of a request seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    pub is_read: bool,
    pub offset: u64,
    pub length: usize,
    pub fault: Option<Fault>,
}

/// In-memory target with fault injection
pub struct MockTarget {
    size: u64,
    data: Mutex<Vec<u8>>,
    calls: AtomicU64,
    faults: Mutex<HashMap<u64, Fault>>,
    records: Mutex<Vec<OperationRecord>>,
}

impl MockTarget {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            data: Mutex::new(vec![0u8; size as usize]),
            calls: AtomicU64::new(0),
            faults: Mutex::new(HashMap::new()),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Make request number `call` fail with `fault`
    pub fn inject(&self, call: u64, fault: Fault) {
        self.faults.lock().unwrap().insert(call, fault);
    }

    /// Number of requests served so far
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// All requests served so far, in arrival order
    pub fn records(&self) -> Vec<OperationRecord> {
        self.records.lock().unwrap().clone()
    }

    fn serve(&self, is_read: bool, offset: u64, length: usize) -> io::Result<(usize, usize)> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let fault = self.faults.lock().unwrap().get(&call).copied();
        self.records.lock().unwrap().push(OperationRecord { is_read, offset, length, fault });

        let start = check_bounds(self.size, offset, length)?;
        match fault {
            Some(Fault::Errno(errno)) => Err(io::Error::from_raw_os_error(errno)),
            Some(Fault::Short(n)) => Ok((start, n.min(length))),
            None => Ok((start, length)),
        }
    }
}

impl Target for MockTarget {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let (start, n) = self.serve(true, offset, buf.len())?;
        let data = self.data.lock().unwrap();
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        let (start, n) = self.serve(false, offset, buf.len())?;
        let mut data = self.data.lock().unwrap();
        data[start..start + n].copy_from_slice(&buf[..n]);
        Ok(n)
    }

    fn describe(&self) -> String {
        format!("mock:{}", self.size)
    }
}
