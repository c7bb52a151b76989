//! Worker implementation
//!
//! A worker is the unit of parallelism: it owns one aligned IO buffer, one
//! offset generator and one random generator, and issues a fixed number of
//! positioned requests against the shared target.
//!
//! # Request loop
//!
//! For each request the worker picks the offset first, then decides read or
//! write, then performs exactly one `read_at`/`write_at` of `io_size` bytes.
//! A failed or short request is logged and counted; the loop always runs to
//! completion so the elapsed time covers every configured request.
//!
//! # Example
//!
//! ```
//! use pario::config::{BenchmarkConfig, IoPattern};
//! use pario::target::ram::RamTarget;
//! use pario::worker::Worker;
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let config = BenchmarkConfig {
//!     thread_count: 1,
//!     requests_per_thread: 100,
//!     read_ratio: 0.5,
//!     io_size: 4096,
//!     pattern: IoPattern::Random,
//! };
//! let target = RamTarget::new(1024 * 1024)?;
//! let rng = Xoshiro256PlusPlus::seed_from_u64(1);
//!
//! let mut worker = Worker::new(0, &config, &target, rng)?;
//! let report = worker.run();
//! assert_eq!(report.reads + report.writes, 100);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod access;
pub mod affinity;

use crate::config::BenchmarkConfig;
use crate::error::RequestError;
use crate::offset::OffsetGenerator;
use crate::target::Target;
use crate::util::buffer::{page_size, AlignedBuffer};
use crate::util::time::as_millis_f64;
use crate::Result;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Direction of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => f.write_str("read"),
            AccessMode::Write => f.write_str("write"),
        }
    }
}

/// Outcome of one worker's run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerReport {
    /// Worker ID in `0..thread_count`
    pub id: usize,
    /// Time from just before the first request to just after the last
    pub elapsed: Duration,
    /// Completed reads
    pub reads: u64,
    /// Completed writes
    pub writes: u64,
    /// Failed or short requests
    pub errors: u64,
}

impl WorkerReport {
    pub fn elapsed_ms(&self) -> f64 {
        as_millis_f64(self.elapsed)
    }

    /// Requests attempted, successful or not
    pub fn requests(&self) -> u64 {
        self.reads + self.writes + self.errors
    }
}

/// One load-generating worker
///
/// Borrows the configuration and the target for its whole life; everything
/// it mutates is private to it.
pub struct Worker<'a> {
    id: usize,
    config: &'a BenchmarkConfig,
    target: &'a dyn Target,
    buffer: AlignedBuffer,
    offsets: OffsetGenerator,
    rng: Xoshiro256PlusPlus,
}

impl<'a> Worker<'a> {
    /// Create a worker
    ///
    /// The IO buffer is page-aligned so it is valid for direct IO, and filled
    /// with pseudo-random bytes so writes do not push all-zero pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot be allocated or the target is not
    /// larger than `io_size`.
    pub fn new(
        id: usize,
        config: &'a BenchmarkConfig,
        target: &'a dyn Target,
        mut rng: Xoshiro256PlusPlus,
    ) -> Result<Self> {
        let offsets = OffsetGenerator::new(config.pattern, target.size(), config.io_size)?;

        let mut buffer = AlignedBuffer::new(config.io_size, page_size())?;
        buffer.fill_random(rng.gen());

        Ok(Self {
            id,
            config,
            target,
            buffer,
            offsets,
            rng,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Issue every configured request and report the elapsed time
    pub fn run(&mut self) -> WorkerReport {
        let mut report = WorkerReport {
            id: self.id,
            ..WorkerReport::default()
        };

        let start = Instant::now();
        for _ in 0..self.config.requests_per_thread {
            let offset = self.offsets.next_offset(&mut self.rng);
            let mode = if access::is_read(self.config.read_ratio, &mut self.rng) {
                AccessMode::Read
            } else {
                AccessMode::Write
            };

            match self.perform(mode, offset) {
                Ok(()) => match mode {
                    AccessMode::Read => report.reads += 1,
                    AccessMode::Write => report.writes += 1,
                },
                Err(err) => {
                    report.errors += 1;
                    warn!(
                        worker = self.id,
                        offset,
                        mode = %mode,
                        size = self.config.io_size,
                        errno = ?err.raw_os_error(),
                        error = %err,
                        "I/O request failed"
                    );
                }
            }
        }
        report.elapsed = start.elapsed();

        debug!(
            worker = self.id,
            elapsed_ms = report.elapsed_ms(),
            reads = report.reads,
            writes = report.writes,
            errors = report.errors,
            "worker finished"
        );
        report
    }

    /// One positioned request; anything but a full transfer is an error
    #[inline]
    fn perform(&mut self, mode: AccessMode, offset: u64) -> Result<(), RequestError> {
        let expected = self.buffer.size();
        let actual = match mode {
            AccessMode::Read => self.target.read_at(self.buffer.as_mut_slice(), offset)?,
            AccessMode::Write => self.target.write_at(self.buffer.as_slice(), offset)?,
        };

        if actual != expected {
            return Err(RequestError::ShortTransfer { expected, actual });
        }
        Ok(())
    }
}
