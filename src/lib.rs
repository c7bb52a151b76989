//! pario - parallel positioned-IO benchmark
//!
//! Launches a fixed number of worker threads against one shared target (a
//! file, a block device or an in-process memory region). Each worker issues a
//! fixed number of equal-sized positioned reads and writes, choosing offsets
//! with a sequential, random or block-aligned random pattern, and times its
//! own loop. The harness then reports aggregate IOPS and the average
//! per-request latency.
//!
//! # Architecture
//!
//! - **config**: CLI, TOML file and validation
//! - **offset**: offset patterns
//! - **target**: file, block device, RAM and mock targets
//! - **worker**: per-thread request loop, read/write decision, CPU pinning
//! - **harness**: spawns and joins workers, times the run
//! - **stats** / **output**: aggregation and reporting
//!
//! # Example
//!
//! ```
//! use pario::config::{BenchmarkConfig, IoPattern, RuntimeConfig};
//! use pario::harness::Harness;
//! use pario::stats::ResultAggregator;
//! use pario::target::ram::RamTarget;
//!
//! let workload = BenchmarkConfig {
//!     thread_count: 4,
//!     requests_per_thread: 100,
//!     read_ratio: 0.5,
//!     io_size: 4096,
//!     pattern: IoPattern::RandomBlock,
//! };
//! let harness = Harness::new(workload.clone(), RuntimeConfig { seed: Some(1), pin_cpus: false })?;
//! let target = RamTarget::new(1024 * 1024)?;
//!
//! let outcome = harness.run_on(&target)?;
//! let summary = ResultAggregator::new(&workload).aggregate(&outcome)?;
//! assert_eq!(summary.thread_count, 4);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod harness;
pub mod offset;
pub mod output;
pub mod stats;
pub mod target;
pub mod util;
pub mod worker;

pub use config::Config;
pub use harness::Harness;

/// Result type used throughout pario
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;
