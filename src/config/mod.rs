//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Everything here is built once before the run and then only read.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_THREADS: usize = 48;
pub const DEFAULT_REQUESTS: u64 = 1000;
pub const DEFAULT_READ_RATIO: f64 = 0.4;
pub const DEFAULT_IO_SIZE: usize = 4096;
pub const DEFAULT_RAM_SIZE: u64 = 512 * 1024 * 1024;

/// Complete run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub workload: BenchmarkConfig,
    pub target: TargetConfig,
    pub runtime: RuntimeConfig,
    pub output: OutputConfig,
}

/// Workload parameters shared read-only by every worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Number of concurrent workers
    pub thread_count: usize,
    /// Requests issued by each worker
    pub requests_per_thread: u64,
    /// Probability that a request is a read (0.0-1.0)
    pub read_ratio: f64,
    /// Bytes transferred per request
    pub io_size: usize,
    /// Offset selection policy
    pub pattern: IoPattern,
}

impl BenchmarkConfig {
    /// Total number of requests across all workers
    pub fn total_requests(&self) -> u64 {
        self.requests_per_thread * self.thread_count as u64
    }
}

/// Offset selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IoPattern {
    /// Strided walk from offset 0, wrapping at the end of the target
    Sequential,
    /// Uniform byte offsets
    Random,
    /// Uniform offsets on 4 KiB block boundaries
    RandomBlock,
}

impl IoPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoPattern::Sequential => "sequential",
            IoPattern::Random => "random",
            IoPattern::RandomBlock => "random_block",
        }
    }
}

impl fmt::Display for IoPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IoPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sequential" => Ok(IoPattern::Sequential),
            "random" => Ok(IoPattern::Random),
            "random_block" => Ok(IoPattern::RandomBlock),
            other => Err(ConfigError::UnknownPattern(other.to_string())),
        }
    }
}

/// Storage the workers run against
#[derive(Debug, Clone, PartialEq)]
pub enum TargetConfig {
    /// Existing files or block devices; only the first one is opened
    Files { paths: Vec<PathBuf>, direct: bool },
    /// Zero-filled in-process memory region
    Ram { size: u64 },
}

/// Runtime knobs that do not change what is measured
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeConfig {
    /// Root seed for the per-worker generators (clock-derived when unset)
    pub seed: Option<u64>,
    /// Pin worker `i` to CPU `i % num_cpus`
    pub pin_cpus: bool,
}

/// Report rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub per_worker: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
