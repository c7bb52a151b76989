//! CLI argument parsing using clap
//!
//! Workload options are optional here so that a `--config` file can supply
//! them; defaults are applied in [`super::cli_convert`].

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// pario - parallel positioned-IO benchmark
#[derive(Parser, Debug)]
#[command(name = "pario")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Target files or block devices (only the first one is benchmarked)
    ///
    /// Not required with --ram-io
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    // === Workload Options ===
    /// Number of worker threads [default: 48]
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Requests issued by each worker thread [default: 1000]
    #[arg(short = 'n', long)]
    pub requests: Option<u64>,

    /// Fraction of requests that are reads (0.0-1.0) [default: 0.4]
    #[arg(short = 'r', long)]
    pub read_ratio: Option<f64>,

    /// Bytes per request (e.g., 4096, 4k, 1M) [default: 4k]
    #[arg(short = 'b', long)]
    pub io_size: Option<String>,

    /// Offset selection pattern
    #[arg(short = 'p', long, value_enum)]
    pub pattern: Option<PatternArg>,

    // === Target Options ===
    /// Bypass the page cache (O_DIRECT on Linux, F_NOCACHE on macOS)
    #[arg(long)]
    pub direct_io: bool,

    /// Benchmark an in-process memory region instead of a file
    #[arg(long)]
    pub ram_io: bool,

    /// Size of the --ram-io region (e.g., 512M, 1G) [default: 512M]
    #[arg(long)]
    pub ram_size: Option<String>,

    // === Runtime Options ===
    /// Root seed for the per-worker random generators (default: clock-derived)
    #[arg(long, env = "PARIO_SEED")]
    pub seed: Option<u64>,

    /// Pin worker i to CPU (i mod number of CPUs)
    #[arg(long)]
    pub pin_cpus: bool,

    // === Output Options ===
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Include per-worker elapsed times in the report
    #[arg(long)]
    pub per_worker: bool,

    // === Configuration File ===
    /// TOML configuration file (CLI options take precedence)
    #[arg(short = 'c', long, env = "PARIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log setup and run details (info level)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Offset selection pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternArg {
    /// Strided walk wrapping at the end of the target
    Sequential,
    /// Uniform random byte offsets
    Random,
    /// Uniform random offsets on 4 KiB boundaries
    #[value(name = "random_block")]
    RandomBlock,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log filter directive for the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}
