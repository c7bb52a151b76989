//! CLI to Config conversion utilities

use crate::config::cli::{Cli, PatternArg};
use crate::config::toml::FileConfig;
use crate::config::*;
use crate::error::ConfigError;
use anyhow::{Context, Result};

/// Parse a size string (e.g., "1G", "100M", "4k") to bytes
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("k") || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches("k"), 1024u64)
    } else if s.ends_with("m") || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches("m"), 1024 * 1024)
    } else if s.ends_with("g") || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches("g"), 1024 * 1024 * 1024)
    } else if s.ends_with("t") || s.ends_with("tb") {
        (s.trim_end_matches("tb").trim_end_matches("t"), 1024 * 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.trim().parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Size out of range: {}", s))
}

/// Convert CLI PatternArg to workload IoPattern
pub fn convert_pattern(arg: PatternArg) -> IoPattern {
    match arg {
        PatternArg::Sequential => IoPattern::Sequential,
        PatternArg::Random => IoPattern::Random,
        PatternArg::RandomBlock => IoPattern::RandomBlock,
    }
}

/// Build the run configuration from CLI arguments and an optional config file
///
/// Precedence is CLI, then file, then built-in defaults. The result is not
/// validated yet; see [`crate::config::validator::validate_config`].
pub fn build_config(cli: &Cli, file: FileConfig) -> Result<Config> {
    let pattern = match cli.pattern {
        Some(arg) => convert_pattern(arg),
        None => match file.pattern.as_deref() {
            Some(name) => name.parse::<IoPattern>()?,
            None => return Err(ConfigError::MissingPattern.into()),
        },
    };

    let io_size = match (&cli.io_size, &file.io_size) {
        (Some(s), _) => parse_size(s).context("Invalid I/O size")?,
        (None, Some(v)) => v.to_bytes().context("Invalid I/O size")?,
        (None, None) => DEFAULT_IO_SIZE as u64,
    };
    let io_size = usize::try_from(io_size).context("I/O size does not fit in memory")?;

    let workload = BenchmarkConfig {
        thread_count: cli.threads.or(file.threads).unwrap_or(DEFAULT_THREADS),
        requests_per_thread: cli.requests.or(file.requests).unwrap_or(DEFAULT_REQUESTS),
        read_ratio: cli.read_ratio.or(file.read_ratio).unwrap_or(DEFAULT_READ_RATIO),
        io_size,
        pattern,
    };

    let ram_io = cli.ram_io || file.ram_io.unwrap_or(false);
    let target = if ram_io {
        let size = match (&cli.ram_size, &file.ram_size) {
            (Some(s), _) => parse_size(s).context("Invalid RAM size")?,
            (None, Some(v)) => v.to_bytes().context("Invalid RAM size")?,
            (None, None) => DEFAULT_RAM_SIZE,
        };
        TargetConfig::Ram { size }
    } else {
        let paths = if cli.paths.is_empty() { file.paths } else { cli.paths.clone() };
        TargetConfig::Files {
            paths,
            direct: cli.direct_io || file.direct_io.unwrap_or(false),
        }
    };

    Ok(Config {
        workload,
        target,
        runtime: RuntimeConfig {
            seed: cli.seed.or(file.seed),
            pin_cpus: cli.pin_cpus || file.pin_cpus.unwrap_or(false),
        },
        output: OutputConfig {
            format: if cli.json { OutputFormat::Json } else { OutputFormat::Text },
            per_worker: cli.per_worker,
        },
    })
}
