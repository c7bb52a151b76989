//! Configuration validation

use super::*;
use crate::error::ConfigError;
use anyhow::Result;
use tracing::warn;

/// Validate complete configuration
///
/// Runs before the target is touched. The size-dependent check lives in
/// [`validate_target_size`] because the size is only known after discovery.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_workload(&config.workload)?;
    validate_target(&config.target, &config.workload)?;
    Ok(())
}

/// Validate workload configuration
pub fn validate_workload(workload: &BenchmarkConfig) -> Result<(), ConfigError> {
    if workload.thread_count == 0 {
        return Err(ConfigError::Zero { field: "thread count" });
    }
    if workload.requests_per_thread == 0 {
        return Err(ConfigError::Zero { field: "requests per thread" });
    }
    if workload.io_size == 0 {
        return Err(ConfigError::Zero { field: "I/O size" });
    }
    if !(0.0..=1.0).contains(&workload.read_ratio) {
        return Err(ConfigError::ReadRatio(workload.read_ratio));
    }
    Ok(())
}

/// Validate target configuration
pub fn validate_target(target: &TargetConfig, workload: &BenchmarkConfig) -> Result<(), ConfigError> {
    match target {
        TargetConfig::Files { paths, direct } => {
            if paths.is_empty() {
                return Err(ConfigError::MissingTarget);
            }
            if paths.len() > 1 {
                warn!(
                    ignored = paths.len() - 1,
                    "only the first path is benchmarked; the others are only size-checked"
                );
            }
            if *direct && workload.io_size % 512 != 0 {
                warn!(
                    io_size = workload.io_size,
                    "I/O size is not a multiple of 512; direct I/O requests will likely fail with EINVAL"
                );
            }
        }
        TargetConfig::Ram { size } => {
            if *size == 0 {
                return Err(ConfigError::Zero { field: "RAM size" });
            }
            validate_target_size(*size, workload.io_size)?;
        }
    }
    Ok(())
}

/// Reject targets that leave no room for a request
///
/// Random offsets are drawn from `[0, size - io_size)`, so the target must be
/// strictly larger than one request.
pub fn validate_target_size(size: u64, io_size: usize) -> Result<(), ConfigError> {
    if size <= io_size as u64 {
        return Err(ConfigError::TargetTooSmall { size, io_size: io_size as u64 });
    }
    Ok(())
}
