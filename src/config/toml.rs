//! TOML configuration file parsing
//!
//! Every key is optional; anything left out falls back to the CLI value or the
//! built-in default.
//!
//! ```toml
//! threads = 16
//! requests = 5000
//! read_ratio = 0.7
//! io_size = "8k"
//! pattern = "random_block"
//! direct_io = true
//! paths = ["/dev/nvme0n1"]
//! seed = 42
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub threads: Option<usize>,
    pub requests: Option<u64>,
    pub read_ratio: Option<f64>,
    /// Byte count or size string such as "4k"
    pub io_size: Option<SizeValue>,
    /// Kept as text so an unknown name surfaces as a configuration error
    pub pattern: Option<String>,
    pub direct_io: Option<bool>,
    pub ram_io: Option<bool>,
    pub ram_size: Option<SizeValue>,
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    pub seed: Option<u64>,
    pub pin_cpus: Option<bool>,
}

/// A size given either as a plain integer or as a suffixed string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Bytes(u64),
    Text(String),
}

impl SizeValue {
    pub fn to_bytes(&self) -> Result<u64> {
        match self {
            SizeValue::Bytes(n) => Ok(*n),
            SizeValue::Text(s) => super::cli_convert::parse_size(s),
        }
    }
}

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<FileConfig> {
    let config: FileConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}
