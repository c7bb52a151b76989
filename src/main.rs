//! pario CLI entry point

use anyhow::{Context, Result};
use pario::config::cli::Cli;
use pario::config::toml::{parse_toml_file, FileConfig};
use pario::config::{cli_convert, validator};
use pario::harness::Harness;
use pario::output;
use pario::stats::ResultAggregator;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(&cli);

    let file = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => FileConfig::default(),
    };
    let config = cli_convert::build_config(&cli, file)?;
    validator::validate_config(&config).context("Configuration validation failed")?;

    let harness = Harness::new(config.workload.clone(), config.runtime.clone())?;
    let outcome = harness.run(&config.target)?;

    let summary = ResultAggregator::new(&config.workload).aggregate(&outcome)?;
    if summary.errors > 0 {
        tracing::warn!(errors = summary.errors, "some requests failed");
    }

    print!("{}", output::render(&config.output, &summary, &outcome)?);
    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the verbosity flags
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
