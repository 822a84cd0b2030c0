//! # morphmesh
//!
//! Batch conversion of SWC neuron reconstructions into capped tube meshes.
//!
//! ```text
//! morphmesh cells/*.swc --output-dir meshes --format both --color radius-heat
//! ```
//!
//! Logging follows `RUST_LOG` (default `info`). The exit status is non-zero
//! when any input failed; the other inputs are still written.

mod args;
mod batch;

use anyhow::{bail, Result};
use args::{Cli, Settings};
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::resolve(&cli)?;

    let summary = batch::run(&cli.inputs, &settings);
    info!(
        "{} of {} inputs meshed",
        summary.succeeded,
        cli.inputs.len()
    );
    if summary.failed > 0 {
        bail!("{} of {} inputs failed", summary.failed, cli.inputs.len());
    }
    Ok(())
}
