//! # Dollo Completion Sampler
//!
//! Samples completions of a noisy binary matrix that admit a 1-Dollo phylogeny.

use clap::Parser;
use lumberjack_tools::{run, Args};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let samples = run(&args)?;
    log::info!("wrote {} samples", samples.len());
    Ok(())
}
