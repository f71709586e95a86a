#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that answers every board frame with one command.
//!
//! Frames arrive one per line on stdin (or from `--input`), commands leave
//! one per line on stdout and logs go to stderr.

mod frame;

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use lasergrid_core::Command;
use lasergrid_system_decision::{DecisionLoop, EngineConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::frame::FrameError;

#[derive(Debug, Parser)]
#[command(name = "lasergrid", about = "Decides one move per laser maze board frame")]
struct Args {
    /// TOML file overriding the engine tuning.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Read frames from FILE instead of stdin.
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Log every decision.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the lasergrid command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let mut engine = DecisionLoop::new(config);

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open frames at {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut frames = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("failed to read frame")?;
        let command = answer(&mut engine, &line).unwrap_or_else(|error| {
            warn!(line = index + 1, %error, "frame answered with stop");
            Command::Stop
        });
        writeln!(out, "{command}").context("failed to write command")?;
        out.flush().context("failed to flush command")?;
        frames += 1;
    }

    info!(frames, "input exhausted");
    Ok(())
}

fn answer(engine: &mut DecisionLoop, line: &str) -> Result<Command, FrameError> {
    let snapshot = frame::parse(line)?;
    Ok(engine.tick(&snapshot)?.command)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}
