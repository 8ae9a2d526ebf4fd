//! prepare-report: flatten compiler combined-JSON output for bytecode diffing.
//!
//! Compiles every `.sol` file in the working directory with the given
//! compiler binary and writes `report.txt` next to the sources.

use anyhow::{Context, Result};
use bytecode_report::report::{ReportConfig, ReportGenerator};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(
    name = "prepare-report",
    about = "Compile every .sol file in the working directory and write a flattened bin/metadata report"
)]
struct Cli {
    /// Path to the compiler executable
    compiler: PathBuf,
}

/// Logs go to stderr so they never mix with anything scraping stdout.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bytecode_report=info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let source_dir = std::env::current_dir().context("failed to resolve working directory")?;
    let generator = ReportGenerator::new(ReportConfig {
        compiler: cli.compiler,
        source_dir,
    });
    generator.run()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
