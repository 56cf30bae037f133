use std::path::PathBuf;

use basins::{parse_grid, run, ResolveOptions, TieBreak};
use clap::{Parser, ValueEnum};
use miette::{Context, IntoDiagnostic};
use tracing::debug;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Ties {
    /// Take the first lowest neighbor in up, down, left, right order
    First,
    /// Fail on the first cell with tied lowest neighbors
    Reject,
}

impl From<Ties> for TieBreak {
    fn from(value: Ties) -> Self {
        match value {
            Ties::First => TieBreak::FirstInScanOrder,
            Ties::Reject => TieBreak::Reject,
        }
    }
}

/// Partition an elevation map into drainage basins and print their sizes
#[derive(Parser, Debug)]
#[command(name = "basins", version, about)]
struct Cli {
    /// Elevation map: a size line followed by that many rows of integers
    input: PathBuf,

    /// Print the per-basin size listing
    #[arg(long)]
    summary: bool,

    /// Print every cell labeled with its basin rank
    #[arg(long)]
    labels: bool,

    /// What to do with cells whose lowest neighbors tie
    #[arg(long, value_enum, default_value_t = Ties::First)]
    ties: Ties,

    /// Resolve flow on a single thread
    #[arg(long)]
    sequential: bool,
}

#[tracing::instrument]
fn main() -> miette::Result<()> {
    init();
    let cli = Cli::parse();

    debug!("Using input {}", cli.input.display());
    let file = std::fs::read_to_string(&cli.input)
        .into_diagnostic()
        .with_context(|| format!("read {}", cli.input.display()))?;

    let grid = parse_grid(&file).context("parse elevation grid")?;
    let options = ResolveOptions {
        tie_break: cli.ties.into(),
        parallel: !cli.sequential,
    };
    let analysis = run(&grid, &options).context("partition basins")?;

    println!("{}", analysis.report);
    if cli.summary {
        println!("{}", analysis.report.summary());
    }
    if cli.labels {
        print!("{}", analysis.labels());
    }
    Ok(())
}

fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("basins=info")),
        )
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .try_init();
}
