use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use basins::{synth, BasinError, Grid};
use clap::{Parser, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    /// Rises by one per column and by S per row; one basin, chains of 2(S - 1)
    Staircase,
    /// Serpentine corridor between walls; one basin, one chain of about S²/2
    Snake,
    /// Seeded shuffle of 0..S², all elevations distinct
    Random,
    /// Single minimum in the center
    Bowl,
}

/// Generate synthetic elevation maps for the basins solver
#[derive(Parser, Debug)]
#[command(name = "grid-input", version, about)]
struct Args {
    /// Side length S of the map
    size: usize,

    #[arg(long, value_enum, default_value_t = Kind::Random)]
    kind: Kind,

    /// Seed for the random kind
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
    let args = Args::parse();

    let grid = generate(args.kind, args.size, args.seed).context("generate grid")?;
    info!("Generated {:?} map of size {}", args.kind, args.size);

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .into_diagnostic()
                .with_context(|| format!("create {}", path.display()))?;
            write_grid(BufWriter::new(file), &grid)
        }
        None => write_grid(BufWriter::new(io::stdout().lock()), &grid),
    }
    .into_diagnostic()
    .context("write grid")
}

fn generate(kind: Kind, size: usize, seed: u64) -> Result<Grid, BasinError> {
    match kind {
        Kind::Staircase => synth::staircase(size),
        Kind::Snake => synth::snake(size),
        Kind::Random => random(size, seed),
        Kind::Bowl => synth::bowl(size),
    }
}

fn random(size: usize, seed: u64) -> Result<Grid, BasinError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut cells = (0..(size * size) as i32).collect::<Vec<_>>();
    cells.shuffle(&mut rng);
    Grid::new(size, cells)
}

fn write_grid(mut out: impl Write, grid: &Grid) -> io::Result<()> {
    write!(out, "{}", grid)?;
    out.flush()
}
