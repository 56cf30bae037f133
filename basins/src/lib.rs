//! Partitions a square elevation map into drainage basins.
//!
//! Water on a cell flows to its lowest 4-connected neighbor when that
//! neighbor is strictly lower, and collects in a sink otherwise. Every cell
//! whose flow chain ends in the same sink belongs to that sink's basin.
//!
//! The pipeline runs in three stages, each owning its output:
//! [`flow::resolve_flow`] → [`basin::aggregate`] → [`report::BasinReport`].

use std::time::Instant;

use miette::Context;
use tracing::{debug, info};

pub mod basin;
pub mod error;
pub mod flow;
pub mod grid;
pub mod parser;
pub mod report;
pub mod synth;

pub use basin::{aggregate, Basin, SinkMap};
pub use error::BasinError;
pub use flow::{resolve_flow, FlowMap, FlowTarget, ResolveOptions, TieBreak};
pub use grid::{Grid, Position};
pub use parser::parse_grid;
pub use report::{BasinReport, LabelGrid};

/// Output of every pipeline stage
#[derive(Debug, Clone)]
pub struct Analysis {
    pub flow: FlowMap,
    pub sinks: SinkMap,
    pub report: BasinReport,
}

impl Analysis {
    pub fn labels(&self) -> LabelGrid {
        self.report.labels(&self.sinks)
    }
}

/// Resolves flow, groups cells into basins and ranks the basins by size.
#[tracing::instrument(skip(grid), fields(size = grid.size()))]
pub fn run(grid: &Grid, options: &ResolveOptions) -> Result<Analysis, BasinError> {
    let start = Instant::now();

    let flow = resolve_flow(grid, options)?;
    let sinks = aggregate(&flow)?;
    let report = BasinReport::new(sinks.basin_sizes());

    debug!(
        "{} basins covering {} cells",
        report.len(),
        report.total_cells()
    );
    info!("Ran in {:.3?}", start.elapsed());

    Ok(Analysis {
        flow,
        sinks,
        report,
    })
}

/// Parses an elevation map and returns its basin sizes, largest first,
/// separated by spaces.
///
/// # Errors
/// * If the input is not a well formed square grid
/// * If a flow chain never reaches a sink
#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> miette::Result<String> {
    let grid = parse_grid(input).context("Failed to parse elevation grid")?;
    let analysis = run(&grid, &ResolveOptions::default()).context("Failed to partition basins")?;
    Ok(analysis.report.to_string())
}
