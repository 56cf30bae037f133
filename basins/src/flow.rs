use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::BasinError;
use crate::grid::{Grid, Position};

/// Where water leaving a cell goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowTarget {
    Sink,
    FlowsTo(Position),
}

/// How to treat a cell whose lowest neighbors tie
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Take the first tied neighbor in up, down, left, right order.
    #[default]
    FirstInScanOrder,
    /// Fail with [`BasinError::AmbiguousFlow`] at the first tied cell.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub tie_break: TieBreak,
    pub parallel: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::default(),
            parallel: true,
        }
    }
}

/// One flow target per cell, stored as the row-major index of the target.
/// A sink points at itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMap {
    size: usize,
    targets: Vec<u32>,
}

impl FlowMap {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.targets.len()
    }

    /// Flow target of `pos`, `None` when `pos` is off the grid
    pub fn target(&self, pos: Position) -> Option<FlowTarget> {
        if pos.x >= self.size || pos.y >= self.size {
            return None;
        }
        let index = pos.y * self.size + pos.x;
        let target = *self.targets.get(index)? as usize;
        if target == index {
            Some(FlowTarget::Sink)
        } else {
            Some(FlowTarget::FlowsTo(self.position(target)))
        }
    }

    /// Sinks in row-major order
    pub fn sinks(&self) -> impl Iterator<Item = Position> + '_ {
        self.targets
            .iter()
            .enumerate()
            .filter(|&(index, &target)| index == target as usize)
            .map(|(index, _)| self.position(index))
    }

    pub fn sink_count(&self) -> usize {
        self.sinks().count()
    }

    pub(crate) fn next(&self, index: usize) -> usize {
        self.targets[index] as usize
    }

    pub(crate) fn position(&self, index: usize) -> Position {
        Position::new(index % self.size, index / self.size)
    }

    #[cfg(test)]
    pub(crate) fn from_raw(size: usize, targets: Vec<u32>) -> Self {
        assert_eq!(size * size, targets.len());
        Self { size, targets }
    }
}

#[derive(Debug, Default)]
struct RowSummary {
    ambiguous: usize,
    first_ambiguous: Option<Position>,
}

/// Computes the flow target of every cell.
///
/// A cell is a sink when no 4-connected neighbor is strictly lower. Otherwise
/// it drains into its lowest neighbor; ties are settled by `options.tie_break`.
/// Rows are independent, so with `options.parallel` they are resolved on the
/// rayon pool, each worker writing only its own row of the output.
#[tracing::instrument(skip(grid), fields(size = grid.size()))]
pub fn resolve_flow(grid: &Grid, options: &ResolveOptions) -> Result<FlowMap, BasinError> {
    let size = grid.size();
    let mut targets = vec![0u32; grid.cell_count()];

    let resolve_row = |(y, row): (usize, &mut [u32])| {
        let mut summary = RowSummary::default();
        for (x, slot) in row.iter_mut().enumerate() {
            let pos = Position::new(x, y);
            let (target, tied) = resolve_cell(grid, pos);
            if tied {
                summary.ambiguous += 1;
                summary.first_ambiguous.get_or_insert(pos);
            }
            *slot = grid.index_of(target) as u32;
        }
        summary
    };

    let summaries: Vec<RowSummary> = if options.parallel {
        targets.par_chunks_mut(size).enumerate().map(resolve_row).collect()
    } else {
        targets.chunks_mut(size).enumerate().map(resolve_row).collect()
    };

    let ambiguous: usize = summaries.iter().map(|s| s.ambiguous).sum();
    if ambiguous > 0 {
        match options.tie_break {
            TieBreak::Reject => {
                if let Some(position) = summaries.iter().find_map(|s| s.first_ambiguous) {
                    return Err(BasinError::AmbiguousFlow { position });
                }
            }
            TieBreak::FirstInScanOrder => {
                warn!(
                    "{} cells have tied lowest neighbors, using first in scan order",
                    ambiguous
                );
            }
        }
    }

    let flow = FlowMap { size, targets };
    debug!("Resolved flow for {} cells", flow.cell_count());
    Ok(flow)
}

/// Returns the cell `pos` drains into (itself for a sink) and whether the
/// choice was a tie.
fn resolve_cell(grid: &Grid, pos: Position) -> (Position, bool) {
    let elevation = grid[pos];
    let mut lowest: Option<(Position, i32)> = None;
    let mut tied = false;

    for neighbor in grid.neighbors(pos) {
        let value = grid[neighbor];
        match lowest {
            Some((_, low)) if value > low => {}
            Some((_, low)) if value == low => tied = true,
            _ => {
                lowest = Some((neighbor, value));
                tied = false;
            }
        }
    }

    match lowest {
        Some((neighbor, low)) if low < elevation => (neighbor, tied),
        _ => (pos, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn grid(rows: &[&[i32]]) -> Grid {
        Grid::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_single_cell_is_sink() -> miette::Result<()> {
        let flow = resolve_flow(&grid(&[&[1]]), &ResolveOptions::default())?;
        assert_eq!(Some(FlowTarget::Sink), flow.target(Position::new(0, 0)));
        assert_eq!(1, flow.sink_count());
        Ok(())
    }

    #[test]
    fn test_corners_of_flat_rim_are_sinks() -> miette::Result<()> {
        let flow = resolve_flow(
            &grid(&[&[9, 9, 9], &[9, 1, 9], &[9, 9, 9]]),
            &ResolveOptions::default(),
        )?;
        let center = Position::new(1, 1);
        // A corner only touches two equal rim cells, never the center.
        assert_eq!(
            vec![
                Position::new(0, 0),
                Position::new(2, 0),
                center,
                Position::new(0, 2),
                Position::new(2, 2)
            ],
            flow.sinks().collect::<Vec<_>>()
        );
        for edge in [(1, 0), (0, 1), (2, 1), (1, 2)] {
            assert_eq!(
                Some(FlowTarget::FlowsTo(center)),
                flow.target(Position::new(edge.0, edge.1))
            );
        }
        Ok(())
    }

    #[rstest]
    #[case(Position::new(3, 0))]
    #[case(Position::new(0, 3))]
    #[case(Position::new(7, 7))]
    fn test_target_off_grid(#[case] pos: Position) -> miette::Result<()> {
        let flow = resolve_flow(
            &grid(&[&[5, 4, 5], &[5, 5, 5], &[1, 5, 9]]),
            &ResolveOptions::default(),
        )?;
        assert_eq!(None, flow.target(pos));
        Ok(())
    }

    #[test]
    fn test_diagonals_are_ignored() -> miette::Result<()> {
        // (0, 0) has a lower diagonal neighbor but no lower 4-neighbor.
        let flow = resolve_flow(&grid(&[&[2, 3], &[3, 1]]), &ResolveOptions::default())?;
        assert_eq!(Some(FlowTarget::Sink), flow.target(Position::new(0, 0)));
        assert_eq!(Some(FlowTarget::Sink), flow.target(Position::new(1, 1)));
        assert_eq!(
            Some(FlowTarget::FlowsTo(Position::new(1, 1))),
            flow.target(Position::new(1, 0))
        );
        Ok(())
    }

    #[test]
    fn test_flows_to_lowest_neighbor() -> miette::Result<()> {
        let flow = resolve_flow(
            &grid(&[&[5, 4, 5], &[5, 5, 5], &[1, 5, 9]]),
            &ResolveOptions::default(),
        )?;
        // (2, 1) sits on a plateau with no strictly lower neighbor.
        assert_eq!(
            vec![Position::new(1, 0), Position::new(2, 1), Position::new(0, 2)],
            flow.sinks().collect::<Vec<_>>()
        );
        assert_eq!(
            Some(FlowTarget::FlowsTo(Position::new(1, 0))),
            flow.target(Position::new(0, 0))
        );
        assert_eq!(
            Some(FlowTarget::FlowsTo(Position::new(0, 2))),
            flow.target(Position::new(0, 1))
        );
        assert_eq!(
            Some(FlowTarget::FlowsTo(Position::new(2, 1))),
            flow.target(Position::new(2, 2))
        );
        Ok(())
    }

    #[rstest]
    #[case(Position::new(1, 1), Position::new(1, 0))]
    #[case(Position::new(2, 2), Position::new(2, 1))]
    fn test_tie_takes_first_in_scan_order(
        #[case] cell: Position,
        #[case] expected: Position,
    ) -> miette::Result<()> {
        let flow = resolve_flow(
            &grid(&[&[9, 1, 9], &[1, 5, 1], &[9, 1, 7]]),
            &ResolveOptions::default(),
        )?;
        assert_eq!(Some(FlowTarget::FlowsTo(expected)), flow.target(cell));
        Ok(())
    }

    #[test]
    fn test_tie_rejected() {
        let options = ResolveOptions {
            tie_break: TieBreak::Reject,
            ..Default::default()
        };
        let result = resolve_flow(&grid(&[&[9, 1, 9], &[1, 5, 1], &[9, 1, 7]]), &options);
        match result {
            Err(BasinError::AmbiguousFlow { position }) => {
                assert_eq!(Position::new(0, 0), position)
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_tie_above_cell_is_still_sink() -> miette::Result<()> {
        let options = ResolveOptions {
            tie_break: TieBreak::Reject,
            ..Default::default()
        };
        let flow = resolve_flow(&grid(&[&[3, 1, 3], &[1, 3, 1], &[3, 1, 3]]), &options);
        assert!(flow.is_err());
        let flow = resolve_flow(&grid(&[&[1, 5, 6], &[5, 4, 8], &[6, 7, 9]]), &options)?;
        assert_eq!(Some(FlowTarget::Sink), flow.target(Position::new(0, 0)));
        assert_eq!(Some(FlowTarget::Sink), flow.target(Position::new(1, 1)));
        assert_eq!(2, flow.sink_count());
        Ok(())
    }

    #[test_log::test]
    fn test_parallel_matches_sequential() -> miette::Result<()> {
        let size = 37;
        let cells = (0..size * size)
            .map(|i| ((i * 7919) % 1009) as i32)
            .collect::<Vec<_>>();
        let grid = Grid::new(size, cells)?;
        let parallel = resolve_flow(&grid, &ResolveOptions::default())?;
        let sequential = resolve_flow(
            &grid,
            &ResolveOptions {
                parallel: false,
                ..Default::default()
            },
        )?;
        assert_eq!(parallel, sequential);
        Ok(())
    }
}
