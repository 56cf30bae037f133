use tracing::debug;

use crate::error::BasinError;
use crate::flow::FlowMap;
use crate::grid::Position;

const UNRESOLVED: u32 = u32::MAX;
const IN_PROGRESS: u32 = u32::MAX - 1;

/// A sink and the number of cells draining into it, the sink included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Basin {
    pub id: usize,
    pub sink: Position,
    pub size: usize,
}

/// Basin membership of every cell.
///
/// Basin ids are assigned to sinks in row-major order when the map is seeded,
/// so two runs over the same flow map always agree on ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkMap {
    size: usize,
    basin_of: Vec<u32>,
    sinks: Vec<Position>,
}

impl SinkMap {
    /// Seeds a map where only the sinks themselves are resolved.
    pub fn new(flow: &FlowMap) -> Self {
        let mut basin_of = vec![UNRESOLVED; flow.cell_count()];
        let mut sinks = Vec::new();
        for (index, slot) in basin_of.iter_mut().enumerate() {
            if flow.next(index) == index {
                *slot = sinks.len() as u32;
                sinks.push(flow.position(index));
            }
        }
        Self {
            size: flow.size(),
            basin_of,
            sinks,
        }
    }

    /// Resolves every unresolved cell by walking its flow chain.
    ///
    /// The walk is iterative. Cells on the current chain are marked in
    /// progress until the chain reaches a resolved cell, then the chain is
    /// walked again and every cell on it gets that cell's basin, so no chain
    /// segment is walked more than twice. Already resolved cells are never
    /// rewritten.
    pub fn resolve(&mut self, flow: &FlowMap) -> Result<(), BasinError> {
        debug_assert_eq!(self.basin_of.len(), flow.cell_count());

        for start in 0..self.basin_of.len() {
            if self.basin_of[start] != UNRESOLVED {
                continue;
            }

            let mut current = start;
            let basin = loop {
                let state = self.basin_of[current];
                match state {
                    UNRESOLVED => {}
                    IN_PROGRESS => {
                        self.unwind(flow, start);
                        return Err(BasinError::FlowCycle {
                            position: flow.position(current),
                        });
                    }
                    resolved => break resolved,
                }
                self.basin_of[current] = IN_PROGRESS;
                current = flow.next(current);
            };

            let mut current = start;
            while self.basin_of[current] == IN_PROGRESS {
                self.basin_of[current] = basin;
                current = flow.next(current);
            }
        }

        Ok(())
    }

    fn unwind(&mut self, flow: &FlowMap, start: usize) {
        let mut current = start;
        while self.basin_of[current] == IN_PROGRESS {
            self.basin_of[current] = UNRESOLVED;
            current = flow.next(current);
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn basin_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn sinks(&self) -> &[Position] {
        &self.sinks
    }

    pub fn is_resolved(&self) -> bool {
        self.basin_of.iter().all(|&b| b < IN_PROGRESS)
    }

    /// Basin of `pos`, `None` when `pos` is off the grid or not yet resolved
    pub fn basin_id(&self, pos: Position) -> Option<usize> {
        if pos.x >= self.size || pos.y >= self.size {
            return None;
        }
        let basin = *self.basin_of.get(pos.y * self.size + pos.x)?;
        (basin < IN_PROGRESS).then_some(basin as usize)
    }

    pub fn sink_of(&self, pos: Position) -> Option<Position> {
        self.basin_id(pos).map(|id| self.sinks[id])
    }

    /// Basin id of every cell in row-major order, `None` where unresolved
    pub fn basin_ids(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        self.basin_of
            .iter()
            .map(|&b| (b < IN_PROGRESS).then_some(b as usize))
    }

    /// One entry per sink, in basin id order
    pub fn basin_sizes(&self) -> Vec<Basin> {
        let mut counts = vec![0usize; self.sinks.len()];
        for &basin in self.basin_of.iter().filter(|&&b| b < IN_PROGRESS) {
            counts[basin as usize] += 1;
        }
        self.sinks
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(id, (&sink, size))| Basin { id, sink, size })
            .collect()
    }
}

/// Groups every cell of `flow` by the sink its chain ends in.
#[tracing::instrument(skip(flow), fields(size = flow.size()))]
pub fn aggregate(flow: &FlowMap) -> Result<SinkMap, BasinError> {
    let mut sinks = SinkMap::new(flow);
    debug!("Found {} sinks", sinks.basin_count());
    sinks.resolve(flow)?;
    Ok(sinks)
}
