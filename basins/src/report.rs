use std::fmt;

use itertools::Itertools;

use crate::basin::{Basin, SinkMap};
use crate::grid::Position;

/// Basins ordered by size, largest first.
///
/// Equal sizes keep basin id order (row-major order of their sinks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasinReport {
    basins: Vec<Basin>,
}

impl BasinReport {
    pub fn new(mut basins: Vec<Basin>) -> Self {
        basins.sort_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id)));
        Self { basins }
    }

    pub fn basins(&self) -> &[Basin] {
        &self.basins
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.basins.iter().map(|b| b.size).collect()
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }

    pub fn total_cells(&self) -> usize {
        self.basins.iter().map(|b| b.size).sum()
    }

    /// One `Basin <rank> size: <size>` line per basin
    pub fn summary(&self) -> String {
        self.basins
            .iter()
            .enumerate()
            .map(|(rank, basin)| format!("Basin {} size: {}", rank + 1, basin.size))
            .join("\n")
    }

    /// Labels every cell with the 1-based rank of its basin in this report.
    /// Cells `sinks` has not resolved are labeled 0.
    pub fn labels(&self, sinks: &SinkMap) -> LabelGrid {
        let mut rank_of = vec![0u32; sinks.basin_count()];
        for (rank, basin) in self.basins.iter().enumerate() {
            if let Some(slot) = rank_of.get_mut(basin.id) {
                *slot = rank as u32 + 1;
            }
        }

        let ranks = sinks
            .basin_ids()
            .map(|id| id.map_or(0, |id| rank_of[id]))
            .collect();

        LabelGrid {
            size: sinks.size(),
            ranks,
        }
    }
}

impl fmt::Display for BasinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.basins.iter().map(|b| b.size).join(" "))
    }
}

/// Basin rank of every cell, for looking at the partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrid {
    size: usize,
    ranks: Vec<u32>,
}

impl LabelGrid {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Position) -> Option<u32> {
        if pos.x >= self.size || pos.y >= self.size {
            return None;
        }
        self.ranks.get(pos.y * self.size + pos.x).copied()
    }
}

impl fmt::Display for LabelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.ranks.chunks(self.size) {
            writeln!(f, "{}", row.iter().join(" "))?;
        }
        Ok(())
    }
}
