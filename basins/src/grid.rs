use std::fmt;
use std::ops::Index;

use crate::error::BasinError;

pub mod constants {
    pub const MIN_SIZE: usize = 1;
    pub const MAX_SIZE: usize = 5000;
}

use constants::*;

/// Fixed neighbor scan order: up, down, left, right.
const DELTAS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Cell coordinate, `x` is the column and `y` the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Square elevation map stored row-major. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<i32>,
}

impl Grid {
    /// Builds a grid from `size * size` row-major elevations.
    pub fn new(size: usize, cells: Vec<i32>) -> Result<Self, BasinError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BasinError::InvalidSize { size: size as i64 });
        }
        if cells.len() != size * size {
            return Err(BasinError::CellCount {
                size,
                expected: size * size,
                found: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, BasinError> {
        let size = rows.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(BasinError::ColumnCount {
                row: row + 1,
                expected: size,
                found: values.len(),
            });
        }
        Self::new(size, rows.into_iter().flatten().collect())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, pos: Position) -> Option<i32> {
        if pos.x >= self.size || pos.y >= self.size {
            return None;
        }
        self.cells.get(self.index_of(pos)).copied()
    }

    pub fn index_of(&self, pos: Position) -> usize {
        pos.y * self.size + pos.x
    }

    pub fn position(&self, index: usize) -> Position {
        Position::new(index % self.size, index / self.size)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.cells.chunks(self.size)
    }

    /// In-bounds 4-connected neighbors of `pos` in up, down, left, right order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        DELTAS.iter().filter_map(move |&(dx, dy)| {
            let nx = pos.x.checked_add_signed(dx)?;
            let ny = pos.y.checked_add_signed(dy)?;
            (nx < self.size && ny < self.size).then_some(Position::new(nx, ny))
        })
    }
}

impl Index<Position> for Grid {
    type Output = i32;

    fn index(&self, pos: Position) -> &Self::Output {
        &self.cells[self.index_of(pos)]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.size)?;
        for row in self.rows() {
            let mut values = row.iter();
            if let Some(first) = values.next() {
                write!(f, "{}", first)?;
            }
            for value in values {
                write!(f, " {}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
