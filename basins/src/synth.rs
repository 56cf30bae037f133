//! Synthetic elevation maps with known drainage.

use crate::error::BasinError;
use crate::grid::{constants::*, Grid};

/// Elevation rises by one per column and by `size` per row, so every cell
/// drains up and then left into (0, 0). Chains run up to 2(S - 1) cells.
pub fn staircase(size: usize) -> Result<Grid, BasinError> {
    check_size(size)?;
    Grid::new(size, (0..size * size).map(|i| i as i32).collect())
}

/// Even rows form a serpentine corridor joined at alternating ends, odd rows
/// are walls. The corridor is one flow chain covering about half the grid.
pub fn snake(size: usize) -> Result<Grid, BasinError> {
    check_size(size)?;
    let mut path = Vec::new();
    for y in (0..size).step_by(2) {
        let forward = (y / 2) % 2 == 0;
        let row = y * size;
        if forward {
            path.extend((0..size).map(|x| row + x));
        } else {
            path.extend((0..size).rev().map(|x| row + x));
        }
        if y + 2 < size {
            let gap = if forward { size - 1 } else { 0 };
            path.push((y + 1) * size + gap);
        }
    }

    let wall = path.len() as i32 + 1;
    let mut cells = vec![wall; size * size];
    for (step, &index) in path.iter().enumerate() {
        cells[index] = (path.len() - step) as i32;
    }
    Grid::new(size, cells)
}

/// Distinct elevations `i * m mod S²`, where `m` is the first multiplier
/// from `step` upwards that is coprime to S².
pub fn scattered(size: usize, step: usize) -> Result<Grid, BasinError> {
    check_size(size)?;
    let n = size * size;
    let multiplier = (step.max(1)..).find(|&m| gcd(m, n) == 1).unwrap_or(1);
    Grid::new(size, (0..n).map(|i| ((i * multiplier) % n) as i32).collect())
}

/// Column distance from the center outweighs any row distance, so the
/// center is the only sink and every other cell has a unique lowest neighbor.
pub fn bowl(size: usize) -> Result<Grid, BasinError> {
    check_size(size)?;
    let center = (size / 2) as i64;
    let weight = size as i64;
    let cells = (0..size * size)
        .map(|i| {
            let dx = (i % size) as i64 - center;
            let dy = (i / size) as i64 - center;
            (dx.abs() * weight + dy.abs()) as i32
        })
        .collect();
    Grid::new(size, cells)
}

fn check_size(size: usize) -> Result<(), BasinError> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(BasinError::InvalidSize { size: size as i64 });
    }
    Ok(())
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
