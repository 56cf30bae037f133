use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::grid::Position;

/// Everything that can stop the pipeline before a basin report exists.
#[derive(Debug, Error, Diagnostic)]
pub enum BasinError {
    #[error("Input is empty")]
    #[diagnostic(
        code(basins::empty_input),
        help("The first line must hold the grid size S")
    )]
    EmptyInput,

    #[error("Grid size {size} is out of range")]
    #[diagnostic(
        code(basins::invalid_size),
        help("S must be between 1 and 5000")
    )]
    InvalidSize { size: i64 },

    #[error("Expected {expected} rows, found {found}")]
    #[diagnostic(code(basins::row_count))]
    RowCount { expected: usize, found: usize },

    #[error("Expected {expected} cells for a {size}x{size} grid, found {found}")]
    #[diagnostic(code(basins::cell_count))]
    CellCount {
        size: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row} has {found} values, expected {expected}")]
    #[diagnostic(code(basins::column_count), help("Elevation maps are square"))]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Failed to parse elevation grid")]
    #[diagnostic(
        code(basins::syntax),
        help("Elevations must be whitespace separated integers")
    )]
    Syntax {
        #[source_code]
        src: String,
        #[label("not an integer")]
        span: SourceSpan,
    },

    #[error("Cell {position} has more than one lowest neighbor")]
    #[diagnostic(
        code(basins::ambiguous_flow),
        help("Every non-sink cell needs a unique lowest neighbor; use the first-in-scan-order tie break to accept this grid")
    )]
    AmbiguousFlow { position: Position },

    #[error("Flow chain through {position} never reaches a sink")]
    #[diagnostic(code(basins::flow_cycle))]
    FlowCycle { position: Position },
}
