use nom::{
    character::complete::{i32, i64, line_ending, multispace0, space0, space1},
    combinator::eof,
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use nom_locate::LocatedSpan;
use tracing::debug;

use crate::error::BasinError;
use crate::grid::{constants::*, Grid};

type Span<'a> = LocatedSpan<&'a str>;

/// Parses the text form of an elevation map: a line holding the size `S`,
/// then `S` rows of `S` whitespace separated integers.
#[tracing::instrument(skip(input), fields(bytes = input.len()))]
pub fn parse_grid(input: &str) -> Result<Grid, BasinError> {
    if input.trim().is_empty() {
        return Err(BasinError::EmptyInput);
    }

    let (size, rows) = match document(Span::new(input)) {
        Ok((_, parsed)) => parsed,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(syntax_error(input, e.input.location_offset()));
        }
        Err(nom::Err::Incomplete(_)) => return Err(syntax_error(input, input.len())),
    };

    if !(MIN_SIZE as i64..=MAX_SIZE as i64).contains(&size) {
        return Err(BasinError::InvalidSize { size });
    }
    let size = size as usize;

    if rows.len() != size {
        return Err(BasinError::RowCount {
            expected: size,
            found: rows.len(),
        });
    }
    if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
        return Err(BasinError::ColumnCount {
            row: row + 1,
            expected: size,
            found: values.len(),
        });
    }

    debug!("Parsed {}x{} elevation grid", size, size);
    Grid::new(size, rows.into_iter().flatten().collect())
}

fn syntax_error(input: &str, offset: usize) -> BasinError {
    let token = input[offset..]
        .split_whitespace()
        .next()
        .map_or(1, |t| t.len().max(1));
    BasinError::Syntax {
        src: input.to_string(),
        span: (offset, token).into(),
    }
}

fn document(input: Span) -> IResult<Span, (i64, Vec<Vec<i32>>)> {
    terminated(pair(header, rows), pair(multispace0, eof))(input)
}

fn header(input: Span) -> IResult<Span, i64> {
    preceded(multispace0, terminated(i64, space0))(input)
}

fn row(input: Span) -> IResult<Span, Vec<i32>> {
    delimited(space0, separated_list1(space1, i32), space0)(input)
}

fn rows(input: Span) -> IResult<Span, Vec<Vec<i32>>> {
    many0(preceded(line_ending, row))(input)
}
