//! Program text loader.
//!
//! Intcode programs are usually shipped as one line of integers separated by
//! a delimiter.
//!
//! # Examples
//!
//! ```
//! # use intcode_base::parser::{parse_program, ParseError, ParseErrorKind};
//! assert_eq!(parse_program("1,0,0,3,99\n", ','), Ok(vec![1, 0, 0, 3, 99]));
//! assert_eq!(parse_program("104, -7 ,99,", ','), Ok(vec![104, -7, 99]));
//!
//! assert_eq!(
//!     parse_program("1,,99", ','),
//!     Err(ParseError { kind: ParseErrorKind::EmptyCell, index: 1, offset: 2 }),
//! );
//! ```

use alloc::{string::{String, ToString}, vec::Vec};
use thiserror::Error;

/// Parses `text` into program cells.
///
/// Whitespace around cells, a trailing delimiter and a trailing newline are
/// accepted. With a whitespace delimiter any run of whitespace separates
/// cells. Blank text is an empty program.
pub fn parse_program(text: &str, delimiter: char) -> Result<Vec<i64>, ParseError> {
    let body = text.trim_end();
    let body = body.strip_suffix(delimiter).unwrap_or(body);

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let cells: Vec<&str> = if delimiter.is_whitespace() {
        body.split_whitespace().collect()
    } else {
        body.split(delimiter).collect()
    };

    cells
        .into_iter()
        .enumerate()
        .map(|(index, cell)| {
            let token = cell.trim();
            let offset = token.as_ptr() as usize - text.as_ptr() as usize;
            let err = |kind| ParseError {
                kind,
                index,
                offset,
            };

            if token.is_empty() {
                return Err(err(ParseErrorKind::EmptyCell));
            }
            token
                .parse::<i64>()
                .map_err(|_| err(ParseErrorKind::InvalidNumber(token.to_string())))
        })
        .collect()
}

/// Represents error that may occur while loading program text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind} in cell {index} @ {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Cell number, from 0.
    pub index: usize,
    /// Byte offset of the cell in the text.
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Nothing between two delimiters
    #[error("empty cell")]
    EmptyCell,
    /// Not a 64-bit integer
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
}
