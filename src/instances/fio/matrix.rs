//! # Parsing and Writing Character Matrices
//!
//! The format consists of two header lines holding the number of rows and
//! the number of columns, each optionally followed by a comment, then one
//! line per row with entries separated by spaces or tabs.
//!
//! ```text
//! 3 #taxa
//! 2 #characters
//! 1 0
//! 0 1
//! 1 1
//! ```
//!
//! Blank lines are skipped and entries beyond the declared number of columns
//! are ignored.

use std::{
    io::{self, BufRead, BufReader, Read, Write},
    path::Path,
};

use nom::{
    character::complete::{i64, space0, space1, u64},
    error::{ErrorKind, ParseError},
    multi::separated_list1,
    sequence::preceded,
    IResult,
};
use thiserror::Error;

use crate::instances::{Matrix, MatrixError, TernaryMatrix};

/// Errors occuring when parsing a matrix file
#[derive(Error, Debug)]
pub enum Error {
    /// IO error reading file
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
    /// A line could not be parsed
    #[error("line {line}: {kind}")]
    Parse { line: usize, kind: LineError },
    /// The file ended before the header was complete
    #[error("missing header line")]
    MissingHeader,
    /// The parsed entries do not form a matrix
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// The file ended before all rows were read
    #[error("expected {expected} rows, found {found}")]
    MissingRows { expected: usize, found: usize },
}

/// What went wrong parsing a single line
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum LineError {
    /// A dimension is zero or negative
    #[error("dimension must be positive, got {0}")]
    Dimension(i64),
    /// Expected a non-negative integer
    #[error("expected a number, found '{0}'")]
    Number(String),
    /// Too few entries in a row
    #[error("expected {expected} entries, found {found}")]
    ShortRow { expected: usize, found: usize },
    /// An entry that is neither 0 nor 1
    #[error("entry in column {col} is {value}, expected 0 or 1")]
    Entry { col: usize, value: u64 },
    /// Base error from nom parsing
    #[error("nom error: {0} ({1:?})")]
    NomError(String, ErrorKind),
}

impl ParseError<&str> for LineError {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        Self::NomError(String::from(input), kind)
    }

    fn append(_: &str, _: ErrorKind, other: Self) -> Self {
        other
    }
}

fn unwrap_nom_error(err: nom::Err<LineError>) -> LineError {
    match err {
        nom::Err::Incomplete(_) => LineError::NomError(String::new(), ErrorKind::Complete),
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
    }
}

/// Parses a matrix from a reader (typically a (compressed) file)
///
/// # Errors
///
/// IO errors, malformed headers or rows, and files with fewer rows than
/// declared.
pub fn parse_matrix<R: Read>(reader: R) -> Result<Matrix, Error> {
    let mut reader = BufReader::new(reader);
    let mut line_no = 0;
    let mut next_line = |buf: &mut String| -> Result<Option<usize>, Error> {
        loop {
            buf.clear();
            if reader.read_line(buf)? == 0 {
                return Ok(None);
            }
            line_no += 1;
            if !buf.trim().is_empty() {
                return Ok(Some(line_no));
            }
        }
    };
    let mut buf = String::new();

    let mut dims = [0; 2];
    for dim in &mut dims {
        let Some(line) = next_line(&mut buf)? else {
            return Err(Error::MissingHeader);
        };
        let (_, val) = parse_dimension(&buf)
            .map_err(unwrap_nom_error)
            .map_err(|kind| Error::Parse { line, kind })?;
        *dim = val;
    }
    let [n_rows, n_cols] = dims;
    log::debug!(target: crate::log::targets::PARSING, "parsing {n_rows}x{n_cols} matrix");

    let mut rows = Vec::with_capacity(n_rows);
    while rows.len() < n_rows {
        let Some(line) = next_line(&mut buf)? else {
            return Err(Error::MissingRows {
                expected: n_rows,
                found: rows.len(),
            });
        };
        let row = parse_row(&buf, n_cols).map_err(|kind| Error::Parse { line, kind })?;
        rows.push(row);
    }
    Ok(Matrix::from_rows(rows)?)
}

/// Parses a matrix from a file path. `-` reads from stdin. With feature
/// `compression`, the file is decompressed according to its extension.
///
/// # Errors
///
/// See [`parse_matrix`].
pub fn parse_matrix_path<P: AsRef<Path>>(path: P) -> Result<Matrix, Error> {
    let reader = super::open_compressed_uncompressed_read(path)?;
    parse_matrix(reader)
}

/// Parses a header line with a positive dimension, ignoring everything
/// after the number
fn parse_dimension(input: &str) -> IResult<&str, usize, LineError> {
    let (rest, val) = preceded(space0, i64)(input).map_err(|_: nom::Err<LineError>| {
        nom::Err::Error(LineError::Number(first_token(input)))
    })?;
    match usize::try_from(val) {
        Ok(dim) if dim > 0 => Ok((rest, dim)),
        _ => Err(nom::Err::Failure(LineError::Dimension(val))),
    }
}

/// Parses the entries of a row, keeping the first `n_cols`
fn parse_row(input: &str, n_cols: usize) -> Result<Vec<u8>, LineError> {
    let (rest, vals) = preceded(space0, separated_list1(space1, u64))(input)
        .map_err(|_: nom::Err<LineError>| LineError::Number(first_token(input)))?;
    let rest = rest.trim();
    if !rest.is_empty() {
        return Err(LineError::Number(first_token(rest)));
    }
    if vals.len() < n_cols {
        return Err(LineError::ShortRow {
            expected: n_cols,
            found: vals.len(),
        });
    }
    vals.into_iter()
        .take(n_cols)
        .enumerate()
        .map(|(col, value)| match value {
            0 => Ok(0),
            1 => Ok(1),
            value => Err(LineError::Entry { col, value }),
        })
        .collect()
}

fn first_token(input: &str) -> String {
    input
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Writes a ternary matrix in the same format
///
/// # Errors
///
/// If writing fails.
pub fn write_matrix<W: Write>(writer: &mut W, matrix: &TernaryMatrix) -> Result<(), io::Error> {
    write!(writer, "{matrix}")?;
    writer.flush()
}

/// Writes a ternary matrix to a file path. With feature `compression`, the
/// file is compressed according to its extension.
///
/// # Errors
///
/// If the file cannot be created or written.
pub fn write_matrix_path<P: AsRef<Path>>(path: P, matrix: &TernaryMatrix) -> Result<(), io::Error> {
    let mut writer = super::open_compressed_uncompressed_write(path)?;
    write_matrix(&mut writer, matrix)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{parse_dimension, parse_matrix, parse_row, write_matrix, Error, LineError};
    use crate::instances::{Matrix, TernaryMatrix};

    #[test]
    fn parse_dimension_pass() {
        assert_eq!(parse_dimension("3 #taxa\n"), Ok((" #taxa\n", 3)));
        assert_eq!(parse_dimension("  12\n"), Ok(("\n", 12)));
    }

    #[test]
    fn parse_dimension_fail() {
        assert_eq!(
            parse_dimension("-1 #taxa"),
            Err(nom::Err::Failure(LineError::Dimension(-1)))
        );
        assert_eq!(
            parse_dimension("0"),
            Err(nom::Err::Failure(LineError::Dimension(0)))
        );
        assert_eq!(
            parse_dimension("taxa 3"),
            Err(nom::Err::Error(LineError::Number(String::from("taxa"))))
        );
    }

    #[test]
    fn parse_row_pass() {
        assert_eq!(parse_row("1 0\t1\n", 3), Ok(vec![1, 0, 1]));
        assert_eq!(parse_row("1 0 1 1\n", 2), Ok(vec![1, 0]));
    }

    #[test]
    fn parse_row_fail() {
        assert_eq!(
            parse_row("1 0\n", 3),
            Err(LineError::ShortRow {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            parse_row("1 2 0\n", 3),
            Err(LineError::Entry { col: 1, value: 2 })
        );
        assert_eq!(
            parse_row("1 x 0\n", 3),
            Err(LineError::Number(String::from("x")))
        );
    }

    #[test]
    fn parse_full() {
        let data = "3 #taxa\n2 #characters\n1 0\n\n0 1\n1 1\n";
        let mat = parse_matrix(Cursor::new(data)).unwrap();
        assert_eq!(
            mat,
            Matrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap()
        );
    }

    #[test]
    fn parse_errors_carry_line() {
        let data = "2 #taxa\n2 #characters\n1 0\n1\n";
        match parse_matrix(Cursor::new(data)) {
            Err(Error::Parse { line, kind }) => {
                assert_eq!(line, 4);
                assert_eq!(
                    kind,
                    LineError::ShortRow {
                        expected: 2,
                        found: 1
                    }
                );
            }
            other => panic!("unexpected result {other:?}"),
        }
        match parse_matrix(Cursor::new("3\n2\n1 0\n")) {
            Err(Error::MissingRows { expected, found }) => {
                assert_eq!((expected, found), (3, 1));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn write_then_parse() {
        let tern = TernaryMatrix::from_digits(&[vec![1, 0], vec![0, 1]]);
        let mut out = Vec::new();
        write_matrix(&mut out, &tern).unwrap();
        let mat = parse_matrix(Cursor::new(out)).unwrap();
        assert_eq!(mat, Matrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap());
    }
}
