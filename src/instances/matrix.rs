//! # Character Matrices
//!
//! The binary input matrix (rows are cells or taxa, columns are mutations or
//! characters) and the ternary matrices produced by the sampler.

use std::fmt;

use thiserror::Error;

/// Errors when constructing a matrix
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum MatrixError {
    /// The matrix has no rows or no columns
    #[error("matrix dimensions must be positive, got {rows}x{cols}")]
    Dimension { rows: usize, cols: usize },
    /// A row has a different length than the first one
    #[error("row {row} has {found} entries, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// An entry is neither 0 nor 1
    #[error("entry ({row}, {col}) is {value}, expected 0 or 1")]
    Entry { row: usize, col: usize, value: u8 },
}

/// A binary presence/absence matrix. Immutable after construction.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<bool>,
}

impl Matrix {
    /// Creates a matrix from its rows
    ///
    /// # Errors
    ///
    /// If there are no rows or columns, rows differ in length or an entry is
    /// not binary.
    pub fn from_rows<R>(rows: R) -> Result<Self, MatrixError>
    where
        R: IntoIterator<Item = Vec<u8>>,
    {
        let mut data = Vec::new();
        let mut n_rows = 0;
        let mut n_cols = None;
        for (row, entries) in rows.into_iter().enumerate() {
            let expected = *n_cols.get_or_insert(entries.len());
            if entries.len() != expected {
                return Err(MatrixError::RowLength {
                    row,
                    expected,
                    found: entries.len(),
                });
            }
            for (col, &val) in entries.iter().enumerate() {
                data.push(match val {
                    0 => false,
                    1 => true,
                    value => return Err(MatrixError::Entry { row, col, value }),
                });
            }
            n_rows += 1;
        }
        let n_cols = n_cols.unwrap_or(0);
        if n_rows == 0 || n_cols == 0 {
            return Err(MatrixError::Dimension {
                rows: n_rows,
                cols: n_cols,
            });
        }
        Ok(Matrix {
            n_rows,
            n_cols,
            data,
        })
    }

    /// The number of rows (cells)
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// The number of columns (mutations)
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Whether the entry at row `p` and column `c` is 1
    ///
    /// # Panics
    ///
    /// If the index is out of range.
    #[inline]
    #[must_use]
    pub fn is_one(&self, p: usize, c: usize) -> bool {
        assert!(p < self.n_rows && c < self.n_cols, "index out of range");
        self.data[p * self.n_cols + c]
    }

    /// The entry at row `p` and column `c` as a number
    #[inline]
    #[must_use]
    pub fn entry(&self, p: usize, c: usize) -> u8 {
        u8::from(self.is_one(p, c))
    }

    /// The number of 1 entries
    #[must_use]
    pub fn n_ones(&self) -> usize {
        self.data.iter().filter(|&&b| b).count()
    }

    /// The number of 0 entries
    #[must_use]
    pub fn n_zeros(&self) -> usize {
        self.data.len() - self.n_ones()
    }

    /// Iterates over the rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.data.chunks(self.n_cols)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} #taxa", self.n_rows)?;
        writeln!(f, "{} #characters", self.n_cols)?;
        for row in self.rows() {
            let mut first = true;
            for &b in row {
                if !first {
                    write!(f, " ")?;
                }
                first = false;
                write!(f, "{}", u8::from(b))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.rows()
                    .map(|r| r.iter().map(|&b| u8::from(b)).collect::<Vec<_>>()),
            )
            .finish()
    }
}

/// State of a character in a cell of a corrected matrix
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CharState {
    /// Never gained
    #[default]
    Absent = 0,
    /// Gained and present
    Present = 1,
    /// Gained and later lost
    Lost = 2,
}

impl CharState {
    /// All states in increasing order
    pub const ALL: [CharState; 3] = [CharState::Absent, CharState::Present, CharState::Lost];

    /// The state as its digit
    #[inline]
    #[must_use]
    pub fn digit(self) -> u8 {
        self as u8
    }

    /// The state for a digit, if it is one of 0, 1 or 2
    #[must_use]
    pub fn from_digit(digit: u8) -> Option<CharState> {
        match digit {
            0 => Some(CharState::Absent),
            1 => Some(CharState::Present),
            2 => Some(CharState::Lost),
            _ => None,
        }
    }
}

impl fmt::Display for CharState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digit())
    }
}

/// A matrix of [`CharState`] entries
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TernaryMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<CharState>,
}

impl TernaryMatrix {
    /// Creates a matrix with all entries [`CharState::Absent`]
    #[must_use]
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        TernaryMatrix {
            n_rows,
            n_cols,
            data: vec![CharState::Absent; n_rows * n_cols],
        }
    }

    /// Creates a matrix from rows of digits
    ///
    /// # Panics
    ///
    /// If rows differ in length or a digit is larger than 2.
    #[must_use]
    pub fn from_digits(rows: &[Vec<u8>]) -> Self {
        let n_cols = rows.first().map_or(0, Vec::len);
        let data = rows
            .iter()
            .flat_map(|row| {
                assert_eq!(row.len(), n_cols, "rows must have equal length");
                row.iter()
                    .map(|&d| CharState::from_digit(d).expect("digit must be 0, 1 or 2"))
            })
            .collect();
        TernaryMatrix {
            n_rows: rows.len(),
            n_cols,
            data,
        }
    }

    /// The number of rows
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// The number of columns
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Gets an entry
    #[inline]
    #[must_use]
    pub fn get(&self, p: usize, c: usize) -> CharState {
        self.data[p * self.n_cols + c]
    }

    /// Sets an entry
    #[inline]
    pub fn set(&mut self, p: usize, c: usize, state: CharState) {
        self.data[p * self.n_cols + c] = state;
    }

    /// Gets a row as a slice
    #[must_use]
    pub fn row(&self, p: usize) -> &[CharState] {
        &self.data[p * self.n_cols..(p + 1) * self.n_cols]
    }

    /// Iterates over a column
    pub fn col(&self, c: usize) -> impl Iterator<Item = CharState> + '_ {
        (0..self.n_rows).map(move |p| self.get(p, c))
    }

    /// Iterates over the rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[CharState]> {
        self.data.chunks(self.n_cols.max(1)).take(self.n_rows)
    }

    /// The sub-matrix containing only the given rows and columns, in the
    /// given order
    #[must_use]
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Self {
        let data = rows
            .iter()
            .flat_map(|&p| cols.iter().map(move |&c| self.get(p, c)))
            .collect();
        TernaryMatrix {
            n_rows: rows.len(),
            n_cols: cols.len(),
            data,
        }
    }
}

impl fmt::Display for TernaryMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} #taxa", self.n_rows)?;
        writeln!(f, "{} #characters", self.n_cols)?;
        for row in self.rows() {
            let mut first = true;
            for s in row {
                if !first {
                    write!(f, " ")?;
                }
                first = false;
                write!(f, "{s}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TernaryMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.rows()
                    .map(|r| r.iter().map(|s| s.digit()).collect::<Vec<_>>()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CharState, Matrix, MatrixError, TernaryMatrix};

    #[test]
    fn from_rows() {
        let mat = Matrix::from_rows(vec![vec![1, 0, 0], vec![0, 1, 1]]).unwrap();
        assert_eq!(mat.n_rows(), 2);
        assert_eq!(mat.n_cols(), 3);
        assert!(mat.is_one(1, 2));
        assert_eq!(mat.entry(0, 1), 0);
        assert_eq!(mat.n_ones(), 3);
        assert_eq!(mat.n_zeros(), 3);
    }

    #[test]
    fn from_rows_errors() {
        assert_eq!(
            Matrix::from_rows(Vec::<Vec<u8>>::new()),
            Err(MatrixError::Dimension { rows: 0, cols: 0 })
        );
        assert_eq!(
            Matrix::from_rows(vec![vec![1, 0], vec![1]]),
            Err(MatrixError::RowLength {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Matrix::from_rows(vec![vec![1, 3]]),
            Err(MatrixError::Entry {
                row: 0,
                col: 1,
                value: 3
            })
        );
    }

    #[test]
    fn display() {
        let mat = Matrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap();
        assert_eq!(format!("{mat}"), "2 #taxa\n2 #characters\n1 0\n0 1\n");
        let tern = TernaryMatrix::from_digits(&[vec![2, 1], vec![0, 1]]);
        assert_eq!(format!("{tern}"), "2 #taxa\n2 #characters\n2 1\n0 1\n");
        assert_eq!(format!("{tern:?}"), "[[2, 1], [0, 1]]");
    }

    #[test]
    fn select() {
        let tern = TernaryMatrix::from_digits(&[vec![2, 1, 0], vec![0, 1, 1], vec![1, 1, 2]]);
        let sub = tern.select(&[2, 0], &[0, 2]);
        assert_eq!(sub, TernaryMatrix::from_digits(&[vec![1, 2], vec![2, 0]]));
        assert_eq!(tern.col(2).collect::<Vec<_>>(), vec![
            CharState::Absent,
            CharState::Present,
            CharState::Lost
        ]);
    }
}
