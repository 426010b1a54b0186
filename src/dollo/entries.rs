//! # Entry Variables
//!
//! Every cell `(p, c)` of the input matrix owns a loss variable and one flip
//! variable. The flip variable marks a false negative if the input entry is 0
//! and a false positive if it is 1. The corrected state of a cell is a
//! function of these two variables and the input entry:
//!
//! | input | loss | flip | state |
//! | --- | --- | --- | --- |
//! | 0 | 0 | 0 | 0 |
//! | 0 | 0 | 1 | 1 |
//! | 0 | 1 | 0 | 2 |
//! | 0 | 1 | 1 | excluded |
//! | 1 | 0 | 0 | 1 |
//! | 1 | 0 | 1 | 0 |
//! | 1 | 1 | 0 | excluded |
//! | 1 | 1 | 1 | 2 |

use crate::{
    clause,
    encodings::{clustering::CellLabels, CollectClauses},
    instances::{CharState, ManageVars, Matrix, TernaryMatrix},
    types::{Assignment, Lit},
};

use super::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    loss: Lit,
    flip: Lit,
    one: bool,
}

impl Cell {
    /// The literal that is true iff the cell is not 1, given it is not lost
    #[inline]
    fn zero_cond(self) -> Lit {
        if self.one {
            self.flip
        } else {
            !self.flip
        }
    }
}

/// The entry variables of all cells of a matrix
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryVars {
    n_rows: usize,
    n_cols: usize,
    cells: Vec<Cell>,
}

impl EntryVars {
    /// Allocates the loss and flip variable of every cell, in row-major order
    pub fn new(matrix: &Matrix, var_manager: &mut dyn ManageVars) -> Self {
        let mut cells = Vec::with_capacity(matrix.n_rows() * matrix.n_cols());
        for p in 0..matrix.n_rows() {
            for c in 0..matrix.n_cols() {
                let loss = var_manager.new_lit();
                let flip = var_manager.new_lit();
                cells.push(Cell {
                    loss,
                    flip,
                    one: matrix.is_one(p, c),
                });
            }
        }
        EntryVars {
            n_rows: matrix.n_rows(),
            n_cols: matrix.n_cols(),
            cells,
        }
    }

    #[inline]
    fn cell(&self, p: usize, c: usize) -> Cell {
        debug_assert!(p < self.n_rows && c < self.n_cols);
        self.cells[p * self.n_cols + c]
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

    /// The number of allocated variables
    #[must_use]
    pub fn n_vars(&self) -> usize {
        2 * self.cells.len()
    }

    /// The loss literal of a cell
    #[must_use]
    pub fn loss(&self, p: usize, c: usize) -> Lit {
        self.cell(p, c).loss
    }

    /// The false negative literal of a cell, if its input entry is 0
    #[must_use]
    pub fn false_neg(&self, p: usize, c: usize) -> Option<Lit> {
        let cell = self.cell(p, c);
        (!cell.one).then_some(cell.flip)
    }

    /// The false positive literal of a cell, if its input entry is 1
    #[must_use]
    pub fn false_pos(&self, p: usize, c: usize) -> Option<Lit> {
        let cell = self.cell(p, c);
        cell.one.then_some(cell.flip)
    }

    /// All false negative literals
    #[must_use]
    pub fn false_negs(&self) -> Vec<Lit> {
        self.cells
            .iter()
            .filter(|cell| !cell.one)
            .map(|cell| cell.flip)
            .collect()
    }

    /// All false positive literals
    #[must_use]
    pub fn false_poss(&self) -> Vec<Lit> {
        self.cells
            .iter()
            .filter(|cell| cell.one)
            .map(|cell| cell.flip)
            .collect()
    }

    /// Literal that is true iff the cell is 1
    #[must_use]
    pub fn is_one(&self, p: usize, c: usize) -> Lit {
        let cell = self.cell(p, c);
        if cell.one {
            !cell.flip
        } else {
            cell.flip
        }
    }

    /// Literals whose conjunction is true iff the cell is 0
    #[must_use]
    pub fn is_zero(&self, p: usize, c: usize) -> [Lit; 2] {
        let cell = self.cell(p, c);
        [!cell.loss, cell.zero_cond()]
    }

    /// Literal that is true iff the cell is 2
    #[must_use]
    pub fn is_lost(&self, p: usize, c: usize) -> Lit {
        self.cell(p, c).loss
    }

    /// All three labels of a cell
    #[must_use]
    pub fn labels(&self, p: usize, c: usize) -> CellLabels {
        CellLabels {
            is_one: self.is_one(p, c),
            is_zero: self.is_zero(p, c),
            is_lost: self.is_lost(p, c),
        }
    }

    /// Encodes one clause per cell excluding the combinations of loss and
    /// flip that do not decode: a lost cell with input 0 is no false
    /// negative, a lost cell with input 1 is a false positive.
    pub fn encode_conflicts<Col: CollectClauses>(&self, collector: &mut Col) {
        collector.extend(self.cells.iter().map(|cell| {
            if cell.one {
                clause![!cell.loss, cell.flip]
            } else {
                clause![!cell.loss, !cell.flip]
            }
        }));
    }

    /// Encodes that no cell of column `c` is lost
    pub fn encode_no_loss<Col: CollectClauses>(&self, c: usize, collector: &mut Col) {
        collector.extend((0..self.n_rows).map(|p| clause![!self.loss(p, c)]));
    }

    /// The state of a cell under a model. Does not check consistency, a lost
    /// cell is always [`CharState::Lost`].
    #[must_use]
    pub fn state(&self, p: usize, c: usize, model: &Assignment) -> CharState {
        let cell = self.cell(p, c);
        if model.is_true(cell.loss) {
            CharState::Lost
        } else if model.is_true(cell.zero_cond()) {
            CharState::Absent
        } else {
            CharState::Present
        }
    }

    /// Decodes the state of a cell
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the cell is lost while its flip variable contradicts
    /// the loss.
    pub fn decode(&self, p: usize, c: usize, model: &Assignment) -> Result<CharState, Error> {
        let cell = self.cell(p, c);
        if model.is_true(cell.loss) && !model.is_true(cell.zero_cond()) {
            return Err(Error::Decode {
                row: p,
                col: c,
                entry: u8::from(cell.one),
            });
        }
        Ok(self.state(p, c, model))
    }

    /// Decodes the full corrected matrix
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] for the first cell that does not decode.
    pub fn decode_matrix(&self, model: &Assignment) -> Result<TernaryMatrix, Error> {
        let mut matrix = TernaryMatrix::new(self.n_rows, self.n_cols);
        for p in 0..self.n_rows {
            for c in 0..self.n_cols {
                matrix.set(p, c, self.decode(p, c, model)?);
            }
        }
        Ok(matrix)
    }
}
