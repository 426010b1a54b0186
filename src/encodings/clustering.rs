//! # Row and Column Clustering
//!
//! Detects duplicate rows and columns of a ternary matrix whose cells are
//! described by label literals ([`CellLabels`]). For every pair of cells
//! sharing a row (or column) an equality variable is defined, a row `j`
//! duplicates an earlier row `i` iff all of its cells equal those of `i`, and
//! row `j` is flagged iff it duplicates any earlier row. Row 0 (and column 0)
//! is never flagged. Counting the flags with a cardinality encoding fixes the
//! number of clusters.
//!
//! Equality is only defined between cells of a common row or column; no
//! transitivity constraints are needed since equality compares decoded values.

use crate::{
    encodings::{atomics, CollectClauses, EncodeStats},
    instances::ManageVars,
    types::Lit,
};

/// Label literals of a ternary cell. Exactly one of the three labels holds in
/// every model of the encoding providing them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellLabels {
    /// True iff the cell is 1
    pub is_one: Lit,
    /// Conjunction that is true iff the cell is 0
    pub is_zero: [Lit; 2],
    /// True iff the cell is 2
    pub is_lost: Lit,
}

/// Index of the pair `i < j` among all pairs of `n` elements, ordered by `j`
/// then `i`
#[inline]
fn pair_idx(i: usize, j: usize) -> usize {
    debug_assert!(i < j);
    j * (j - 1) / 2 + i
}

#[inline]
fn n_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// The variables of the clustering encoding for an `n_rows x n_cols` matrix
#[derive(Debug, Clone)]
pub struct Clustering {
    n_rows: usize,
    n_cols: usize,
    /// Per row, equality of each pair of columns
    in_row_eq: Vec<Lit>,
    /// Per column, equality of each pair of rows
    in_col_eq: Vec<Lit>,
    /// Row `j` is identical to row `i < j`
    row_dup_of: Vec<Lit>,
    /// Column `j` is identical to column `i < j`
    col_dup_of: Vec<Lit>,
    /// Row duplicates some earlier row
    row_flags: Vec<Lit>,
    /// Column duplicates some earlier column
    col_flags: Vec<Lit>,
    n_vars: u32,
    n_clauses: usize,
}

impl Clustering {
    /// Allocates all variables of the encoding
    pub fn new(n_rows: usize, n_cols: usize, var_manager: &mut dyn ManageVars) -> Self {
        let n_vars_before = var_manager.n_used();
        let mut lits = |n: usize| -> Vec<Lit> { (0..n).map(|_| var_manager.new_lit()).collect() };
        let in_row_eq = lits(n_rows * n_pairs(n_cols));
        let in_col_eq = lits(n_cols * n_pairs(n_rows));
        let row_dup_of = lits(n_pairs(n_rows));
        let col_dup_of = lits(n_pairs(n_cols));
        let row_flags = lits(n_rows);
        let col_flags = lits(n_cols);
        let n_vars = var_manager.n_used() - n_vars_before;
        Clustering {
            n_rows,
            n_cols,
            in_row_eq,
            in_col_eq,
            row_dup_of,
            col_dup_of,
            row_flags,
            col_flags,
            n_vars,
            n_clauses: 0,
        }
    }

    /// Equality of columns `i < j` within row `p`
    #[must_use]
    pub fn in_row_eq(&self, p: usize, i: usize, j: usize) -> Lit {
        self.in_row_eq[p * n_pairs(self.n_cols) + pair_idx(i, j)]
    }

    /// Equality of rows `i < j` within column `c`
    #[must_use]
    pub fn in_col_eq(&self, c: usize, i: usize, j: usize) -> Lit {
        self.in_col_eq[c * n_pairs(self.n_rows) + pair_idx(i, j)]
    }

    /// Row `j` is a duplicate of row `i < j`
    #[must_use]
    pub fn row_dup_of(&self, i: usize, j: usize) -> Lit {
        self.row_dup_of[pair_idx(i, j)]
    }

    /// Column `j` is a duplicate of column `i < j`
    #[must_use]
    pub fn col_dup_of(&self, i: usize, j: usize) -> Lit {
        self.col_dup_of[pair_idx(i, j)]
    }

    /// Duplicate flags of all rows
    #[must_use]
    pub fn row_flags(&self) -> &[Lit] {
        &self.row_flags
    }

    /// Duplicate flags of all columns
    #[must_use]
    pub fn col_flags(&self) -> &[Lit] {
        &self.col_flags
    }

    /// Encodes the clustering constraints over the cell labels
    pub fn encode<Col, Labels>(&mut self, labels: Labels, collector: &mut Col)
    where
        Col: CollectClauses,
        Labels: Fn(usize, usize) -> CellLabels,
    {
        let n_clauses_before = collector.n_clauses();
        // equality of cells within rows and columns
        for p in 0..self.n_rows {
            for j in 1..self.n_cols {
                for i in 0..j {
                    let eq = self.in_row_eq(p, i, j);
                    encode_equal(eq, labels(p, i), labels(p, j), collector);
                }
            }
        }
        for c in 0..self.n_cols {
            for j in 1..self.n_rows {
                for i in 0..j {
                    let eq = self.in_col_eq(c, i, j);
                    encode_equal(eq, labels(i, c), labels(j, c), collector);
                }
            }
        }
        // duplicates of whole rows and columns
        for j in 1..self.n_rows {
            for i in 0..j {
                let eqs: Vec<Lit> = (0..self.n_cols).map(|c| self.in_col_eq(c, i, j)).collect();
                encode_and(self.row_dup_of(i, j), &eqs, collector);
            }
        }
        for j in 1..self.n_cols {
            for i in 0..j {
                let eqs: Vec<Lit> = (0..self.n_rows).map(|p| self.in_row_eq(p, i, j)).collect();
                encode_and(self.col_dup_of(i, j), &eqs, collector);
            }
        }
        // flags
        for j in 0..self.n_rows {
            let dups: Vec<Lit> = (0..j).map(|i| self.row_dup_of(i, j)).collect();
            encode_or(self.row_flags[j], &dups, collector);
        }
        for j in 0..self.n_cols {
            let dups: Vec<Lit> = (0..j).map(|i| self.col_dup_of(i, j)).collect();
            encode_or(self.col_flags[j], &dups, collector);
        }
        self.n_clauses += collector.n_clauses() - n_clauses_before;
        log::debug!(
            target: crate::log::targets::CLUSTERING,
            "clustering of {}x{} matrix: {} vars, {} clauses",
            self.n_rows,
            self.n_cols,
            self.n_vars,
            self.n_clauses
        );
    }
}

impl EncodeStats for Clustering {
    fn n_clauses(&self) -> usize {
        self.n_clauses
    }

    fn n_vars(&self) -> u32 {
        self.n_vars
    }
}

/// `eq` is true iff both cells carry the same label
fn encode_equal<Col: CollectClauses>(eq: Lit, x: CellLabels, y: CellLabels, collector: &mut Col) {
    collector.extend([
        atomics::cube_impl_lit(&[x.is_one, y.is_one], eq),
        atomics::cube_impl_lit(&[x.is_lost, y.is_lost], eq),
        atomics::cube_impl_lit(
            &[x.is_zero[0], x.is_zero[1], y.is_zero[0], y.is_zero[1]],
            eq,
        ),
    ]);
    for (from, to) in [(x, y), (y, x)] {
        collector.extend([
            atomics::cube_impl_lit(&[eq, from.is_one], to.is_one),
            atomics::cube_impl_lit(&[eq, from.is_lost], to.is_lost),
        ]);
        collector.extend(atomics::cube_impl_cube(
            &[eq, from.is_zero[0], from.is_zero[1]],
            &to.is_zero,
        ));
    }
}

/// `out <-> AND(lits)`
fn encode_and<Col: CollectClauses>(out: Lit, lits: &[Lit], collector: &mut Col) {
    collector.extend(std::iter::once(atomics::cube_impl_lit(lits, out)));
    collector.extend(atomics::lit_impl_cube(out, lits));
}

/// `out <-> OR(lits)`, the empty disjunction being false
fn encode_or<Col: CollectClauses>(out: Lit, lits: &[Lit], collector: &mut Col) {
    collector.extend(atomics::clause_impl_lit(lits, out));
    collector.extend(std::iter::once(atomics::lit_impl_clause(out, lits)));
}
