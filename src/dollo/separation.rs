//! # Forbidden Submatrix Separation
//!
//! Excludes the forbidden 3x2 patterns from all corrected matrices. A pattern
//! on rows `(r1, r2, r3)` and columns `(c1, c2)` is excluded by a single
//! clause: at least one of the six cells differs from the pattern, or one of
//! the rows or columns is a flagged duplicate.
//!
//! The clauses are either all added up front ([`DolloSeparator::encode_eager`])
//! or found on demand for candidate models ([`Separate::separate`]).

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    encodings::CollectClauses,
    instances::{CharState, TernaryMatrix},
    solvers::Separate,
    types::{Assignment, Clause, Lit},
};

use super::{entries::EntryVars, forbidden};

/// The k-Dollo separation oracle
#[derive(Debug)]
pub struct DolloSeparator {
    entries: EntryVars,
    row_flags: Vec<Lit>,
    col_flags: Vec<Lit>,
    n_calls: AtomicUsize,
    n_clauses: AtomicUsize,
    n_decoded: AtomicUsize,
}

impl DolloSeparator {
    /// Creates a separator over the entry variables and the duplicate flags
    /// of rows and columns
    #[must_use]
    pub fn new(entries: EntryVars, row_flags: Vec<Lit>, col_flags: Vec<Lit>) -> Self {
        debug_assert_eq!(entries.n_rows(), row_flags.len());
        debug_assert_eq!(entries.n_cols(), col_flags.len());
        DolloSeparator {
            entries,
            row_flags,
            col_flags,
            n_calls: AtomicUsize::new(0),
            n_clauses: AtomicUsize::new(0),
            n_decoded: AtomicUsize::new(0),
        }
    }

    /// The clause excluding `pattern` (row-major) on the given rows and
    /// columns
    #[must_use]
    pub fn pattern_clause(
        &self,
        rows: [usize; 3],
        cols: [usize; 2],
        pattern: &[CharState; 6],
    ) -> Clause {
        let mut clause = Clause::with_capacity(17);
        for (i, &p) in rows.iter().enumerate() {
            for (j, &c) in cols.iter().enumerate() {
                match pattern[2 * i + j] {
                    CharState::Absent => {
                        let [a, b] = self.entries.is_zero(p, c);
                        clause.add(!a);
                        clause.add(!b);
                    }
                    CharState::Present => clause.add(!self.entries.is_one(p, c)),
                    CharState::Lost => clause.add(!self.entries.is_lost(p, c)),
                }
            }
        }
        rows.iter().for_each(|&p| clause.add(self.row_flags[p]));
        cols.iter().for_each(|&c| clause.add(self.col_flags[c]));
        clause
    }

    /// Adds the clauses for all patterns on all ordered row triples and
    /// column pairs. Returns the number of clauses added.
    pub fn encode_eager<Col: CollectClauses>(&self, collector: &mut Col) -> usize {
        let n_clauses_before = collector.n_clauses();
        let patterns: Vec<_> = forbidden::patterns().collect();
        for rows in row_triples(self.entries.n_rows(), |_| true) {
            for cols in col_pairs(self.entries.n_cols(), |_| true) {
                collector.extend(
                    patterns
                        .iter()
                        .map(|pattern| self.pattern_clause(rows, cols, pattern)),
                );
            }
        }
        let n_added = collector.n_clauses() - n_clauses_before;
        log::debug!(
            target: crate::log::targets::SEPARATION,
            "added {n_added} forbidden submatrix clauses up front"
        );
        n_added
    }

    /// Forbidden submatrices of `matrix` that avoid the flagged rows and
    /// columns, as row triples, column pairs and the matched cells
    pub fn violations<'a>(
        matrix: &'a TernaryMatrix,
        row_flagged: &'a [bool],
        col_flagged: &'a [bool],
    ) -> impl Iterator<Item = ([usize; 3], [usize; 2], [CharState; 6])> + 'a {
        row_triples(matrix.n_rows(), move |p| !row_flagged[p]).flat_map(move |rows| {
            col_pairs(matrix.n_cols(), move |c| !col_flagged[c]).filter_map(move |cols| {
                let cells = submatrix(matrix, rows, cols);
                forbidden::is_forbidden(&cells).then_some((rows, cols, cells))
            })
        })
    }

    /// The number of times the separator was called
    #[must_use]
    pub fn n_calls(&self) -> usize {
        self.n_calls.load(Ordering::Relaxed)
    }

    /// The number of clauses returned over all calls
    #[must_use]
    pub fn n_clauses(&self) -> usize {
        self.n_clauses.load(Ordering::Relaxed)
    }

    /// The number of cells decoded over all calls
    #[must_use]
    pub fn n_decoded(&self) -> usize {
        self.n_decoded.load(Ordering::Relaxed)
    }
}

impl Separate for DolloSeparator {
    fn separate(&self, model: &Assignment) -> Vec<Clause> {
        self.n_calls.fetch_add(1, Ordering::Relaxed);
        let row_flagged: Vec<bool> = self.row_flags.iter().map(|&l| model.is_true(l)).collect();
        let col_flagged: Vec<bool> = self.col_flags.iter().map(|&l| model.is_true(l)).collect();
        // cells of flagged rows or columns are never part of a violation
        let mut matrix = TernaryMatrix::new(self.entries.n_rows(), self.entries.n_cols());
        let mut n_decoded = 0;
        for p in (0..row_flagged.len()).filter(|&p| !row_flagged[p]) {
            for c in (0..col_flagged.len()).filter(|&c| !col_flagged[c]) {
                matrix.set(p, c, self.entries.state(p, c, model));
                n_decoded += 1;
            }
        }
        self.n_decoded.fetch_add(n_decoded, Ordering::Relaxed);
        let clauses: Vec<Clause> = Self::violations(&matrix, &row_flagged, &col_flagged)
            .map(|(rows, cols, cells)| {
                let clause = self.pattern_clause(rows, cols, &cells);
                log::trace!(
                    target: crate::log::targets::SEPARATION,
                    "rows {rows:?} cols {cols:?} match {cells:?}: {clause}"
                );
                clause
            })
            .collect();
        self.n_clauses.fetch_add(clauses.len(), Ordering::Relaxed);
        log::debug!(
            target: crate::log::targets::SEPARATION,
            "separation call {}: {} violated submatrices in {n_decoded} decoded cells",
            self.n_calls(),
            clauses.len()
        );
        clauses
    }
}

fn submatrix(matrix: &TernaryMatrix, rows: [usize; 3], cols: [usize; 2]) -> [CharState; 6] {
    let mut cells = [CharState::Absent; 6];
    for (i, &p) in rows.iter().enumerate() {
        for (j, &c) in cols.iter().enumerate() {
            cells[2 * i + j] = matrix.get(p, c);
        }
    }
    cells
}

/// Ordered triples of distinct rows passing `keep`
fn row_triples<F>(n_rows: usize, keep: F) -> impl Iterator<Item = [usize; 3]>
where
    F: Fn(usize) -> bool + Copy,
{
    let rows = move || (0..n_rows).filter(move |&p| keep(p));
    rows().flat_map(move |r1| {
        rows().flat_map(move |r2| {
            rows()
                .filter(move |&r3| r1 != r2 && r3 != r1 && r3 != r2)
                .map(move |r3| [r1, r2, r3])
        })
    })
}

/// Column pairs `c1 < c2` passing `keep`
fn col_pairs<F>(n_cols: usize, keep: F) -> impl Iterator<Item = [usize; 2]>
where
    F: Fn(usize) -> bool + Copy,
{
    (0..n_cols).filter(move |&c| keep(c)).flat_map(move |c1| {
        (c1 + 1..n_cols)
            .filter(move |&c| keep(c))
            .map(move |c2| [c1, c2])
    })
}
