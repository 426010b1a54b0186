//! # k-Dollo Completion Sampling
//!
//! Samples ternary matrices that correct a binary input matrix into a
//! 1-Dollo phylogeny. A cell may be corrected as a false negative (0 to 1) or
//! false positive (1 to 0), or marked as lost (2). The number of corrections
//! of each kind is bounded by a rate of the respective input entries. Rows
//! and columns are grouped into a fixed number of clusters of identical rows
//! (columns), where every row (column) duplicating an earlier one is flagged.
//!
//! The encoding consists of
//! - the entry variables of all cells ([`entries`]),
//! - the clustering of rows and columns
//!   ([`crate::encodings::clustering`]),
//! - binary adder cardinality constraints bounding the corrections and fixing
//!   the cluster counts ([`crate::encodings::adder`]),
//! - clauses excluding the forbidden submatrices of 1-Dollo phylogenies
//!   ([`forbidden`], [`separation`]), either up front or on demand.
//!
//! ## Example
//!
//! ```
//! use lumberjack::{
//!     dollo::{DolloSampler, Options},
//!     instances::Matrix,
//! };
//!
//! let matrix = Matrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap();
//! let opts = Options::default().cell_clusters(2).mutation_clusters(2);
//! let sampler = DolloSampler::new(matrix, opts).unwrap();
//! assert_eq!(sampler.bounds().false_negatives, 0);
//! ```

use std::{fmt, io};

use thiserror::Error;

use crate::{
    encodings,
    instances::{CharState, Matrix, TernaryMatrix},
    utils,
};

pub mod entries;
pub mod forbidden;
pub mod sampler;
pub mod separation;
pub mod validate;

pub use sampler::{DolloSampler, Phase, SamplerStats};

/// Errors of the k-Dollo sampler
#[derive(Error, Debug)]
pub enum Error {
    /// The options do not fit the input matrix
    #[error("invalid options: {0}")]
    Options(String),
    /// An operation was called in the wrong phase
    #[error("sampler must be {expected} but is {found}")]
    Phase { expected: Phase, found: Phase },
    /// Encoding the cardinality constraints failed
    #[error(transparent)]
    Encoding(#[from] encodings::Error),
    /// A cell of a model is lost but its flip variable contradicts the loss
    #[error("cell ({row}, {col}) with input {entry} is lost but does not decode")]
    Decode { row: usize, col: usize, entry: u8 },
    /// A decoded sample disagrees with the model or the constraints
    #[error("sample failed validation: {0}")]
    Validation(String),
    /// The engine failed
    #[error(transparent)]
    Engine(#[from] anyhow::Error),
    /// Writing the encoding failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Options of the k-Dollo sampler
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options {
    /// Fraction of the 0 entries that may be false negatives
    pub fn_rate: f64,
    /// Fraction of the 1 entries that may be false positives
    pub fp_rate: f64,
    /// Number of distinct rows. Defaults to the number of rows.
    pub cell_clusters: Option<usize>,
    /// Number of distinct columns. Defaults to the number of columns.
    pub mutation_clusters: Option<usize>,
    /// Separate forbidden submatrices on demand instead of up front
    pub lazy: bool,
    /// Columns whose cells may not be lost
    pub no_loss: Vec<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            fn_rate: 0.,
            fp_rate: 0.,
            cell_clusters: None,
            mutation_clusters: None,
            lazy: false,
            no_loss: vec![],
        }
    }
}

impl Options {
    /// Sets the false negative rate
    #[must_use]
    pub fn fn_rate(mut self, rate: f64) -> Self {
        self.fn_rate = rate;
        self
    }

    /// Sets the false positive rate
    #[must_use]
    pub fn fp_rate(mut self, rate: f64) -> Self {
        self.fp_rate = rate;
        self
    }

    /// Sets the number of row clusters
    #[must_use]
    pub fn cell_clusters(mut self, clusters: usize) -> Self {
        self.cell_clusters = Some(clusters);
        self
    }

    /// Sets the number of column clusters
    #[must_use]
    pub fn mutation_clusters(mut self, clusters: usize) -> Self {
        self.mutation_clusters = Some(clusters);
        self
    }

    /// Enables or disables on-demand separation
    #[must_use]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Sets the columns whose cells may not be lost
    #[must_use]
    pub fn no_loss<I: IntoIterator<Item = usize>>(mut self, cols: I) -> Self {
        self.no_loss = cols.into_iter().collect();
        self.no_loss.sort_unstable();
        self.no_loss.dedup();
        self
    }

    /// Checks the options against a matrix
    ///
    /// # Errors
    ///
    /// [`Error::Options`] if a rate is outside `[0, 1]`, a cluster count is
    /// zero or exceeds the dimension, or a no-loss column is out of range.
    pub fn check(&self, matrix: &Matrix) -> Result<(), Error> {
        for (name, rate) in [("false negative", self.fn_rate), ("false positive", self.fp_rate)] {
            if !(0. ..=1.).contains(&rate) {
                return Err(Error::Options(format!(
                    "{name} rate {rate} is not in [0, 1]"
                )));
            }
        }
        for (name, clusters, dim) in [
            ("cell", self.cell_clusters, matrix.n_rows()),
            ("mutation", self.mutation_clusters, matrix.n_cols()),
        ] {
            if let Some(k) = clusters {
                if k == 0 || k > dim {
                    return Err(Error::Options(format!(
                        "{k} {name} clusters are not in 1..={dim}"
                    )));
                }
            }
        }
        if let Some(&c) = self.no_loss.iter().find(|&&c| c >= matrix.n_cols()) {
            return Err(Error::Options(format!(
                "no-loss column {c} is out of range for {} columns",
                matrix.n_cols()
            )));
        }
        Ok(())
    }
}

/// Bounds derived from the options and the input matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    /// Maximum number of false negatives
    pub false_negatives: usize,
    /// Maximum number of false positives
    pub false_positives: usize,
    /// Exact number of flagged duplicate rows
    pub row_duplicates: usize,
    /// Exact number of flagged duplicate columns
    pub col_duplicates: usize,
}

impl Bounds {
    /// Derives the bounds from checked options
    #[must_use]
    pub fn new(matrix: &Matrix, opts: &Options) -> Self {
        let (m, n) = (matrix.n_rows(), matrix.n_cols());
        Bounds {
            false_negatives: utils::noise_bound(opts.fn_rate, matrix.n_zeros()),
            false_positives: utils::noise_bound(opts.fp_rate, matrix.n_ones()),
            row_duplicates: m - opts.cell_clusters.unwrap_or(m),
            col_duplicates: n - opts.mutation_clusters.unwrap_or(n),
        }
    }
}

/// A decoded sample
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// The corrected matrix
    pub matrix: TernaryMatrix,
    /// Rows duplicating an earlier row
    pub row_flags: Vec<bool>,
    /// Columns duplicating an earlier column
    pub col_flags: Vec<bool>,
}

impl Sample {
    /// The matrix without flagged rows and columns
    #[must_use]
    pub fn clustered(&self) -> TernaryMatrix {
        let rows: Vec<usize> = (0..self.matrix.n_rows())
            .filter(|&p| !self.row_flags[p])
            .collect();
        let cols: Vec<usize> = (0..self.matrix.n_cols())
            .filter(|&c| !self.col_flags[c])
            .collect();
        self.matrix.select(&rows, &cols)
    }

    /// The number of row clusters
    #[must_use]
    pub fn n_cell_clusters(&self) -> usize {
        self.row_flags.iter().filter(|&&f| !f).count()
    }

    /// The number of column clusters
    #[must_use]
    pub fn n_mutation_clusters(&self) -> usize {
        self.col_flags.iter().filter(|&&f| !f).count()
    }

    /// The number of false negatives with respect to an input matrix
    #[must_use]
    pub fn n_false_negatives(&self, input: &Matrix) -> usize {
        self.count_cells(|p, c, state| !input.is_one(p, c) && state == CharState::Present)
    }

    /// The number of false positives with respect to an input matrix
    #[must_use]
    pub fn n_false_positives(&self, input: &Matrix) -> usize {
        self.count_cells(|p, c, state| input.is_one(p, c) && state != CharState::Present)
    }

    fn count_cells<F: Fn(usize, usize, CharState) -> bool>(&self, pred: F) -> usize {
        let mut count = 0;
        for p in 0..self.matrix.n_rows() {
            for c in 0..self.matrix.n_cols() {
                if pred(p, c, self.matrix.get(p, c)) {
                    count += 1;
                }
            }
        }
        count
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, Error, Options, Sample};
    use crate::instances::{Matrix, TernaryMatrix};

    fn matrix() -> Matrix {
        Matrix::from_rows(vec![vec![1, 0, 0], vec![1, 1, 0], vec![1, 1, 1]]).unwrap()
    }

    #[test]
    fn check_options() {
        let matrix = matrix();
        assert!(Options::default().check(&matrix).is_ok());
        assert!(matches!(
            Options::default().fn_rate(1.5).check(&matrix),
            Err(Error::Options(_))
        ));
        assert!(matches!(
            Options::default().fp_rate(-0.1).check(&matrix),
            Err(Error::Options(_))
        ));
        assert!(matches!(
            Options::default().cell_clusters(0).check(&matrix),
            Err(Error::Options(_))
        ));
        assert!(matches!(
            Options::default().mutation_clusters(4).check(&matrix),
            Err(Error::Options(_))
        ));
        assert!(matches!(
            Options::default().no_loss([3]).check(&matrix),
            Err(Error::Options(_))
        ));
        assert!(Options::default()
            .cell_clusters(3)
            .mutation_clusters(1)
            .no_loss([2, 0, 2])
            .check(&matrix)
            .is_ok());
    }

    #[test]
    fn no_loss_deduplicated() {
        assert_eq!(Options::default().no_loss([2, 0, 2]).no_loss, vec![0, 2]);
    }

    #[test]
    fn bounds() {
        let matrix = matrix();
        let opts = Options::default()
            .fn_rate(0.34)
            .fp_rate(0.25)
            .cell_clusters(2);
        assert_eq!(
            Bounds::new(&matrix, &opts),
            Bounds {
                false_negatives: 2,
                false_positives: 2,
                row_duplicates: 1,
                col_duplicates: 0,
            }
        );
    }

    #[test]
    fn clustered_view() {
        let sample = Sample {
            matrix: TernaryMatrix::from_digits(&[vec![1, 0, 0], vec![1, 2, 2], vec![1, 2, 2]]),
            row_flags: vec![false, false, true],
            col_flags: vec![false, false, true],
        };
        assert_eq!(
            sample.clustered(),
            TernaryMatrix::from_digits(&[vec![1, 0], vec![1, 2]])
        );
        assert_eq!(sample.n_cell_clusters(), 2);
        assert_eq!(sample.n_mutation_clusters(), 2);
        let input = matrix();
        assert_eq!(sample.n_false_negatives(&input), 0);
        assert_eq!(sample.n_false_positives(&input), 3);
    }
}
