//! # Sample Validation
//!
//! Recomputes everything the encoding implies from a decoded matrix and
//! compares it to the model and to the bounds. A mismatch means the encoding
//! is wrong and is reported as [`Error::Validation`].

use crate::{
    encodings::clustering::Clustering,
    instances::{CharState, Matrix},
    types::{Assignment, Lit, RsHashSet},
};

use super::{
    entries::EntryVars, separation::DolloSeparator, Bounds, DolloSampler, Error, Options, Sample,
};

macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(Error::Validation(format!($($arg)*)));
        }
    };
}

/// Checks a sample against an input matrix and options, without access to
/// a model: noise bounds, cluster counts, duplicate flags, no-loss columns and
/// forbidden submatrices
///
/// # Errors
///
/// [`Error::Options`] if the options do not fit the input,
/// [`Error::Validation`] describing the first violated property otherwise.
pub fn check_sample(input: &Matrix, opts: &Options, sample: &Sample) -> Result<(), Error> {
    opts.check(input)?;
    let bounds = Bounds::new(input, opts);
    let matrix = &sample.matrix;
    ensure!(
        matrix.n_rows() == input.n_rows() && matrix.n_cols() == input.n_cols(),
        "sample is {}x{} but input is {}x{}",
        matrix.n_rows(),
        matrix.n_cols(),
        input.n_rows(),
        input.n_cols()
    );
    ensure!(
        sample.row_flags.len() == matrix.n_rows() && sample.col_flags.len() == matrix.n_cols(),
        "{} row flags and {} column flags for a {}x{} sample",
        sample.row_flags.len(),
        sample.col_flags.len(),
        matrix.n_rows(),
        matrix.n_cols()
    );

    let n_fn = sample.n_false_negatives(input);
    ensure!(
        n_fn <= bounds.false_negatives,
        "{n_fn} false negatives exceed the bound of {}",
        bounds.false_negatives
    );
    let n_fp = sample.n_false_positives(input);
    ensure!(
        n_fp <= bounds.false_positives,
        "{n_fp} false positives exceed the bound of {}",
        bounds.false_positives
    );

    let mut seen_rows = RsHashSet::default();
    for j in 0..matrix.n_rows() {
        let dup = !seen_rows.insert(matrix.row(j));
        ensure!(
            dup == sample.row_flags[j],
            "row {j} is flagged {} but duplicates an earlier row: {dup}",
            sample.row_flags[j]
        );
    }
    let mut seen_cols = RsHashSet::default();
    for j in 0..matrix.n_cols() {
        let dup = !seen_cols.insert(matrix.col(j).collect::<Vec<_>>());
        ensure!(
            dup == sample.col_flags[j],
            "column {j} is flagged {} but duplicates an earlier column: {dup}",
            sample.col_flags[j]
        );
    }
    ensure!(
        sample.n_cell_clusters() == input.n_rows() - bounds.row_duplicates,
        "{} cell clusters instead of {}",
        sample.n_cell_clusters(),
        input.n_rows() - bounds.row_duplicates
    );
    ensure!(
        sample.n_mutation_clusters() == input.n_cols() - bounds.col_duplicates,
        "{} mutation clusters instead of {}",
        sample.n_mutation_clusters(),
        input.n_cols() - bounds.col_duplicates
    );

    for &c in &opts.no_loss {
        ensure!(
            matrix.col(c).all(|s| s != CharState::Lost),
            "column {c} may not be lost"
        );
    }

    if let Some((rows, cols, cells)) =
        DolloSeparator::violations(matrix, &sample.row_flags, &sample.col_flags).next()
    {
        return Err(Error::Validation(format!(
            "rows {rows:?} and columns {cols:?} form the forbidden submatrix {cells:?}"
        )));
    }
    Ok(())
}

fn check_lit(model: &Assignment, lit: Lit, expected: bool, what: &str) -> Result<(), Error> {
    ensure!(
        model.is_true(lit) == expected,
        "{what} is {} in the model but {expected} in the sample",
        model.is_true(lit)
    );
    Ok(())
}

impl DolloSampler {
    /// Validates a sample decoded from `model` against the model's
    /// clustering and noise variables and against the bounds
    pub(super) fn validate(
        &self,
        model: &Assignment,
        entries: &EntryVars,
        clustering: &Clustering,
        sample: &Sample,
    ) -> Result<(), Error> {
        let input = self.matrix();
        let matrix = &sample.matrix;

        let n_fn_vars = entries
            .false_negs()
            .into_iter()
            .filter(|&l| model.is_true(l))
            .count();
        ensure!(
            n_fn_vars == sample.n_false_negatives(input),
            "{n_fn_vars} false negative variables but {} false negatives",
            sample.n_false_negatives(input)
        );
        let n_fp_vars = entries
            .false_poss()
            .into_iter()
            .filter(|&l| model.is_true(l))
            .count();
        ensure!(
            n_fp_vars == sample.n_false_positives(input),
            "{n_fp_vars} false positive variables but {} false positives",
            sample.n_false_positives(input)
        );

        for p in 0..matrix.n_rows() {
            for j in 1..matrix.n_cols() {
                for i in 0..j {
                    check_lit(
                        model,
                        clustering.in_row_eq(p, i, j),
                        matrix.get(p, i) == matrix.get(p, j),
                        &format!("equality of columns {i} and {j} in row {p}"),
                    )?;
                }
            }
        }
        for c in 0..matrix.n_cols() {
            for j in 1..matrix.n_rows() {
                for i in 0..j {
                    check_lit(
                        model,
                        clustering.in_col_eq(c, i, j),
                        matrix.get(i, c) == matrix.get(j, c),
                        &format!("equality of rows {i} and {j} in column {c}"),
                    )?;
                }
            }
        }
        for j in 1..matrix.n_rows() {
            for i in 0..j {
                check_lit(
                    model,
                    clustering.row_dup_of(i, j),
                    matrix.row(i) == matrix.row(j),
                    &format!("row {j} duplicating row {i}"),
                )?;
            }
        }
        for j in 1..matrix.n_cols() {
            for i in 0..j {
                check_lit(
                    model,
                    clustering.col_dup_of(i, j),
                    matrix.col(i).eq(matrix.col(j)),
                    &format!("column {j} duplicating column {i}"),
                )?;
            }
        }

        check_sample(input, self.options(), sample)?;
        log::debug!(
            target: crate::log::targets::VALIDATION,
            "sample with {} false negatives, {} false positives, {} cell and {} mutation clusters is valid",
            n_fn_vars,
            n_fp_vars,
            sample.n_cell_clusters(),
            sample.n_mutation_clusters()
        );
        Ok(())
    }
}
