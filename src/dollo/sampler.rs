//! # The k-Dollo Sampler
//!
//! Builds the full encoding in a fixed order, hands it to an engine and
//! decodes and validates the sampled models.

use std::{fmt, io, path::Path, sync::Arc};

use crate::{
    encodings::{adder::BinaryAdder, clustering::Clustering, EncodeStats},
    instances::{fio, BasicVarManager, Cnf, ManageVars, Matrix},
    solvers::{self, Count, SolCount},
    types::{Assignment, Lit, Var},
};

use super::{entries::EntryVars, separation::DolloSeparator, Bounds, Error, Options, Sample};

/// Phases of the sampler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Options are checked, nothing is encoded yet
    Constructed,
    /// The encoding has been passed to an engine
    Initialized,
    /// Samples have been drawn at least once
    Sampled,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Constructed => write!(f, "constructed"),
            Phase::Initialized => write!(f, "initialized"),
            Phase::Sampled => write!(f, "sampled"),
        }
    }
}

/// Sizes of the encoding
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplerStats {
    /// Total number of variables
    pub n_vars: u32,
    /// Number of loss and flip variables
    pub n_entry_vars: usize,
    /// Number of equality, duplicate and flag variables
    pub n_clustering_vars: u32,
    /// Number of auxiliary variables of the cardinality constraints
    pub n_cardinality_vars: u32,
    /// Number of clauses excluding undecodable cells
    pub n_conflict_clauses: usize,
    /// Number of clustering clauses
    pub n_clustering_clauses: usize,
    /// Number of cardinality clauses
    pub n_cardinality_clauses: usize,
    /// Number of forbidden submatrix clauses added up front
    pub n_forbidden_clauses: usize,
    /// Number of clauses forbidding losses
    pub n_no_loss_clauses: usize,
    /// Number of validated samples
    pub n_samples: usize,
}

impl SamplerStats {
    /// Total number of clauses added up front, including the unit fixing the
    /// constant true literal
    #[must_use]
    pub fn n_clauses(&self) -> usize {
        1 + self.n_conflict_clauses
            + self.n_clustering_clauses
            + self.n_cardinality_clauses
            + self.n_forbidden_clauses
            + self.n_no_loss_clauses
    }
}

/// Everything built during initialization
#[derive(Debug)]
struct Encoding {
    true_lit: Lit,
    entries: EntryVars,
    clustering: Clustering,
    separator: Option<Arc<DolloSeparator>>,
    cnf: Cnf,
    max_var: Var,
}

/// Sampler for k-Dollo completions of a binary matrix
#[derive(Debug)]
pub struct DolloSampler {
    matrix: Matrix,
    opts: Options,
    bounds: Bounds,
    phase: Phase,
    var_manager: BasicVarManager,
    encoding: Option<Encoding>,
    stats: SamplerStats,
}

impl DolloSampler {
    /// Creates a sampler for a matrix
    ///
    /// # Errors
    ///
    /// [`Error::Options`] if the options do not fit the matrix.
    pub fn new(matrix: Matrix, opts: Options) -> Result<Self, Error> {
        opts.check(&matrix)?;
        let bounds = Bounds::new(&matrix, &opts);
        Ok(DolloSampler {
            matrix,
            opts,
            bounds,
            phase: Phase::Constructed,
            var_manager: BasicVarManager::default(),
            encoding: None,
            stats: SamplerStats::default(),
        })
    }

    /// The current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The input matrix
    #[must_use]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// The options
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// The noise and clustering bounds
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Sizes of the encoding
    #[must_use]
    pub fn stats(&self) -> &SamplerStats {
        &self.stats
    }

    /// The separator, if forbidden submatrices are separated on demand
    #[must_use]
    pub fn separator(&self) -> Option<&DolloSeparator> {
        self.encoding
            .as_ref()
            .and_then(|enc| enc.separator.as_deref())
    }

    fn expect_phase(&self, expected: &[Phase]) -> Result<(), Error> {
        if expected.contains(&self.phase) {
            return Ok(());
        }
        Err(Error::Phase {
            expected: expected[0],
            found: self.phase,
        })
    }

    fn encoding(&self) -> Result<&Encoding, Error> {
        self.encoding.as_ref().ok_or(Error::Phase {
            expected: Phase::Initialized,
            found: self.phase,
        })
    }

    /// Builds the encoding and passes it to the engine. Variables are
    /// allocated in the order: constant true literal, entry variables,
    /// clustering variables, cardinality variables.
    ///
    /// # Errors
    ///
    /// - [`Error::Phase`] if the sampler has been initialized before
    /// - [`Error::Encoding`] if a cardinality constant is too large
    /// - [`Error::Engine`] if the engine rejects the encoding
    pub fn init<E>(&mut self, engine: &mut E) -> Result<(), Error>
    where
        E: Count + solvers::Sample,
    {
        self.expect_phase(&[Phase::Constructed])?;
        let (m, n) = (self.matrix.n_rows(), self.matrix.n_cols());

        let true_lit = self.var_manager.new_lit();
        let entries = EntryVars::new(&self.matrix, &mut self.var_manager);
        let mut clustering = Clustering::new(m, n, &mut self.var_manager);
        self.stats.n_entry_vars = entries.n_vars();
        self.stats.n_clustering_vars = clustering.n_vars();
        log::debug!(
            target: crate::log::targets::INIT,
            "allocated {} entry and {} clustering variables",
            self.stats.n_entry_vars,
            self.stats.n_clustering_vars
        );

        let separator = if self.opts.lazy {
            let sep = Arc::new(DolloSeparator::new(
                entries.clone(),
                clustering.row_flags().to_vec(),
                clustering.col_flags().to_vec(),
            ));
            Count::set_separator(engine, sep.clone());
            solvers::Sample::set_separator(engine, sep.clone());
            Some(sep)
        } else {
            None
        };

        let mut card = Cnf::new();
        let mut adder = BinaryAdder::new(true_lit);
        adder.encode_leq(
            &entries.false_negs(),
            self.bounds.false_negatives,
            &mut card,
            &mut self.var_manager,
        )?;
        adder.encode_leq(
            &entries.false_poss(),
            self.bounds.false_positives,
            &mut card,
            &mut self.var_manager,
        )?;
        adder.encode_eq(
            clustering.row_flags(),
            self.bounds.row_duplicates,
            &mut card,
            &mut self.var_manager,
        )?;
        adder.encode_eq(
            clustering.col_flags(),
            self.bounds.col_duplicates,
            &mut card,
            &mut self.var_manager,
        )?;
        self.stats.n_cardinality_vars = adder.n_vars();
        self.stats.n_cardinality_clauses = card.len();

        let mut cnf = Cnf::new();
        cnf.add_unit(true_lit);
        entries.encode_conflicts(&mut cnf);
        self.stats.n_conflict_clauses = cnf.len() - 1;
        clustering.encode(|p, c| entries.labels(p, c), &mut cnf);
        self.stats.n_clustering_clauses = clustering.n_clauses();
        if let Some(sep) = &separator {
            log::debug!(
                target: crate::log::targets::INIT,
                "forbidden submatrices are separated on demand"
            );
            debug_assert_eq!(sep.n_calls(), 0);
        } else {
            let eager = DolloSeparator::new(
                entries.clone(),
                clustering.row_flags().to_vec(),
                clustering.col_flags().to_vec(),
            );
            self.stats.n_forbidden_clauses = eager.encode_eager(&mut cnf);
        }
        let n_before_no_loss = cnf.len();
        for &c in &self.opts.no_loss {
            entries.encode_no_loss(c, &mut cnf);
        }
        self.stats.n_no_loss_clauses = cnf.len() - n_before_no_loss;
        cnf.extend(card);

        let max_var = self.var_manager.max_var().unwrap_or(true_lit.var());
        self.stats.n_vars = self.var_manager.n_used();
        engine.reserve(max_var)?;
        engine.set_sampling_set((0..=max_var.idx32()).map(Var::new).collect())?;
        for clause in cnf.iter() {
            engine.add_clause(clause.clone())?;
        }
        log::info!(
            target: crate::log::targets::INIT,
            "{}x{} matrix encoded with {} variables and {} clauses ({} forbidden submatrix clauses{})",
            m,
            n,
            self.stats.n_vars,
            cnf.len(),
            self.stats.n_forbidden_clauses,
            if self.opts.lazy { ", lazy" } else { "" }
        );
        debug_assert_eq!(cnf.len(), self.stats.n_clauses());

        self.encoding = Some(Encoding {
            true_lit,
            entries,
            clustering,
            separator,
            cnf,
            max_var,
        });
        self.phase = Phase::Initialized;
        Ok(())
    }

    /// Counts the solutions with the engine
    ///
    /// # Errors
    ///
    /// [`Error::Phase`] before initialization, [`Error::Engine`] if counting
    /// fails.
    pub fn count<E: Count>(&mut self, engine: &mut E) -> Result<SolCount, Error> {
        self.expect_phase(&[Phase::Initialized, Phase::Sampled])?;
        let count = engine.count()?;
        log::info!(
            target: crate::log::targets::SAMPLING,
            "estimated {count} solutions"
        );
        Ok(count)
    }

    /// Counts the solutions and draws `n_samples` decoded and validated
    /// samples. If no solution exists, the result is empty.
    ///
    /// # Errors
    ///
    /// - [`Error::Phase`] before initialization
    /// - [`Error::Engine`] if counting or sampling fails
    /// - [`Error::Decode`] or [`Error::Validation`] if a model is inconsistent
    ///   with the encoding
    pub fn sample<E>(&mut self, engine: &mut E, n_samples: usize) -> Result<Vec<Sample>, Error>
    where
        E: Count + solvers::Sample,
    {
        let count = self.count(engine)?;
        if count.is_zero() {
            log::info!(
                target: crate::log::targets::SAMPLING,
                "no completion within the bounds exists"
            );
            self.phase = Phase::Sampled;
            return Ok(vec![]);
        }
        let models = solvers::Sample::sample(engine, &count, n_samples)?;
        let samples = models
            .iter()
            .map(|model| self.process(model))
            .collect::<Result<Vec<_>, _>>()?;
        self.stats.n_samples += samples.len();
        log::info!(
            target: crate::log::targets::SAMPLING,
            "drew {} samples",
            samples.len()
        );
        if let Some(sep) = self.separator() {
            log::info!(
                target: crate::log::targets::SAMPLING,
                "separator: {} calls, {} clauses",
                sep.n_calls(),
                sep.n_clauses()
            );
        }
        self.phase = Phase::Sampled;
        Ok(samples)
    }

    /// Decodes and validates a model
    ///
    /// # Errors
    ///
    /// [`Error::Phase`] before initialization, [`Error::Decode`] or
    /// [`Error::Validation`] if the model is inconsistent with the encoding.
    pub fn process(&self, model: &Assignment) -> Result<Sample, Error> {
        let enc = self.encoding()?;
        if !model.is_true(enc.true_lit) {
            return Err(Error::Validation(
                "constant true literal is false".to_string(),
            ));
        }
        let matrix = enc.entries.decode_matrix(model)?;
        let sample = Sample {
            matrix,
            row_flags: enc
                .clustering
                .row_flags()
                .iter()
                .map(|&l| model.is_true(l))
                .collect(),
            col_flags: enc
                .clustering
                .col_flags()
                .iter()
                .map(|&l| model.is_true(l))
                .collect(),
        };
        self.validate(model, &enc.entries, &enc.clustering, &sample)?;
        Ok(sample)
    }

    /// The clauses passed to the engine. Clauses found on demand by the
    /// separator are not included.
    ///
    /// # Errors
    ///
    /// [`Error::Phase`] before initialization.
    pub fn cnf(&self) -> Result<&Cnf, Error> {
        Ok(&self.encoding()?.cnf)
    }

    /// Writes the clauses passed to the engine in DIMACS format together with
    /// the sampling set
    ///
    /// # Errors
    ///
    /// [`Error::Phase`] before initialization, [`Error::Io`] if writing fails.
    pub fn write_dimacs<W: io::Write>(&self, writer: &mut W) -> Result<(), Error> {
        let enc = self.encoding()?;
        let sampling_set: Vec<Var> = (0..=enc.max_var.idx32()).map(Var::new).collect();
        enc.cnf.write_dimacs(writer, Some(enc.max_var))?;
        fio::dimacs::write_sampling_set(writer, &sampling_set)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the clauses passed to the engine to a file, see
    /// [`DolloSampler::write_dimacs`]
    ///
    /// # Errors
    ///
    /// [`Error::Phase`] before initialization, [`Error::Io`] if the file
    /// cannot be written.
    pub fn write_dimacs_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut writer = fio::open_compressed_uncompressed_write(path)?;
        self.write_dimacs(&mut writer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DolloSampler, Phase};
    use crate::{
        dollo::{forbidden, Error, Options},
        instances::{Matrix, TernaryMatrix},
        solvers::{Count, Engine, Sample, Separate, SolCount},
        types::{Assignment, Clause, Var},
    };

    /// Engine recording everything it is given
    #[derive(Default)]
    struct Recorder {
        max_var: Option<Var>,
        sampling_set: Vec<Var>,
        clauses: Vec<Clause>,
        n_separators: usize,
    }

    impl Extend<Clause> for Recorder {
        fn extend<T: IntoIterator<Item = Clause>>(&mut self, iter: T) {
            self.clauses.extend(iter);
        }
    }

    impl Engine for Recorder {
        fn signature(&self) -> &'static str {
            "recorder"
        }

        fn reserve(&mut self, max_var: Var) -> anyhow::Result<()> {
            self.max_var = Some(max_var);
            Ok(())
        }

        fn add_clause(&mut self, clause: Clause) -> anyhow::Result<()> {
            self.clauses.push(clause);
            Ok(())
        }

        fn set_sampling_set(&mut self, vars: Vec<Var>) -> anyhow::Result<()> {
            self.sampling_set = vars;
            Ok(())
        }
    }

    impl Count for Recorder {
        fn set_separator(&mut self, _separator: Arc<dyn Separate>) {
            self.n_separators += 1;
        }

        fn count(&mut self) -> anyhow::Result<SolCount> {
            Ok(SolCount::default())
        }
    }

    impl Sample for Recorder {
        fn set_separator(&mut self, _separator: Arc<dyn Separate>) {
            self.n_separators += 1;
        }

        fn sample(&mut self, _count: &SolCount, _n: usize) -> anyhow::Result<Vec<Assignment>> {
            Ok(vec![])
        }
    }

    fn matrix() -> Matrix {
        Matrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap()
    }

    #[test]
    fn phases() {
        let mut sampler = DolloSampler::new(matrix(), Options::default()).unwrap();
        let mut engine = Recorder::default();
        assert!(matches!(
            sampler.sample(&mut engine, 1),
            Err(Error::Phase {
                found: Phase::Constructed,
                ..
            })
        ));
        sampler.init(&mut engine).unwrap();
        assert_eq!(sampler.phase(), Phase::Initialized);
        assert!(matches!(
            sampler.init(&mut engine),
            Err(Error::Phase { .. })
        ));
        assert!(sampler.sample(&mut engine, 3).unwrap().is_empty());
        assert_eq!(sampler.phase(), Phase::Sampled);
    }

    #[test]
    fn submitted_formula() {
        let mut sampler = DolloSampler::new(matrix(), Options::default()).unwrap();
        let mut engine = Recorder::default();
        sampler.init(&mut engine).unwrap();
        let stats = sampler.stats().clone();
        assert_eq!(stats.n_entry_vars, 12);
        assert_eq!(stats.n_conflict_clauses, 6);
        assert_eq!(stats.n_forbidden_clauses, 6 * forbidden::N_PATTERNS);
        assert_eq!(stats.n_no_loss_clauses, 0);
        assert_eq!(engine.clauses.len(), stats.n_clauses());
        assert_eq!(engine.clauses.len(), sampler.cnf().unwrap().len());
        assert_eq!(engine.max_var, Some(Var::new(stats.n_vars - 1)));
        assert_eq!(engine.sampling_set.len(), stats.n_vars as usize);
        assert_eq!(engine.n_separators, 0);
        // the first clause fixes the constant true literal
        assert_eq!(engine.clauses[0].len(), 1);
        assert!(engine.clauses[0][0].is_pos());
    }

    #[test]
    fn lazy_registers_separator() {
        let opts = Options::default().lazy(true).no_loss([1]);
        let mut sampler = DolloSampler::new(matrix(), opts).unwrap();
        let mut engine = Recorder::default();
        sampler.init(&mut engine).unwrap();
        assert_eq!(engine.n_separators, 2);
        assert_eq!(sampler.stats().n_forbidden_clauses, 0);
        assert_eq!(sampler.stats().n_no_loss_clauses, 3);
        assert!(sampler.separator().is_some());
    }

    #[test]
    fn process_requires_clustering_values() {
        let input = Matrix::from_rows(vec![vec![1, 0], vec![1, 1]]).unwrap();
        let mut sampler = DolloSampler::new(input, Options::default()).unwrap();
        let mut engine = Recorder::default();
        sampler.init(&mut engine).unwrap();
        let enc = sampler.encoding().unwrap();
        let mut model = Assignment::default();
        model.assign_lit(enc.true_lit);
        for p in 0..2 {
            for c in 0..2 {
                model.assign_lit(!enc.entries.loss(p, c));
                let flip = enc.entries.false_neg(p, c).or(enc.entries.false_pos(p, c));
                model.assign_lit(!flip.unwrap());
            }
        }
        assert_eq!(
            enc.entries.decode_matrix(&model).unwrap(),
            TernaryMatrix::from_digits(&[vec![1, 0], vec![1, 1]])
        );
        // the equality of the two cells of row 1 is left false
        assert!(matches!(
            sampler.process(&model),
            Err(Error::Validation(_))
        ));
    }
}
