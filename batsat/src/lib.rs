//! # lumberjack-batsat - Enumerating Engine on BatSat for lumberjack
//!
//! Counting and sampling engine for the lumberjack library built on the
//! [BatSat](https://github.com/c-cube/batsat) incremental SAT solver.
//!
//! Solutions are enumerated with blocking clauses over the sampling set.
//! Before a model is accepted, it is passed to the registered separator (if
//! any), and clauses returned by the separator are added to the solver
//! instead. Counting is exact up to a configurable limit and sampling draws
//! uniformly with replacement from the enumerated solutions.
//!
//! # BatSat Version
//!
//! The version of BatSat in this crate is Version 0.6.0.

#![warn(clippy::pedantic)]
#![warn(missing_docs)]

use std::{sync::Arc, time::Duration};

use batsat::{intmap::AsIndex, lbool, SolverInterface};
use cpu_time::ProcessTime;
use lumberjack::{
    solvers::{
        Count, Engine, EngineStatistics, EngineStats, Sample, Separate, SolCount, SolverResult,
    },
    types::{Assignment, Clause, Lit, TernaryVal, Var},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Default limit on the number of enumerated solutions
pub const DEFAULT_MAX_SOLUTIONS: usize = 1 << 20;

/// Errors of the enumerating engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// More solutions than the limit exist
    #[error("more than {0} solutions, increase the limit or use an approximate counter")]
    TooManySolutions(usize),
    /// The solver was interrupted
    #[error("the solver was interrupted")]
    Interrupted,
    /// A variable of the sampling set was not reserved
    #[error("sampling variable {0} was not reserved")]
    Unreserved(Var),
    /// Sampling was requested before counting
    #[error("solutions must be counted before sampling")]
    NotCounted,
    /// The formula changed after the solutions were enumerated
    #[error("clauses cannot be added after the solutions were enumerated")]
    Enumerated,
}

/// Enumerating engine wrapping [`batsat::BasicSolver`]
pub struct EnumSampler {
    internal: batsat::BasicSolver,
    max_var: Option<Var>,
    sampling_set: Option<Vec<Var>>,
    separator: Option<Arc<dyn Separate>>,
    solutions: Option<Vec<Assignment>>,
    max_solutions: usize,
    rng: ChaCha8Rng,
    n_sat: usize,
    n_unsat: usize,
    n_separated: usize,
    n_separation_clauses: usize,
    avg_clause_len: f32,
    cpu_time: Duration,
}

impl Default for EnumSampler {
    fn default() -> Self {
        EnumSampler::new(0)
    }
}

impl EnumSampler {
    /// Creates an engine sampling with a given seed
    #[must_use]
    pub fn new(seed: u64) -> Self {
        EnumSampler {
            internal: batsat::BasicSolver::default(),
            max_var: None,
            sampling_set: None,
            separator: None,
            solutions: None,
            max_solutions: DEFAULT_MAX_SOLUTIONS,
            rng: ChaCha8Rng::seed_from_u64(seed),
            n_sat: 0,
            n_unsat: 0,
            n_separated: 0,
            n_separation_clauses: 0,
            avg_clause_len: 0.,
            cpu_time: Duration::ZERO,
        }
    }

    /// Sets the maximum number of solutions to enumerate
    #[must_use]
    pub fn with_max_solutions(mut self, max_solutions: usize) -> Self {
        self.max_solutions = max_solutions;
        self
    }

    /// All enumerated solutions, if counted already
    #[must_use]
    pub fn solutions(&self) -> Option<&[Assignment]> {
        self.solutions.as_deref()
    }

    /// Gets a reference to the internal [`batsat::BasicSolver`]
    #[must_use]
    pub fn batsat_ref(&self) -> &batsat::BasicSolver {
        &self.internal
    }

    #[inline]
    fn batsat_lit(&mut self, lit: Lit) -> batsat::Lit {
        batsat::Lit::new(self.internal.var_of_int(lit.vidx32() + 1), lit.is_pos())
    }

    #[allow(clippy::cast_precision_loss)]
    #[inline]
    fn update_avg_clause_len(&mut self, clause: &Clause) {
        let n_clauses = self.n_clauses_internal();
        self.avg_clause_len = (self.avg_clause_len * (n_clauses as f32) + clause.len() as f32)
            / (n_clauses + 1) as f32;
    }

    fn n_clauses_internal(&self) -> usize {
        usize::try_from(self.internal.num_clauses()).unwrap_or(usize::MAX)
    }

    fn add_internal(&mut self, clause: &Clause) {
        self.update_avg_clause_len(clause);
        let mut c: Vec<_> = clause.iter().map(|&l| self.batsat_lit(l)).collect();
        self.internal.add_clause_reuse(&mut c);
        if let Some(var) = clause.iter().map(|l| l.var()).max() {
            self.max_var = std::cmp::max(self.max_var, Some(var));
        }
    }

    fn solve_track_stats(&mut self) -> SolverResult {
        let start = ProcessTime::now();
        let ret = match self.internal.solve_limited(&[]) {
            x if x == lbool::TRUE => {
                self.n_sat += 1;
                SolverResult::Sat
            }
            x if x == lbool::FALSE => {
                self.n_unsat += 1;
                SolverResult::Unsat
            }
            _ => SolverResult::Interrupted,
        };
        self.cpu_time += start.elapsed();
        ret
    }

    fn lit_val(&self, lit: Lit) -> TernaryVal {
        let l = batsat::Lit::new(batsat::Var::from_index(lit.vidx() + 1), lit.is_pos());
        match self.internal.value_lit(l) {
            x if x == lbool::TRUE => TernaryVal::True,
            x if x == lbool::FALSE => TernaryVal::False,
            _ => TernaryVal::DontCare,
        }
    }

    /// The current model over all variables
    fn model(&self) -> Assignment {
        let Some(max_var) = self.max_var else {
            return Assignment::default();
        };
        (0..=max_var.idx32())
            .map(|idx| self.lit_val(Lit::positive(idx)))
            .collect::<Vec<_>>()
            .into()
    }

    /// Enumerates all solutions projected onto the sampling set
    fn enumerate(&mut self) -> anyhow::Result<Vec<Assignment>> {
        let sampling_set = match &self.sampling_set {
            Some(vars) => vars.clone(),
            None => self
                .max_var
                .map(|max| (0..=max.idx32()).map(Var::new).collect())
                .unwrap_or_default(),
        };
        let mut solutions = vec![];
        loop {
            match self.solve_track_stats() {
                SolverResult::Sat => (),
                SolverResult::Unsat => break,
                SolverResult::Interrupted => return Err(EngineError::Interrupted.into()),
            }
            let model = self.model();
            if let Some(separator) = self.separator.clone() {
                let cuts = separator.separate(&model);
                if !cuts.is_empty() {
                    self.n_separated += 1;
                    self.n_separation_clauses += cuts.len();
                    cuts.iter().for_each(|cl| self.add_internal(cl));
                    continue;
                }
            }
            let blocking: Clause = model.project(&sampling_set).map(|l| !l).collect();
            solutions.push(model);
            if solutions.len() > self.max_solutions {
                return Err(EngineError::TooManySolutions(self.max_solutions).into());
            }
            if blocking.is_empty() {
                // the only projected solution is the empty one
                break;
            }
            self.add_internal(&blocking);
        }
        log::debug!(
            "enumerated {} solutions with {} separated models",
            solutions.len(),
            self.n_separated
        );
        Ok(solutions)
    }
}

impl Extend<Clause> for EnumSampler {
    fn extend<T: IntoIterator<Item = Clause>>(&mut self, iter: T) {
        iter.into_iter()
            .for_each(|cl| self.add_clause(cl).expect("Error adding clause in extend"));
    }
}

impl Engine for EnumSampler {
    fn signature(&self) -> &'static str {
        "BatSat 0.6.0 (enumeration)"
    }

    fn reserve(&mut self, max_var: Var) -> anyhow::Result<()> {
        self.internal.var_of_int(max_var.idx32() + 1);
        self.max_var = std::cmp::max(self.max_var, Some(max_var));
        Ok(())
    }

    fn add_clause(&mut self, clause: Clause) -> anyhow::Result<()> {
        if self.solutions.is_some() {
            return Err(EngineError::Enumerated.into());
        }
        self.add_internal(&clause);
        Ok(())
    }

    fn set_sampling_set(&mut self, vars: Vec<Var>) -> anyhow::Result<()> {
        if let Some(&var) = vars.iter().find(|&&v| Some(v) > self.max_var) {
            return Err(EngineError::Unreserved(var).into());
        }
        self.sampling_set = Some(vars);
        Ok(())
    }
}

impl Count for EnumSampler {
    fn set_separator(&mut self, separator: Arc<dyn Separate>) {
        self.separator = Some(separator);
    }

    fn count(&mut self) -> anyhow::Result<SolCount> {
        if self.solutions.is_none() {
            let solutions = self.enumerate()?;
            self.solutions = Some(solutions);
        }
        let n_solutions = self.solutions.as_ref().map_or(0, Vec::len);
        Ok(SolCount::exact(u64::try_from(n_solutions)?))
    }
}

impl Sample for EnumSampler {
    fn set_separator(&mut self, separator: Arc<dyn Separate>) {
        self.separator = Some(separator);
    }

    fn sample(&mut self, _count: &SolCount, n_samples: usize) -> anyhow::Result<Vec<Assignment>> {
        let Some(solutions) = &self.solutions else {
            return Err(EngineError::NotCounted.into());
        };
        if solutions.is_empty() {
            return Ok(vec![]);
        }
        let rng = &mut self.rng;
        Ok((0..n_samples)
            .map(|_| solutions[rng.random_range(0..solutions.len())].clone())
            .collect())
    }
}

impl EngineStatistics for EnumSampler {
    fn stats(&self) -> EngineStats {
        EngineStats {
            n_sat: self.n_sat,
            n_unsat: self.n_unsat,
            n_separated: self.n_separated,
            n_separation_clauses: self.n_separation_clauses,
            n_clauses: self.n_clauses_internal(),
            max_var: self.max_var,
            avg_clause_len: self.avg_clause_len,
            cpu_solve_time: self.cpu_time,
        }
    }
}
