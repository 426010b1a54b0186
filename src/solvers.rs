//! # Interface to Solving, Counting and Sampling Engines
//!
//! The k-Dollo sampler does not search itself. It hands a finished CNF to an
//! engine, declares the variables over which solutions are counted and sampled
//! and receives full assignments back. This module defines the traits such an
//! engine implements.
//!
//! ## Engines
//!
//! - [`Engine`]: variable reservation, clause input and the sampling set
//! - [`Count`]: (approximate) counting of the solutions projected onto the
//!   sampling set
//! - [`Sample`]: drawing (near-)uniform solutions
//!
//! ## Separation
//!
//! Constraints that are too numerous to add up front can be left to a
//! [`Separate`] implementation. Engines pass every candidate model to the
//! registered separator and only accept it if no clauses are returned,
//! otherwise the returned clauses are added and search resumes.
//!
//! ## Available Engines
//!
//! An engine enumerating solutions with the pure-Rust SAT solver
//! [BatSat](https://github.com/c-cube/batsat) is provided in the
//! `lumberjack-batsat` crate.

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    clause,
    encodings::CollectClauses,
    instances::Cnf,
    types::{Assignment, Clause, Lit, Var},
};

/// Trait for all engines accepting a CNF formula
pub trait Engine: Extend<Clause> {
    /// Gets a signature of the engine implementation
    fn signature(&self) -> &'static str;
    /// Reserves all variables up to and including `max_var`
    ///
    /// # Errors
    ///
    /// A specific implementation might fail to reserve variables
    fn reserve(&mut self, max_var: Var) -> anyhow::Result<()>;
    /// Adds a clause to the engine
    ///
    /// # Errors
    ///
    /// A specific implementation might reject clauses, e.g., after sampling
    fn add_clause(&mut self, clause: Clause) -> anyhow::Result<()>;
    /// Like [`Engine::add_clause`] but for unit clauses
    ///
    /// # Errors
    ///
    /// See [`Engine::add_clause`]
    fn add_unit(&mut self, lit: Lit) -> anyhow::Result<()> {
        self.add_clause(clause![lit])
    }
    /// Like [`Engine::add_clause`] but for clauses with two literals
    ///
    /// # Errors
    ///
    /// See [`Engine::add_clause`]
    fn add_binary(&mut self, lit1: Lit, lit2: Lit) -> anyhow::Result<()> {
        self.add_clause(clause![lit1, lit2])
    }
    /// Adds all clauses from a [`Cnf`] instance
    ///
    /// # Errors
    ///
    /// See [`Engine::add_clause`]
    fn add_cnf(&mut self, cnf: Cnf) -> anyhow::Result<()> {
        cnf.into_iter().try_for_each(|cl| self.add_clause(cl))
    }
    /// Declares the variables that solutions are counted and sampled over
    ///
    /// # Errors
    ///
    /// If a variable has not been reserved
    fn set_sampling_set(&mut self, vars: Vec<Var>) -> anyhow::Result<()>;
}

/// Capability of computing clauses violated by a candidate model that are not
/// part of the formula yet
pub trait Separate: Send + Sync {
    /// Returns clauses falsified by `model`. An empty vector accepts the model.
    fn separate(&self, model: &Assignment) -> Vec<Clause>;
}

/// Trait for engines that can count solutions
pub trait Count: Engine {
    /// Registers a separator consulted on every candidate model. Registering a
    /// second separator replaces the first.
    fn set_separator(&mut self, separator: Arc<dyn Separate>);
    /// Counts the solutions projected onto the sampling set
    ///
    /// # Errors
    ///
    /// If counting fails or exceeds a limit of the engine
    fn count(&mut self) -> anyhow::Result<SolCount>;
}

/// Trait for engines that can sample solutions
pub trait Sample: Engine {
    /// Registers a separator consulted on every candidate model. Registering a
    /// second separator replaces the first.
    fn set_separator(&mut self, separator: Arc<dyn Separate>);
    /// Samples `n_samples` full solutions, using the estimate from a previous
    /// call to [`Count::count`]. Returns fewer samples only if the formula is
    /// unsatisfiable, in which case the vector is empty.
    ///
    /// # Errors
    ///
    /// If sampling fails
    fn sample(&mut self, count: &SolCount, n_samples: usize) -> anyhow::Result<Vec<Assignment>>;
}

/// A (possibly approximate) number of solutions as reported by hashing-based
/// counters: `cell_count * 2^hash_count`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SolCount {
    /// Number of solutions in a cell
    pub cell_count: u64,
    /// Number of hash constraints cutting the solution space into cells
    pub hash_count: u32,
}

impl SolCount {
    /// An exact count
    #[must_use]
    pub fn exact(count: u64) -> Self {
        SolCount {
            cell_count: count,
            hash_count: 0,
        }
    }

    /// Whether no solution exists
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.cell_count == 0
    }

    /// The estimated number of solutions
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(&self) -> f64 {
        self.cell_count as f64 * 2f64.powi(i32::try_from(self.hash_count).unwrap_or(i32::MAX))
    }
}

impl fmt::Display for SolCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hash_count == 0 {
            write!(f, "{}", self.cell_count)
        } else {
            write!(f, "{}*2^{}", self.cell_count, self.hash_count)
        }
    }
}

/// Return value for solving queries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverResult {
    /// The query was found satisfiable
    Sat,
    /// The query was found unsatisfiable
    Unsat,
    /// The query was prematurely interrupted
    Interrupted,
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverResult::Sat => write!(f, "SAT"),
            SolverResult::Unsat => write!(f, "UNSAT"),
            SolverResult::Interrupted => write!(f, "Interrupted"),
        }
    }
}

/// Engine statistics
#[derive(Clone, Debug, PartialEq, Default)]
pub struct EngineStats {
    /// The number of satisfiable queries executed
    pub n_sat: usize,
    /// The number of unsatisfiable queries executed
    pub n_unsat: usize,
    /// The number of candidate models rejected by the separator
    pub n_separated: usize,
    /// The number of clauses added by the separator
    pub n_separation_clauses: usize,
    /// The number of clauses in the engine
    pub n_clauses: usize,
    /// The highest variable in the engine
    pub max_var: Option<Var>,
    /// The average length of the clauses added to the engine
    pub avg_clause_len: f32,
    /// The total CPU time spent solving
    pub cpu_solve_time: Duration,
}

/// Trait for engines that track certain statistics
pub trait EngineStatistics {
    /// Gets the available statistics from the engine
    fn stats(&self) -> EngineStats;
    /// Gets the total number of queries executed
    fn n_solves(&self) -> usize {
        let stats = self.stats();
        stats.n_sat + stats.n_unsat
    }
    /// Gets the number of clauses in the engine
    fn n_clauses(&self) -> usize {
        self.stats().n_clauses
    }
    /// Gets the variable with the highest index in the engine, if any
    fn max_var(&self) -> Option<Var> {
        self.stats().max_var
    }
    /// Gets the total CPU time spent solving
    fn cpu_solve_time(&self) -> Duration {
        self.stats().cpu_solve_time
    }
}

impl<E: Engine + EngineStatistics> CollectClauses for E {
    fn n_clauses(&self) -> usize {
        EngineStatistics::n_clauses(self)
    }
}

#[cfg(test)]
mod tests {
    use super::SolCount;

    #[test]
    fn sol_count_display() {
        assert_eq!(format!("{}", SolCount::exact(12)), "12");
        let approx = SolCount {
            cell_count: 3,
            hash_count: 4,
        };
        assert_eq!(format!("{approx}"), "3*2^4");
        assert!((approx.estimate() - 48.).abs() < f64::EPSILON);
        assert!(SolCount::default().is_zero());
    }
}
