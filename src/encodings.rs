//! # Encodings to CNF
//!
//! Tseitin gates, a binary adder for cardinality constraints over arbitrary
//! literal sets, and the pairwise-equality encoding used to cluster rows and
//! columns of a ternary matrix.
//!
//! Encodings write their clauses into any [`CollectClauses`] and take fresh
//! variables from a [`crate::instances::ManageVars`].

use thiserror::Error;

pub mod adder;
pub mod atomics;
pub mod clustering;
pub mod gates;

/// Trait for collecting clauses. Mainly used to
/// generically encode into [`crate::instances::Cnf`] or directly into an
/// engine.
pub trait CollectClauses: Extend<crate::types::Clause> {
    /// Gets the number of clauses in the collection
    fn n_clauses(&self) -> usize;
}

/// Errors from encodings
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A constant does not fit the 32 bits the adder supports
    #[error("constant {value} exceeds the supported bit width of {max_bits}")]
    BitWidth { value: usize, max_bits: u32 },
}

/// Trait for encodings that track statistics.
pub trait EncodeStats {
    /// Gets the number of clauses in the encoding
    fn n_clauses(&self) -> usize;

    /// Gets the number of variables in the encoding
    fn n_vars(&self) -> u32;
}
