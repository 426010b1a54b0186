//! # lumberjack - Sampling k-Dollo Completions with SAT
//!
//! `lumberjack` corrects a noisy binary presence/absence matrix (rows are
//! cells/taxa, columns are mutations/characters) into ternary matrices that
//! admit a 1-Dollo phylogeny. Every character is gained once and lost at most
//! once, up to a bounded number of false positives and false negatives, with
//! near-identical rows and columns collapsed into a fixed number of clusters.
//!
//! The problem is compiled into CNF. Solving, approximate counting and
//! (near-)uniform sampling are delegated to an external engine through the
//! traits in [`solvers`].
//!
//! ## Crate Layout
//!
//! - [`types`]: variables, literals, clauses and assignments
//! - [`instances`]: variable management, CNF formulas and input/output matrices
//! - [`encodings`]: Tseitin gates, the binary adder cardinality encoding and
//!   the row/column clustering encoding
//! - [`solvers`]: the boundary towards counting and sampling engines
//! - [`dollo`]: the k-Dollo sampler, its separation oracle and self-checks
//!
//! ## Features
//!
//! | Feature name | Description |
//! | --- | --- |
//! | `internals` | Make some internal helpers of the encodings public. |
//! | `fxhash` | Use the faster firefox hash function from `rustc-hash`. |
//! | `compression` | Enable parsing and writing compressed matrices. |
//! | `serde` | Derive `serde` traits for matrices and options. |
//!
//! ## Example
//!
//! ```
//! use lumberjack::{dollo::Options, instances::Matrix};
//!
//! let matrix = Matrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
//! let opts = Options::default().fn_rate(0.).fp_rate(0.);
//! let sampler = lumberjack::dollo::DolloSampler::new(matrix, opts).unwrap();
//! assert_eq!(sampler.phase(), lumberjack::dollo::Phase::Constructed);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dollo;
pub mod encodings;
pub mod instances;
pub mod log;
pub mod solvers;
pub mod types;

mod utils;
