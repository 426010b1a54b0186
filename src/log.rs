//! # Logging Targets
//!
//! Names passed as `target:` to the [`log`] macros throughout the crate, so
//! that `RUST_LOG` can select individual stages, e.g.
//! `RUST_LOG=separation=trace`.

pub mod targets {
    pub const INIT: &str = "dollo::init";
    pub const SAMPLING: &str = "dollo::sampling";
    pub const VALIDATION: &str = "dollo::validation";
    pub const SEPARATION: &str = "separation";
    pub const ADDER: &str = "encodings::adder";
    pub const CLUSTERING: &str = "encodings::clustering";
    pub const PARSING: &str = "fio";
}
