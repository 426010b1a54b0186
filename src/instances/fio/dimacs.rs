//! # Writing DIMACS CNF Files
//!
//! Used to dump the built k-Dollo formula for external counters and
//! samplers.
//!
//! ## References
//!
//! - [DIMACS CNF](http://www.satcompetition.org/2011/format-benchmarks2011.html)

use std::io::{self, Write};

use crate::{
    instances::Cnf,
    types::{Clause, Var},
};

/// Writes a CNF to a DIMACS CNF file
///
/// # Errors
///
/// If writing fails.
pub fn write_cnf_annotated<W: Write>(
    writer: &mut W,
    cnf: &Cnf,
    max_var: Option<Var>,
) -> Result<(), io::Error> {
    writeln!(writer, "c CNF file written by lumberjack")?;
    writeln!(
        writer,
        "p cnf {} {}",
        if let Some(max_var) = max_var {
            max_var.pos_lit().to_ipasir()
        } else {
            0
        },
        cnf.len()
    )?;
    cnf.iter().try_for_each(|cl| write_clause(writer, cl))?;
    writer.flush()
}

/// Writes a sampling set declaration in the `c ind ... 0` convention of
/// projected counters and samplers
///
/// # Errors
///
/// If writing fails.
pub fn write_sampling_set<W: Write>(writer: &mut W, vars: &[Var]) -> Result<(), io::Error> {
    for chunk in vars.chunks(10) {
        write!(writer, "c ind ")?;
        chunk
            .iter()
            .try_for_each(|v| write!(writer, "{} ", v.to_ipasir()))?;
        writeln!(writer, "0")?;
    }
    Ok(())
}

fn write_clause<W: Write>(writer: &mut W, clause: &Clause) -> Result<(), io::Error> {
    clause
        .iter()
        .try_for_each(|l| write!(writer, "{} ", l.to_ipasir()))?;
    writeln!(writer, "0")
}
