//! # Tseitin Gates
//!
//! Boolean gates defined by the full equivalence between a gate output and the
//! gate function of its inputs. Outputs are fresh variables unless the caller
//! asks for the definition to be written onto an existing literal.

use crate::{
    clause,
    encodings::CollectClauses,
    instances::ManageVars,
    types::Lit,
};

/// Where a gate writes its output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Output {
    /// Allocate a fresh variable for the output
    #[default]
    Fresh,
    /// Define the given literal as the output
    Reuse(Lit),
}

impl Output {
    #[inline]
    fn lit(self, var_manager: &mut dyn ManageVars) -> Lit {
        match self {
            Output::Fresh => var_manager.new_lit(),
            Output::Reuse(lit) => lit,
        }
    }
}

/// Defines `r <-> (a & b)`
pub fn and<Col>(
    a: Lit,
    b: Lit,
    out: Output,
    collector: &mut Col,
    var_manager: &mut dyn ManageVars,
) -> Lit
where
    Col: CollectClauses,
{
    let r = out.lit(var_manager);
    collector.extend([clause![r, !a, !b], clause![!r, a], clause![!r, b]]);
    r
}

/// Defines `r <-> (a | b)`
pub fn or<Col>(
    a: Lit,
    b: Lit,
    out: Output,
    collector: &mut Col,
    var_manager: &mut dyn ManageVars,
) -> Lit
where
    Col: CollectClauses,
{
    let r = out.lit(var_manager);
    collector.extend([clause![!r, a, b], clause![r, !a], clause![r, !b]]);
    r
}

/// Defines `r <-> (a ^ b)`
pub fn xor<Col>(
    a: Lit,
    b: Lit,
    out: Output,
    collector: &mut Col,
    var_manager: &mut dyn ManageVars,
) -> Lit
where
    Col: CollectClauses,
{
    let r = out.lit(var_manager);
    collector.extend([
        clause![!r, a, b],
        clause![!r, !a, !b],
        clause![r, a, !b],
        clause![r, !a, b],
    ]);
    r
}

/// Sum and carry bit of an adder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SumCarry {
    pub sum: Lit,
    pub carry: Lit,
}

/// Half adder: `sum <-> a ^ b`, `carry <-> a & b`
pub fn half_adder<Col>(
    a: Lit,
    b: Lit,
    sum: Output,
    carry: Output,
    collector: &mut Col,
    var_manager: &mut dyn ManageVars,
) -> SumCarry
where
    Col: CollectClauses,
{
    let sum = xor(a, b, sum, collector, var_manager);
    let carry = and(a, b, carry, collector, var_manager);
    SumCarry { sum, carry }
}

/// Full adder built from two half adders, the carries combined by an OR gate
pub fn full_adder<Col>(
    a: Lit,
    b: Lit,
    c: Lit,
    sum: Output,
    carry: Output,
    collector: &mut Col,
    var_manager: &mut dyn ManageVars,
) -> SumCarry
where
    Col: CollectClauses,
{
    let first = half_adder(a, b, Output::Fresh, Output::Fresh, collector, var_manager);
    let second = half_adder(first.sum, c, sum, Output::Fresh, collector, var_manager);
    let carry = or(first.carry, second.carry, carry, collector, var_manager);
    SumCarry {
        sum: second.sum,
        carry,
    }
}

#[cfg(test)]
mod tests {
    use super::Output;
    use crate::{
        instances::{BasicVarManager, Cnf, ManageVars},
        lit,
        types::{Lit, RsHashSet, TernaryVal},
        utils::assignments,
        var,
    };

    /// Projections onto the first `n_proj` variables of all models of `cnf`
    /// over `n_vars` variables
    fn projected_models(cnf: &Cnf, n_vars: u32, n_proj: u32) -> RsHashSet<u32> {
        assignments(n_vars)
            .filter(|a| cnf.evaluate(a) == TernaryVal::True)
            .map(|a| {
                (0..n_proj)
                    .filter(|&i| a.is_true(Lit::positive(i)))
                    .fold(0, |bits, i| bits | (1 << i))
            })
            .collect()
    }

    #[test]
    fn and_gate() {
        let mut cnf = Cnf::new();
        let mut vm = BasicVarManager::from_next_free(var![2]);
        let r = super::and(lit![0], lit![1], Output::Fresh, &mut cnf, &mut vm);
        assert_eq!(r, lit![2]);
        assert_eq!(cnf.len(), 3);
        for assign in assignments(3) {
            let expected = assign.is_true(lit![0]) && assign.is_true(lit![1]);
            assert_eq!(
                cnf.evaluate(&assign) == TernaryVal::True,
                assign.is_true(r) == expected
            );
        }
    }

    #[test]
    fn or_gate_reuse() {
        let mut cnf = Cnf::new();
        let mut vm = BasicVarManager::from_next_free(var![3]);
        let r = super::or(lit![0], !lit![1], Output::Reuse(lit![2]), &mut cnf, &mut vm);
        assert_eq!(r, lit![2]);
        assert_eq!(vm.n_used(), 3);
        for assign in assignments(3) {
            let expected = assign.is_true(lit![0]) || assign.is_true(!lit![1]);
            assert_eq!(
                cnf.evaluate(&assign) == TernaryVal::True,
                assign.is_true(r) == expected
            );
        }
    }

    #[test]
    fn xor_gate() {
        let mut cnf = Cnf::new();
        let mut vm = BasicVarManager::from_next_free(var![2]);
        let r = super::xor(lit![0], lit![1], Output::Fresh, &mut cnf, &mut vm);
        assert_eq!(cnf.len(), 4);
        for assign in assignments(3) {
            let expected = assign.is_true(lit![0]) != assign.is_true(lit![1]);
            assert_eq!(
                cnf.evaluate(&assign) == TernaryVal::True,
                assign.is_true(r) == expected
            );
        }
    }

    #[test]
    fn half_adder() {
        let mut cnf = Cnf::new();
        let mut vm = BasicVarManager::from_next_free(var![4]);
        let out = super::half_adder(
            lit![0],
            lit![1],
            Output::Reuse(lit![2]),
            Output::Reuse(lit![3]),
            &mut cnf,
            &mut vm,
        );
        assert_eq!((out.sum, out.carry), (lit![2], lit![3]));
        let models = projected_models(&cnf, 4, 4);
        for inputs in 0..4u32 {
            let total = inputs.count_ones();
            let expected = inputs | ((total & 1) << 2) | ((total >> 1) << 3);
            assert!(models.contains(&expected));
        }
        assert_eq!(models.len(), 4);
    }

    #[test]
    fn full_adder() {
        let mut cnf = Cnf::new();
        let mut vm = BasicVarManager::from_next_free(var![5]);
        let out = super::full_adder(
            lit![0],
            lit![1],
            lit![2],
            Output::Reuse(lit![3]),
            Output::Reuse(lit![4]),
            &mut cnf,
            &mut vm,
        );
        assert_eq!((out.sum, out.carry), (lit![3], lit![4]));
        // two half adders (7 clauses each) and one OR gate
        assert_eq!(cnf.len(), 17);
        let n_vars = vm.n_used();
        let models = projected_models(&cnf, n_vars, 5);
        for inputs in 0..8u32 {
            let total = inputs.count_ones();
            let expected = inputs | ((total & 1) << 3) | ((total >> 1) << 4);
            assert!(models.contains(&expected), "missing model for {inputs:03b}");
        }
        assert_eq!(models.len(), 8);
    }
}
