//! # "Atomic"/"Trivial" Encodings
//!
//! Implications between literals, cubes and clauses as CNF.

use std::ops::Not;

use crate::{
    clause,
    types::{Clause, Lit},
};

/// Implication of form `a -> b`
#[must_use]
pub fn lit_impl_lit(a: Lit, b: Lit) -> Clause {
    clause![!a, b]
}

/// Implication of form `a -> (b1 | b2 | ... | bm)`
#[must_use]
pub fn lit_impl_clause(a: Lit, b: &[Lit]) -> Clause {
    let mut cl = Clause::from(b);
    cl.add(!a);
    cl
}

/// Implication of form `(a1 & a2 & ... & an) -> b`
#[must_use]
pub fn cube_impl_lit(a: &[Lit], b: Lit) -> Clause {
    let mut cl: Clause = a.iter().copied().map(Not::not).collect();
    cl.add(b);
    cl
}

/// Implication of form `a -> (b1 & b2 & ... & bm)`
pub fn lit_impl_cube(a: Lit, b: &[Lit]) -> impl Iterator<Item = Clause> + '_ {
    b.iter().map(move |bi| clause![!a, *bi])
}

/// Implication of form `(a1 | a2 | ... | an) -> b`
pub fn clause_impl_lit(a: &[Lit], b: Lit) -> impl Iterator<Item = Clause> + '_ {
    a.iter().map(move |ai| clause![!*ai, b])
}

/// Implication of form `(a1 & a2 & ... & an) -> (b1 & b2 & ... & bm)`
pub fn cube_impl_cube<'all>(a: &'all [Lit], b: &'all [Lit]) -> impl Iterator<Item = Clause> + 'all {
    b.iter().map(move |bi| {
        let mut cl: Clause = a.iter().copied().map(Not::not).collect();
        cl.add(*bi);
        cl
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        instances::Cnf,
        lit,
        types::{Assignment, TernaryVal},
        utils::assignments,
    };

    fn holds(cnf: &Cnf, assign: &Assignment) -> bool {
        cnf.evaluate(assign) == TernaryVal::True
    }

    #[test]
    fn cube_impl_lit() {
        let cnf: Cnf = std::iter::once(super::cube_impl_lit(&[lit![0], lit![1]], lit![2])).collect();
        for assign in assignments(3) {
            let expected = !(assign.is_true(lit![0]) && assign.is_true(lit![1]))
                || assign.is_true(lit![2]);
            assert_eq!(holds(&cnf, &assign), expected);
        }
    }

    #[test]
    fn lit_impl_cube_and_clause_impl_lit() {
        let cnf: Cnf = super::lit_impl_cube(lit![0], &[lit![1], lit![2]])
            .chain(super::clause_impl_lit(&[lit![1], lit![2]], lit![3]))
            .collect();
        for assign in assignments(4) {
            let first = !assign.is_true(lit![0])
                || (assign.is_true(lit![1]) && assign.is_true(lit![2]));
            let second =
                !(assign.is_true(lit![1]) || assign.is_true(lit![2])) || assign.is_true(lit![3]);
            assert_eq!(holds(&cnf, &assign), first && second);
        }
    }

    #[test]
    fn cube_impl_cube() {
        let cnf: Cnf = super::cube_impl_cube(&[lit![0], lit![1]], &[lit![2], !lit![3]]).collect();
        assert_eq!(cnf.len(), 2);
        for assign in assignments(4) {
            let expected = !(assign.is_true(lit![0]) && assign.is_true(lit![1]))
                || (assign.is_true(lit![2]) && assign.is_true(!lit![3]));
            assert_eq!(holds(&cnf, &assign), expected);
        }
    }
}
