//! # Clauses
//!
//! The only constraint type the encodings emit. Order and duplication of
//! literals inside a clause carry no meaning.

use std::{fmt, ops};

use itertools::Itertools;

use super::{Assignment, Lit, RsHashSet, TernaryVal};

/// Type representing a clause.
/// Wrapper around a std collection to allow for changing the data structure.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Default, Hash)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    /// Creates a new empty clause
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty clause with at least the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lits: Vec::with_capacity(capacity),
        }
    }

    /// Adds a literal to the clause
    pub fn add(&mut self, lit: Lit) {
        self.lits.push(lit);
    }

    /// Normalizes the clause. This includes sorting the literals, removing
    /// duplicates and removing the entire clause if it is a tautology.
    /// Comparing two normalized clauses checks their logical equivalence.
    #[must_use]
    pub fn normalize(mut self) -> Option<Self> {
        if self.len() <= 1 {
            return Some(self);
        }
        self.lits.sort_unstable();
        self.lits.dedup();
        // Complementary literals end up adjacent after sorting
        if self.lits.windows(2).any(|w| w[0] == !w[1]) {
            return None;
        }
        Some(self)
    }

    /// Sanitizes the clause. This removes duplicates and the entire clause if
    /// it is a tautology while preserving the order of the literals.
    #[must_use]
    pub fn sanitize(mut self) -> Option<Self> {
        if self.len() <= 1 {
            return Some(self);
        }
        let mut lset = RsHashSet::default();
        let mut idx = 0;
        while idx < self.len() {
            let l = self.lits[idx];
            if lset.contains(&!l) {
                return None;
            }
            if lset.contains(&l) {
                self.lits.remove(idx);
            } else {
                lset.insert(l);
                idx += 1;
            }
        }
        Some(self)
    }

    /// Evaluates a clause under a given assignment
    #[must_use]
    pub fn evaluate(&self, assignment: &Assignment) -> TernaryVal {
        self.iter()
            .fold(TernaryVal::False, |val, l| match assignment.lit_value(*l) {
                TernaryVal::True => TernaryVal::True,
                TernaryVal::DontCare => {
                    if val == TernaryVal::False {
                        TernaryVal::DontCare
                    } else {
                        val
                    }
                }
                TernaryVal::False => val,
            })
    }

    /// Checks whether the clause is tautological
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.lits
            .iter()
            .enumerate()
            .any(|(idx, &l1)| self.lits[idx + 1..].iter().any(|&l2| l1 == !l2))
    }
}

impl ops::Deref for Clause {
    type Target = [Lit];

    fn deref(&self) -> &Self::Target {
        &self.lits
    }
}

impl ops::DerefMut for Clause {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.lits
    }
}

impl AsRef<[Lit]> for Clause {
    fn as_ref(&self) -> &[Lit] {
        &self.lits
    }
}

impl<const N: usize> From<[Lit; N]> for Clause {
    fn from(value: [Lit; N]) -> Self {
        Self {
            lits: Vec::from(value),
        }
    }
}

impl From<&[Lit]> for Clause {
    fn from(value: &[Lit]) -> Self {
        Self {
            lits: Vec::from(value),
        }
    }
}

impl Extend<Lit> for Clause {
    fn extend<T: IntoIterator<Item = Lit>>(&mut self, iter: T) {
        self.lits.extend(iter);
    }
}

impl IntoIterator for Clause {
    type Item = Lit;

    type IntoIter = std::vec::IntoIter<Lit>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.lits.into_iter()
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Lit;

    type IntoIter = std::slice::Iter<'a, Lit>;

    fn into_iter(self) -> Self::IntoIter {
        self.lits.iter()
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<T: IntoIterator<Item = Lit>>(iter: T) -> Self {
        Self {
            lits: Vec::from_iter(iter),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.iter().format("|"))
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Creates a clause from a list of literals
///
/// # Examples
///
/// ```
/// use lumberjack::{clause, lit};
///
/// let cl = clause![lit![0], !lit![1]];
/// assert_eq!(cl.len(), 2);
/// ```
#[macro_export]
macro_rules! clause {
    () => {
        $crate::types::Clause::new()
    };
    ( $($l:expr),* $(,)? ) => {
        {
            let mut tmp_clause = $crate::types::Clause::new();
            $(
                tmp_clause.add($l);
            )*
            tmp_clause
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{
        lit,
        types::{Assignment, TernaryVal},
    };

    #[test]
    fn normalize_sorts_and_dedups() {
        let cl = clause![lit![3], lit![1], lit![3], !lit![2]];
        assert_eq!(
            cl.normalize(),
            Some(clause![lit![1], !lit![2], lit![3]])
        );
    }

    #[test]
    fn normalize_drops_tautology() {
        let cl = clause![lit![1], lit![0], !lit![1]];
        assert!(cl.is_tautology());
        assert_eq!(cl.normalize(), None);
    }

    #[test]
    fn sanitize_keeps_order() {
        let cl = clause![lit![4], lit![2], lit![4]];
        assert_eq!(cl.sanitize(), Some(clause![lit![4], lit![2]]));
        assert_eq!(clause![lit![4], !lit![4]].sanitize(), None);
    }

    #[test]
    fn evaluate() {
        let assign = Assignment::from(vec![TernaryVal::True, TernaryVal::False]);
        assert_eq!(clause![!lit![0], lit![1]].evaluate(&assign), TernaryVal::False);
        assert_eq!(clause![lit![1], lit![0]].evaluate(&assign), TernaryVal::True);
        assert_eq!(
            clause![lit![1], lit![2]].evaluate(&assign),
            TernaryVal::DontCare
        );
        assert_eq!(clause![].evaluate(&assign), TernaryVal::False);
    }
}
