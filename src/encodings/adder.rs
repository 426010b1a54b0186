//! # Binary Adder Cardinality Encoding
//!
//! Counts the true literals of a set with a tree of ripple-carry adders and
//! compares the resulting binary number against a constant. Numbers are
//! little-endian vectors of literals (least significant bit first); the
//! constant bits are the true literal and its negation, so the caller must
//! fix the true literal with a unit clause.
//!
//! The clause count is linear in the number of input literals times the bit
//! width of their sum.

use crate::{
    clause,
    encodings::{
        gates::{self, Output},
        CollectClauses, EncodeStats, Error,
    },
    instances::ManageVars,
    types::{Clause, Lit},
    utils,
};

/// Largest number of bits a constant may have
const MAX_BITS: u32 = 32;

/// Encoder for `sum(lits) <= k` and `sum(lits) = k`
#[derive(Debug, Clone)]
pub struct BinaryAdder {
    /// Literal fixed to true by the caller
    true_lit: Lit,
    /// The number of variables
    n_vars: u32,
    /// The number of clauses
    n_clauses: usize,
}

impl BinaryAdder {
    /// Creates a new adder over a literal that the caller fixes to true
    #[must_use]
    pub fn new(true_lit: Lit) -> Self {
        BinaryAdder {
            true_lit,
            n_vars: 0,
            n_clauses: 0,
        }
    }

    /// The constant false bit
    #[inline]
    #[must_use]
    pub fn false_lit(&self) -> Lit {
        !self.true_lit
    }

    /// Pads a number with constant false bits to a given width
    fn pad(&self, num: &[Lit], width: usize) -> Vec<Lit> {
        let mut padded = num.to_vec();
        padded.resize(std::cmp::max(width, num.len()), self.false_lit());
        padded
    }

    /// Records the variables and clauses produced by `encode`
    fn track<Col, T>(
        &mut self,
        collector: &mut Col,
        var_manager: &mut dyn ManageVars,
        encode: impl FnOnce(&Self, &mut Col, &mut dyn ManageVars) -> T,
    ) -> T
    where
        Col: CollectClauses,
    {
        let n_vars_before = var_manager.n_used();
        let n_clauses_before = collector.n_clauses();
        let res = encode(self, collector, var_manager);
        self.n_vars += var_manager.n_used() - n_vars_before;
        self.n_clauses += collector.n_clauses() - n_clauses_before;
        res
    }

    /// Adds two numbers. Both are padded to the same width `w` and the result
    /// has `w + 1` bits, so the addition never overflows.
    pub fn add<Col>(
        &mut self,
        a: &[Lit],
        b: &[Lit],
        collector: &mut Col,
        var_manager: &mut dyn ManageVars,
    ) -> Vec<Lit>
    where
        Col: CollectClauses,
    {
        self.track(collector, var_manager, |this, collector, var_manager| {
            this.ripple_add(a, b, collector, var_manager)
        })
    }

    fn ripple_add<Col>(
        &self,
        a: &[Lit],
        b: &[Lit],
        collector: &mut Col,
        var_manager: &mut dyn ManageVars,
    ) -> Vec<Lit>
    where
        Col: CollectClauses,
    {
        let width = std::cmp::max(a.len(), b.len());
        if width == 0 {
            return vec![self.false_lit()];
        }
        let a = self.pad(a, width);
        let b = self.pad(b, width);
        let mut result = Vec::with_capacity(width + 1);
        let first = gates::half_adder(
            a[0],
            b[0],
            Output::Fresh,
            Output::Fresh,
            collector,
            var_manager,
        );
        result.push(first.sum);
        let mut carry = first.carry;
        for (&ai, &bi) in a.iter().zip(&b).skip(1) {
            let out = gates::full_adder(
                ai,
                bi,
                carry,
                Output::Fresh,
                Output::Fresh,
                collector,
                var_manager,
            );
            result.push(out.sum);
            carry = out.carry;
        }
        result.push(carry);
        result
    }

    /// Sums up a set of literals, treating each as a one bit number. Adjacent
    /// numbers are added pairwise until one remains. The empty sum is the
    /// single constant false bit.
    pub fn sum<Col>(
        &mut self,
        lits: &[Lit],
        collector: &mut Col,
        var_manager: &mut dyn ManageVars,
    ) -> Vec<Lit>
    where
        Col: CollectClauses,
    {
        if lits.is_empty() {
            return vec![self.false_lit()];
        }
        self.track(collector, var_manager, |this, collector, var_manager| {
            let mut numbers: Vec<Vec<Lit>> = lits.iter().map(|&l| vec![l]).collect();
            while numbers.len() > 1 {
                let mut next = Vec::with_capacity(numbers.len() / 2 + 1);
                let mut iter = numbers.chunks_exact(2);
                for pair in &mut iter {
                    next.push(this.ripple_add(&pair[0], &pair[1], collector, var_manager));
                }
                if let [odd] = iter.remainder() {
                    let width = next.last().map_or(odd.len(), Vec::len);
                    next.push(this.pad(odd, width));
                }
                numbers = next;
            }
            numbers.pop().unwrap_or_default()
        })
    }

    /// Encodes a constant as bits over the true literal. The width is the
    /// number of binary digits of `k`, at least one.
    ///
    /// # Errors
    ///
    /// [`Error::BitWidth`] if `k` needs more than 32 bits.
    pub fn constant(&self, k: usize) -> Result<Vec<Lit>, Error> {
        if u32::try_from(k).is_err() {
            return Err(Error::BitWidth {
                value: k,
                max_bits: MAX_BITS,
            });
        }
        let width = utils::digits(k, 2);
        Ok((0..width)
            .map(|i| {
                if (k >> i) & 1 == 1 {
                    self.true_lit
                } else {
                    self.false_lit()
                }
            })
            .collect())
    }

    /// Asserts that two numbers are equal, with at most two clauses per bit.
    /// Clauses between two constant bits that hold trivially are skipped.
    pub fn equal<Col>(&mut self, a: &[Lit], b: &[Lit], collector: &mut Col)
    where
        Col: CollectClauses,
    {
        let width = std::cmp::max(a.len(), b.len());
        let a = self.pad(a, width);
        let b = self.pad(b, width);
        let n_clauses_before = collector.n_clauses();
        collector.extend(
            a.iter()
                .zip(&b)
                .flat_map(|(&ai, &bi)| [clause![!ai, bi], clause![ai, !bi]])
                .filter_map(Clause::sanitize),
        );
        self.n_clauses += collector.n_clauses() - n_clauses_before;
    }

    /// Returns a literal that is true iff `a <= b`. Computes `b + !a + 1` with
    /// a ripple adder, the final carry being set exactly when `b - a` does
    /// not borrow.
    pub fn leq<Col>(
        &mut self,
        a: &[Lit],
        b: &[Lit],
        collector: &mut Col,
        var_manager: &mut dyn ManageVars,
    ) -> Lit
    where
        Col: CollectClauses,
    {
        self.track(collector, var_manager, |this, collector, var_manager| {
            let width = std::cmp::max(a.len(), b.len());
            let a = this.pad(a, width);
            let b = this.pad(b, width);
            let mut carry = this.true_lit;
            for (&ai, &bi) in a.iter().zip(&b) {
                carry = gates::full_adder(
                    bi,
                    !ai,
                    carry,
                    Output::Fresh,
                    Output::Fresh,
                    collector,
                    var_manager,
                )
                .carry;
            }
            carry
        })
    }

    /// Encodes `sum(lits) = k`. With `k > lits.len()` the encoding is
    /// unsatisfiable.
    ///
    /// # Errors
    ///
    /// [`Error::BitWidth`] if `k` needs more than 32 bits.
    pub fn encode_eq<Col>(
        &mut self,
        lits: &[Lit],
        k: usize,
        collector: &mut Col,
        var_manager: &mut dyn ManageVars,
    ) -> Result<(), Error>
    where
        Col: CollectClauses,
    {
        let k_bits = self.constant(k)?;
        let sum = self.sum(lits, collector, var_manager);
        self.equal(&sum, &k_bits, collector);
        log::debug!(
            target: crate::log::targets::ADDER,
            "sum of {} literals = {k}: {} vars, {} clauses so far",
            lits.len(),
            self.n_vars,
            self.n_clauses
        );
        Ok(())
    }

    /// Encodes `sum(lits) <= k`. Bounds of at least `lits.len()` hold
    /// trivially and produce no clauses.
    ///
    /// # Errors
    ///
    /// [`Error::BitWidth`] if `k` needs more than 32 bits.
    pub fn encode_leq<Col>(
        &mut self,
        lits: &[Lit],
        k: usize,
        collector: &mut Col,
        var_manager: &mut dyn ManageVars,
    ) -> Result<(), Error>
    where
        Col: CollectClauses,
    {
        let k_bits = self.constant(k)?;
        if k >= lits.len() {
            log::debug!(
                target: crate::log::targets::ADDER,
                "sum of {} literals <= {k} holds trivially",
                lits.len()
            );
            return Ok(());
        }
        let sum = self.sum(lits, collector, var_manager);
        let holds = self.leq(&sum, &k_bits, collector, var_manager);
        collector.extend([clause![holds]]);
        self.n_clauses += 1;
        log::debug!(
            target: crate::log::targets::ADDER,
            "sum of {} literals <= {k}: {} vars, {} clauses so far",
            lits.len(),
            self.n_vars,
            self.n_clauses
        );
        Ok(())
    }
}

impl EncodeStats for BinaryAdder {
    fn n_clauses(&self) -> usize {
        self.n_clauses
    }

    fn n_vars(&self) -> u32 {
        self.n_vars
    }
}
