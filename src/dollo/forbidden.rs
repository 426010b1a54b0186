//! # Forbidden Submatrices
//!
//! A ternary matrix admits a 1-Dollo phylogeny iff none of its 3x2
//! submatrices, rows and columns taken in any order, equals one of the
//! patterns below. Patterns are written row-major: the first two digits are
//! the first row.
//!
//! The catalogue is closed under swapping the two columns (up to reordering
//! the rows), so checking ordered row triples against column pairs `c1 < c2`
//! suffices.

use crate::instances::CharState;

/// Number of forbidden patterns
pub const N_PATTERNS: usize = 25;

/// The forbidden 3x2 patterns
pub const PATTERNS: [&str; N_PATTERNS] = [
    "100111", "100112", "100121", "100122", "100211", "100212", "100221", "100222", "110212",
    "110222", "200111", "200112", "200121", "200122", "200211", "200212", "200221", "200222",
    "201121", "201122", "201221", "201222", "210212", "210222", "211222",
];

const N_CODES: usize = 729;

/// Membership of every base-3 code of a 3x2 ternary matrix
const LOOKUP: [bool; N_CODES] = build_lookup();

const fn build_lookup() -> [bool; N_CODES] {
    let mut lookup = [false; N_CODES];
    let mut idx = 0;
    while idx < N_PATTERNS {
        let digits = PATTERNS[idx].as_bytes();
        let mut code = 0;
        let mut pos = 0;
        while pos < 6 {
            code = code * 3 + (digits[pos] - b'0') as usize;
            pos += 1;
        }
        lookup[code] = true;
        idx += 1;
    }
    lookup
}

/// The base-3 code of a 3x2 submatrix given row-major
#[inline]
#[must_use]
pub fn code(cells: &[CharState; 6]) -> usize {
    cells
        .iter()
        .fold(0, |code, &state| code * 3 + state.digit() as usize)
}

/// Checks whether a 3x2 submatrix given row-major is forbidden
#[inline]
#[must_use]
pub fn is_forbidden(cells: &[CharState; 6]) -> bool {
    LOOKUP[code(cells)]
}

/// Iterates over the patterns as cell states
pub fn patterns() -> impl Iterator<Item = [CharState; 6]> {
    PATTERNS.iter().map(|pattern| {
        let mut cells = [CharState::Absent; 6];
        for (cell, digit) in cells.iter_mut().zip(pattern.bytes()) {
            // all patterns are over the digits 0 to 2
            *cell = CharState::ALL[usize::from(digit - b'0')];
        }
        cells
    })
}

#[cfg(test)]
mod tests {
    use super::{is_forbidden, patterns, N_PATTERNS, PATTERNS};
    use crate::{instances::CharState, types::RsHashSet};

    fn swap_cols(cells: &[CharState; 6]) -> [CharState; 6] {
        [cells[1], cells[0], cells[3], cells[2], cells[5], cells[4]]
    }

    fn row_orders(cells: &[CharState; 6]) -> Vec<[CharState; 6]> {
        let rows = [[cells[0], cells[1]], [cells[2], cells[3]], [cells[4], cells[5]]];
        [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]]
            .iter()
            .map(|&[a, b, c]| {
                [
                    rows[a][0], rows[a][1], rows[b][0], rows[b][1], rows[c][0], rows[c][1],
                ]
            })
            .collect()
    }

    #[test]
    fn patterns_are_distinct() {
        let set: RsHashSet<_> = PATTERNS.iter().collect();
        assert_eq!(set.len(), N_PATTERNS);
        assert_eq!(patterns().count(), N_PATTERNS);
        assert!(patterns().all(|p| is_forbidden(&p)));
    }

    #[test]
    fn lookup_matches_catalogue() {
        let n_forbidden = (0..729usize)
            .filter(|&code| {
                let mut cells = [CharState::Absent; 6];
                let mut rest = code;
                for cell in cells.iter_mut().rev() {
                    *cell = CharState::ALL[rest % 3];
                    rest /= 3;
                }
                is_forbidden(&cells)
            })
            .count();
        assert_eq!(n_forbidden, N_PATTERNS);
    }

    #[test]
    fn closed_under_column_swap() {
        for pattern in patterns() {
            let swapped = swap_cols(&pattern);
            assert!(
                row_orders(&swapped).iter().any(is_forbidden),
                "{pattern:?}"
            );
        }
    }

    #[test]
    fn three_gametes() {
        use CharState::{Absent, Lost, Present};
        assert!(is_forbidden(&[Present, Absent, Absent, Present, Present, Present]));
        assert!(is_forbidden(&[Lost, Absent, Absent, Lost, Present, Present]));
        // a loss can explain one missing gamete
        assert!(!is_forbidden(&[Present, Lost, Absent, Present, Present, Present]));
        assert!(!is_forbidden(&[Present, Absent, Present, Present, Absent, Absent]));
    }
}
