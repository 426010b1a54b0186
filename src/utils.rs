//! # Library-Internal Utilities

/// Computes the number of digits needed to represent a number in a given base.
/// Saturates at `u32::MAX` in base 1.
#[cfg_attr(feature = "internals", visibility::make(pub))]
#[cfg_attr(docsrs, doc(cfg(feature = "internals")))]
#[must_use]
pub(crate) fn digits(mut number: usize, mut basis: u8) -> u32 {
    debug_assert_ne!(basis, 0);
    if number == 0 {
        return 1;
    }
    if basis == 1 {
        return u32::try_from(number).unwrap_or(u32::MAX);
    }
    let mut digits = 0;
    if basis.is_power_of_two() {
        // optimized version using shift operations
        let mut pow: u8 = 0;
        basis >>= 1;
        while basis > 0 {
            pow += 1;
            basis >>= 1;
        }
        while number > 0 {
            digits += 1;
            number >>= pow;
        }
    } else {
        while number > 0 {
            digits += 1;
            number /= basis as usize;
        }
    }
    digits
}

/// The number of corrections allowed when a fraction `rate` of `total` entries
/// may be flipped, rounded up
#[cfg_attr(feature = "internals", visibility::make(pub))]
#[cfg_attr(docsrs, doc(cfg(feature = "internals")))]
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn noise_bound(rate: f64, total: usize) -> usize {
    debug_assert!((0. ..=1.).contains(&rate));
    let bound = (rate * total as f64).ceil() as usize;
    std::cmp::min(bound, total)
}

/// All assignments over the first `n` variables
#[cfg(test)]
pub(crate) fn assignments(n: u32) -> impl Iterator<Item = crate::types::Assignment> {
    (0..1u32 << n).map(move |bits| {
        (0..n)
            .map(|i| crate::types::Lit::new(i, bits & (1 << i) == 0))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    #[test]
    fn digits_pow_2() {
        assert_eq!(super::digits(0b1111_1101, 2), 8);
        assert_eq!(super::digits(0b1111_1101, 4), 4);
        assert_eq!(super::digits(0b1111_1101, 8), 3);
        assert_eq!(super::digits(0b1111_1101, 16), 2);
    }

    #[test]
    fn digits_base_10() {
        assert_eq!(super::digits(3158, 10), 4);
        assert_eq!(super::digits(123, 10), 3);
    }

    #[test]
    fn noise_bound_rounds_up() {
        assert_eq!(super::noise_bound(0., 12), 0);
        assert_eq!(super::noise_bound(0.25, 3), 1);
        assert_eq!(super::noise_bound(0.34, 3), 2);
        assert_eq!(super::noise_bound(0.5, 4), 2);
        assert_eq!(super::noise_bound(1., 7), 7);
        assert_eq!(super::noise_bound(0.5, 0), 0);
    }
}
