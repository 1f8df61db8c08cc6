//! The fixed hash policy: seed 1, `h * 31 + v` in wrapping 32-bit
//! arithmetic. Not configurable.

use stencil_schema::member::{HASH_MULTIPLIER, HASH_SEED};

pub const TRUE: i32 = 1231;
pub const FALSE: i32 = 1237;
pub const NULL: i32 = 0;

///
/// Accumulator
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Accumulator(i32);

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    #[must_use]
    pub const fn new() -> Self {
        Self(HASH_SEED)
    }

    #[must_use]
    pub const fn seeded(seed: i32) -> Self {
        Self(seed)
    }

    pub const fn add(&mut self, v: i32) {
        self.0 = self.0.wrapping_mul(HASH_MULTIPLIER).wrapping_add(v);
    }

    #[must_use]
    pub const fn finish(self) -> i32 {
        self.0
    }
}

#[must_use]
pub const fn boolean(v: bool) -> i32 {
    if v { TRUE } else { FALSE }
}

/// `v ^ (v >>> 32)`, truncated to 32 bits.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn fold(v: i64) -> i32 {
    let bits = v as u64;

    (bits ^ (bits >> 32)) as i32
}

/// Bit pattern with every NaN collapsed to one value.
#[must_use]
pub fn canonical_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn float(v: f64) -> i32 {
    fold(canonical_bits(v) as i64)
}

/// 31-polynomial over UTF-16 code units, starting from 0.
#[must_use]
pub fn text(s: &str) -> i32 {
    s.encode_utf16().fold(0_i32, |h, c| {
        h.wrapping_mul(HASH_MULTIPLIER).wrapping_add(i32::from(c))
    })
}

/// Ordered sequence, starting from 1.
pub fn sequence(items: impl IntoIterator<Item = i32>) -> i32 {
    let mut acc = Accumulator::new();
    for v in items {
        acc.add(v);
    }

    acc.finish()
}

/// Order-independent sum, for sets.
pub fn unordered(items: impl IntoIterator<Item = i32>) -> i32 {
    items.into_iter().fold(0_i32, i32::wrapping_add)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_values() {
        assert_eq!(text(""), 0);
        assert_eq!(text("a"), 97);
        assert_eq!(text("ab"), 97 * 31 + 98);
        assert_eq!(fold(1), 1);
        assert_eq!(fold(-1), 0);
        assert_eq!(sequence([]), 1);
        assert_eq!(sequence([5]), 31 + 5);
    }

    #[test]
    fn nan_hashes_consistently() {
        let other_nan = f64::from_bits(f64::NAN.to_bits() | 1);

        assert!(other_nan.is_nan());
        assert_eq!(float(f64::NAN), float(other_nan));
    }

    proptest! {
        #[test]
        fn accumulator_wraps_instead_of_overflowing(values in prop::collection::vec(any::<i32>(), 0..32)) {
            let mut expected: i64 = 1;
            for v in &values {
                expected = (expected * 31 + i64::from(*v)) as i32 as i64;
            }

            prop_assert_eq!(i64::from(sequence(values)), expected);
        }

        #[test]
        fn unordered_ignores_order(mut values in prop::collection::vec(any::<i32>(), 0..16)) {
            let before = unordered(values.clone());
            values.reverse();

            prop_assert_eq!(unordered(values), before);
        }
    }
}
