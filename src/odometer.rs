//! Mixed-radix indexing over Cartesian products.
//!
//! A product of lists with sizes `r_0, r_1, ..., r_{n-1}` is addressed by a
//! single integer. Position 0 is the most significant digit and the last
//! position varies fastest, which is exactly the order of a nested-loop
//! (odometer) enumeration. The product is never materialized: any element
//! can be reached directly from its index, and the iterator produces one
//! tuple at a time.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

/// Radices of a mixed-radix number system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedRadix {
    radices: Vec<usize>,
}

impl MixedRadix {
    /// Creates a number system from per-position radices.
    pub fn new(radices: Vec<usize>) -> Self {
        Self { radices }
    }

    /// The radices, most significant first.
    pub fn radices(&self) -> &[usize] {
        &self.radices
    }

    /// Number of addressable tuples: the product of all radices.
    ///
    /// An empty system has exactly one (empty) tuple; a zero radix makes
    /// the whole space empty.
    pub fn total(&self) -> BigUint {
        self.radices
            .iter()
            .fold(BigUint::one(), |acc, &r| acc * BigUint::from(r))
    }

    /// Decomposes `index` into one digit per position.
    ///
    /// Returns `None` if `index` is outside `[0, total)`.
    pub fn digits_at(&self, index: &BigUint) -> Option<Vec<usize>> {
        if *index >= self.total() {
            return None;
        }

        let mut rest = index.clone();
        let mut digits = vec![0usize; self.radices.len()];
        for (slot, &radix) in digits.iter_mut().zip(&self.radices).rev() {
            let radix = BigUint::from(radix);
            *slot = (&rest % &radix).to_usize()?;
            rest /= radix;
        }

        Some(digits)
    }

    /// Recomposes digits into their index.
    ///
    /// Returns `None` if the digit count differs from the radix count or a
    /// digit is not below its radix.
    pub fn index_of(&self, digits: &[usize]) -> Option<BigUint> {
        if digits.len() != self.radices.len() {
            return None;
        }

        let mut index = BigUint::zero();
        for (&digit, &radix) in digits.iter().zip(&self.radices) {
            if digit >= radix {
                return None;
            }
            index = index * BigUint::from(radix) + BigUint::from(digit);
        }

        Some(index)
    }

    /// Lazily enumerates every tuple in index order.
    pub fn iter(&self) -> Odometer<'_> {
        let exhausted = self.radices.iter().any(|&r| r == 0);
        Odometer {
            radices: &self.radices,
            current: vec![0; self.radices.len()],
            exhausted,
        }
    }
}

/// Iterator over the tuples of a [`MixedRadix`], last position fastest.
#[derive(Debug, Clone)]
pub struct Odometer<'a> {
    radices: &'a [usize],
    current: Vec<usize>,
    exhausted: bool,
}

impl Iterator for Odometer<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let item = self.current.clone();

        // Advance like a mechanical counter: bump the last wheel, carry left.
        let mut position = self.radices.len();
        loop {
            if position == 0 {
                self.exhausted = true;
                break;
            }
            position -= 1;
            self.current[position] += 1;
            if self.current[position] < self.radices[position] {
                break;
            }
            self.current[position] = 0;
        }

        Some(item)
    }
}
