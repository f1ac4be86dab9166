//! Capacity of a watermarked document.
//!
//! The addressable space is the exact product of per-sentence variant
//! counts. Capacity is `floor(log2(product))`, computed on the integer
//! itself: summing per-sentence `log2` values in floating point can round
//! across an integer boundary and is never used for capacity.

use num_bigint::BigUint;
use num_traits::One;

use crate::variants::{EnumerationStats, VariantList};

/// Bits contributed by one sentence: `log2(|list|)`.
pub fn per_sentence_bits(list: &VariantList) -> f64 {
    list.bits()
}

/// Exact number of distinct variant combinations of a document.
pub fn num_options(lists: &[VariantList]) -> BigUint {
    lists
        .iter()
        .fold(BigUint::one(), |acc, list| acc * BigUint::from(list.len()))
}

/// `floor(log2(n))` for `n >= 1`; 0 for `n == 0`.
pub fn floor_log2(n: &BigUint) -> u64 {
    n.bits().saturating_sub(1)
}

/// Whole-document capacity in bits.
pub fn capacity(lists: &[VariantList]) -> u64 {
    floor_log2(&num_options(lists))
}

/// Embedding statistics over a corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStats {
    /// Number of sentences.
    pub sentences: usize,
    /// Sentences that fell back to their unmodified text.
    pub fallbacks: usize,
    /// Sum of per-sentence bits (informational, not the capacity).
    pub bits: f64,
    /// Content words (punctuation removed, stopwords excluded).
    pub word_count: usize,
    /// Sum of `log2(tried)` over sentences that tried any combination.
    pub upper_bound: f64,
    /// Summed enumeration counters.
    pub enumeration: EnumerationStats,
}

impl DocumentStats {
    /// Bits per content word, or 0 without content words.
    pub fn bits_per_word(&self) -> f64 {
        if self.word_count == 0 {
            0.0
        } else {
            self.bits / self.word_count as f64
        }
    }

    /// Records one enumerated sentence.
    pub fn record(&mut self, list: &VariantList, stats: EnumerationStats, word_count: usize) {
        self.sentences += 1;
        if list.is_fallback() {
            self.fallbacks += 1;
        }
        self.bits += per_sentence_bits(list);
        self.word_count += word_count;
        if stats.tried > 0 {
            self.upper_bound += (stats.tried as f64).log2();
        }
        self.enumeration += stats;
    }
}
