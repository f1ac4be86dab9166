//! Per-sentence variant enumeration.
//!
//! Every combination of candidates is checked in odometer order (first site
//! slowest, last site fastest). The accepted rewrites, in that order, form
//! the sentence's variant list. The list is never empty: when nothing is
//! accepted the unmodified sentence is the only variant.

use std::collections::HashSet;
use std::ops::AddAssign;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::analysis::{CandidateSet, KeywordSet, MaskPlan, TokenId};
use crate::config::WatermarkConfig;
use crate::consistency::{CheckOutcome, ConsistencyChecker};
use crate::odometer::MixedRadix;
use crate::text::Sentence;

/// One concrete rewrite of a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// The rewritten sentence.
    pub sentence: Sentence,
    /// True only for the unmodified sentence used when nothing was accepted.
    pub is_fallback: bool,
    /// Token positions that were substituted.
    pub substituted: Vec<usize>,
}

impl Variant {
    /// A variant produced by an accepted combination.
    pub fn rewrite(sentence: Sentence, substituted: Vec<usize>) -> Self {
        Self {
            sentence,
            is_fallback: false,
            substituted,
        }
    }

    /// The unmodified sentence.
    pub fn fallback(sentence: Sentence) -> Self {
        Self {
            sentence,
            is_fallback: true,
            substituted: Vec::new(),
        }
    }

    /// Surface text of the variant.
    pub fn text(&self) -> String {
        self.sentence.text()
    }

    /// Surface text with every substituted token wrapped in `open`/`close`.
    pub fn highlighted(&self, open: &str, close: &str) -> String {
        let mut out = String::new();
        for (position, token) in self.sentence.tokens().iter().enumerate() {
            if self.substituted.contains(&position) {
                out.push_str(open);
                out.push_str(&token.text);
                out.push_str(close);
                out.push_str(&token.whitespace);
            } else {
                out.push_str(&token.text_with_ws());
            }
        }
        out.trim_end().to_string()
    }
}

/// Ordered, non-empty list of variants for one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantList {
    variants: Vec<Variant>,
}

impl VariantList {
    /// Wraps variants. Returns `None` for an empty list.
    pub fn new(variants: Vec<Variant>) -> Option<Self> {
        if variants.is_empty() {
            None
        } else {
            Some(Self { variants })
        }
    }

    /// A single-entry list holding the unmodified sentence.
    pub fn fallback(sentence: Sentence) -> Self {
        Self {
            variants: vec![Variant::fallback(sentence)],
        }
    }

    /// Builds a list of non-fallback variants from raw sentence texts.
    ///
    /// Handy for synthetic documents; returns `None` for an empty input.
    pub fn from_texts<I, S>(texts: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let variants = texts
            .into_iter()
            .map(|t| Variant::rewrite(crate::text::tokenize(t.as_ref()), Vec::new()))
            .collect();
        Self::new(variants)
    }

    /// Number of variants (always at least 1).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// The variants in enumeration order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Variant at `index`.
    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.variants.get(index)
    }

    /// Index of the variant whose text equals `text` exactly.
    pub fn position_of(&self, text: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.text() == text)
    }

    /// True if the list is the fallback for a sentence without usable rewrites.
    pub fn is_fallback(&self) -> bool {
        self.variants.len() == 1 && self.variants[0].is_fallback
    }

    /// Bits this sentence contributes on its own: `log2(len)`.
    pub fn bits(&self) -> f64 {
        (self.variants.len() as f64).log2()
    }
}

/// Diagnostic counters of one enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationStats {
    /// Combinations checked.
    pub tried: u64,
    /// Combinations whose re-detected keywords matched.
    pub keyword_matches: u64,
    /// Combinations whose re-detected sites matched.
    pub mask_matches: u64,
    /// Combinations accepted under the acceptance policy (before dedupe).
    pub accepted: u64,
}

impl AddAssign for EnumerationStats {
    fn add_assign(&mut self, other: Self) {
        self.tried += other.tried;
        self.keyword_matches += other.keyword_matches;
        self.mask_matches += other.mask_matches;
        self.accepted += other.accepted;
    }
}

/// Counters plus the accepted rewrites of one enumeration, keyed by their
/// index in the combination space. Rejected rewrites are dropped on arrival.
#[derive(Default)]
struct Tally {
    stats: EnumerationStats,
    accepted: Vec<(usize, Sentence)>,
}

impl Tally {
    fn record(mut self, index: usize, outcome: CheckOutcome) -> Self {
        self.stats.tried += 1;
        if outcome.keyword_match {
            self.stats.keyword_matches += 1;
        }
        if outcome.mask_match {
            self.stats.mask_matches += 1;
        }
        if outcome.accept {
            self.stats.accepted += 1;
            self.accepted.push((index, outcome.rewritten));
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.stats += other.stats;
        self.accepted.extend(other.accepted);
        self
    }
}

/// Enumerates accepted variants of sentences.
pub struct VariantEnumerator<'a> {
    checker: ConsistencyChecker<'a>,
    parallel: bool,
    warning_threshold: u64,
}

impl<'a> VariantEnumerator<'a> {
    /// Creates an enumerator around a consistency checker.
    pub fn new(checker: ConsistencyChecker<'a>, config: &WatermarkConfig) -> Self {
        Self {
            checker,
            parallel: config.parallel,
            warning_threshold: config.combination_warning_threshold,
        }
    }

    /// Enumerates the accepted variants of `sentence`.
    ///
    /// Rewrites with identical text are kept once, at their first position,
    /// so that every variant can be identified from its text alone.
    pub fn enumerate(
        &self,
        sentence: &Sentence,
        plan: &MaskPlan,
        keywords: &KeywordSet,
        candidates: &CandidateSet,
    ) -> (VariantList, EnumerationStats) {
        if plan.is_empty()
            || candidates.is_unusable()
            || candidates.per_position.len() != plan.len()
        {
            debug!(sentence = %sentence, "no viable candidates, using fallback");
            return (VariantList::fallback(sentence.clone()), EnumerationStats::default());
        }

        let space = MixedRadix::new(candidates.radices());
        let total = space.total();
        if total > BigUint::from(self.warning_threshold) {
            warn!(
                combinations = %total,
                sentence = %sentence,
                "large combination space, enumeration may be slow"
            );
        }

        let Tally { stats, accepted } =
            self.check_all(sentence, plan, keywords, candidates, &space, &total);

        let mut seen = HashSet::new();
        let accepted: Vec<Variant> = accepted
            .into_iter()
            .filter(|(_, rewritten)| seen.insert(rewritten.text()))
            .map(|(_, rewritten)| Variant::rewrite(rewritten, plan.positions.clone()))
            .collect();

        debug!(
            sentence = %sentence,
            tried = stats.tried,
            accepted = accepted.len(),
            "enumerated variants"
        );

        let list = VariantList::new(accepted)
            .unwrap_or_else(|| VariantList::fallback(sentence.clone()));
        (list, stats)
    }

    fn check_all(
        &self,
        sentence: &Sentence,
        plan: &MaskPlan,
        keywords: &KeywordSet,
        candidates: &CandidateSet,
        space: &MixedRadix,
        total: &BigUint,
    ) -> Tally {
        let combo_of = |digits: &[usize]| -> Vec<TokenId> {
            digits
                .iter()
                .zip(&candidates.per_position)
                .map(|(&d, options)| options[d])
                .collect()
        };
        let check = |digits: Vec<usize>| {
            self.checker
                .check(sentence, plan, keywords, &combo_of(&digits))
        };

        match total.to_usize() {
            Some(count) if self.parallel && count > 1 => {
                let mut tally = (0..count)
                    .into_par_iter()
                    .filter_map(|i| space.digits_at(&BigUint::from(i)).map(|d| (i, d)))
                    .map(|(i, digits)| (i, check(digits)))
                    .fold(Tally::default, |tally, (i, outcome)| tally.record(i, outcome))
                    .reduce(Tally::default, Tally::merge);
                tally.accepted.sort_unstable_by_key(|(i, _)| *i);
                tally
            }
            _ => space
                .iter()
                .enumerate()
                .fold(Tally::default(), |tally, (i, digits)| tally.record(i, check(digits))),
        }
    }
}
