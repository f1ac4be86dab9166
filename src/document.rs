//! Corpus-level variant documents.
//!
//! A [`Document`] is the ordered list of per-sentence variant lists that the
//! message codec indexes into. [`DocumentBuilder`] produces one from raw
//! sentences by driving the pipeline for each sentence:
//! 1. Tokenize and detect keywords
//! 2. Select substitution sites
//! 3. Ask for ranked candidates
//! 4. Enumerate the blindly consistent rewrites

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::analysis::{CandidateSet, KeywordSet, MaskPlan, Pipeline, PipelineError};
use crate::capacity::{self, DocumentStats};
use crate::config::WatermarkConfig;
use crate::consistency::ConsistencyChecker;
use crate::odometer::MixedRadix;
use crate::text::{count_content_words, preprocess, tokenize, Sentence};
use crate::variants::{EnumerationStats, VariantEnumerator, VariantList};
use crate::PROTOCOL_VERSION;

/// Ordered variant lists, one per sentence in corpus order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lists: Vec<VariantList>,
}

impl Document {
    /// Creates a document from variant lists.
    pub fn new(lists: Vec<VariantList>) -> Self {
        Self { lists }
    }

    /// The variant lists.
    pub fn lists(&self) -> &[VariantList] {
        &self.lists
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Returns true if the document has no sentences.
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Variant count of every sentence.
    pub fn variant_counts(&self) -> Vec<usize> {
        self.lists.iter().map(VariantList::len).collect()
    }

    /// Exact number of variant combinations.
    pub fn num_options(&self) -> BigUint {
        capacity::num_options(&self.lists)
    }

    /// Addressable message length in bits.
    pub fn capacity(&self) -> u64 {
        capacity::capacity(&self.lists)
    }

    /// Mixed-radix system with one digit per sentence.
    pub fn radix(&self) -> MixedRadix {
        MixedRadix::new(self.variant_counts())
    }

    /// Digest of the protocol version and every variant text (base64).
    ///
    /// Two parties derived the same document iff their fingerprints match.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update([PROTOCOL_VERSION]);
        for list in &self.lists {
            hasher.update((list.len() as u64).to_le_bytes());
            for variant in list.variants() {
                hasher.update(variant.text().as_bytes());
                hasher.update([0u8]);
            }
        }
        BASE64.encode(hasher.finalize())
    }
}

/// Builds documents by running the pipeline on every sentence.
pub struct DocumentBuilder<'a> {
    pipeline: &'a dyn Pipeline,
    enumerator: VariantEnumerator<'a>,
}

impl<'a> DocumentBuilder<'a> {
    /// Creates a builder.
    pub fn new(pipeline: &'a dyn Pipeline, config: &WatermarkConfig) -> Self {
        let checker = ConsistencyChecker::new(pipeline, config.acceptance);
        Self {
            pipeline,
            enumerator: VariantEnumerator::new(checker, config),
        }
    }

    /// Cleans raw text, splits it into sentences and builds the document.
    pub fn build_text(&self, text: &str) -> (Document, DocumentStats) {
        self.build(&preprocess(text))
    }

    /// Builds a document from sentences in corpus order.
    pub fn build<S: AsRef<str>>(&self, sentences: &[S]) -> (Document, DocumentStats) {
        let mut lists = Vec::with_capacity(sentences.len());
        let mut stats = DocumentStats::default();

        for (index, raw) in sentences.iter().enumerate() {
            let raw = raw.as_ref();
            let (list, enumeration) = match self.analyze_sentence(raw) {
                Ok((sentence, keywords, plan, candidates)) => {
                    self.build_sentence(&sentence, &keywords, &plan, &candidates)
                }
                Err(e) => {
                    warn!(sentence = index, error = %e, "analysis failed, sentence left unmodified");
                    (VariantList::fallback(tokenize(raw)), EnumerationStats::default())
                }
            };

            debug!(sentence = index, variants = list.len(), "sentence enumerated");
            stats.record(&list, enumeration, count_content_words(raw));
            lists.push(list);
        }

        let document = Document::new(lists);
        info!(
            sentences = document.len(),
            capacity = document.capacity(),
            bpw = stats.bits_per_word(),
            "document built"
        );
        (document, stats)
    }

    /// Enumerates one sentence from precomputed analysis and candidates.
    pub fn build_sentence(
        &self,
        sentence: &Sentence,
        keywords: &KeywordSet,
        plan: &MaskPlan,
        candidates: &CandidateSet,
    ) -> (VariantList, EnumerationStats) {
        self.enumerator.enumerate(sentence, plan, keywords, candidates)
    }

    fn analyze_sentence(
        &self,
        raw: &str,
    ) -> Result<(Sentence, KeywordSet, MaskPlan, CandidateSet), PipelineError> {
        let sentence = self.pipeline.tokenize(raw)?;
        let (keywords, plan) = self.pipeline.analyze(&sentence)?;
        let candidates = if plan.is_empty() {
            CandidateSet::default()
        } else {
            self.pipeline.propose_candidates(&sentence, &plan)?
        };
        Ok((sentence, keywords, plan, candidates))
    }
}
