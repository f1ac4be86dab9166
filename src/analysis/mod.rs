//! Sentence analysis behind a fixed capability interface.
//!
//! The watermark protocol never looks inside the NLP machinery that finds
//! keywords, picks substitution sites or proposes replacement tokens. It
//! only talks to a [`Pipeline`], and any adapter implementing it can be
//! plugged in. [`LexiconPipeline`] is the built-in, deterministic adapter.

use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigUint;
use thiserror::Error;

use crate::text::Sentence;

pub mod lexicon;

pub use lexicon::LexiconPipeline;

/// Errors raised by a pipeline adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Sentence is empty")]
    EmptySentence,

    #[error("Unknown token id: {0}")]
    UnknownToken(TokenId),

    #[error("Position {position} out of range for sentence of {len} tokens")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("Analysis failed: {0}")]
    Analysis(String),
}

/// Identifier of a replacement token in the adapter's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u32);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keywords and entity keywords detected in a sentence.
///
/// Only set equality matters, so both are kept as ordered sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    /// Text keywords.
    pub keywords: BTreeSet<String>,
    /// Named-entity keywords.
    pub entities: BTreeSet<String>,
}

impl KeywordSet {
    /// Creates a keyword set from any string iterators.
    pub fn new<K, E>(keywords: K, entities: E) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            entities: entities.into_iter().map(Into::into).collect(),
        }
    }

    /// Compares the text keywords only.
    pub fn text_matches(&self, other: &KeywordSet) -> bool {
        self.keywords == other.keywords
    }

    /// Returns true if `word` is a keyword or an entity.
    pub fn contains(&self, word: &str) -> bool {
        self.keywords.contains(word) || self.entities.contains(word)
    }
}

/// Substitution sites selected for one sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskPlan {
    /// Token positions, in the order candidates are proposed for them.
    pub positions: Vec<usize>,
    /// Keyword context the positions were derived from.
    pub keywords: KeywordSet,
}

impl MaskPlan {
    /// Creates a plan.
    pub fn new(positions: Vec<usize>, keywords: KeywordSet) -> Self {
        Self { positions, keywords }
    }

    /// Returns true if there is nothing to substitute.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of substitution sites.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Positions as a set, for order-insensitive comparison.
    pub fn position_set(&self) -> BTreeSet<usize> {
        self.positions.iter().copied().collect()
    }
}

/// Ranked replacement candidates, one list per mask position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    /// `per_position[i]` holds the candidates for `MaskPlan::positions[i]`.
    pub per_position: Vec<Vec<TokenId>>,
}

impl CandidateSet {
    /// Creates a candidate set.
    pub fn new(per_position: Vec<Vec<TokenId>>) -> Self {
        Self { per_position }
    }

    /// Number of candidates at each position.
    pub fn radices(&self) -> Vec<usize> {
        self.per_position.iter().map(Vec::len).collect()
    }

    /// Returns true if some position has no viable substitution, or there
    /// are no positions at all.
    pub fn is_unusable(&self) -> bool {
        self.per_position.is_empty() || self.per_position.iter().any(Vec::is_empty)
    }

    /// Size of the raw combination space (Cartesian product).
    pub fn combination_count(&self) -> BigUint {
        self.per_position
            .iter()
            .fold(BigUint::from(1u32), |acc, c| acc * BigUint::from(c.len()))
    }
}

/// Capability interface of the external NLP pipeline.
///
/// Every method must be a pure function of its inputs: the watermark is
/// only recoverable if the receiver gets the same answers as the sender.
pub trait Pipeline: Send + Sync {
    /// Splits raw sentence text into tokens.
    fn tokenize(&self, text: &str) -> Result<Sentence, PipelineError>;

    /// Detects keywords and entity keywords.
    fn extract_keywords(&self, sentence: &Sentence) -> Result<KeywordSet, PipelineError>;

    /// Picks substitution sites. An empty plan means nothing can be embedded.
    fn select_mask_plan(
        &self,
        sentence: &Sentence,
        keywords: &KeywordSet,
    ) -> Result<MaskPlan, PipelineError>;

    /// Proposes ranked replacement tokens for every position of `plan`.
    fn propose_candidates(
        &self,
        sentence: &Sentence,
        plan: &MaskPlan,
    ) -> Result<CandidateSet, PipelineError>;

    /// Turns a token identifier back into surface text.
    fn decode_token(&self, id: TokenId) -> Result<String, PipelineError>;

    /// Runs keyword extraction followed by mask selection.
    fn analyze(&self, sentence: &Sentence) -> Result<(KeywordSet, MaskPlan), PipelineError> {
        let keywords = self.extract_keywords(sentence)?;
        let plan = self.select_mask_plan(sentence, &keywords)?;
        Ok((keywords, plan))
    }
}
