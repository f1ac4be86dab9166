//! Synonym-lexicon pipeline adapter.
//!
//! Substitution sites are words that belong to a configured synonym group;
//! their candidates are the members of that group. Because the candidate
//! list depends only on the group and not on the member currently present,
//! a receiver analysing watermarked text gets the same candidates the
//! sender had.

use std::collections::{BTreeSet, HashMap};

use crate::config::LexiconConfig;
use crate::text::{is_stopword, tokenize, Sentence};

use super::{CandidateSet, KeywordSet, MaskPlan, Pipeline, PipelineError, TokenId};

/// Deterministic [`Pipeline`] backed by synonym groups.
#[derive(Debug, Clone)]
pub struct LexiconPipeline {
    vocab: Vec<String>,
    ids: HashMap<String, TokenId>,
    groups: Vec<Vec<String>>,
    group_of: HashMap<String, usize>,
    custom_keywords: BTreeSet<String>,
    max_masks: usize,
    top_k: usize,
}

impl LexiconPipeline {
    /// Builds the adapter from its configuration.
    ///
    /// Words are matched case-insensitively. A word listed in several groups
    /// stays a candidate in each of them but is never a substitution site,
    /// since its candidate list would depend on which group it came from.
    pub fn new(config: &LexiconConfig) -> Self {
        let mut pipeline = Self {
            vocab: Vec::new(),
            ids: HashMap::new(),
            groups: Vec::with_capacity(config.groups.len()),
            group_of: HashMap::new(),
            custom_keywords: config
                .custom_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .collect(),
            max_masks: config.max_masks,
            top_k: config.top_k,
        };

        let mut shared = BTreeSet::new();
        for (index, group) in config.groups.iter().enumerate() {
            let mut members: Vec<String> = Vec::with_capacity(group.len());
            for word in group {
                let lower = word.trim().to_lowercase();
                if members.contains(&lower) {
                    continue;
                }
                pipeline.intern(&lower);
                pipeline.intern(&capitalize(&lower));
                if *pipeline.group_of.entry(lower.clone()).or_insert(index) != index {
                    shared.insert(lower.clone());
                }
                members.push(lower);
            }
            pipeline.groups.push(members);
        }

        for word in &shared {
            pipeline.group_of.remove(word);
        }

        pipeline
    }

    /// Number of distinct surface forms in the vocabulary.
    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }

    /// Looks up the id of a surface form.
    pub fn token_id(&self, surface: &str) -> Option<TokenId> {
        self.ids.get(surface).copied()
    }

    fn intern(&mut self, surface: &str) -> TokenId {
        if let Some(id) = self.ids.get(surface) {
            return *id;
        }
        let id = TokenId(self.vocab.len() as u32);
        self.vocab.push(surface.to_string());
        self.ids.insert(surface.to_string(), id);
        id
    }

    fn candidates_for(&self, word: &str, capitalized: bool) -> Vec<TokenId> {
        let Some(&group) = self.group_of.get(&word.to_lowercase()) else {
            return Vec::new();
        };
        self.groups[group]
            .iter()
            .take(self.top_k)
            .filter_map(|member| {
                if capitalized {
                    self.token_id(&capitalize(member))
                } else {
                    self.token_id(member)
                }
            })
            .collect()
    }
}

impl Pipeline for LexiconPipeline {
    fn tokenize(&self, text: &str) -> Result<Sentence, PipelineError> {
        let sentence = tokenize(text);
        if sentence.is_empty() {
            return Err(PipelineError::EmptySentence);
        }
        Ok(sentence)
    }

    fn extract_keywords(&self, sentence: &Sentence) -> Result<KeywordSet, PipelineError> {
        let mut keywords = BTreeSet::new();
        let mut entities = BTreeSet::new();

        for (position, token) in sentence.tokens().iter().enumerate() {
            if !token.is_word() {
                continue;
            }
            let lower = token.lower();
            if self.custom_keywords.contains(&lower) {
                keywords.insert(lower);
            } else if position > 0 && token.is_capitalized() {
                entities.insert(token.text.clone());
            }
        }

        Ok(KeywordSet { keywords, entities })
    }

    fn select_mask_plan(
        &self,
        sentence: &Sentence,
        keywords: &KeywordSet,
    ) -> Result<MaskPlan, PipelineError> {
        let positions: Vec<usize> = sentence
            .tokens()
            .iter()
            .enumerate()
            .filter(|(_, token)| {
                let lower = token.lower();
                token.is_word()
                    && self.group_of.contains_key(&lower)
                    && !is_stopword(&lower)
                    && !keywords.contains(&lower)
                    && !keywords.contains(&token.text)
            })
            .map(|(position, _)| position)
            .take(self.max_masks)
            .collect();

        Ok(MaskPlan::new(positions, keywords.clone()))
    }

    fn propose_candidates(
        &self,
        sentence: &Sentence,
        plan: &MaskPlan,
    ) -> Result<CandidateSet, PipelineError> {
        let per_position = plan
            .positions
            .iter()
            .map(|&position| {
                let token = sentence.token(position).ok_or(PipelineError::PositionOutOfRange {
                    position,
                    len: sentence.len(),
                })?;
                let capitalized = position == 0 && token.is_capitalized();
                Ok(self.candidates_for(&token.text, capitalized))
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(CandidateSet::new(per_position))
    }

    fn decode_token(&self, id: TokenId) -> Result<String, PipelineError> {
        self.vocab
            .get(id.0 as usize)
            .cloned()
            .ok_or(PipelineError::UnknownToken(id))
    }
}

/// Uppercases the first character.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
