//! Blind consistency checking of candidate rewrites.
//!
//! A rewrite is only usable if a receiver who sees nothing but the rewritten
//! sentence finds the same substitution sites the sender used. The checker
//! applies one combination of candidates, runs the rewritten text through
//! the pipeline from scratch and compares what it finds with the sender's
//! original analysis.

use tracing::trace;

use crate::analysis::{KeywordSet, MaskPlan, Pipeline, PipelineError, TokenId};
use crate::config::AcceptancePolicy;
use crate::text::Sentence;

/// Result of checking one candidate combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Whether the combination may be used as a variant.
    pub accept: bool,
    /// The rewritten sentence (the original one if the rewrite failed).
    pub rewritten: Sentence,
    /// Re-detected text keywords equal the original keywords.
    pub keyword_match: bool,
    /// Re-detected substitution sites equal the original ones (and exist).
    pub mask_match: bool,
}

impl CheckOutcome {
    fn rejected(original: &Sentence) -> Self {
        Self {
            accept: false,
            rewritten: original.clone(),
            keyword_match: false,
            mask_match: false,
        }
    }
}

/// Checks candidate combinations against blind re-analysis.
#[derive(Clone, Copy)]
pub struct ConsistencyChecker<'a> {
    pipeline: &'a dyn Pipeline,
    policy: AcceptancePolicy,
}

impl<'a> ConsistencyChecker<'a> {
    /// Creates a checker using `pipeline` for re-analysis.
    pub fn new(pipeline: &'a dyn Pipeline, policy: AcceptancePolicy) -> Self {
        Self { pipeline, policy }
    }

    /// The acceptance policy in use.
    pub fn policy(&self) -> AcceptancePolicy {
        self.policy
    }

    /// Applies `combo` to `original` at the positions of `plan`.
    ///
    /// Only the token text is replaced; trailing whitespace is kept.
    pub fn rewrite(
        &self,
        original: &Sentence,
        plan: &MaskPlan,
        combo: &[TokenId],
    ) -> Result<Sentence, PipelineError> {
        if combo.len() != plan.positions.len() {
            return Err(PipelineError::Analysis(format!(
                "combination has {} tokens for {} positions",
                combo.len(),
                plan.positions.len()
            )));
        }

        let replacements = plan
            .positions
            .iter()
            .zip(combo)
            .map(|(&position, &id)| Ok((position, self.pipeline.decode_token(id)?)))
            .collect::<Result<Vec<_>, PipelineError>>()?;

        original
            .with_replacements(&replacements)
            .ok_or_else(|| PipelineError::PositionOutOfRange {
                position: plan.positions.iter().copied().max().unwrap_or_default(),
                len: original.len(),
            })
    }

    /// Checks one combination.
    ///
    /// Pipeline failures reject the combination instead of propagating.
    pub fn check(
        &self,
        original: &Sentence,
        plan: &MaskPlan,
        keywords: &KeywordSet,
        combo: &[TokenId],
    ) -> CheckOutcome {
        match self.try_check(original, plan, keywords, combo) {
            Ok(outcome) => outcome,
            Err(e) => {
                trace!(error = %e, "rewrite rejected by pipeline failure");
                CheckOutcome::rejected(original)
            }
        }
    }

    fn try_check(
        &self,
        original: &Sentence,
        plan: &MaskPlan,
        keywords: &KeywordSet,
        combo: &[TokenId],
    ) -> Result<CheckOutcome, PipelineError> {
        let substituted = self.rewrite(original, plan, combo)?;

        // The receiver only ever sees text, so analyse the text, not tokens.
        let rewritten = self.pipeline.tokenize(&substituted.text())?;
        let (rewritten_keywords, rewritten_plan) = self.pipeline.analyze(&rewritten)?;

        let keyword_match = rewritten_keywords.text_matches(keywords);
        let mask_match =
            !rewritten_plan.is_empty() && rewritten_plan.position_set() == plan.position_set();

        let accept = match self.policy {
            AcceptancePolicy::MaskOnly => mask_match,
            AcceptancePolicy::MaskAndKeywords => mask_match && keyword_match,
        };

        Ok(CheckOutcome {
            accept,
            rewritten,
            keyword_match,
            mask_match,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LexiconPipeline;
    use crate::config::LexiconConfig;

    fn pipeline(groups: &[&[&str]], keywords: &[&str]) -> LexiconPipeline {
        LexiconPipeline::new(&LexiconConfig {
            groups: groups
                .iter()
                .map(|g| g.iter().map(|w| w.to_string()).collect())
                .collect(),
            custom_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..LexiconConfig::default()
        })
    }

    fn id(p: &LexiconPipeline, word: &str) -> TokenId {
        p.token_id(word).unwrap()
    }

    #[test]
    fn test_accepts_consistent_rewrite() {
        let p = pipeline(&[&["fast", "quick", "rapid"]], &[]);
        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskOnly);
        let sentence = p.tokenize("The fast car stopped.").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();

        let outcome = checker.check(&sentence, &plan, &keywords, &[id(&p, "rapid")]);
        assert!(outcome.accept);
        assert!(outcome.mask_match);
        assert!(outcome.keyword_match);
        assert_eq!(outcome.rewritten.text(), "The rapid car stopped.");
    }

    #[test]
    fn test_rejects_when_substitution_moves_sites() {
        // "so" is a stopword, so the rewritten word is no longer a site.
        let p = pipeline(&[&["hence", "so"]], &[]);
        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskOnly);
        let sentence = p.tokenize("It rained, hence wet roads.").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();
        assert_eq!(plan.positions, vec![3]);

        let outcome = checker.check(&sentence, &plan, &keywords, &[id(&p, "so")]);
        assert!(!outcome.accept);
        assert!(!outcome.mask_match);
        assert_eq!(outcome.rewritten.text(), "It rained, so wet roads.");
    }

    #[test]
    fn test_rejects_multiword_candidate_that_shifts_tokens() {
        let p = pipeline(&[&["fast", "very quick"], &["car", "auto"]], &[]);
        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskOnly);
        let sentence = p.tokenize("A fast car.").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();
        assert_eq!(plan.positions, vec![1, 2]);

        let combo = [id(&p, "very quick"), id(&p, "car")];
        let outcome = checker.check(&sentence, &plan, &keywords, &combo);
        assert!(!outcome.accept);
    }

    /// Keywords are long words; sites are vocabulary words, keywords or not.
    struct LongWordPipeline {
        vocab: Vec<&'static str>,
    }

    impl Pipeline for LongWordPipeline {
        fn tokenize(&self, text: &str) -> Result<Sentence, PipelineError> {
            Ok(crate::text::tokenize(text))
        }

        fn extract_keywords(&self, sentence: &Sentence) -> Result<KeywordSet, PipelineError> {
            let long = sentence
                .tokens()
                .iter()
                .filter(|t| t.text.len() >= 7)
                .map(|t| t.lower());
            Ok(KeywordSet::new(long, Vec::<String>::new()))
        }

        fn select_mask_plan(
            &self,
            sentence: &Sentence,
            keywords: &KeywordSet,
        ) -> Result<MaskPlan, PipelineError> {
            let positions = sentence
                .tokens()
                .iter()
                .enumerate()
                .filter(|(_, t)| self.vocab.contains(&t.lower().as_str()))
                .map(|(i, _)| i)
                .collect();
            Ok(MaskPlan::new(positions, keywords.clone()))
        }

        fn propose_candidates(
            &self,
            _sentence: &Sentence,
            plan: &MaskPlan,
        ) -> Result<crate::analysis::CandidateSet, PipelineError> {
            let all: Vec<TokenId> = (0..self.vocab.len() as u32).map(TokenId).collect();
            Ok(crate::analysis::CandidateSet::new(vec![all; plan.len()]))
        }

        fn decode_token(&self, id: TokenId) -> Result<String, PipelineError> {
            self.vocab
                .get(id.0 as usize)
                .map(|w| w.to_string())
                .ok_or(PipelineError::UnknownToken(id))
        }
    }

    #[test]
    fn test_keyword_drift_is_diagnostic_under_mask_only() {
        let p = LongWordPipeline {
            vocab: vec!["big", "enormous"],
        };
        let sentence = p.tokenize("a big dog").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();
        assert_eq!(plan.positions, vec![1]);

        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskOnly);
        let outcome = checker.check(&sentence, &plan, &keywords, &[TokenId(1)]);
        assert!(outcome.mask_match);
        assert!(!outcome.keyword_match);
        assert!(outcome.accept);
        assert_eq!(outcome.rewritten.text(), "a enormous dog");
    }

    #[test]
    fn test_mask_and_keywords_rejects_keyword_drift() {
        let p = LongWordPipeline {
            vocab: vec!["big", "enormous"],
        };
        let sentence = p.tokenize("a big dog").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();

        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskAndKeywords);
        assert_eq!(checker.policy(), AcceptancePolicy::MaskAndKeywords);

        let drifted = checker.check(&sentence, &plan, &keywords, &[TokenId(1)]);
        assert!(drifted.mask_match);
        assert!(!drifted.accept);

        let stable = checker.check(&sentence, &plan, &keywords, &[TokenId(0)]);
        assert!(stable.accept);
    }

    #[test]
    fn test_accepted_count_follows_policy() {
        use crate::config::WatermarkConfig;
        use crate::variants::VariantEnumerator;

        let p = LongWordPipeline {
            vocab: vec!["big", "enormous"],
        };
        let sentence = p.tokenize("a big dog").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();
        let candidates = p.propose_candidates(&sentence, &plan).unwrap();

        for (policy, accepted) in [
            (AcceptancePolicy::MaskOnly, 2),
            (AcceptancePolicy::MaskAndKeywords, 1),
        ] {
            let checker = ConsistencyChecker::new(&p, policy);
            let enumerator = VariantEnumerator::new(checker, &WatermarkConfig::default());
            let (list, stats) = enumerator.enumerate(&sentence, &plan, &keywords, &candidates);

            assert_eq!(stats.tried, 2);
            assert_eq!(stats.mask_matches, 2);
            assert_eq!(stats.keyword_matches, 1);
            assert_eq!(stats.accepted, accepted);
            assert_eq!(list.len() as u64, accepted);
        }
    }

    #[test]
    fn test_substituted_keyword_loses_its_site() {
        let p = pipeline(&[&["labeling", "marking"]], &["marking"]);
        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskOnly);
        let sentence = p.tokenize("Careful labeling helps.").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();
        assert_eq!(plan.positions, vec![1]);

        let outcome = checker.check(&sentence, &plan, &keywords, &[id(&p, "marking")]);
        assert!(!outcome.keyword_match);
        assert!(!outcome.mask_match);
        assert!(!outcome.accept);

        let kept = checker.check(&sentence, &plan, &keywords, &[id(&p, "labeling")]);
        assert!(kept.accept && kept.keyword_match);
    }

    #[test]
    fn test_unknown_token_is_rejected_not_fatal() {
        let p = pipeline(&[&["fast", "quick"]], &[]);
        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskOnly);
        let sentence = p.tokenize("a fast car").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();

        let outcome = checker.check(&sentence, &plan, &keywords, &[TokenId(10_000)]);
        assert!(!outcome.accept);
        assert_eq!(outcome.rewritten, sentence);
    }

    #[test]
    fn test_wrong_combo_length_is_rejected() {
        let p = pipeline(&[&["fast", "quick"]], &[]);
        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskOnly);
        let sentence = p.tokenize("a fast car").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();

        let outcome = checker.check(&sentence, &plan, &keywords, &[]);
        assert!(!outcome.accept);
    }

    #[test]
    fn test_check_is_idempotent() {
        let p = pipeline(&[&["fast", "quick", "rapid"], &["hence", "so"]], &[]);
        let checker = ConsistencyChecker::new(&p, AcceptancePolicy::MaskOnly);
        let sentence = p.tokenize("A fast car, hence trouble.").unwrap();
        let (keywords, plan) = p.analyze(&sentence).unwrap();

        for combo in [
            [id(&p, "quick"), id(&p, "hence")],
            [id(&p, "rapid"), id(&p, "so")],
        ] {
            let first = checker.check(&sentence, &plan, &keywords, &combo);
            let second = checker.check(&sentence, &plan, &keywords, &combo);
            assert_eq!(first, second);
        }
    }
}
