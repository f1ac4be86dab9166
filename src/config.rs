//! Watermark configuration.
//!
//! Loaded from a TOML file with a `[watermark]` section for protocol
//! options and a `[lexicon]` section for the built-in lexicon adapter.
//! Every field has a default, so an empty file is a valid configuration.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of substitution sites per sentence.
pub const DEFAULT_MAX_MASKS: usize = 3;

/// Default number of candidates kept per substitution site.
pub const DEFAULT_TOP_K: usize = 8;

/// Raw combination count above which enumeration logs a warning.
pub const DEFAULT_COMBINATION_WARNING_THRESHOLD: u64 = 4096;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the consistency checker decides whether a rewrite is usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptancePolicy {
    /// Accept when the blind re-analysis finds the same substitution sites.
    /// Keyword agreement is only counted.
    #[default]
    MaskOnly,
    /// Additionally require the detected text keywords to agree.
    MaskAndKeywords,
}

/// Protocol-level options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Acceptance gate used by the consistency checker.
    pub acceptance: AcceptancePolicy,

    /// Check candidate combinations on the rayon thread pool.
    pub parallel: bool,

    /// Warn when one sentence has more raw combinations than this.
    pub combination_warning_threshold: u64,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            acceptance: AcceptancePolicy::default(),
            parallel: true,
            combination_warning_threshold: DEFAULT_COMBINATION_WARNING_THRESHOLD,
        }
    }
}

/// Options of the lexicon adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Maximum substitution sites per sentence.
    pub max_masks: usize,

    /// Maximum candidates per substitution site.
    pub top_k: usize,

    /// Words that must never be substituted.
    pub custom_keywords: Vec<String>,

    /// Synonym groups. Members of a group are interchangeable.
    pub groups: Vec<Vec<String>>,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            max_masks: DEFAULT_MAX_MASKS,
            top_k: DEFAULT_TOP_K,
            custom_keywords: Vec::new(),
            groups: Vec::new(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Protocol options.
    pub watermark: WatermarkConfig,
    /// Lexicon adapter options.
    pub lexicon: LexiconConfig,
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lexicon.top_k == 0 {
            return Err(ConfigError::Invalid("lexicon.top_k must be at least 1".into()));
        }
        if let Some(index) = self.lexicon.groups.iter().position(|g| g.is_empty()) {
            return Err(ConfigError::Invalid(format!("lexicon group {} is empty", index)));
        }
        if let Some(word) = self
            .lexicon
            .groups
            .iter()
            .flatten()
            .find(|w| w.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "lexicon word {:?} is blank",
                word
            )));
        }

        // A shared word would give the receiver a different candidate list
        // depending on which group member appears in the text.
        let mut owner: HashMap<String, usize> = HashMap::new();
        for (index, group) in self.lexicon.groups.iter().enumerate() {
            for word in group {
                let lower = word.trim().to_lowercase();
                match owner.get(&lower) {
                    Some(&first) if first != index => {
                        return Err(ConfigError::Invalid(format!(
                            "lexicon word {:?} appears in groups {} and {}",
                            lower, first, index
                        )));
                    }
                    _ => {
                        owner.insert(lower, index);
                    }
                }
            }
        }
        Ok(())
    }
}
