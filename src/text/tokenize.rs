//! Word tokenization for watermark carriers.
//!
//! Sentences are split into word tokens and single-character punctuation
//! tokens. Each token remembers the whitespace that followed it so the
//! sentence can be rebuilt exactly after a substitution.

use std::fmt;

/// A single token with its surface text and trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Surface text (never contains whitespace).
    pub text: String,
    /// Whitespace that followed the token in the source text.
    pub whitespace: String,
}

impl Token {
    /// Creates a token from its text and trailing whitespace.
    pub fn new(text: impl Into<String>, whitespace: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            whitespace: whitespace.into(),
        }
    }

    /// Returns true if the token contains at least one alphanumeric character.
    pub fn is_word(&self) -> bool {
        self.text.chars().any(|c| c.is_alphanumeric())
    }

    /// Returns true if the token is made only of punctuation or symbols.
    pub fn is_punct(&self) -> bool {
        !self.text.is_empty() && !self.is_word()
    }

    /// Lowercased surface text.
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    /// Returns true if the first character is uppercase.
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(|c| c.is_uppercase())
    }

    /// Text followed by its trailing whitespace.
    pub fn text_with_ws(&self) -> String {
        format!("{}{}", self.text, self.whitespace)
    }
}

/// An immutable, ordered sequence of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    /// Creates a sentence from already tokenized input.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// The tokens of this sentence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the token at `index`, if any.
    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the sentence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Reassembles the surface text, without trailing whitespace.
    pub fn text(&self) -> String {
        let joined: String = self.tokens.iter().map(Token::text_with_ws).collect();
        joined.trim_end().to_string()
    }

    /// Returns a copy with the text of the given tokens replaced.
    ///
    /// Trailing whitespace of every token is preserved. Returns `None` if a
    /// position is out of bounds.
    pub fn with_replacements(&self, replacements: &[(usize, String)]) -> Option<Sentence> {
        let mut tokens = self.tokens.clone();
        for (position, text) in replacements {
            tokens.get_mut(*position)?.text = text.clone();
        }
        Some(Sentence { tokens })
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

fn is_joiner(c: char) -> bool {
    c == '\'' || c == '’' || c == '-'
}

/// Tokenizes a sentence into words and punctuation.
///
/// Words are runs of alphanumeric characters; an apostrophe or hyphen is kept
/// inside a word when it sits between two alphanumeric characters. Any other
/// non-whitespace character becomes its own token. Leading and trailing
/// whitespace of the input is ignored.
pub fn tokenize(text: &str) -> Sentence {
    let chars: Vec<char> = text.trim().chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            if let Some(last) = tokens.last_mut() {
                last.whitespace.push(c);
            }
            i += 1;
            continue;
        }

        let mut word = String::new();
        if c.is_alphanumeric() {
            while i < chars.len() {
                let cur = chars[i];
                let inside_joiner = is_joiner(cur)
                    && i + 1 < chars.len()
                    && chars[i + 1].is_alphanumeric()
                    && !word.is_empty();
                if cur.is_alphanumeric() || inside_joiner {
                    word.push(cur);
                    i += 1;
                } else {
                    break;
                }
            }
        } else {
            word.push(c);
            i += 1;
        }

        tokens.push(Token::new(word, String::new()));
    }

    Sentence::new(tokens)
}
