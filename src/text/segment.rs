//! Cover text cleanup and sentence segmentation.

use std::sync::OnceLock;

use regex::Regex;

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*?>").expect("tag pattern should compile"))
}

/// Flattens line breaks and tabs to spaces and strips HTML-like tags.
pub fn clean_text(text: &str) -> String {
    let flattened = text.replace(['\n', '\r', '\t'], " ");
    tag_pattern().replace_all(&flattened, "").into_owned()
}

/// Splits cleaned text into sentences.
///
/// A sentence ends after `.`, `!` or `?` (plus any closing quotes or
/// brackets) when the next character is whitespace or the end of input.
/// Returned sentences are trimmed; empty ones are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        current.push(c);
        i += 1;

        if matches!(c, '.' | '!' | '?') {
            while i < chars.len() && matches!(chars[i], '"' | '\'' | ')' | ']' | '”' | '’') {
                current.push(chars[i]);
                i += 1;
            }
            if i >= chars.len() || chars[i].is_whitespace() {
                push_trimmed(&mut sentences, &current);
                current.clear();
            }
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, sentence: &str) {
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Cleans raw text and splits it into sentences.
pub fn preprocess(text: &str) -> Vec<String> {
    split_sentences(&clean_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("a\nb\tc"), "a b c");
        assert_eq!(clean_text("<b>bold</b> text"), "bold text");
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("The car is fast. Is it? Yes!");
        assert_eq!(sentences, vec!["The car is fast.", "Is it?", "Yes!"]);
    }

    #[test]
    fn test_split_keeps_decimals_and_trailing_text() {
        let sentences = split_sentences("Pi is 3.14 roughly. No period here");
        assert_eq!(sentences, vec!["Pi is 3.14 roughly.", "No period here"]);
    }

    #[test]
    fn test_split_closing_quote() {
        let sentences = split_sentences("He said \"stop.\" Then left.");
        assert_eq!(sentences, vec!["He said \"stop.\"", "Then left."]);
    }

    #[test]
    fn test_preprocess_multiline() {
        let sentences = preprocess("First line.\nSecond\tline.\n\n");
        assert_eq!(sentences, vec!["First line.", "Second line."]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_sentences("   ").is_empty());
    }
}
