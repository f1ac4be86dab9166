//! English stopwords and content-word counting.

/// Common English function words. Never used as substitution sites and
/// excluded from bits-per-word statistics.
pub const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Returns true if `word` (any case) is a stopword.
pub fn is_stopword(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOPWORDS.contains(&lower.as_str())
}

/// Counts content words: ASCII punctuation is removed, the text is split on
/// whitespace and stopwords are skipped.
pub fn count_content_words(text: &str) -> usize {
    let stripped: String = text.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    stripped
        .split_whitespace()
        .filter(|word| !is_stopword(word))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stopword_case_insensitive() {
        assert!(is_stopword("The"));
        assert!(is_stopword("and"));
        assert!(!is_stopword("watermark"));
    }

    #[test]
    fn test_count_content_words() {
        assert_eq!(count_content_words("The fast car stopped."), 3);
        assert_eq!(count_content_words("It is what it is!"), 0);
        assert_eq!(count_content_words(""), 0);
    }

    #[test]
    fn test_count_drops_punctuation_only_tokens() {
        assert_eq!(count_content_words("cars , trucks ; boats"), 3);
    }
}
