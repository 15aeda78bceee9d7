use std::collections::HashMap;

use super::tokenize::is_alphanumeric;
use super::words;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "couldn", "d", "did", "didn", "do", "does", "doesn", "doing",
    "don", "down", "during", "each", "few", "for", "from", "further", "had", "hadn", "has",
    "hasn", "have", "haven", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "isn", "it", "its", "itself",
    "just", "ll", "m", "ma", "me", "mightn", "more", "most", "mustn", "my", "myself", "needn",
    "no", "nor", "not", "now", "o", "of", "off", "on", "once", "only", "or", "other", "our",
    "ours", "ourselves", "out", "over", "own", "re", "s", "same", "shan", "she", "should",
    "shouldn", "so", "some", "such", "t", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "ve", "very", "was", "wasn", "we", "were", "weren", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "won", "wouldn", "y",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Whether a lowercase word is a common function word
pub(crate) fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

/// The `limit` most frequent non-stopword tokens, lowercased.
///
/// Ties keep first-occurrence order.
pub fn top_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for token in words(text) {
        let word = token.to_lowercase();
        if !is_alphanumeric(&word) || is_stopword(&word) {
            continue;
        }
        let count = counts.entry(word.clone()).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(limit);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopword_list_is_sorted() {
        assert!(STOPWORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ranks_by_frequency() {
        let keywords = top_keywords("Rust is fast. Rust is safe. Fast code is good code, rust!", 3);
        assert_eq!(keywords, vec!["rust", "fast", "code"]);
    }

    #[test]
    fn test_drops_stopwords_and_punctuation() {
        let keywords = top_keywords("The cat and the hat, on the mat!", 5);
        assert_eq!(keywords, vec!["cat", "hat", "mat"]);
    }

    #[test]
    fn test_limit_applies() {
        assert_eq!(top_keywords("one two three four five six seven", 5).len(), 5);
        assert!(top_keywords("", 5).is_empty());
    }
}
