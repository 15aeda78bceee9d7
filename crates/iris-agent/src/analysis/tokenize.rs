//! Word and sentence splitting shared by the analyzers.

use std::sync::LazyLock;

use regex::Regex;

/// Words (with inner apostrophes) or single punctuation marks
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:['’]\w+)*|\.\.\.|[^\s\w]").unwrap());

/// A run of sentence terminators followed by whitespace or the end of input
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)").unwrap());

/// Split text into word and punctuation tokens.
pub fn words(text: &str) -> Vec<&str> {
    TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Split text into trimmed, non-empty sentences.
///
/// Trailing text without a terminator counts as a sentence.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            out.push(sentence);
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

/// True for tokens made only of letters and digits
pub(crate) fn is_alphanumeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}
