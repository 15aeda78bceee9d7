use super::{AnalysisError, Complexity, sentences, words};

/// Classify text by average word length and average sentence length.
///
/// High needs both averages above 5 chars / 20 words, Medium above 4 / 15.
pub fn assess_complexity(text: &str) -> Result<Complexity, AnalysisError> {
    let tokens = words(text);
    if tokens.is_empty() {
        return Err(AnalysisError::EmptyText);
    }
    let sentence_count = sentences(text).len().max(1);

    let total_chars: usize = tokens.iter().map(|t| t.chars().count()).sum();
    let avg_word_length = total_chars as f64 / tokens.len() as f64;
    let avg_sentence_length = tokens.len() as f64 / sentence_count as f64;

    let complexity = if avg_word_length > 5.0 && avg_sentence_length > 20.0 {
        Complexity::High
    } else if avg_word_length > 4.0 && avg_sentence_length > 15.0 {
        Complexity::Medium
    } else {
        Complexity::Low
    };
    Ok(complexity)
}
