//! Text analysis: sentiment, keywords, named entities and complexity.
//!
//! [`LexiconAnalyzer`] is a self-contained rule and word-list analyzer. The
//! [`Analyzer`] trait lets the processor run against any other backend.

mod complexity;
mod entities;
mod keywords;
mod sentiment;
mod tokenize;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use complexity::assess_complexity;
pub use entities::{extract_entities, format_entities};
pub use keywords::top_keywords;
pub use sentiment::{polarity, sentiment_of};
pub use tokenize::{sentences, words};

/// Number of keywords reported per input
pub const KEYWORD_COUNT: usize = 5;

/// Errors produced by an analyzer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Input had no word tokens, so averages are undefined
    #[error("input contains no words")]
    EmptyText,

    /// Backend-specific failure
    #[error("{0}")]
    Backend(String),
}

/// Overall sentiment of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        })
    }
}

/// Rough reading complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
        })
    }
}

/// A named entity and its type label (`PERSON`, `GPE`, `ORGANIZATION`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Analysis of one user input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    /// Most frequent non-stopword tokens, most frequent first
    pub keywords: Vec<String>,
    pub named_entities: Vec<Entity>,
    pub complexity: Complexity,
}

/// Analysis backend used by the turn processor
pub trait Analyzer: Send + Sync {
    /// Full analysis for the side panel
    fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError>;

    /// Named entities only, used to decorate the model prompt
    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, AnalysisError>;
}

/// Word-list based analyzer with no external models
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let complexity = assess_complexity(text)?;
        let result = AnalysisResult {
            sentiment: sentiment_of(text),
            keywords: top_keywords(text, KEYWORD_COUNT),
            named_entities: extract_entities(text),
            complexity,
        };
        tracing::debug!(
            sentiment = %result.sentiment,
            complexity = %result.complexity,
            keywords = result.keywords.len(),
            "analyzed input"
        );
        Ok(result)
    }

    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, AnalysisError> {
        Ok(extract_entities(text))
    }
}
