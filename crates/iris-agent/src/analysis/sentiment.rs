//! Valence-lexicon sentiment scoring.
//!
//! Word valences sit on a -4..=4 scale. Boosters, negations, a contrastive
//! "but", shouting and exclamation marks adjust them, and the sum is squashed
//! into a compound score in (-1, 1).

use super::{Sentiment, words};

/// Compound score beyond which text counts as positive or negative
pub const POLARITY_THRESHOLD: f64 = 0.05;

const BOOST: f64 = 0.293;
const CAPS_BOOST: f64 = 0.733;
const NEGATION_SCALE: f64 = -0.74;
const EXCLAMATION_BOOST: f64 = 0.292;
const NORMALIZE_ALPHA: f64 = 15.0;

const LEXICON: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("calm", 1.3),
    ("cool", 1.3),
    ("delight", 2.9),
    ("delighted", 3.1),
    ("enjoy", 2.2),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("fantastic", 2.6),
    ("fine", 0.8),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("hope", 1.9),
    ("interesting", 1.7),
    ("kind", 2.4),
    ("like", 1.5),
    ("love", 3.2),
    ("lovely", 2.8),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("pleasant", 2.3),
    ("please", 1.3),
    ("pretty", 2.2),
    ("proud", 2.1),
    ("safe", 1.9),
    ("smart", 1.7),
    ("success", 2.7),
    ("super", 2.9),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("welcome", 2.0),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("wow", 2.8),
    ("yes", 1.7),
    ("afraid", -2.2),
    ("angry", -2.3),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("broken", -2.1),
    ("confused", -1.3),
    ("crap", -1.6),
    ("cry", -2.1),
    ("dead", -3.3),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("dislike", -1.6),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("fear", -2.2),
    ("frustrated", -2.4),
    ("frustrating", -1.9),
    ("hate", -2.7),
    ("horrible", -2.5),
    ("hurt", -2.4),
    ("lonely", -1.5),
    ("lose", -1.6),
    ("lost", -1.3),
    ("mad", -2.2),
    ("miserable", -2.8),
    ("no", -1.2),
    ("pain", -2.3),
    ("poor", -2.1),
    ("problem", -1.7),
    ("sad", -2.1),
    ("scared", -1.9),
    ("sick", -2.3),
    ("sorry", -0.3),
    ("stupid", -2.4),
    ("terrible", -2.1),
    ("tired", -1.9),
    ("ugly", -2.3),
    ("unhappy", -1.8),
    ("upset", -1.6),
    ("useless", -1.8),
    ("worried", -1.2),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const BOOSTERS: &[&str] = &[
    "absolutely",
    "completely",
    "deeply",
    "extremely",
    "highly",
    "incredibly",
    "most",
    "really",
    "so",
    "totally",
    "very",
];

const DAMPENERS: &[&str] = &["barely", "hardly", "kinda", "slightly", "somewhat"];

const NEGATIONS: &[&str] = &[
    "aint", "cannot", "cant", "didnt", "doesnt", "dont", "isnt", "never", "no", "nobody",
    "none", "not", "nothing", "nowhere", "wasnt", "without", "wont",
];

fn valence(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(entry, _)| *entry == word)
        .map(|(_, v)| *v)
}

fn is_negation(word: &str) -> bool {
    let plain: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
    NEGATIONS.contains(&plain.as_str()) || word.ends_with("n't") || word.ends_with("n’t")
}

/// Compound polarity score in (-1, 1)
pub fn polarity(text: &str) -> f64 {
    let tokens: Vec<&str> = words(text)
        .into_iter()
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .collect();
    let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let shouting_is_emphasis = tokens.iter().any(|t| t.chars().any(char::is_lowercase));
    let but_index = lowered.iter().position(|w| w == "but");

    let mut total = 0.0;
    for (i, word) in lowered.iter().enumerate() {
        let Some(mut v) = valence(word) else {
            continue;
        };
        let sign = v.signum();

        let raw = tokens[i];
        if shouting_is_emphasis
            && raw.chars().count() > 1
            && raw.chars().all(|c| !c.is_lowercase())
        {
            v += sign * CAPS_BOOST;
        }
        if i > 0 {
            let prev = lowered[i - 1].as_str();
            if BOOSTERS.contains(&prev) {
                v += sign * BOOST;
            } else if DAMPENERS.contains(&prev) {
                v -= sign * BOOST;
            }
        }
        if lowered[i.saturating_sub(3)..i].iter().any(|w| is_negation(w)) {
            v *= NEGATION_SCALE;
        }
        match but_index {
            Some(b) if i < b => v *= 0.5,
            Some(b) if i > b => v *= 1.5,
            _ => {}
        }
        total += v;
    }

    if total != 0.0 {
        let exclamations = text.chars().filter(|c| *c == '!').count().min(4);
        total += total.signum() * exclamations as f64 * EXCLAMATION_BOOST;
    }

    total / (total * total + NORMALIZE_ALPHA).sqrt()
}

/// Classify text as positive, negative or neutral
pub fn sentiment_of(text: &str) -> Sentiment {
    let score = polarity(text);
    if score > POLARITY_THRESHOLD {
        Sentiment::Positive
    } else if score < -POLARITY_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
