//! Capitalisation-based named entity chunking.
//!
//! Runs of capitalised tokens become entities. Labels come from honorifics,
//! organisation suffixes, acronyms, a small place gazetteer and the
//! preposition in front of the run.

use super::keywords::is_stopword;
use super::{Entity, sentences, words};

const TITLES: &[&str] = &[
    "Dr", "Miss", "Mr", "Mrs", "Ms", "Prof", "Professor", "Sir", "Lady", "Lord", "President",
    "King", "Queen",
];

const ORG_SUFFIXES: &[&str] = &[
    "Agency", "Association", "Bank", "Co", "College", "Company", "Corp", "Corporation",
    "Foundation", "Group", "Inc", "Institute", "LLC", "Ltd", "Ministry", "Museum", "Council",
    "Society", "Team", "University",
];

const PLACES: &[&str] = &[
    "Africa", "America", "Amsterdam", "Asia", "Athens", "Australia", "Beijing", "Berlin",
    "Boston", "Brazil", "California", "Canada", "Chicago", "China", "Dublin", "Egypt",
    "England", "Europe", "France", "Germany", "Greece", "India", "Ireland", "Italy", "Japan",
    "Kenya", "Lisbon", "London", "Madrid", "Mexico", "Moscow", "Mumbai", "Nigeria", "Paris",
    "Portugal", "Rome", "Russia", "Scotland", "Seoul", "Spain", "Sydney", "Texas", "Tokyo",
    "Toronto", "Ukraine", "Vienna", "Wales",
];

const PLACE_PREPOSITIONS: &[&str] = &["at", "from", "in", "near", "to", "visit", "visiting"];

/// Openers that are capitalised only because they start a sentence
const OPENERS: &[&str] = &[
    "hello", "hey", "hi", "maybe", "ok", "okay", "please", "so", "thanks", "well", "yes",
];

fn is_capitalised(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.is_uppercase() && token.chars().all(char::is_alphanumeric),
        None => false,
    }
}

fn is_acronym(token: &str) -> bool {
    token.chars().count() >= 2 && token.chars().all(|c| c.is_uppercase())
}

fn is_sentence_opener(token: &str) -> bool {
    let lower = token.to_lowercase();
    is_stopword(&lower) || OPENERS.contains(&lower.as_str())
}

fn label_for(run: &[&str], titled: bool, prev: Option<&str>) -> &'static str {
    let last = run[run.len() - 1];
    if ORG_SUFFIXES.contains(&last) || (run.len() == 1 && is_acronym(last)) {
        return "ORGANIZATION";
    }
    if titled {
        return "PERSON";
    }
    let joined = run.join(" ");
    let after_preposition = prev
        .map(|p| PLACE_PREPOSITIONS.contains(&p.to_lowercase().as_str()))
        .unwrap_or(false);
    if PLACES.contains(&joined.as_str()) || (run.len() == 1 && after_preposition) {
        return "GPE";
    }
    "PERSON"
}

/// Extract named entities in order of appearance.
///
/// Repeated mentions are reported each time.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let mut entities = Vec::new();

    for sentence in sentences(text) {
        let tokens = words(sentence);
        let mut i = 0;
        while i < tokens.len() {
            if !is_capitalised(tokens[i]) || tokens[i] == "I" {
                i += 1;
                continue;
            }
            let start = i;
            while i < tokens.len() && is_capitalised(tokens[i]) && tokens[i] != "I" {
                i += 1;
            }

            let mut run = &tokens[start..i];
            if start == 0 {
                while let Some((first, rest)) = run.split_first() {
                    if !is_sentence_opener(first) {
                        break;
                    }
                    run = rest;
                }
            }
            let title_at = run.iter().rposition(|t| TITLES.contains(t));
            if let Some(pos) = title_at {
                run = &run[pos + 1..];
            }
            let titled = title_at.is_some();
            if run.is_empty() {
                continue;
            }

            let prev = tokens[..start].last().copied();
            entities.push(Entity::new(run.join(" "), label_for(run, titled, prev)));
        }
    }

    entities
}

/// Render entities the way they appear in the decorated prompt:
/// `[('Paris', 'GPE'), ('Ada', 'PERSON')]`
pub fn format_entities(entities: &[Entity]) -> String {
    let items: Vec<String> = entities
        .iter()
        .map(|e| format!("({}, {})", quote(&e.text), quote(&e.label)))
        .collect();
    format!("[{}]", items.join(", "))
}

fn quote(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{s}\"")
    } else {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        extract_entities(text)
            .into_iter()
            .map(|e| (e.text, e.label))
            .collect()
    }

    fn pair(text: &str, label: &str) -> (String, String) {
        (text.to_string(), label.to_string())
    }

    #[test]
    fn test_places_and_people() {
        assert_eq!(
            pairs("Ada Lovelace moved to Paris with Charles."),
            vec![
                pair("Ada Lovelace", "PERSON"),
                pair("Paris", "GPE"),
                pair("Charles", "PERSON"),
            ]
        );
    }

    #[test]
    fn test_organisations() {
        assert_eq!(
            pairs("She joined Acme Corp after working at NASA."),
            vec![pair("Acme Corp", "ORGANIZATION"), pair("NASA", "ORGANIZATION")]
        );
    }

    #[test]
    fn test_titles_mark_people() {
        assert_eq!(pairs("Ask Dr Watson."), vec![pair("Watson", "PERSON")]);
    }

    #[test]
    fn test_sentence_openers_are_skipped() {
        assert_eq!(
            pairs("What is the weather in Lisbon? Hello Maria."),
            vec![pair("Lisbon", "GPE"), pair("Maria", "PERSON")]
        );
        assert!(pairs("I think this is fine.").is_empty());
    }

    #[test]
    fn test_unknown_place_after_preposition() {
        assert_eq!(pairs("We drove to Zermatt."), vec![pair("Zermatt", "GPE")]);
    }

    #[test]
    fn test_format_entities() {
        assert_eq!(format_entities(&[]), "[]");
        assert_eq!(
            format_entities(&[Entity::new("Paris", "GPE"), Entity::new("Ada", "PERSON")]),
            "[('Paris', 'GPE'), ('Ada', 'PERSON')]"
        );
        assert_eq!(
            format_entities(&[Entity::new("O'Neil", "PERSON")]),
            "[(\"O'Neil\", 'PERSON')]"
        );
    }
}
