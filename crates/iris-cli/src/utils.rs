//! Shared utilities

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Join `(text, label)` entity pairs as `Paris (GPE), Ada (PERSON)`
pub fn describe_entities<'a>(entities: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let parts: Vec<String> = entities
        .into_iter()
        .map(|(text, label)| format!("{} ({})", text, label))
        .collect();
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

/// Welcome line for an hour of the day (0-23)
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Good morning, sunshine!",
        12..=17 => "Good afternoon, champ!",
        18..=21 => "Good evening, rockstar!",
        _ => "Hello, night owl!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_greeting_follows_the_clock() {
        assert_eq!(greeting(4), "Hello, night owl!");
        assert_eq!(greeting(5), "Good morning, sunshine!");
        assert_eq!(greeting(11), "Good morning, sunshine!");
        assert_eq!(greeting(12), "Good afternoon, champ!");
        assert_eq!(greeting(18), "Good evening, rockstar!");
        assert_eq!(greeting(22), "Hello, night owl!");
        assert_eq!(greeting(0), "Hello, night owl!");
    }

    #[test]
    fn test_describe_entities() {
        assert_eq!(describe_entities(Vec::<(&str, &str)>::new()), "none");
        assert_eq!(
            describe_entities([("Paris", "GPE"), ("Ada", "PERSON")]),
            "Paris (GPE), Ada (PERSON)"
        );
    }
}
