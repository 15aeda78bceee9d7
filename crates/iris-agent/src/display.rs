//! Bounded list of short history entries shown beside the conversation.

use std::collections::VecDeque;

/// Maximum entries kept in the history list
pub const DISPLAY_HISTORY_CAP: usize = 50;

/// Characters of a message kept in its history entry
pub const PREVIEW_CHARS: usize = 30;

/// Build the history entry for a displayed message: `"{sender}: {first 30 chars}..."`
pub fn entry_for(sender: &str, text: &str) -> String {
    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{sender}: {preview}...")
}

/// Newest-first list of history entries, evicting the oldest past the cap.
#[derive(Debug, Clone)]
pub struct DisplayHistory {
    entries: VecDeque<String>,
    cap: usize,
}

impl Default for DisplayHistory {
    fn default() -> Self {
        Self::with_cap(DISPLAY_HISTORY_CAP)
    }
}

impl DisplayHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap + 1),
            cap,
        }
    }

    /// Record a displayed message
    pub fn record(&mut self, sender: &str, text: &str) {
        self.push(entry_for(sender, text));
    }

    /// Insert an entry at the top
    pub fn push(&mut self, entry: String) {
        self.entries.push_front(entry);
        while self.entries.len() > self.cap {
            self.entries.pop_back();
        }
    }

    /// Entry at `index`, 0 being the newest
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
