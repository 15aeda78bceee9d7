//! Recent-message history list

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, StatefulWidget, Widget},
};

/// Cursor over the history list. Movement clamps at both ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCursor {
    selected: Option<usize>,
}

impl HistoryCursor {
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        });
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => i.saturating_sub(1),
            None => 0,
        });
    }

    /// Keep the cursor valid after the list changed length
    pub fn clamp(&mut self, len: usize) {
        self.selected = match self.selected {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => None,
        };
    }

    pub fn reset(&mut self) {
        self.selected = None;
    }
}

/// Newest-first list of message previews
pub struct HistoryPanel<'a> {
    entries: Vec<&'a str>,
    cursor: HistoryCursor,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> HistoryPanel<'a> {
    pub fn new(entries: impl IntoIterator<Item = &'a str>, theme: &'a Theme) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            cursor: HistoryCursor::default(),
            focused: false,
            theme,
        }
    }

    pub fn cursor(mut self, cursor: HistoryCursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for HistoryPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" History ({}) ", self.entries.len());
        let block = Block::default()
            .title(title)
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(if self.focused {
                self.theme.accent_style()
            } else {
                self.theme.border_style()
            });

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| ListItem::new(Line::from(Span::styled(*entry, self.theme.base_style()))))
            .collect();

        let highlight = if self.focused {
            Style::default()
                .bg(self.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("› ")
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(self.cursor.selected());
        StatefulWidget::render(list, area, buf, &mut state);
    }
}
