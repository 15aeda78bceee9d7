//! Selector popup widget for choosing from a short list of options

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, StatefulWidget, Widget},
};

const MIN_POPUP_WIDTH: u16 = 20;
const MAX_POPUP_WIDTH: u16 = 60;
const MAX_POPUP_HEIGHT: u16 = 12;

/// An option in the selector
#[derive(Debug, Clone)]
pub struct SelectorItem {
    pub label: String,
    pub description: Option<String>,
    /// Marks the option that is currently in effect
    pub is_current: bool,
}

impl SelectorItem {
    pub fn new(label: impl Into<String>, is_current: bool) -> Self {
        Self {
            label: label.into(),
            description: None,
            is_current,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn text(&self) -> String {
        let marker = if self.is_current { "● " } else { "  " };
        match &self.description {
            Some(description) => format!("{}{}  {}", marker, self.label, description),
            None => format!("{}{}", marker, self.label),
        }
    }
}

/// A popup selector, drawn centered over whatever is below it
pub struct Selector<'a> {
    title: &'a str,
    items: &'a [SelectorItem],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> Selector<'a> {
    pub fn new(title: &'a str, items: &'a [SelectorItem], theme: &'a Theme) -> Self {
        Self {
            title,
            items,
            selected: 0,
            theme,
        }
    }

    pub fn with_selected(mut self, index: usize) -> Self {
        self.selected = index.min(self.items.len().saturating_sub(1));
        self
    }

    fn popup_area(&self, area: Rect) -> Rect {
        let widest = self
            .items
            .iter()
            .map(|item| item.text().chars().count() + 4)
            .chain(std::iter::once(self.title.chars().count() + 4))
            .max()
            .unwrap_or(0);
        let width = (widest as u16)
            .clamp(MIN_POPUP_WIDTH, MAX_POPUP_WIDTH)
            .min(area.width);
        let height = (self.items.len() as u16 + 2)
            .min(MAX_POPUP_HEIGHT)
            .min(area.height);
        Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        )
    }
}

impl Widget for Selector<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = self.popup_area(area);
        Clear.render(popup, buf);

        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if i == self.selected {
                    Style::default()
                        .bg(self.theme.accent)
                        .fg(self.theme.bg)
                        .add_modifier(Modifier::BOLD)
                } else if item.is_current {
                    self.theme.accent_style()
                } else {
                    self.theme.base_style()
                };
                ListItem::new(Line::from(Span::styled(item.text(), style)))
            })
            .collect();

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.accent_style());
        let list = List::new(items)
            .block(block)
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(Some(self.selected));
        StatefulWidget::render(list, popup, buf, &mut state);
    }
}

/// Open/closed state and cursor for a selector popup
#[derive(Debug, Default)]
pub struct SelectorState {
    pub selected: usize,
    pub visible: bool,
}

impl SelectorState {
    /// Show the popup with the cursor on `index`
    pub fn open_at(&mut self, index: usize) {
        self.selected = index;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Move up, wrapping to the last item
    pub fn up(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        self.selected = self.selected.checked_sub(1).unwrap_or(item_count - 1);
    }

    /// Move down, wrapping to the first item
    pub fn down(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        self.selected = (self.selected + 1) % item_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_wraps_both_ways() {
        let mut state = SelectorState::default();
        state.open_at(0);
        assert!(state.visible);
        state.up(2);
        assert_eq!(state.selected, 1);
        state.down(2);
        assert_eq!(state.selected, 0);
        state.down(0);
        assert_eq!(state.selected, 0);
        state.hide();
        assert!(!state.visible);
    }

    #[test]
    fn test_popup_is_centered_and_clamped() {
        let theme = Theme::dark();
        let items = vec![
            SelectorItem::new("Female", true),
            SelectorItem::new("Male", false),
        ];
        let selector = Selector::new("Voice", &items, &theme);
        let popup = selector.popup_area(Rect::new(0, 0, 80, 24));
        assert_eq!(popup.width, MIN_POPUP_WIDTH);
        assert_eq!(popup.height, 4);
        assert_eq!(popup.x, 30);
        assert_eq!(popup.y, 10);
    }

    #[test]
    fn test_current_item_is_marked() {
        assert_eq!(SelectorItem::new("Male", true).text(), "● Male");
        assert_eq!(
            SelectorItem::new("Female", false)
                .with_description("en+f3")
                .text(),
            "  Female  en+f3"
        );
    }
}
