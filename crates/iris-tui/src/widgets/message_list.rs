//! Message list widget for the conversation pane

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Who a line in the conversation pane belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    User,
    Assistant,
    /// Status notices such as "Conversation cleared."
    Notice,
    Error,
}

/// A single entry in the conversation pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub kind: LineKind,
    pub text: String,
}

impl ChatLine {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(LineKind::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(LineKind::Assistant, text)
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(LineKind::Notice, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(LineKind::Error, text)
    }

    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Header label and marker for each kind
fn header(kind: LineKind) -> (&'static str, &'static str) {
    match kind {
        LineKind::User => ("▶ ", "You"),
        LineKind::Assistant => ("◀ ", "Iris"),
        LineKind::Notice => ("● ", "Notice"),
        LineKind::Error => ("✗ ", "Error"),
    }
}

/// Body text wrapped to the pane, indented by two columns
fn wrap_body(text: &str, width: usize) -> Vec<String> {
    let body_width = width.saturating_sub(2).max(1);
    textwrap::wrap(text, body_width)
        .into_iter()
        .map(|line| format!("  {}", line))
        .collect()
}

/// Widget for displaying the conversation
pub struct MessageList<'a> {
    lines: &'a [ChatLine],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(lines: &'a [ChatLine], theme: &'a Theme) -> Self {
        Self {
            lines,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset in rendered rows
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    fn render_entry(&self, entry: &ChatLine, width: usize) -> Vec<Line<'static>> {
        let (marker, label) = header(entry.kind);
        let (header_style, body_style): (Style, Style) = match entry.kind {
            LineKind::User => (self.theme.user_style(), self.theme.base_style()),
            LineKind::Assistant => (self.theme.assistant_style(), self.theme.base_style()),
            LineKind::Notice => (self.theme.dim_style(), self.theme.dim_style()),
            LineKind::Error => (self.theme.error_style(), self.theme.error_style()),
        };

        let mut rendered = vec![Line::from(Span::styled(
            format!("{}{}", marker, label),
            header_style,
        ))];
        rendered.extend(
            wrap_body(&entry.text, width)
                .into_iter()
                .map(|line| Line::from(Span::styled(line, body_style))),
        );
        rendered.push(Line::from(""));
        rendered
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let visible: Vec<Line> = self
            .lines
            .iter()
            .flat_map(|entry| self.render_entry(entry, width))
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Total rendered height of `lines` at `width`
pub fn calculate_message_height(lines: &[ChatLine], width: usize) -> usize {
    lines
        .iter()
        .map(|entry| wrap_body(&entry.text, width).len() + 2)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_counts_header_body_and_gap() {
        let lines = vec![
            ChatLine::user("hello"),
            ChatLine::assistant("one two three four five six"),
        ];
        // width 12 leaves 10 columns of body
        assert_eq!(calculate_message_height(&lines[..1], 12), 3);
        assert_eq!(calculate_message_height(&lines[1..], 12), 5);
        assert_eq!(calculate_message_height(&lines, 12), 8);
    }

    #[test]
    fn test_render_shows_sender_headers() {
        let theme = Theme::dark();
        let lines = vec![ChatLine::user("hi"), ChatLine::assistant("hello")];
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        MessageList::new(&lines, &theme).render(area, &mut buf);

        let row = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        };
        assert!(row(0).contains("You"));
        assert!(row(1).contains("hi"));
        assert!(row(3).contains("Iris"));
        assert!(row(4).contains("hello"));
    }
}
