//! Text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Columns taken by the border and padding
const CHROME_WIDTH: usize = 4;

/// Single-line message entry.
///
/// The box can be locked while a voice phrase is captured; a locked box
/// ignores edits and shows its lock label instead of the text.
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    /// Cursor position in characters
    cursor: usize,
    /// Horizontal scroll offset in display columns
    scroll: usize,
    placeholder: String,
    focused: bool,
    locked: Option<String>,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the text and move the cursor to the end
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Take the entered text, leaving the box empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.scroll = 0;
        std::mem::take(&mut self.content)
    }

    /// Lock the box with a label, or unlock it with `None`
    pub fn set_locked(&mut self, label: Option<&str>) {
        self.locked = label.map(str::to_string);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Byte offset of the character at `index`
    fn byte_at(&self, index: usize) -> usize {
        self.content
            .char_indices()
            .nth(index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    /// Display width of the text before the cursor
    fn cursor_column(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    /// Remove the characters in `start..end` (character indices)
    fn remove_chars(&mut self, start: usize, end: usize) {
        let range = self.byte_at(start)..self.byte_at(end);
        self.content.drain(range);
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Start of the word before the cursor, skipping trailing spaces
    fn word_start(&self) -> usize {
        let chars: Vec<char> = self.content.chars().take(self.cursor).collect();
        let mut start = chars.len();
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && chars[start - 1] != ' ' {
            start -= 1;
        }
        start
    }

    /// Apply an editing action. Returns whether anything changed.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        if self.locked.is_some() {
            return false;
        }

        let changed = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Backspace if self.cursor > 0 => {
                self.remove_chars(self.cursor - 1, self.cursor);
                self.cursor -= 1;
                true
            }
            Action::Delete if self.cursor < self.char_count() => {
                self.remove_chars(self.cursor, self.cursor + 1);
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < self.char_count() => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = self.char_count();
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let start = self.word_start();
                self.remove_chars(start, self.cursor);
                self.cursor = start;
                true
            }
            Action::Paste(text) => {
                // Line breaks collapse into single spaces
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        if self.cursor > 0 && !self.content.ends_with(' ') {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                true
            }
            _ => false,
        };

        if changed {
            self.follow_cursor(width as usize);
        }
        changed
    }

    fn follow_cursor(&mut self, width: usize) {
        let visible = width.saturating_sub(CHROME_WIDTH).max(1);
        let column = self.cursor_column();
        if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + visible {
            self.scroll = column + 1 - visible;
        }
    }

    /// The slice of text that fits in `width` columns after scrolling
    fn visible_text(&self, width: usize) -> String {
        let mut column = 0;
        let mut shown = 0;
        let mut visible = String::new();
        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if column < self.scroll {
                column += w;
                continue;
            }
            if shown + w > width {
                break;
            }
            visible.push(c);
            shown += w;
        }
        visible
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused && self.locked.is_none() {
                theme.accent_style()
            } else {
                theme.border_style()
            });
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if let Some(label) = &self.locked {
            Line::from(Span::styled(label.as_str(), theme.warning_style()))
        } else if self.content.is_empty() {
            Line::from(Span::styled(self.placeholder.as_str(), theme.dim_style()))
        } else {
            Line::from(Span::styled(
                self.visible_text(inner.width as usize),
                theme.base_style(),
            ))
        };
        Paragraph::new(line).render(inner, buf);

        if self.focused && self.locked.is_none() && inner.width > 0 {
            let x = self.cursor_column().saturating_sub(self.scroll);
            if x < inner.width as usize {
                if let Some(cell) = buf.cell_mut((inner.x + x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}
