//! Side panel showing the analysis of the latest user message

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Display-ready analysis of one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisView {
    pub sentiment: String,
    pub complexity: String,
    pub keywords: Vec<String>,
    /// `(text, label)` pairs
    pub entities: Vec<(String, String)>,
}

impl AnalysisView {
    fn lines<'a>(&'a self, theme: &Theme) -> Vec<Line<'a>> {
        let row = |label: &'static str, value: Span<'a>| {
            Line::from(vec![Span::styled(label, theme.dim_style()), value])
        };

        let keywords = if self.keywords.is_empty() {
            "none".to_string()
        } else {
            self.keywords.join(", ")
        };

        let mut lines = vec![
            row(
                "Sentiment:  ",
                Span::styled(
                    self.sentiment.as_str(),
                    theme.sentiment_style(&self.sentiment),
                ),
            ),
            row(
                "Complexity: ",
                Span::styled(
                    self.complexity.as_str(),
                    theme.complexity_style(&self.complexity),
                ),
            ),
            row("Keywords:   ", Span::styled(keywords, theme.base_style())),
            Line::from(Span::styled("Entities:", theme.dim_style())),
        ];

        if self.entities.is_empty() {
            lines.push(Line::from(Span::styled("  none", theme.dim_style())));
        }
        for (text, label) in &self.entities {
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", text), theme.base_style()),
                Span::styled(format!("({})", label), theme.accent_style()),
            ]));
        }
        lines
    }
}

/// Panel widget; renders a placeholder until the first analysis arrives
pub struct AnalysisPanel<'a> {
    view: Option<&'a AnalysisView>,
    theme: &'a Theme,
}

impl<'a> AnalysisPanel<'a> {
    pub fn new(view: Option<&'a AnalysisView>, theme: &'a Theme) -> Self {
        Self { view, theme }
    }
}

impl Widget for AnalysisPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Analysis ")
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());

        let lines = match self.view {
            Some(view) => view.lines(self.theme),
            None => vec![Line::from(Span::styled(
                "Send a message to see its analysis.",
                self.theme.dim_style(),
            ))],
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_rows_for_a_full_analysis() {
        let theme = Theme::dark();
        let view = AnalysisView {
            sentiment: "positive".into(),
            complexity: "Low".into(),
            keywords: vec!["paris".into(), "trip".into()],
            entities: vec![("Paris".into(), "GPE".into())],
        };
        let rendered: Vec<String> = view.lines(&theme).iter().map(text_of).collect();
        assert_eq!(
            rendered,
            vec![
                "Sentiment:  positive",
                "Complexity: Low",
                "Keywords:   paris, trip",
                "Entities:",
                "  Paris (GPE)",
            ]
        );
    }

    #[test]
    fn test_empty_lists_say_none() {
        let theme = Theme::dark();
        let view = AnalysisView {
            sentiment: "neutral".into(),
            complexity: "Low".into(),
            ..Default::default()
        };
        let rendered: Vec<String> = view.lines(&theme).iter().map(text_of).collect();
        assert_eq!(rendered[2], "Keywords:   none");
        assert_eq!(rendered[4], "  none");
    }
}
