//! Animated activity indicators for the status line

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, style::Style, text::Span, widgets::Widget};
use std::time::{Duration, Instant};

const DOT_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const PULSE_FRAMES: &[&str] = &["◉", "◎", "○", "◎"];

/// What the assistant is busy with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// A reply is being generated
    Typing,
    /// The microphone is open
    Listening,
}

impl Activity {
    fn frames(self) -> (&'static [&'static str], Duration) {
        match self {
            Activity::Typing => (DOT_FRAMES, Duration::from_millis(80)),
            Activity::Listening => (PULSE_FRAMES, Duration::from_millis(250)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Activity::Typing => "Iris is typing...",
            Activity::Listening => "Listening...",
        }
    }
}

/// Animated spinner widget
pub struct Spinner<'a> {
    activity: Activity,
    theme: &'a Theme,
    start_time: Instant,
}

impl<'a> Spinner<'a> {
    pub fn new(activity: Activity, theme: &'a Theme) -> Self {
        Self {
            activity,
            theme,
            start_time: Instant::now(),
        }
    }

    /// Animate relative to `start` so the frame survives redraws
    pub fn with_start_time(mut self, start: Instant) -> Self {
        self.start_time = start;
        self
    }

    fn frame_at(&self, elapsed: Duration) -> &'static str {
        let (frames, step) = self.activity.frames();
        let index = (elapsed.as_millis() / step.as_millis()) as usize;
        frames[index % frames.len()]
    }

    fn style(&self) -> Style {
        match self.activity {
            Activity::Typing => self.theme.accent_style(),
            Activity::Listening => self.theme.warning_style(),
        }
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 {
            return;
        }
        let text = format!(
            "{} {}",
            self.frame_at(self.start_time.elapsed()),
            self.activity.label()
        );
        let span = Span::styled(text, self.style());
        buf.set_span(area.x, area.y, &span, area.width);
    }
}
