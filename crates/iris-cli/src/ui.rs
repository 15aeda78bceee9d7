//! TUI implementation for iris

use chrono::Timelike;
use crossterm::event::EventStream;
use futures::StreamExt;
use iris_agent::{
    AnalysisResult, ChatEvent, DisplayHistory, Flow, Sender, Submission, TurnProcessor,
    VoiceGender,
};
use iris_ai::Model;
use iris_tui::{
    App, Theme, ThemeMode,
    input::{Action, event_to_action},
    widgets::{
        Activity, AnalysisPanel, AnalysisView, ChatLine, HistoryCursor, HistoryPanel, InputBox,
        MessageList, Selector, SelectorItem, SelectorState, Spinner, calculate_message_height,
    },
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;

use crate::commands::{CommandResult, execute_command};
use crate::utils::greeting;

/// Side panels are hidden below this terminal width
const SIDE_PANEL_MIN_WIDTH: u16 = 90;
const SIDE_PANEL_WIDTH: u16 = 38;
const ANALYSIS_PANEL_HEIGHT: u16 = 11;
const VOICES: [VoiceGender; 2] = [VoiceGender::Female, VoiceGender::Male];

/// Requests from the UI to the turn processor
#[derive(Debug, Clone, PartialEq)]
pub enum UiMessage {
    /// User submitted input
    Submit(String),
    /// Capture one spoken phrase
    Listen,
    StopSpeaking,
    Clear,
    SetVoice(VoiceGender),
    SetRate(u32),
    SetVolume(f32),
    /// A history entry was picked
    Recall(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    History,
}

/// TUI application state
pub struct TuiState {
    lines: Vec<ChatLine>,
    input: InputBox,
    /// Scroll offset in rows; `usize::MAX` pins to the bottom
    scroll: usize,
    /// Response tasks still running
    typing: usize,
    listening: bool,
    analysis: Option<AnalysisView>,
    history: DisplayHistory,
    history_cursor: HistoryCursor,
    focus: Focus,
    voice: VoiceGender,
    voice_selector: SelectorState,
    status: String,
    model_name: String,
    theme_mode: ThemeMode,
    theme: Theme,
    spinner_start: Instant,
}

impl TuiState {
    pub fn new(model: &Model, voice: VoiceGender) -> Self {
        let mut input = InputBox::new().with_placeholder("Type a message...");
        input.set_focused(true);
        let model_name = model
            .id
            .split('/')
            .next_back()
            .unwrap_or(&model.id)
            .to_string();

        Self {
            lines: Vec::new(),
            input,
            scroll: 0,
            typing: 0,
            listening: false,
            analysis: None,
            history: DisplayHistory::new(),
            history_cursor: HistoryCursor::default(),
            focus: Focus::Input,
            voice,
            voice_selector: SelectorState::default(),
            status: "Ready".to_string(),
            model_name,
            theme_mode: ThemeMode::default(),
            theme: Theme::default(),
            spinner_start: Instant::now(),
        }
    }

    fn push_line(&mut self, line: ChatLine) {
        self.lines.push(line);
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved against the content height at render time
        self.scroll = usize::MAX;
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.input.set_focused(focus == Focus::Input);
        if focus == Focus::History && self.history_cursor.selected().is_none() {
            self.history_cursor.next(self.history.len());
        }
    }

    /// Apply a processor event. Returns `false` once the session is over.
    pub fn handle_event(&mut self, event: ChatEvent) -> bool {
        match event {
            ChatEvent::Message { sender, text } => {
                self.history.record(sender.display_name(), &text);
                self.history_cursor.clamp(self.history.len());
                self.push_line(match sender {
                    Sender::User => ChatLine::user(text),
                    Sender::Assistant => ChatLine::assistant(text),
                });
            }
            ChatEvent::Typing { active: true } => {
                self.typing += 1;
                self.spinner_start = Instant::now();
            }
            ChatEvent::Typing { active: false } => {
                self.typing = self.typing.saturating_sub(1);
            }
            ChatEvent::Listening { active } => {
                self.listening = active;
                self.input
                    .set_locked(active.then_some("Listening... speak now"));
                if active {
                    self.spinner_start = Instant::now();
                }
            }
            ChatEvent::Analysis { result } => {
                self.analysis = Some(analysis_view(&result));
            }
            ChatEvent::VoiceTranscript { text } => {
                self.status = format!("Heard: {}", text);
            }
            ChatEvent::Error { message, .. } => {
                self.status = message.clone();
                self.push_line(ChatLine::error(message));
            }
            ChatEvent::Notice { text } => self.push_line(ChatLine::notice(text)),
            ChatEvent::HistoryCleared => {
                self.lines.clear();
                self.history.clear();
                self.history_cursor.reset();
                self.scroll = 0;
                self.status = "Conversation cleared.".to_string();
                if self.focus == Focus::History {
                    self.set_focus(Focus::Input);
                }
            }
            ChatEvent::Shutdown => return false,
        }
        true
    }

    /// Handle a key action, returning a request for the processor if the
    /// action needs one
    pub fn handle_action(&mut self, action: Action, width: u16) -> Option<UiMessage> {
        if self.voice_selector.visible {
            return self.handle_voice_selector(action);
        }

        match action {
            Action::Quit | Action::Interrupt => return Some(UiMessage::Quit),
            Action::Clear => return Some(UiMessage::Clear),
            Action::StopSpeaking => {
                self.status = "Speech stopped.".to_string();
                return Some(UiMessage::StopSpeaking);
            }
            Action::VoiceInput => return self.request_listen(),
            Action::VoiceSelect => {
                self.open_voice_selector();
                return None;
            }
            Action::ToggleTheme => {
                self.set_theme(self.theme_mode.toggled());
                return None;
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                return None;
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::History => self.handle_history_action(action),
            Focus::Input => self.handle_input_action(action, width),
        }
    }

    fn set_theme(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        self.theme = Theme::for_mode(mode);
        self.status = format!("Theme: {}", mode);
    }

    fn request_listen(&mut self) -> Option<UiMessage> {
        if self.listening {
            return None;
        }
        Some(UiMessage::Listen)
    }

    fn open_voice_selector(&mut self) {
        let current = VOICES.iter().position(|v| *v == self.voice).unwrap_or(0);
        self.voice_selector.open_at(current);
    }

    fn handle_voice_selector(&mut self, action: Action) -> Option<UiMessage> {
        match action {
            Action::Up => self.voice_selector.up(VOICES.len()),
            Action::Down => self.voice_selector.down(VOICES.len()),
            Action::Submit => {
                self.voice_selector.hide();
                let gender = VOICES[self.voice_selector.selected % VOICES.len()];
                return self.choose_voice(gender);
            }
            Action::Escape | Action::VoiceSelect => self.voice_selector.hide(),
            Action::Quit | Action::Interrupt => return Some(UiMessage::Quit),
            _ => {}
        }
        None
    }

    fn choose_voice(&mut self, gender: VoiceGender) -> Option<UiMessage> {
        if gender == self.voice {
            return None;
        }
        self.voice = gender;
        self.status = format!("Voice: {}", gender);
        Some(UiMessage::SetVoice(gender))
    }

    fn handle_history_action(&mut self, action: Action) -> Option<UiMessage> {
        match action {
            Action::Up => self.history_cursor.previous(self.history.len()),
            Action::Down => self.history_cursor.next(self.history.len()),
            Action::Submit => {
                let entry = self
                    .history_cursor
                    .selected()
                    .and_then(|i| self.history.get(i))?;
                return Some(UiMessage::Recall(entry.to_string()));
            }
            Action::Tab | Action::BackTab | Action::Escape => self.set_focus(Focus::Input),
            _ => {}
        }
        None
    }

    fn handle_input_action(&mut self, action: Action, width: u16) -> Option<UiMessage> {
        match action {
            Action::Submit => {
                if self.input.is_locked() || self.input.content().trim().is_empty() {
                    return None;
                }
                let content = self.input.take();
                let content = content.trim();
                match execute_command(content, self.voice) {
                    Some(result) => self.apply_command(result),
                    None => Some(UiMessage::Submit(content.to_string())),
                }
            }
            Action::Tab | Action::BackTab => {
                if !self.history.is_empty() {
                    self.set_focus(Focus::History);
                }
                None
            }
            Action::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            Action::Down => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            _ => {
                self.input.handle_action(&action, width);
                None
            }
        }
    }

    fn apply_command(&mut self, result: CommandResult) -> Option<UiMessage> {
        match result {
            CommandResult::Clear => Some(UiMessage::Clear),
            CommandResult::SetVoice(gender) => self.choose_voice(gender),
            CommandResult::OpenVoiceSelector => {
                self.open_voice_selector();
                None
            }
            CommandResult::SetRate(wpm) => {
                self.status = format!("Rate: {} wpm", wpm);
                Some(UiMessage::SetRate(wpm))
            }
            CommandResult::SetVolume(volume) => {
                self.status = format!("Volume: {:.0}%", volume * 100.0);
                Some(UiMessage::SetVolume(volume))
            }
            CommandResult::SetTheme(mode) => {
                self.set_theme(mode.unwrap_or(self.theme_mode.toggled()));
                None
            }
            CommandResult::Listen => self.request_listen(),
            CommandResult::StopSpeaking => Some(UiMessage::StopSpeaking),
            CommandResult::History => {
                self.set_focus(Focus::History);
                None
            }
            CommandResult::Message(msg) => {
                self.push_line(ChatLine::notice(msg));
                None
            }
            CommandResult::Exit => Some(UiMessage::Quit),
            CommandResult::Unknown(cmd) => {
                self.push_line(ChatLine::notice(format!(
                    "Unknown command: /{}\nType /help for available commands.",
                    cmd
                )));
                None
            }
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let (main, side) = if size.width >= SIDE_PANEL_MIN_WIDTH {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(1), Constraint::Length(SIDE_PANEL_WIDTH)])
                .split(size);
            (columns[0], Some(columns[1]))
        } else {
            (size, None)
        };

        // Layout: messages (flex), status bar (1), input (3)
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(main);

        self.render_messages(frame, rows[0]);
        self.render_status(frame, rows[1]);
        self.input.render(rows[2], frame.buffer_mut(), &self.theme);

        if let Some(side) = side {
            self.render_side_panels(frame, side);
        }

        if self.voice_selector.visible {
            let items: Vec<SelectorItem> = VOICES
                .iter()
                .map(|v| SelectorItem::new(capitalize(v.as_str()), *v == self.voice))
                .collect();
            let selector = Selector::new("Select Voice", &items, &self.theme)
                .with_selected(self.voice_selector.selected);
            frame.render_widget(selector, size);
        }
    }

    fn render_side_panels(&self, frame: &mut Frame, area: Rect) {
        let panels = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(ANALYSIS_PANEL_HEIGHT),
                Constraint::Min(3),
            ])
            .split(area);

        frame.render_widget(
            AnalysisPanel::new(self.analysis.as_ref(), &self.theme),
            panels[0],
        );
        frame.render_widget(
            HistoryPanel::new(self.history.iter(), &self.theme)
                .cursor(self.history_cursor)
                .focused(self.focus == Focus::History),
            panels[1],
        );
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" Iris │ {} │ voice: {} ", self.model_name, self.voice);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }
        if self.lines.is_empty() {
            frame.render_widget(self.welcome(), inner);
            return;
        }

        let content_height = calculate_message_height(&self.lines, inner.width as usize);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        frame.render_widget(
            MessageList::new(&self.lines, &self.theme).scroll(self.scroll),
            inner,
        );
    }

    fn welcome(&self) -> Paragraph<'static> {
        let key = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("    {:<10}", keys), self.theme.accent_style()),
                Span::styled(what, self.theme.base_style()),
            ])
        };

        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", greeting(chrono::Local::now().hour())),
                self.theme.accent_bold(),
            )),
            Line::from(vec![
                Span::styled("  Iris", self.theme.accent_bold()),
                Span::styled(" - your voice-enabled assistant", self.theme.dim_style()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("  Model: {}", self.model_name),
                self.theme.dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled("  Keybindings", self.theme.warning_style())),
            Line::from(""),
            key("Enter", "Send message"),
            key("Ctrl+R", "Speak a message"),
            key("Ctrl+S", "Stop speaking"),
            key("Ctrl+V", "Select voice"),
            key("Ctrl+L", "Clear conversation"),
            key("Ctrl+T", "Light / dark theme"),
            key("Tab", "Browse history"),
            key("Ctrl+Q", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "  Type a message, or \"exit\" to quit.",
                self.theme.dim_style(),
            )),
        ])
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let activity = if self.listening {
            Some(Activity::Listening)
        } else if self.typing > 0 {
            Some(Activity::Typing)
        } else {
            None
        };

        match activity {
            Some(activity) => frame.render_widget(
                Spinner::new(activity, &self.theme).with_start_time(self.spinner_start),
                area,
            ),
            None => frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {}", self.status),
                    self.theme.dim_style(),
                )),
                area,
            ),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn analysis_view(result: &AnalysisResult) -> AnalysisView {
    AnalysisView {
        sentiment: result.sentiment.to_string(),
        complexity: result.complexity.to_string(),
        keywords: result.keywords.clone(),
        entities: result
            .named_entities
            .iter()
            .map(|e| (e.text.clone(), e.label.clone()))
            .collect(),
    }
}

/// Forward a UI request to the processor. Returns `false` to end the session.
fn dispatch(processor: &mut TurnProcessor, message: UiMessage) -> bool {
    match message {
        UiMessage::Submit(text) => processor.submit_user_text(&text) != Submission::Shutdown,
        UiMessage::Listen => {
            processor.start_voice_capture();
            true
        }
        UiMessage::StopSpeaking => {
            processor.stop_speaking();
            true
        }
        UiMessage::Clear => {
            processor.clear_history();
            true
        }
        UiMessage::SetVoice(gender) => {
            processor.change_voice(gender);
            true
        }
        UiMessage::SetRate(wpm) => {
            processor.set_speech_rate(wpm);
            true
        }
        UiMessage::SetVolume(volume) => {
            processor.set_speech_volume(volume);
            true
        }
        UiMessage::Recall(entry) => {
            processor.recall_history_item(&entry);
            true
        }
        UiMessage::Quit => false,
    }
}

/// Run the terminal UI until the user quits
pub async fn run_tui(
    processor: &mut TurnProcessor,
    model: &Model,
    voice: VoiceGender,
) -> anyhow::Result<()> {
    let mut app = App::new()?;
    let mut state = TuiState::new(model, voice);
    let mut events = processor.subscribe();
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    let result = loop {
        app.draw(|frame| state.render(frame))?;
        let width = app.width()?;

        tokio::select! {
            biased;

            // Processor events first so the screen reflects every outcome
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if !state.handle_event(event) {
                            break Ok(());
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "ui fell behind processor events");
                    }
                    Err(RecvError::Closed) => break Ok(()),
                }
            }

            Some(outcome) = processor.next_outcome() => {
                if processor.apply(outcome) == Flow::Shutdown {
                    break Ok(());
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(event)) => {
                        let Some(action) = event_to_action(event) else {
                            continue;
                        };
                        if let Some(message) = state.handle_action(action, width) {
                            if !dispatch(processor, message) {
                                break Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => break Err(anyhow::anyhow!("Event error: {}", e)),
                    None => break Ok(()),
                }
            }

            // Tick for spinner animation
            _ = tick_interval.tick() => {}
        }
    };

    processor.stop_speaking();
    drop(app);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_agent::{Complexity, Entity, ErrorKind, Sentiment};
    use iris_ai::Provider;

    fn state() -> TuiState {
        TuiState::new(
            &Model::new(Provider::Groq, "llama3-groq-70b-8192-tool-use-preview"),
            VoiceGender::Female,
        )
    }

    fn message(sender: Sender, text: &str) -> ChatEvent {
        ChatEvent::Message {
            sender,
            text: text.to_string(),
        }
    }

    fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c), 80);
        }
    }

    #[test]
    fn test_messages_feed_conversation_and_history() {
        let mut state = state();
        state.handle_event(message(Sender::User, "Tell me about Paris in the spring"));
        state.handle_event(message(Sender::Assistant, "Paris is lovely."));

        assert_eq!(state.lines.len(), 2);
        assert_eq!(state.lines[1], ChatLine::assistant("Paris is lovely."));
        assert_eq!(state.history.get(0), Some("Iris: Paris is lovely...."));
        assert_eq!(
            state.history.get(1),
            Some("You: Tell me about Paris in the spr...")
        );
    }

    #[test]
    fn test_typing_indicator_counts_overlapping_turns() {
        let mut state = state();
        state.handle_event(ChatEvent::Typing { active: true });
        state.handle_event(ChatEvent::Typing { active: true });
        state.handle_event(ChatEvent::Typing { active: false });
        assert_eq!(state.typing, 1);
        state.handle_event(ChatEvent::Typing { active: false });
        state.handle_event(ChatEvent::Typing { active: false });
        assert_eq!(state.typing, 0);
    }

    #[test]
    fn test_analysis_and_errors() {
        let mut state = state();
        state.handle_event(ChatEvent::Analysis {
            result: AnalysisResult {
                sentiment: Sentiment::Negative,
                keywords: vec!["rain".into()],
                named_entities: vec![Entity::new("London", "GPE")],
                complexity: Complexity::Medium,
            },
        });
        let view = state.analysis.as_ref().unwrap();
        assert_eq!(view.sentiment, "negative");
        assert_eq!(view.complexity, "Medium");
        assert_eq!(view.entities, vec![("London".to_string(), "GPE".to_string())]);

        state.handle_event(ChatEvent::Error {
            kind: ErrorKind::Generation,
            message: "Error generating response: rate limited".into(),
        });
        assert_eq!(
            state.lines.last(),
            Some(&ChatLine::error("Error generating response: rate limited"))
        );
    }

    #[test]
    fn test_history_cleared_empties_view_and_list() {
        let mut state = state();
        state.handle_event(message(Sender::User, "hi"));
        assert!(state.handle_event(ChatEvent::HistoryCleared));
        assert!(state.lines.is_empty());
        assert!(state.history.is_empty());
        assert!(!state.handle_event(ChatEvent::Shutdown));
    }

    #[test]
    fn test_submit_takes_trimmed_input() {
        let mut state = state();
        type_text(&mut state, "  hello  ");
        assert_eq!(
            state.handle_action(Action::Submit, 80),
            Some(UiMessage::Submit("hello".into()))
        );
        assert_eq!(state.input.content(), "");
        assert_eq!(state.handle_action(Action::Submit, 80), None);
    }

    #[test]
    fn test_slash_commands_from_the_input() {
        let mut state = state();
        type_text(&mut state, "/voice male");
        assert_eq!(
            state.handle_action(Action::Submit, 80),
            Some(UiMessage::SetVoice(VoiceGender::Male))
        );
        assert_eq!(state.voice, VoiceGender::Male);

        type_text(&mut state, "/nope");
        assert_eq!(state.handle_action(Action::Submit, 80), None);
        assert_eq!(state.lines.last().map(|l| l.kind), Some(iris_tui::widgets::LineKind::Notice));
    }

    #[test]
    fn test_listening_locks_input() {
        let mut state = state();
        assert_eq!(state.handle_action(Action::VoiceInput, 80), Some(UiMessage::Listen));
        state.handle_event(ChatEvent::Listening { active: true });
        assert_eq!(state.handle_action(Action::VoiceInput, 80), None);
        type_text(&mut state, "abc");
        assert_eq!(state.input.content(), "");
        state.handle_event(ChatEvent::Listening { active: false });
        type_text(&mut state, "abc");
        assert_eq!(state.input.content(), "abc");
    }

    #[test]
    fn test_voice_selector_round_trip() {
        let mut state = state();
        state.handle_action(Action::VoiceSelect, 80);
        assert!(state.voice_selector.visible);
        assert_eq!(state.voice_selector.selected, 0);
        state.handle_action(Action::Down, 80);
        assert_eq!(
            state.handle_action(Action::Submit, 80),
            Some(UiMessage::SetVoice(VoiceGender::Male))
        );
        assert!(!state.voice_selector.visible);

        // Picking the current voice again changes nothing
        state.handle_action(Action::VoiceSelect, 80);
        assert_eq!(state.handle_action(Action::Submit, 80), None);
    }

    #[test]
    fn test_history_focus_and_recall() {
        let mut state = state();
        // Tab does nothing while the history is empty
        state.handle_action(Action::Tab, 80);
        assert_eq!(state.focus, Focus::Input);

        state.handle_event(message(Sender::User, "first"));
        state.handle_event(message(Sender::Assistant, "second"));
        state.handle_action(Action::Tab, 80);
        assert_eq!(state.focus, Focus::History);
        state.handle_action(Action::Down, 80);
        assert_eq!(
            state.handle_action(Action::Submit, 80),
            Some(UiMessage::Recall("You: first...".into()))
        );
        state.handle_action(Action::Escape, 80);
        assert_eq!(state.focus, Focus::Input);
    }

    #[test]
    fn test_theme_toggle_and_command() {
        let mut state = state();
        assert_eq!(state.theme_mode, ThemeMode::Dark);
        assert_eq!(state.handle_action(Action::ToggleTheme, 80), None);
        assert_eq!(state.theme_mode, ThemeMode::Light);
        assert_eq!(state.theme.bg, Theme::light().bg);
        assert_eq!(state.status, "Theme: light");

        type_text(&mut state, "/theme");
        state.handle_action(Action::Submit, 80);
        assert_eq!(state.theme_mode, ThemeMode::Dark);

        type_text(&mut state, "/theme light");
        state.handle_action(Action::Submit, 80);
        type_text(&mut state, "/theme light");
        state.handle_action(Action::Submit, 80);
        assert_eq!(state.theme_mode, ThemeMode::Light);
    }

    #[test]
    fn test_rate_and_volume_reach_the_processor() {
        let mut state = state();
        type_text(&mut state, "/rate 175");
        assert_eq!(
            state.handle_action(Action::Submit, 80),
            Some(UiMessage::SetRate(175))
        );
        type_text(&mut state, "/volume 40%");
        assert_eq!(
            state.handle_action(Action::Submit, 80),
            Some(UiMessage::SetVolume(0.4))
        );
        assert_eq!(state.status, "Volume: 40%");
    }

    #[test]
    fn test_quit_keys() {
        let mut state = state();
        assert_eq!(state.handle_action(Action::Quit, 80), Some(UiMessage::Quit));
        assert_eq!(state.handle_action(Action::Interrupt, 80), Some(UiMessage::Quit));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("female"), "Female");
        assert_eq!(capitalize(""), "");
    }
}
