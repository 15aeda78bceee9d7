//! Input handling

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter/submit
    Submit,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    PageUp,
    PageDown,
    /// Tab (switch focus between input and history)
    Tab,
    BackTab,
    Escape,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+Q
    Quit,
    /// Ctrl+L (clear conversation)
    Clear,
    /// Ctrl+U (clear line)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Ctrl+R (capture one spoken phrase)
    VoiceInput,
    /// Ctrl+S (silence speech output)
    StopSpeaking,
    /// Ctrl+V (open voice selector)
    VoiceSelect,
    /// Ctrl+T (switch light/dark theme)
    ToggleTheme,
    /// Bracketed paste
    Paste(String),
    /// Unknown/unhandled
    Unknown,
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('l') => Action::Clear,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            KeyCode::Char('r') => Action::VoiceInput,
            KeyCode::Char('s') => Action::StopSpeaking,
            KeyCode::Char('v') => Action::VoiceSelect,
            KeyCode::Char('t') => Action::ToggleTheme,
            _ => Action::Unknown,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => Action::BackTab,
        KeyCode::Tab => Action::Tab,
        KeyCode::BackTab => Action::BackTab,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action.
///
/// Key releases are ignored so keys do not fire twice on terminals that
/// report them.
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            Some(key_to_action(key_event))
        }
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_voice_shortcuts() {
        assert_eq!(key_to_action(ctrl('r')), Action::VoiceInput);
        assert_eq!(key_to_action(ctrl('s')), Action::StopSpeaking);
        assert_eq!(key_to_action(ctrl('v')), Action::VoiceSelect);
        assert_eq!(key_to_action(ctrl('t')), Action::ToggleTheme);
    }

    #[test]
    fn test_quit_and_clear_shortcuts() {
        assert_eq!(key_to_action(ctrl('c')), Action::Interrupt);
        assert_eq!(key_to_action(ctrl('q')), Action::Quit);
        assert_eq!(key_to_action(ctrl('l')), Action::Clear);
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)),
            Action::Char('x')
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
            Action::Tab
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT)),
            Action::BackTab
        );
    }

    #[test]
    fn test_paste_and_release_events() {
        assert_eq!(
            event_to_action(Event::Paste("hi".into())),
            Some(Action::Paste("hi".into()))
        );
        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(event_to_action(Event::Key(release)), None);
        assert_eq!(event_to_action(Event::FocusGained), None);
    }
}
