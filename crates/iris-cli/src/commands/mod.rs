//! Slash commands for interactive mode

mod speech;
mod voice;

pub use speech::{RateCommand, VolumeCommand};
pub use voice::VoiceCommand;

use iris_agent::VoiceGender;
use iris_tui::ThemeMode;

/// Result of executing a slash command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Clear the conversation
    Clear,
    /// Switch the speaking voice
    SetVoice(VoiceGender),
    /// Open the voice selector (lists voices in line mode)
    OpenVoiceSelector,
    /// Change the speaking rate (words per minute)
    SetRate(u32),
    /// Change the output volume (0 to 1)
    SetVolume(f32),
    /// Switch theme; `None` toggles
    SetTheme(Option<ThemeMode>),
    /// Capture one spoken phrase
    Listen,
    /// Silence speech output
    StopSpeaking,
    /// Show recent message previews
    History,
    /// Show a message to the user (not sent to the assistant)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command. Returns `None` for ordinary input.
pub fn execute_command(input: &str, current_voice: VoiceGender) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let (command, args) = match rest.split_once(' ') {
        Some((command, args)) => (command, args.trim()),
        None => (rest, ""),
    };

    Some(match command.to_lowercase().as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),
        "clear" | "c" => CommandResult::Clear,
        "voice" | "v" => VoiceCommand::execute(args, current_voice),
        "rate" => RateCommand::execute(args),
        "volume" => VolumeCommand::execute(args),
        "theme" | "t" => match args {
            "" => CommandResult::SetTheme(None),
            name => match ThemeMode::parse(name) {
                Some(mode) => CommandResult::SetTheme(Some(mode)),
                None => CommandResult::Message(format!(
                    "Unknown theme '{}'. Use /theme light or /theme dark.",
                    name
                )),
            },
        },
        "listen" | "l" => CommandResult::Listen,
        "stop" | "s" => CommandResult::StopSpeaking,
        "history" => CommandResult::History,
        "quit" | "exit" | "q" => CommandResult::Exit,
        other => CommandResult::Unknown(other.to_string()),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?          Show this help message
  /clear, /c             Clear conversation history
  /voice, /v [voice]     Switch voice (male or female)
  /rate <wpm>            Set the speaking rate
  /volume <0-1>          Set the speaking volume
  /theme, /t [name]      Switch theme (light or dark)
  /listen, /l            Speak one message into the microphone
  /stop, /s              Stop speaking
  /history               Show recent messages
  /quit, /exit, /q       Exit iris

Typing "exit" on its own also quits."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(execute_command("hello there", VoiceGender::Female), None);
        assert_eq!(execute_command("exit", VoiceGender::Female), None);
    }

    #[test]
    fn test_simple_commands() {
        let voice = VoiceGender::Female;
        assert_eq!(execute_command("/clear", voice), Some(CommandResult::Clear));
        assert_eq!(execute_command(" /LISTEN ", voice), Some(CommandResult::Listen));
        assert_eq!(execute_command("/stop", voice), Some(CommandResult::StopSpeaking));
        assert_eq!(execute_command("/history", voice), Some(CommandResult::History));
        assert_eq!(execute_command("/q", voice), Some(CommandResult::Exit));
        assert_eq!(
            execute_command("/dance now", voice),
            Some(CommandResult::Unknown("dance".into()))
        );
        assert!(matches!(
            execute_command("/help", voice),
            Some(CommandResult::Message(_))
        ));
    }

    #[test]
    fn test_voice_command() {
        assert_eq!(
            execute_command("/voice male", VoiceGender::Female),
            Some(CommandResult::SetVoice(VoiceGender::Male))
        );
        assert_eq!(
            execute_command("/voice", VoiceGender::Female),
            Some(CommandResult::OpenVoiceSelector)
        );
        assert_eq!(
            execute_command("/voice female", VoiceGender::Female),
            Some(CommandResult::Message("Voice is already female.".into()))
        );
        assert!(matches!(
            execute_command("/voice robot", VoiceGender::Female),
            Some(CommandResult::Message(msg)) if msg.contains("robot")
        ));
    }

    #[test]
    fn test_rate_and_volume_commands() {
        let voice = VoiceGender::Female;
        assert_eq!(execute_command("/rate 180", voice), Some(CommandResult::SetRate(180)));
        assert_eq!(
            execute_command("/volume 0.5", voice),
            Some(CommandResult::SetVolume(0.5))
        );
        assert_eq!(
            execute_command("/volume 80%", voice),
            Some(CommandResult::SetVolume(0.8))
        );
        for bad in ["/rate", "/rate 0", "/rate fast", "/volume 2", "/volume loud"] {
            assert!(
                matches!(execute_command(bad, voice), Some(CommandResult::Message(ref m)) if m.starts_with("Usage")),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_theme_command() {
        let voice = VoiceGender::Female;
        assert_eq!(execute_command("/theme", voice), Some(CommandResult::SetTheme(None)));
        assert_eq!(
            execute_command("/theme Light", voice),
            Some(CommandResult::SetTheme(Some(ThemeMode::Light)))
        );
        assert!(matches!(
            execute_command("/theme neon", voice),
            Some(CommandResult::Message(msg)) if msg.contains("neon")
        ));
    }

    #[test]
    fn test_voice_listing_marks_current() {
        let text = VoiceCommand::describe(VoiceGender::Male);
        assert!(text.contains("* male"));
        assert!(text.contains("  female"));
    }
}
