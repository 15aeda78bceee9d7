//! /voice command

use iris_agent::VoiceGender;

use super::CommandResult;

pub struct VoiceCommand;

impl VoiceCommand {
    pub fn execute(args: &str, current: VoiceGender) -> CommandResult {
        if args.is_empty() {
            return CommandResult::OpenVoiceSelector;
        }
        match args.parse::<VoiceGender>() {
            Ok(gender) if gender == current => {
                CommandResult::Message(format!("Voice is already {}.", gender))
            }
            Ok(gender) => CommandResult::SetVoice(gender),
            Err(_) => CommandResult::Message(format!(
                "Unknown voice '{}'. Use /voice male or /voice female.",
                args
            )),
        }
    }

    /// Current voice and the choices, for line mode
    pub fn describe(current: VoiceGender) -> String {
        let mut text = String::from("Voices:\n");
        for gender in [VoiceGender::Female, VoiceGender::Male] {
            let marker = if gender == current { "*" } else { " " };
            text.push_str(&format!("  {} {}\n", marker, gender));
        }
        text.push_str("Switch with /voice male or /voice female.");
        text
    }
}
