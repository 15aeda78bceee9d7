//! /rate and /volume commands

use super::CommandResult;

pub struct RateCommand;

impl RateCommand {
    pub fn execute(args: &str) -> CommandResult {
        match args.parse::<u32>() {
            Ok(wpm) if wpm > 0 => CommandResult::SetRate(wpm),
            _ => CommandResult::Message(
                "Usage: /rate <words per minute>, for example /rate 150".to_string(),
            ),
        }
    }
}

pub struct VolumeCommand;

impl VolumeCommand {
    /// Accepts a fraction (`0.8`) or a percentage (`80%`)
    pub fn execute(args: &str) -> CommandResult {
        let parsed = match args.strip_suffix('%') {
            Some(percent) => percent.trim().parse::<f32>().map(|p| p / 100.0),
            None => args.parse::<f32>(),
        };
        match parsed {
            Ok(volume) if (0.0..=1.0).contains(&volume) => CommandResult::SetVolume(volume),
            _ => CommandResult::Message(
                "Usage: /volume <0 to 1>, for example /volume 0.8 or /volume 80%".to_string(),
            ),
        }
    }
}
