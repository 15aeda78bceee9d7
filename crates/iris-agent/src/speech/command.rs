//! Synthesizers backed by an external text-to-speech program.

use std::io;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{SpeechError, SpeechSynthesizer, VoiceGender, VoiceSettings};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Supported speech programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthCommand {
    /// `espeak` / `espeak-ng`
    Espeak(String),
    /// macOS `say`
    Say,
}

impl SynthCommand {
    /// Pick the argument style from the program name
    pub fn from_program(program: &str) -> Self {
        let name = program.rsplit('/').next().unwrap_or(program);
        if name == "say" {
            SynthCommand::Say
        } else {
            SynthCommand::Espeak(program.to_string())
        }
    }

    fn program(&self) -> &str {
        match self {
            SynthCommand::Espeak(program) => program,
            SynthCommand::Say => "say",
        }
    }

    /// Arguments for speaking `text` with `settings`
    fn args(&self, settings: &VoiceSettings, text: &str) -> Vec<String> {
        match self {
            SynthCommand::Espeak(_) => {
                let voice = match settings.gender {
                    VoiceGender::Male => "en+m3",
                    VoiceGender::Female => "en+f3",
                };
                // espeak amplitude runs 0..=200 with 100 as normal
                let amplitude = (settings.volume * 100.0).round() as u32;
                vec![
                    "-v".into(),
                    voice.into(),
                    "-s".into(),
                    settings.rate.to_string(),
                    "-a".into(),
                    amplitude.to_string(),
                    "--".into(),
                    text.into(),
                ]
            }
            SynthCommand::Say => {
                let voice = match settings.gender {
                    VoiceGender::Male => "Alex",
                    VoiceGender::Female => "Samantha",
                };
                // say has no volume flag; it uses an inline [[volm]] command
                vec![
                    "-v".into(),
                    voice.into(),
                    "-r".into(),
                    settings.rate.to_string(),
                    format!("[[volm {:.2}]] {}", settings.volume, text),
                ]
            }
        }
    }
}

/// Speaks by running a TTS program once per utterance.
///
/// Cancelling kills the running process.
pub struct CommandSynthesizer {
    command: SynthCommand,
    settings: Mutex<VoiceSettings>,
}

impl CommandSynthesizer {
    pub fn new(command: SynthCommand) -> Self {
        Self::with_settings(command, VoiceSettings::default())
    }

    pub fn with_settings(command: SynthCommand, settings: VoiceSettings) -> Self {
        Self {
            command,
            settings: Mutex::new(settings),
        }
    }

    pub fn settings(&self) -> VoiceSettings {
        *self.settings.lock()
    }

    fn spawn(&self, text: &str) -> Result<Child, SpeechError> {
        let settings = *self.settings.lock();
        Command::new(self.command.program())
            .args(self.command.args(&settings, text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => SpeechError::Unavailable(format!(
                    "'{}' not found on PATH",
                    self.command.program()
                )),
                _ => SpeechError::Engine(e.to_string()),
            })
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str, cancel: &CancellationToken) -> Result<(), SpeechError> {
        if cancel.is_cancelled() || text.trim().is_empty() {
            return Ok(());
        }
        let mut child = self.spawn(text)?;

        loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                tracing::debug!("utterance cancelled");
                return Ok(());
            }
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(SpeechError::Engine(format!(
                        "{} exited with {}",
                        self.command.program(),
                        status
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(SpeechError::Engine(e.to_string())),
            }
        }
    }

    fn set_voice(&self, gender: VoiceGender) -> Result<(), SpeechError> {
        self.settings.lock().gender = gender;
        Ok(())
    }

    fn set_rate(&self, wpm: u32) -> Result<(), SpeechError> {
        self.settings.lock().set_rate(wpm)
    }

    fn set_volume(&self, volume: f32) -> Result<(), SpeechError> {
        self.settings.lock().set_volume(volume)
    }
}

/// A synthesizer that only logs, used with `--mute` or when speech is disabled
#[derive(Default)]
pub struct SilentSynthesizer {
    settings: Mutex<VoiceSettings>,
}

impl SilentSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&self, text: &str, _cancel: &CancellationToken) -> Result<(), SpeechError> {
        tracing::debug!(chars = text.chars().count(), "speech muted");
        Ok(())
    }

    fn set_voice(&self, gender: VoiceGender) -> Result<(), SpeechError> {
        self.settings.lock().gender = gender;
        Ok(())
    }

    fn set_rate(&self, wpm: u32) -> Result<(), SpeechError> {
        self.settings.lock().set_rate(wpm)
    }

    fn set_volume(&self, volume: f32) -> Result<(), SpeechError> {
        self.settings.lock().set_volume(volume)
    }
}
