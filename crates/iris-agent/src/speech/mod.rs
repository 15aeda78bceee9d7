//! Speech synthesis and recognition.
//!
//! Synthesis is synchronous and runs on the dedicated [`SpeechOutput`]
//! worker thread. Recognition is async and runs on a spawned task.

mod command;
mod output;
mod recognizer;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use command::{CommandSynthesizer, SilentSynthesizer, SynthCommand};
pub use output::SpeechOutput;
pub use recognizer::{
    CpalMicrophone, FRAME_LEN, Microphone, PhraseBuffer, RecordingRecognizer, SAMPLE_RATE,
    Sensitivity, encode_wav,
};

/// Default speaking rate in words per minute
pub const DEFAULT_RATE: u32 = 150;
/// Default output volume
pub const DEFAULT_VOLUME: f32 = 0.8;
/// How long to wait for speech to begin
pub const LISTEN_TIMEOUT: Duration = Duration::from_secs(5);
/// Longest phrase captured by one listen
pub const PHRASE_LIMIT: Duration = Duration::from_secs(5);

/// Voice selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    #[default]
    Female,
}

impl VoiceGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Male => "male",
            VoiceGender::Female => "female",
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceGender {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(VoiceGender::Male),
            "female" | "f" => Ok(VoiceGender::Female),
            other => Err(SpeechError::UnknownVoice(other.to_string())),
        }
    }
}

/// Synthesis failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeechError {
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),

    #[error("speech engine failed: {0}")]
    Engine(String),

    #[error("volume must be between 0 and 1, got {0}")]
    InvalidVolume(f32),

    #[error("rate must be greater than zero")]
    InvalidRate,

    #[error("unknown voice '{0}', expected male or female")]
    UnknownVoice(String),
}

/// Listen-and-transcribe failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenError {
    #[error("Sorry, I couldn't understand that.")]
    NoMatch,

    #[error("Could not request results; {0}")]
    Request(String),

    #[error("Listening timed out waiting for speech")]
    Timeout,

    #[error("microphone unavailable: {0}")]
    Device(String),
}

/// Engine settings shared by synthesizers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    pub gender: VoiceGender,
    pub rate: u32,
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            gender: VoiceGender::default(),
            rate: DEFAULT_RATE,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl VoiceSettings {
    pub fn set_rate(&mut self, rate: u32) -> Result<(), SpeechError> {
        if rate == 0 {
            return Err(SpeechError::InvalidRate);
        }
        self.rate = rate;
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), SpeechError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(SpeechError::InvalidVolume(volume));
        }
        self.volume = volume;
        Ok(())
    }
}

/// Blocking text-to-speech engine
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` and return when playback finishes or `cancel` fires
    fn speak(&self, text: &str, cancel: &CancellationToken) -> Result<(), SpeechError>;

    fn set_voice(&self, gender: VoiceGender) -> Result<(), SpeechError>;

    fn set_rate(&self, wpm: u32) -> Result<(), SpeechError>;

    fn set_volume(&self, volume: f32) -> Result<(), SpeechError>;
}

/// Microphone capture plus transcription
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Capture one phrase and return its transcript
    async fn listen(&self, timeout: Duration, phrase_limit: Duration)
    -> Result<String, ListenError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_parsing() {
        assert_eq!("Male".parse::<VoiceGender>().unwrap(), VoiceGender::Male);
        assert_eq!(" female ".parse::<VoiceGender>().unwrap(), VoiceGender::Female);
        assert!(matches!(
            "robot".parse::<VoiceGender>(),
            Err(SpeechError::UnknownVoice(_))
        ));
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = VoiceSettings::default();
        assert_eq!(settings.rate, 150);
        assert_eq!(settings.volume, 0.8);

        assert_eq!(settings.set_volume(1.2), Err(SpeechError::InvalidVolume(1.2)));
        assert_eq!(settings.volume, 0.8);
        assert_eq!(settings.set_rate(0), Err(SpeechError::InvalidRate));
        settings.set_volume(0.0).unwrap();
        settings.set_rate(200).unwrap();
        assert_eq!(settings.rate, 200);
    }

    #[test]
    fn test_listen_messages() {
        assert_eq!(
            ListenError::Request("connection refused".into()).to_string(),
            "Could not request results; connection refused"
        );
        assert_eq!(
            ListenError::Timeout.to_string(),
            "Listening timed out waiting for speech"
        );
    }
}
