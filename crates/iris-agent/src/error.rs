//! Error types for iris-agent

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::responder::GenerationError;
use crate::speech::{ListenError, SpeechError};

/// Result type alias using iris-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Which operation an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Analysis,
    Generation,
    SpeechInput,
    SpeechOutput,
    VoiceChange,
}

/// Errors surfaced by the turn processor.
///
/// The `Display` text is what the user sees.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Error analyzing input: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Error generating response: {0}")]
    Generation(#[from] GenerationError),

    #[error("Error processing voice input: {0}")]
    SpeechInput(#[from] ListenError),

    #[error("Error in text-to-speech: {0}")]
    SpeechOutput(#[source] SpeechError),

    #[error("Error changing voice: {0}")]
    VoiceChange(#[source] SpeechError),

    /// The speech worker thread could not be started
    #[error("Failed to start speech output: {0}")]
    Startup(#[from] std::io::Error),
}

impl Error {
    /// The operation this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Analysis(_) => ErrorKind::Analysis,
            Error::Generation(_) => ErrorKind::Generation,
            Error::SpeechInput(_) => ErrorKind::SpeechInput,
            Error::SpeechOutput(_) | Error::Startup(_) => ErrorKind::SpeechOutput,
            Error::VoiceChange(_) => ErrorKind::VoiceChange,
        }
    }
}
