//! iris-agent: turn processing runtime for the Iris assistant
//!
//! This crate owns the conversation history and drives each turn: input
//! analysis, reply generation on a background task, spoken output through a
//! single speech worker, and one-shot voice capture.

pub mod analysis;
pub mod conversation;
pub mod display;
pub mod error;
pub mod events;
pub mod processor;
pub mod responder;
pub mod speech;

pub use analysis::{AnalysisResult, Analyzer, Complexity, Entity, LexiconAnalyzer, Sentiment};
pub use conversation::Conversation;
pub use display::DisplayHistory;
pub use error::{Error, ErrorKind, Result};
pub use events::{ChatEvent, Sender};
pub use processor::{EXIT_COMMAND, Flow, Submission, TaskOutcome, TurnConfig, TurnProcessor};
pub use responder::{ProviderResponder, Responder, ResponseRequest};
pub use speech::{
    CommandSynthesizer, CpalMicrophone, RecordingRecognizer, Sensitivity, SilentSynthesizer,
    SpeechOutput, SpeechRecognizer, SpeechSynthesizer, SynthCommand, VoiceGender,
};
