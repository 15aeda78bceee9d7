//! iris-ai: language model client layer
//!
//! This crate provides a small interface over OpenAI-compatible chat
//! completion and transcription endpoints (Groq, OpenAI, OpenRouter, Ollama).

pub mod error;
pub mod providers;
pub mod types;

pub use error::{Error, Result};
pub use providers::{ChatProvider, TranscriptionProvider};
pub use types::*;
