//! Model provider implementations

pub mod openai;

use crate::{AudioClip, ChatMessage, CompletionOptions, Error, Model, Result};
use async_trait::async_trait;

/// Trait for chat completion providers
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run a single request/response completion and return the reply text
    async fn complete(
        &self,
        model: &Model,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String>;
}

/// Trait for speech transcription providers
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe a recorded clip to text
    async fn transcribe(&self, clip: AudioClip) -> Result<String>;
}

/// Get an API key from environment or provided value
pub fn get_api_key(provided: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = provided {
        return Ok(key.to_string());
    }

    std::env::var(env_var).map_err(|_| Error::InvalidApiKey)
}
