//! Responder abstraction for generating assistant replies

use std::sync::Arc;

use async_trait::async_trait;
use iris_ai::{ChatMessage, ChatProvider, CompletionOptions, Model};
use thiserror::Error;

use crate::analysis::{AnalysisError, Entity, format_entities};

/// System preamble sent ahead of every request
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are Iris, an advanced AI assistant. Respond concisely and helpfully.";

/// Why a reply could not be produced
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] iris_ai::Error),

    #[error("entity extraction failed: {0}")]
    Entities(#[from] AnalysisError),

    /// The response task ended without reporting a result
    #[error("response task ended unexpectedly")]
    Interrupted,
}

/// Everything a responder needs for one turn
#[derive(Debug, Clone)]
pub struct ResponseRequest {
    pub system_prompt: String,
    /// Recent history, oldest first, already including the current user turn
    pub context: Vec<ChatMessage>,
    pub user_text: String,
    pub entities: Vec<Entity>,
}

impl ResponseRequest {
    /// The user text decorated with detected entities
    pub fn decorated_prompt(&self) -> String {
        format!(
            "User input: {}\nDetected entities: {}",
            self.user_text,
            format_entities(&self.entities)
        )
    }

    /// Messages in wire order: preamble, context window, decorated prompt
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.context.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(self.context.iter().cloned());
        messages.push(ChatMessage::user(self.decorated_prompt()));
        messages
    }
}

/// Produces a reply for a turn
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, request: &ResponseRequest) -> Result<String, GenerationError>;
}

/// Direct provider responder - one chat completion per turn, no retry
pub struct ProviderResponder {
    provider: Arc<dyn ChatProvider>,
    model: Model,
    options: CompletionOptions,
}

impl ProviderResponder {
    /// Create a responder with the default sampling options
    pub fn new(provider: Arc<dyn ChatProvider>, model: Model) -> Self {
        Self {
            provider,
            model,
            options: CompletionOptions::default(),
        }
    }

    /// Set sampling options
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

#[async_trait]
impl Responder for ProviderResponder {
    async fn respond(&self, request: &ResponseRequest) -> Result<String, GenerationError> {
        let messages = request.messages();
        tracing::debug!(
            model = %self.model.id,
            context = request.context.len(),
            entities = request.entities.len(),
            "requesting reply"
        );
        let reply = self
            .provider
            .complete(&self.model, &messages, &self.options)
            .await
            .inspect_err(|e| {
                if e.is_rate_limited() {
                    tracing::warn!(model = %self.model.id, "provider is rate limiting requests");
                }
            })?;
        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_ai::{Provider, Role};
    use parking_lot::Mutex;

    /// A provider that records what it was sent and returns a canned reply.
    struct RecordingProvider {
        reply: Option<String>,
        seen: Mutex<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
    }

    impl RecordingProvider {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for RecordingProvider {
        async fn complete(
            &self,
            _model: &Model,
            messages: &[ChatMessage],
            options: &CompletionOptions,
        ) -> iris_ai::Result<String> {
            self.seen.lock().push((messages.to_vec(), options.clone()));
            self.reply
                .clone()
                .ok_or(iris_ai::Error::RateLimited { retry_after: None })
        }
    }

    fn request() -> ResponseRequest {
        ResponseRequest {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            context: vec![
                ChatMessage::user("Hi"),
                ChatMessage::assistant("Hello!"),
                ChatMessage::user("Tell me about Paris"),
            ],
            user_text: "Tell me about Paris".to_string(),
            entities: vec![Entity::new("Paris", "GPE")],
        }
    }

    #[test]
    fn test_messages_wrap_context_with_preamble_and_prompt() {
        let messages = request().messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(messages[3].content, "Tell me about Paris");
        assert_eq!(messages[4].role, Role::User);
        assert_eq!(
            messages[4].content,
            "User input: Tell me about Paris\nDetected entities: [('Paris', 'GPE')]"
        );
    }

    #[tokio::test]
    async fn test_provider_responder_sends_default_options() {
        let provider = Arc::new(RecordingProvider::replying("  Paris is lovely.\n"));
        let responder =
            ProviderResponder::new(provider.clone(), Model::new(Provider::Groq, "llama3"));

        let reply = responder.respond(&request()).await.unwrap();
        assert_eq!(reply, "Paris is lovely.");

        let seen = provider.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.len(), 5);
        assert_eq!(seen[0].1, CompletionOptions::default());
    }

    #[tokio::test]
    async fn test_provider_failure_is_reported_once() {
        let provider = Arc::new(RecordingProvider::failing());
        let responder =
            ProviderResponder::new(provider.clone(), Model::new(Provider::Groq, "llama3"));

        let err = responder.respond(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Provider(ref e) if e.is_rate_limited()));
        assert_eq!(provider.seen.lock().len(), 1);
    }
}
