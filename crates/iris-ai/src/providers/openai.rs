//! OpenAI-compatible Chat Completions and transcription provider
//!
//! Groq, OpenRouter and Ollama all expose the same `/chat/completions` and
//! `/audio/transcriptions` surface, so one client covers them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatProvider, TranscriptionProvider};
use crate::{
    error::{Error, Result},
    types::{AudioClip, ChatMessage, CompletionOptions, Model, Provider},
};

/// OpenAI-compatible API client
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAIProvider {
    /// Create a new provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Build a transcriber sharing this client and key
    pub fn transcriber(
        &self,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> OpenAITranscriber {
        OpenAITranscriber {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn headers(&self, model: &Model) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &model.headers {
            if let (Ok(name), Ok(val)) = (
                key.parse::<reqwest::header::HeaderName>(),
                value.parse::<reqwest::header::HeaderValue>(),
            ) {
                headers.insert(name, val);
            }
        }
        headers
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    async fn complete(
        &self,
        model: &Model,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String> {
        let request = build_request(model, messages, options);
        let url = format!("{}/chat/completions", model.base_url);

        tracing::debug!(model = %model.id, messages = messages.len(), "chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .headers(self.headers(model))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status.as_u16(), retry_after, &body));
        }

        let body: CompletionResponse = response.json().await?;
        extract_reply(body)
    }
}

/// Transcribes audio through `{base_url}/audio/transcriptions`
pub struct OpenAITranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[async_trait]
impl TranscriptionProvider for OpenAITranscriber {
    async fn transcribe(&self, clip: AudioClip) -> Result<String> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        let part = reqwest::multipart::Part::bytes(clip.data)
            .file_name(clip.file_name)
            .mime_str(&clip.mime_type)?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status.as_u16(), retry_after, &body));
        }

        let body: TranscriptionResponse = response.json().await?;
        Ok(body.text.trim().to_string())
    }
}

fn build_request(
    model: &Model,
    messages: &[ChatMessage],
    options: &CompletionOptions,
) -> CompletionRequest {
    CompletionRequest {
        model: model.id.clone(),
        messages: messages
            .iter()
            .map(|m| OpenAIMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect(),
        stream: false,
        max_tokens: options.max_tokens,
        temperature: options.temperature,
        top_p: options.top_p,
        frequency_penalty: options.frequency_penalty,
        presence_penalty: options.presence_penalty,
    }
}

fn extract_reply(body: CompletionResponse) -> Result<String> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse("response contained no choices".to_string()))?;

    choice
        .message
        .content
        .map(|text| text.trim().to_string())
        .ok_or_else(|| Error::UnexpectedResponse("choice had no message content".to_string()))
}

fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Map a non-success status and its body to an error
fn error_from_status(status: u16, retry_after: Option<u64>, body: &str) -> Error {
    match status {
        401 | 403 => Error::InvalidApiKey,
        429 => Error::RateLimited { retry_after },
        _ => match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => Error::api(
                parsed
                    .error
                    .error_type
                    .unwrap_or_else(|| format!("http_{}", status)),
                parsed.error.message,
            ),
            Err(_) => Error::api(format!("http_{}", status), body.trim()),
        },
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}
