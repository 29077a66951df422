//! LLM client — the single point of entry for all generation calls.
//!
//! No other module calls the OpenAI API directly; all generation traffic
//! goes through here. The tailor pipeline depends on the `ChatBackend`
//! trait rather than the concrete client, so tests can script responses
//! without the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all generation calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f64 = 0.15;
const USER_AGENT: &str = "ResumeAssistantBot/1.0";
/// Blanket connect timeout — safety net under the per-call timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("empty completion")]
    EmptyCompletion,
}

/// Capability contract of the generation backend: one system+user message
/// pair in, generated text out, bounded by a per-call timeout.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        timeout: Duration,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The production chat-completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Surface the API's own message when the body parses
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        debug!("generation call succeeded: {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_parses_first_choice() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "<html>ok</html>"}}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.choices[0].message.content.as_deref(),
            Some("<html>ok</html>")
        );
    }

    #[test]
    fn test_chat_response_tolerates_missing_choices() {
        let resp: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_empty());
    }

    #[test]
    fn test_api_error_body_parses() {
        let json = r#"{"error": {"message": "Invalid API key", "type": "auth"}}"#;
        let err: OpenAiError = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.message, "Invalid API key");
    }
}
