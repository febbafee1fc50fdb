//! Completion provider client for generating legal guidance.
//!
//! Talks to an OpenAI-compatible chat completions API (Groq by default).
//! Transient transport failures are retried a small number of times with
//! backoff; provider-signalled errors are surfaced immediately.

mod prompts;

pub use prompts::{follow_up_prompt, initial_prompt, Prompt};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::CompletionSettings;
use crate::conversation::Message;
use crate::error::AnalysisError;

/// Backend that turns role-tagged messages into a model reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Submit messages and return the reply text.
    ///
    /// A well-formed response with empty content is `Ok("")`; a response
    /// missing the expected shape is `MalformedResponse`.
    async fn complete(&self, messages: &[Message]) -> Result<String, AnalysisError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionsClient {
    settings: CompletionSettings,
    client: Client,
}

impl ChatCompletionsClient {
    pub fn new(settings: CompletionSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { settings, client })
    }

    /// Send the request, retrying transient transport failures.
    async fn send_with_retry(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, AnalysisError> {
        let mut attempt = 0;
        loop {
            let result = self
                .client
                .post(&self.settings.endpoint)
                .bearer_auth(&self.settings.api_key)
                .json(request)
                .send()
                .await;

            let retryable = match &result {
                Err(e) => e.is_timeout() || e.is_connect(),
                Ok(resp) => resp.status().is_server_error() || resp.status().as_u16() == 429,
            };

            if retryable && attempt < self.settings.max_retries {
                let wait = Duration::from_millis(500 * 2u64.pow(attempt));
                warn!(attempt, "completion request failed transiently, retrying in {:?}", wait);
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            let resp = result.map_err(|e| AnalysisError::Provider(e.to_string()))?;
            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(AnalysisError::Provider(format!("HTTP {}: {}", status, body)));
            }

            return resp
                .json()
                .await
                .map_err(|e| AnalysisError::MalformedResponse(e.to_string()));
        }
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, AnalysisError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages,
        };

        debug!(model = %self.settings.model, "requesting completion");
        let response = self.send_with_retry(&request).await?;

        if let Some(error) = response.error {
            return Err(AnalysisError::Provider(error.message));
        }

        let choice = response
            .choices
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| AnalysisError::MalformedResponse("response has no choices".to_string()))?;

        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("choice has no message content".to_string())
            })?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_request_serialization() {
        let messages = vec![Message::system("sys"), Message::user("usr")];
        let request = ChatRequest {
            model: "llama3-8b-8192",
            messages: &messages,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3-8b-8192");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "usr");
    }

    #[test]
    fn test_response_parsing_well_formed() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Do:\n- pay"}}]}"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        let content = resp.choices.unwrap()[0]
            .message
            .as_ref()
            .unwrap()
            .content
            .clone()
            .unwrap();
        assert_eq!(content, "Do:\n- pay");
    }

    #[test]
    fn test_response_parsing_empty_content_is_distinct() {
        // Empty but well-formed content parses to Some("").
        let body = r#"{"choices":[{"message":{"content":""}}]}"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        let content = resp.choices.unwrap()[0]
            .message
            .as_ref()
            .unwrap()
            .content
            .clone();
        assert_eq!(content, Some(String::new()));
    }

    #[test]
    fn test_response_parsing_missing_choices() {
        let body = r#"{"error":{"message":"invalid api key","type":"auth"}}"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(resp.choices.is_none());
        assert_eq!(resp.error.unwrap().message, "invalid api key");
    }

    #[test]
    fn test_message_roles_serialize_lowercase() {
        let msg = Message {
            role: Role::Assistant,
            content: "x".into(),
        };
        assert_eq!(serde_json::to_value(&msg).unwrap()["role"], "assistant");
    }
}
