// LLM client - one chat-completions call per user turn
//
// Thin reqwest wrapper around the OpenAI-style chat completions endpoint.
// The whole conversation is sent each time; the response is returned only
// once fully received (no streaming). Errors come back as anyhow errors
// with the API's own message attached where one exists; the caller renders
// them in-band through the animation path. No automatic retries.

use crate::session::Turn;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Sampling temperature sent with every request
const TEMPERATURE: f32 = 0.7;

pub struct LlmClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_base: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Send the conversation and return the assistant's reply text.
    pub async fn complete(&self, model: &str, turns: &[Turn], max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: turns,
            max_tokens,
            temperature: TEMPERATURE,
        };
        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!(model, turns = turns.len(), "sending completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Request to the completion API failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => envelope.error.message,
                Err(_) => {
                    let trimmed = body.trim();
                    if trimmed.is_empty() {
                        "no error body".to_string()
                    } else {
                        trimmed.chars().take(200).collect()
                    }
                }
            };
            bail!("API returned {}: {}", status, detail);
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("Failed to parse the completion response")?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.is_empty() {
            bail!("The model returned an empty response");
        }
        Ok(content)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ChatSession, SYSTEM_PROMPT};

    #[test]
    fn request_body_has_the_expected_shape() {
        let mut session = ChatSession::new(SYSTEM_PROMPT);
        session.push_user("hello");
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: session.turns(),
            max_tokens: 150,
            temperature: TEMPERATURE,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn response_content_is_extracted() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Follow the white rabbit."}}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 6}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Follow the white rabbit.")
        );
    }

    #[test]
    fn error_envelope_is_parsed() {
        let json = r#"{"error": {"message": "Rate limit reached", "type": "rate_limit_error"}}"#;
        let parsed: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.message, "Rate limit reached");
    }

    #[test]
    fn trailing_slash_on_the_base_url_is_stripped() {
        let client = LlmClient::new(
            "sk-test".to_string(),
            "https://example.test/v1/".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.api_base, "https://example.test/v1");
    }
}
