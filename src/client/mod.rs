//! Completion client adapter for OpenAI-compatible APIs.
//!
//! The panel talks to its LLM through the [`CompletionBackend`] trait so the
//! aggregator can be driven by a mock in tests. [`OpenAiClient`] implements
//! it by POSTing to `{base_url}/chat/completions`.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// A text-completion service: one system + user exchange in, text out.
///
/// Implementations must be safe to share across concurrent calls; the
/// aggregator holds one handle for the whole run.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Request one completion. Any transport or API failure maps to
    /// [`Error::Completion`]; there are no retries.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Reqwest-based client for any OpenAI-compatible chat-completions API.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: Client,
    timeout_seconds: u64,
}

impl OpenAiClient {
    /// Create a client for the given API endpoint.
    ///
    /// An empty `api_key` sends no Authorization header, which is what local
    /// OpenAI-compatible servers expect.
    pub fn new(base_url: String, api_key: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| Error::completion(format!("failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, "Completion client created");

        Ok(Self {
            base_url,
            api_key,
            client,
            timeout_seconds,
        })
    }

    /// Build the authorization header value (if an API key is set).
    fn auth_header(&self) -> Option<String> {
        if self.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.api_key))
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature,
        };

        debug!(model, temperature, "Sending completion request");

        let mut req = self.client.post(&url).json(&request);
        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::completion(format!(
                    "request timed out after {}s",
                    self.timeout_seconds
                ))
            } else if e.is_connect() {
                Error::completion(format!("cannot connect to API at {}", self.base_url))
            } else {
                Error::completion(format!("failed to send request: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::completion(format!("API error {}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::completion(format!("failed to parse API response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::completion("no choices in API response"))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header() {
        let client =
            OpenAiClient::new("http://localhost:11434/v1".to_string(), "sk-test".to_string(), 60)
                .unwrap();
        assert_eq!(client.auth_header(), Some("Bearer sk-test".to_string()));

        let no_key =
            OpenAiClient::new("http://localhost:11434/v1".to_string(), String::new(), 60).unwrap();
        assert_eq!(no_key.auth_header(), None);
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatCompletionRequest {
            model: "gpt-4".to_string(),
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: "be brief".to_string(),
            }],
            temperature: 0.7,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"content":"rates will rise"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("rates will rise")
        );

        // Null content degrades to an empty string, not a parse error
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
