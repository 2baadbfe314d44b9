//! Groq chat-completions client used for per-query summarization.
//!
//! Groq exposes an OpenAI-compatible endpoint, so the wire format is the
//! standard `messages` / `choices` chat-completions shape.

use std::time::Duration;

use async_trait::async_trait;
use deepbrief_core::{
    ApiKey, DeepBriefError, GenerationOptions, ProviderError, ResearchModelConfig, TextGenerator,
    require_env,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const COMPLETIONS_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const PROVIDER: &str = "groq";

/// Network-backed [`TextGenerator`] for Groq-hosted chat models.
pub struct GroqClient {
    http: reqwest::Client,
    api_key: ApiKey,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl GroqClient {
    /// Build a client from configuration. Fails when the configured API key
    /// environment variable is absent.
    pub fn new(config: &ResearchModelConfig) -> Result<Self, DeepBriefError> {
        let api_key = require_env(&config.api_key_env)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| {
                DeepBriefError::InvalidConfiguration(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
        })
    }
}

fn extract_completion(payload: ChatResponse) -> Result<String, ProviderError> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(ProviderError::EmptyCompletion { provider: PROVIDER })
}

#[async_trait]
impl TextGenerator for GroqClient {
    async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .http
            .post(COMPLETIONS_ENDPOINT)
            .bearer_auth(self.api_key.reveal())
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::request(PROVIDER, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request(
                PROVIDER,
                format!("status {status}: {body}"),
            ));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::parse(PROVIDER, err.to_string()))?;

        let completion = extract_completion(payload)?;
        debug!(model = %self.model, chars = completion.chars().count(), "completion received");
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_system_and_user_messages() {
        let body = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an expert research analyst.",
                },
                ChatMessage {
                    role: "user",
                    content: "Summarize.",
                },
            ],
            temperature: Some(0.1),
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Summarize.");
        assert_eq!(json["temperature"], 0.1);
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn completion_is_taken_from_the_first_choice() {
        let payload: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "sum"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_completion(payload).unwrap(), "sum");
    }

    #[test]
    fn missing_choices_is_an_empty_completion() {
        let payload: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let err = extract_completion(payload).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyCompletion { .. }));
    }
}
