//! Gemini generateContent client used for final report synthesis.

use std::time::Duration;

use async_trait::async_trait;
use deepbrief_core::{
    ApiKey, DeepBriefError, GenerationOptions, ProviderError, ReportModelConfig, TextGenerator,
    require_env,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER: &str = "gemini";

/// Network-backed [`TextGenerator`] for the Gemini API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: ApiKey,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Build a client from configuration. Fails when the configured API key
    /// environment variable is absent.
    pub fn new(config: &ReportModelConfig) -> Result<Self, DeepBriefError> {
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

    fn endpoint(&self) -> String {
        format!("{ENDPOINT_BASE}/{}:generateContent", self.model)
    }
}

fn extract_text(payload: GenerateResponse) -> Result<String, ProviderError> {
    let text = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::EmptyCompletion { provider: PROVIDER });
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: system.map(|text| Content {
                parts: vec![Part { text }],
            }),
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.reveal())
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

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::parse(PROVIDER, err.to_string()))?;

        let text = extract_text(payload)?;
        debug!(model = %self.model, chars = text.chars().count(), "generation received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_the_generate_content_format() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "prompt" }],
            }],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: Some(0.3),
                max_output_tokens: Some(4096),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(json["generationConfig"]["temperature"], 0.3);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 4096);
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn response_text_joins_candidate_parts() {
        let payload: GenerateResponse = serde_json::from_str(
            r###"{"candidates": [{"content": {"parts": [{"text": "## Re"}, {"text": "port"}]}}]}"###,
        )
        .unwrap();
        assert_eq!(extract_text(payload).unwrap(), "## Report");
    }

    #[test]
    fn blocked_response_without_candidates_is_empty() {
        let payload: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let err = extract_text(payload).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyCompletion { .. }));
    }
}
