//! Tavily web search client.

use std::time::Duration;

use async_trait::async_trait;
use deepbrief_core::{
    ApiKey, DeepBriefError, ProviderError, SearchConfig, SearchHit, SearchProvider, require_env,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";
const PROVIDER: &str = "tavily";

/// Network-backed [`SearchProvider`] for the Tavily search API.
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: ApiKey,
    max_results: u32,
    depth: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilyClient {
    /// Build a client from configuration. Fails when the configured API key
    /// environment variable is absent.
    pub fn new(config: &SearchConfig) -> Result<Self, DeepBriefError> {
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
            max_results: config.max_results,
            depth: config.depth.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let body = SearchRequest {
            query,
            search_depth: &self.depth,
            max_results: self.max_results,
        };

        let response = self
            .http
            .post(SEARCH_ENDPOINT)
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

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::parse(PROVIDER, err.to_string()))?;

        debug!(%query, results = payload.results.len(), "search completed");
        Ok(payload.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_the_provider_wire_format() {
        let body = SearchRequest {
            query: "AI in Healthcare recent developments",
            search_depth: "advanced",
            max_results: 3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["query"], "AI in Healthcare recent developments");
        assert_eq!(json["search_depth"], "advanced");
        assert_eq!(json["max_results"], 3);
    }

    #[test]
    fn response_parsing_extracts_hits() {
        let payload = r#"{
            "query": "q",
            "results": [
                {"title": "T", "content": "C", "url": "U", "score": 0.93},
                {"url": "https://example.com/no-title"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].title.as_deref(), Some("T"));
        assert_eq!(response.results[1].title, None);
        assert_eq!(
            response.results[1].url.as_deref(),
            Some("https://example.com/no-title")
        );
    }

    #[test]
    fn response_without_results_field_is_empty() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }
}
