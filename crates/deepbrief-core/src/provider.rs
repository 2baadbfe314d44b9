//! Provider traits the pipeline stages depend on.
//!
//! The stages never talk to the network directly; they see a search provider
//! and two text generators behind these traits. Real clients live in
//! `deepbrief-providers`, tests supply in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ProviderError;

/// One web search result as returned by a search provider.
///
/// Fields are optional because providers omit them for some result types;
/// missing values render as `N/A` when formatted into a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
}

/// Sampling controls forwarded to a text-generation provider.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query and return the provider's results in provider order.
    /// An empty vector means the query matched nothing.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ProviderError>;
}

/// A text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt, optionally under a system instruction.
    async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError>;
}
