//! Network-backed provider clients for the DeepBrief pipeline.
//!
//! Implements the `deepbrief-core` provider traits against Tavily (search),
//! Groq (research summarization), and Gemini (report synthesis), and exposes
//! the config-driven entry point that wires a full pipeline.

mod gemini;
mod groq;
mod tavily;

pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use tavily::TavilyClient;

use std::sync::Arc;

use deepbrief_core::{Config, DeepBriefError, Pipeline, failure_document};
use tracing::error;

/// Build a pipeline wired to the real provider clients.
///
/// Fails when any of the three configured credential variables is absent.
pub fn build_pipeline(config: &Config) -> Result<Pipeline, DeepBriefError> {
    let search = Arc::new(TavilyClient::new(&config.search)?);
    let research_generator = Arc::new(GroqClient::new(&config.research_model)?);
    let report_generator = Arc::new(GeminiClient::new(&config.report_model)?);
    Ok(Pipeline::new(search, research_generator, report_generator))
}

/// Run the full pipeline for a topic. Never fails: construction errors
/// (missing credentials) collapse into the failure document exactly like
/// stage errors.
pub async fn run_research_pipeline(config: &Config, topic: &str) -> String {
    match build_pipeline(config) {
        Ok(pipeline) => pipeline.run(topic).await,
        Err(err) => {
            error!(error = %err, "pipeline construction failed");
            failure_document(&err)
        }
    }
}
