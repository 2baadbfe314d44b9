//! Research stage: sub-query fan-out, per-query summarization, concatenation.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::StageError;
use crate::provider::{GenerationOptions, SearchHit, SearchProvider, TextGenerator};

/// Separator between per-query summaries in the research output.
pub const SUMMARY_SEPARATOR: &str = "\n\n---\n\n";

/// Sentinel returned when none of the sub-queries produced search results.
pub const NO_INFORMATION: &str = "Could not find sufficient information on the topic.";

const SUB_QUERY_SUFFIXES: [&str; 3] = [
    "recent developments",
    "key players and companies",
    "major challenges and opportunities",
];

const SYSTEM_INSTRUCTION: &str = "You are an expert research analyst.";
const CONTENT_CHAR_LIMIT: usize = 1500;
const RESEARCH_TEMPERATURE: f64 = 0.1;

/// Gathers web data for a topic and condenses it into summaries, one per
/// sub-query that had results.
pub struct ResearchStage {
    search: Arc<dyn SearchProvider>,
    generator: Arc<dyn TextGenerator>,
}

impl ResearchStage {
    pub fn new(search: Arc<dyn SearchProvider>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { search, generator }
    }

    /// Research a topic by running the three fixed sub-queries sequentially
    /// and summarizing each one's search results.
    ///
    /// A failed or empty search drops that sub-query without aborting the
    /// stage. A generation failure aborts the whole stage; that asymmetry is
    /// deliberate and matches the pipeline's failure-reporting contract.
    pub async fn research(&self, topic: &str) -> Result<String, StageError> {
        info!(%topic, "starting chunked research");

        let mut summaries = Vec::new();
        for query in sub_queries(topic) {
            debug!(%query, "running sub-query");

            let hits = match self.search.search(&query).await {
                Ok(hits) => hits,
                Err(err) => {
                    error!(%query, error = %err, "search failed; skipping sub-query");
                    continue;
                }
            };
            if hits.is_empty() {
                debug!(%query, "no results for sub-query");
                continue;
            }

            let web_data = format_hits(&hits);
            let prompt = summarization_prompt(topic, &query, &web_data);
            let options = GenerationOptions {
                temperature: Some(RESEARCH_TEMPERATURE),
                max_tokens: None,
            };
            let summary = self
                .generator
                .generate(Some(SYSTEM_INSTRUCTION), &prompt, &options)
                .await
                .map_err(|err| StageError::Research(err.to_string()))?;

            info!(%query, "sub-query summarized");
            summaries.push(summary);
        }

        if summaries.is_empty() {
            return Ok(NO_INFORMATION.to_string());
        }

        info!(
            summary_count = summaries.len(),
            "research chunks summarized"
        );
        Ok(summaries.join(SUMMARY_SEPARATOR))
    }
}

fn sub_queries(topic: &str) -> [String; 3] {
    SUB_QUERY_SUFFIXES.map(|suffix| format!("{topic} {suffix}"))
}

/// Truncate to a character count, never splitting a UTF-8 sequence.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            let content = truncate_chars(hit.content.as_deref().unwrap_or("N/A"), CONTENT_CHAR_LIMIT);
            format!(
                "Title: {}\nContent: {}\nURL: {}\n---",
                hit.title.as_deref().unwrap_or("N/A"),
                content,
                hit.url.as_deref().unwrap_or("N/A"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn summarization_prompt(topic: &str, query: &str, web_data: &str) -> String {
    format!(
        "You are an expert researcher. Synthesize this data on '{topic}':\n\n\
         Query: {query}\n{web_data}\n\
         Provide a concise, factual summary based *only* on the provided data (max 250 words)."
    )
}
