//! Report stage: a single synthesis call producing the final markdown report.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::StageError;
use crate::provider::{GenerationOptions, TextGenerator};

const REPORT_TEMPERATURE: f64 = 0.3;
const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Turns concatenated research summaries into a structured markdown report.
pub struct ReportStage {
    generator: Arc<dyn TextGenerator>,
}

impl ReportStage {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate the final report from the research stage's output.
    ///
    /// Invokes the report generator exactly once. Low temperature and a
    /// bounded output length favour determinism over creativity.
    pub async fn create_report(
        &self,
        research_data: &str,
        topic: &str,
    ) -> Result<String, StageError> {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        let prompt = report_prompt(research_data, topic, &date);
        let options = GenerationOptions {
            temperature: Some(REPORT_TEMPERATURE),
            max_tokens: Some(MAX_OUTPUT_TOKENS),
        };

        let report = self
            .generator
            .generate(None, &prompt, &options)
            .await
            .map_err(|err| StageError::Report(err.to_string()))?;

        info!(chars = report.chars().count(), "report generated");
        Ok(report)
    }
}

fn report_prompt(research_data: &str, topic: &str, date: &str) -> String {
    format!(
        "You are a senior research analyst. Create a detailed, well-structured markdown report on '{topic}'.\n\n\
         Use the following research summaries to construct your report. Adhere strictly to the provided information.\n\n\
         Include the following sections:\n\
         - **Executive Summary**\n\
         - **Key Findings**\n\
         - **Detailed Analysis**\n\
         - **Conclusions & Recommendations**\n\n\
         --- RESEARCH DATA START ---\n{research_data}\n--- RESEARCH DATA END ---\n\n\
         Current date: {date}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_prompt_lists_the_four_sections_in_order() {
        let prompt = report_prompt("data", "Topic", "2026-08-24");
        let exec = prompt.find("Executive Summary").unwrap();
        let findings = prompt.find("Key Findings").unwrap();
        let analysis = prompt.find("Detailed Analysis").unwrap();
        let conclusions = prompt.find("Conclusions & Recommendations").unwrap();
        assert!(exec < findings && findings < analysis && analysis < conclusions);
    }

    #[test]
    fn report_prompt_brackets_the_research_data() {
        let prompt = report_prompt("the research body", "Topic", "2026-08-24");
        assert!(prompt.contains("--- RESEARCH DATA START ---\nthe research body\n--- RESEARCH DATA END ---"));
        assert!(prompt.contains("Current date: 2026-08-24"));
    }
}
