//! End-to-end pipeline boundary.
//!
//! `Pipeline::run` is the only place errors are collapsed into user-visible
//! text: callers always get a document back, never an error.

use std::fmt::Display;
use std::sync::Arc;

use tracing::{info, warn};

use crate::StageError;
use crate::logging::{RunLogInput, log_run_completion};
use crate::provider::{SearchProvider, TextGenerator};
use crate::report::ReportStage;
use crate::research::ResearchStage;

/// Composes the research and report stages for one topic at a time.
///
/// Stateless and re-entrant: each call to [`Pipeline::run`] is independent.
pub struct Pipeline {
    research: ResearchStage,
    report: ReportStage,
}

impl Pipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        research_generator: Arc<dyn TextGenerator>,
        report_generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            research: ResearchStage::new(search, research_generator),
            report: ReportStage::new(report_generator),
        }
    }

    /// Run the full research-and-report pipeline for a topic.
    ///
    /// Always returns a document: stage failures are collapsed into the
    /// failure document instead of propagating.
    pub async fn run(&self, topic: &str) -> String {
        info!(%topic, "starting full research pipeline");

        let (document, outcome) = match self.execute(topic).await {
            Ok(report) => (report, "completed"),
            Err(err) => (failure_document(&err), "failed"),
        };

        if let Err(err) = log_run_completion(RunLogInput {
            topic: topic.to_string(),
            outcome: outcome.to_string(),
            document_chars: document.chars().count(),
        }) {
            warn!(error = %err, "unable to append run log record");
        }

        info!(outcome, "pipeline finished");
        document
    }

    async fn execute(&self, topic: &str) -> Result<String, StageError> {
        let research_data = self.research.research(topic).await?;
        info!("research stage complete");
        self.report.create_report(&research_data, topic).await
    }
}

/// Collapse any error into the fixed user-visible failure document.
pub fn failure_document(err: &dyn Display) -> String {
    format!("# Research Failed\n\nAn unexpected error occurred: {err}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_document_has_fixed_heading_and_message() {
        let err = StageError::Report("quota exceeded".to_string());
        let document = failure_document(&err);
        assert!(document.starts_with("# Research Failed\n\n"));
        assert!(document.contains("An unexpected error occurred: Report generation failed: quota exceeded"));
        assert!(document.ends_with('\n'));
    }
}
