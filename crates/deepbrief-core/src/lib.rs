//! DeepBrief core abstractions for the topic-to-report pipeline.
//!
//! This crate defines the provider traits (web search, text generation), the
//! research and report stages built on top of them, and the never-failing
//! pipeline boundary that collapses stage errors into a user-visible failure
//! document. Network-backed provider clients live in `deepbrief-providers`.

mod config;
mod error;
mod logging;
mod pipeline;
mod provider;
mod report;
mod research;
mod secrets;

pub use config::{
    Config, ConfigLoader, LoggingConfig, ReportModelConfig, ResearchModelConfig, SearchConfig,
};
pub use error::{DeepBriefError, ProviderError, StageError};
pub use logging::{RunLogInput, log_run_completion};
pub use pipeline::{Pipeline, failure_document};
pub use provider::{GenerationOptions, SearchHit, SearchProvider, TextGenerator};
pub use report::ReportStage;
pub use research::{NO_INFORMATION, ResearchStage, SUMMARY_SEPARATOR};
pub use secrets::{ApiKey, require_env};
