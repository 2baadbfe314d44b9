use std::path::PathBuf;

use thiserror::Error;

/// Construction-time error type for DeepBrief.
///
/// These errors surface while loading configuration or building provider
/// clients; once a pipeline is constructed, failures are reported through
/// [`StageError`] instead.
#[derive(Debug, Error)]
pub enum DeepBriefError {
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),
    #[error("Missing {0} in the environment")]
    MissingSecret(String),
    #[error("I/O error while reading {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeepBriefError {
    pub fn config_io(path: PathBuf, source: std::io::Error) -> Self {
        Self::ConfigIo { path, source }
    }
}

/// Failure of a single call to an external provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    Request {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} response could not be parsed: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned an empty completion")]
    EmptyCompletion { provider: &'static str },
}

impl ProviderError {
    pub fn request(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Request {
            provider,
            message: message.into(),
        }
    }

    pub fn parse(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            provider,
            message: message.into(),
        }
    }
}

/// Failure of a pipeline stage.
///
/// The Display strings double as the user-visible sentinels inside the
/// failure document, so their wording is part of the pipeline contract.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Research failed: {0}")]
    Research(String),
    #[error("Report generation failed: {0}")]
    Report(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_names_the_variable() {
        let err = DeepBriefError::MissingSecret("GROQ_API_KEY".to_string());
        assert!(err.to_string().contains("Missing GROQ_API_KEY"));
    }

    #[test]
    fn stage_errors_render_their_sentinels() {
        let research = StageError::Research("model offline".to_string());
        assert_eq!(research.to_string(), "Research failed: model offline");

        let report = StageError::Report("quota exceeded".to_string());
        assert_eq!(report.to_string(), "Report generation failed: quota exceeded");
    }

    #[test]
    fn provider_error_names_the_provider() {
        let err = ProviderError::request("tavily", "status 500");
        assert_eq!(err.to_string(), "tavily request failed: status 500");
    }
}
