use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::DeepBriefError;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const CONFIG_PATH_ENV: &str = "DEEPBRIEF_CONFIG";

/// Top-level configuration for the pipeline and its provider clients.
///
/// Credentials are never stored here: each section names the environment
/// variable holding its API key, and the value is resolved at client
/// construction time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub research_model: ResearchModelConfig,
    pub report_model: ReportModelConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Environment variable holding the search provider API key.
    pub api_key_env: String,
    /// Maximum results requested per query.
    pub max_results: u32,
    /// Provider search depth.
    pub depth: String,
    /// HTTP timeout for a single search call.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: "TAVILY_API_KEY".to_string(),
            max_results: 3,
            depth: "advanced".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResearchModelConfig {
    /// Environment variable holding the summarization model API key.
    pub api_key_env: String,
    /// Model identifier passed to the chat-completions endpoint.
    pub model: String,
    /// HTTP timeout for a single generation call.
    pub timeout_secs: u64,
}

impl Default for ResearchModelConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GROQ_API_KEY".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportModelConfig {
    /// Environment variable holding the report model API key.
    pub api_key_env: String,
    /// Model identifier passed to the generateContent endpoint.
    pub model: String,
    /// HTTP timeout for the report generation call.
    pub timeout_secs: u64,
}

impl Default for ReportModelConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Helper to load configuration with discoverable defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a provided path or discoverable defaults.
    ///
    /// Resolution order:
    /// 1. Explicit `path` argument.
    /// 2. `DEEPBRIEF_CONFIG` environment variable.
    /// 3. `config.toml` in the current working directory, if present.
    /// 4. Built-in defaults when no file is found at the default location.
    ///
    /// An explicitly named file that cannot be read is an error; a missing
    /// file at the default location is not.
    pub fn load(path: Option<PathBuf>) -> Result<Config, DeepBriefError> {
        match resolve_path(path) {
            Some(candidate) => Self::from_file(&candidate),
            None => Ok(Config::default()),
        }
    }

    /// Load and validate configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Config, DeepBriefError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| DeepBriefError::config_io(path.to_path_buf(), err))?;
        let config: Config = toml::from_str(&raw)
            .map_err(|err| DeepBriefError::InvalidConfiguration(err.to_string()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &Config) -> Result<(), DeepBriefError> {
        let sections = [
            ("search", &config.search.api_key_env),
            ("research_model", &config.research_model.api_key_env),
            ("report_model", &config.report_model.api_key_env),
        ];
        for (section, var) in sections {
            if var.trim().is_empty() {
                return Err(DeepBriefError::InvalidConfiguration(format!(
                    "{section}.api_key_env must reference an environment variable"
                )));
            }
        }
        Ok(())
    }
}

fn resolve_path(path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = path {
        return Some(path);
    }

    if let Ok(from_env) = env::var(CONFIG_PATH_ENV) {
        if !from_env.trim().is_empty() {
            return Some(PathBuf::from(from_env));
        }
    }

    let default = Path::new(DEFAULT_CONFIG_PATH);
    default.exists().then(|| default.to_path_buf())
}
