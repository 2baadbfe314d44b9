//! Best-effort JSONL run log with secret redaction.
//!
//! Every completed pipeline run appends a record under the configured log
//! directory, organized by year/month. Free text is scrubbed for credential
//! patterns before it is written; when redaction fires, an audit record is
//! appended alongside.

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{OpenOptions, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

const LOG_DIR_ENV: &str = "DEEPBRIEF_LOG_DIR";
const DEFAULT_LOG_DIR: &str = "data/logs";

static REDACTION_PATTERNS: Lazy<Vec<(String, Regex)>> = Lazy::new(|| {
    vec![
        (
            "api_key".to_string(),
            Regex::new(r"(?i)(api[_-]?key\s*[:=]\s*)([A-Za-z0-9\-_.+/]+)")
                .expect("invalid api_key regex"),
        ),
        (
            "bearer".to_string(),
            Regex::new(r"(?i)(bearer\s+)([A-Za-z0-9\-_.+=/]+)").expect("invalid bearer regex"),
        ),
        (
            "sk_token".to_string(),
            Regex::new(r"(sk-[A-Za-z0-9]{16,})").expect("invalid sk_token regex"),
        ),
    ]
});

/// Summary of one pipeline run, supplied by the pipeline boundary.
#[derive(Debug, Clone)]
pub struct RunLogInput {
    pub topic: String,
    pub outcome: String,
    pub document_chars: usize,
}

#[derive(Serialize)]
struct RunLogRecord {
    timestamp: String,
    topic: String,
    outcome: String,
    document_chars: usize,
    redactions: Vec<String>,
}

#[derive(Serialize)]
struct AuditLogRecord {
    timestamp: String,
    topic: String,
    redactions: Vec<String>,
}

fn log_base_dir() -> PathBuf {
    std::env::var(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR))
}

fn append_json_line<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let line = serde_json::to_string(value)?;
    writeln!(writer, "{}", line)
        .with_context(|| format!("failed to append log entry to {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

fn sanitize_text(input: &str, redactions: &mut HashSet<String>) -> String {
    let mut output = input.to_string();
    for (name, regex) in REDACTION_PATTERNS.iter() {
        let mut matched = false;
        output = regex
            .replace_all(&output, |caps: &Captures| {
                matched = true;
                if caps.len() > 2 {
                    format!("{}[REDACTED]", &caps[1])
                } else {
                    "[REDACTED]".to_string()
                }
            })
            .to_string();
        if matched {
            redactions.insert(name.clone());
        }
    }
    output
}

/// Append a run record (and an audit record if redaction fired).
///
/// Write failures are reported to the caller, which treats them as
/// non-fatal: the run log must never take the pipeline down.
pub fn log_run_completion(input: RunLogInput) -> Result<()> {
    let timestamp = Utc::now();
    let mut redactions = HashSet::new();

    let topic = sanitize_text(&input.topic, &mut redactions);

    let record = RunLogRecord {
        timestamp: timestamp.to_rfc3339(),
        topic: topic.clone(),
        outcome: input.outcome,
        document_chars: input.document_chars,
        redactions: redactions.iter().cloned().collect(),
    };

    let month_dir = log_base_dir()
        .join(format!("{:04}", timestamp.year()))
        .join(format!("{:02}", timestamp.month()));
    append_json_line(&month_dir.join("runs.jsonl"), &record)?;

    if !record.redactions.is_empty() {
        let audit = AuditLogRecord {
            timestamp: record.timestamp.clone(),
            topic,
            redactions: record.redactions.clone(),
        };
        append_json_line(&month_dir.join("audit.jsonl"), &audit)?;
        warn!(
            fields = ?record.redactions,
            "redacted potential secrets from run log"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn run_logging_sanitizes_and_persists() -> Result<()> {
        let temp = TempDir::new().expect("temp dir");
        unsafe {
            std::env::set_var(LOG_DIR_ENV, temp.path());
        }

        log_run_completion(RunLogInput {
            topic: "Leaked api_key=abcd1234 in prompt".to_string(),
            outcome: "completed".to_string(),
            document_chars: 42,
        })?;

        let year_dir = temp.path().read_dir()?.next().unwrap()?.path();
        let month_dir = year_dir.read_dir()?.next().unwrap()?.path();
        let run_log = month_dir.join("runs.jsonl");
        assert!(run_log.exists());

        let line = std::fs::read_to_string(&run_log)?;
        let record: Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(record["outcome"], "completed");
        assert_eq!(record["document_chars"], 42);
        assert!(record["topic"].as_str().unwrap().contains("[REDACTED]"));
        assert!(!record["topic"].as_str().unwrap().contains("abcd1234"));

        assert!(month_dir.join("audit.jsonl").exists());
        Ok(())
    }

    #[test]
    fn sanitize_leaves_ordinary_text_alone() {
        let mut redactions = HashSet::new();
        let text = sanitize_text("The impact of 5G technology on IoT", &mut redactions);
        assert_eq!(text, "The impact of 5G technology on IoT");
        assert!(redactions.is_empty());
    }

    #[test]
    fn sanitize_scrubs_bearer_tokens() {
        let mut redactions = HashSet::new();
        let text = sanitize_text("Authorization: Bearer abc.def.ghi", &mut redactions);
        assert!(text.contains("[REDACTED]"));
        assert!(!text.contains("abc.def.ghi"));
        assert!(redactions.contains("bearer"));
    }
}
