use std::env;

use crate::DeepBriefError;

/// Wrapper around credential material to keep it out of logs and debug dumps.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***redacted***")
    }
}

/// Require that the given environment variable is set and non-empty.
///
/// Provider clients call this at construction time, so a missing credential
/// is fatal before any network call is attempted.
pub fn require_env(var: &str) -> Result<ApiKey, DeepBriefError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(ApiKey(value)),
        _ => Err(DeepBriefError::MissingSecret(var.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_env_success() {
        unsafe {
            env::set_var("DEEPBRIEF_TEST_KEY_PRESENT", "value");
        }
        let key = require_env("DEEPBRIEF_TEST_KEY_PRESENT").expect("key should load");
        assert_eq!(key.reveal(), "value");
        assert_eq!(format!("{key:?}"), "***redacted***");
    }

    #[test]
    fn require_env_missing() {
        unsafe {
            env::remove_var("DEEPBRIEF_TEST_KEY_ABSENT");
        }
        let err = require_env("DEEPBRIEF_TEST_KEY_ABSENT").unwrap_err();
        assert!(matches!(err, DeepBriefError::MissingSecret(_)));
        assert!(err.to_string().contains("Missing DEEPBRIEF_TEST_KEY_ABSENT"));
    }

    #[test]
    fn require_env_rejects_blank_values() {
        unsafe {
            env::set_var("DEEPBRIEF_TEST_KEY_BLANK", "   ");
        }
        let err = require_env("DEEPBRIEF_TEST_KEY_BLANK").unwrap_err();
        assert!(matches!(err, DeepBriefError::MissingSecret(_)));
    }
}
