//! Per-user configuration from `data/{username}-config.json`.
//!
//! The file carries an `options` map; the only key the bot reads today is
//! `switch-model`. An absent file means "no configuration yet" and is not an
//! error; a file that exists but cannot be read or parsed is reported as such,
//! the two cases are never conflated.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("Failed to read user config: {0}")]
    Io(#[from] std::io::Error),
    #[error("User config is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parsed per-user configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

impl UserConfig {
    /// Model override from `options["switch-model"]`, if present and a string.
    pub fn switch_model(&self) -> Option<&str> {
        self.options.get("switch-model").and_then(|v| v.as_str())
    }
}

/// Load one user's config file. `Ok(None)` means the file does not exist;
/// `Err` means it exists but could not be read or parsed.
pub fn load(path: &Path) -> Result<Option<UserConfig>, UserConfigError> {
    if !path.exists() {
        debug!("UserConfig: {:?} absent, using defaults", path);
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let config: UserConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Resolve the model a user is currently set to: their `switch-model` override
/// when configured, otherwise `default_model`. Malformed config is an error.
pub fn active_model(path: &Path, default_model: &str) -> Result<String, UserConfigError> {
    match load(path)? {
        Some(config) => Ok(config
            .switch_model()
            .unwrap_or(default_model)
            .to_string()),
        None => Ok(default_model.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_resolves_to_default_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice-config.json");
        let model = active_model(&path, "llama3.2:latest").unwrap();
        assert_eq!(model, "llama3.2:latest");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn switch_model_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice-config.json");
        std::fs::write(
            &path,
            r#"{"options":{"switch-model":"qwen2.5-coder:latest","theme":"dark"}}"#,
        )
        .unwrap();
        let model = active_model(&path, "llama3.2:latest").unwrap();
        assert_eq!(model, "qwen2.5-coder:latest");
    }

    #[test]
    fn options_without_switch_model_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bob-config.json");
        std::fs::write(&path, r#"{"options":{"theme":"dark"}}"#).unwrap();
        let model = active_model(&path, "llama3.2:latest").unwrap();
        assert_eq!(model, "llama3.2:latest");
    }

    #[test]
    fn malformed_file_is_distinct_from_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mallory-config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = active_model(&path, "llama3.2:latest").unwrap_err();
        assert!(matches!(err, UserConfigError::Malformed(_)));
    }

    #[test]
    fn non_string_switch_model_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carol-config.json");
        std::fs::write(&path, r#"{"options":{"switch-model":42}}"#).unwrap();
        let model = active_model(&path, "llama3.2:latest").unwrap();
        assert_eq!(model, "llama3.2:latest");
    }
}
