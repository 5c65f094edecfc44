//! Ollama HTTP client.
//!
//! Thin wrapper over the local Ollama server's model-listing endpoint
//! (`GET /api/tags`). The response is parsed into an explicit schema with
//! required fields; a missing `name`, `size`, or `modified_at` is a parse
//! error, never a silently-absent value.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Errors from talking to the Ollama API. Each command converts these into a
/// user-visible reply at its own boundary; nothing is retried.
#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("Ollama API responded with status: {0}")]
    Status(u16),
    #[error("Request to Ollama failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Failed to parse Ollama response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid Ollama endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// One installed model as reported by `/api/tags`. All three fields are
/// required; the deserializer rejects entries without them.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    /// Model blob size in bytes.
    pub size: u64,
    /// RFC 3339 modification timestamp.
    pub modified_at: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelSummary>,
}

impl ModelSummary {
    /// Size in whole megabytes, rounded like the display expects.
    pub fn size_mb(&self) -> u64 {
        (self.size as f64 / 1024.0 / 1024.0).round() as u64
    }

    /// `modified_at` as a plain date, falling back to the raw string when the
    /// timestamp is not RFC 3339.
    pub fn modified_date(&self) -> String {
        match DateTime::<FixedOffset>::parse_from_rfc3339(&self.modified_at) {
            Ok(dt) => dt.format("%Y-%m-%d").to_string(),
            Err(_) => self.modified_at.clone(),
        }
    }
}

/// Client for one Ollama server. Cheap to clone; holds a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Build a client for `base_url` (e.g. "http://127.0.0.1:11434").
    pub fn new(base_url: &str) -> Result<Self, OllamaError> {
        Url::parse(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        info!("Ollama: Initializing client with endpoint: {}", base_url);
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// List installed models from `GET /api/tags`. Non-2xx is an error.
    pub async fn list_models(&self) -> Result<Vec<ModelSummary>, OllamaError> {
        let url = format!("{}/api/tags", self.base_url);
        debug!("Ollama: Listing models from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("Ollama: /api/tags failed with HTTP {}", status);
            return Err(OllamaError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let tags: TagsResponse = serde_json::from_str(&body)?;
        info!("Ollama: {} models reported by /api/tags", tags.models.len());
        Ok(tags.models)
    }
}

/// Render the model list as embed-description text: one block per model with
/// name, size in MB, and modification date, blank-line separated.
pub fn format_model_list(models: &[ModelSummary]) -> String {
    models
        .iter()
        .map(|m| {
            format!(
                "**{}**\nSize: {} MB\nModified: {}",
                m.name,
                m.size_mb(),
                m.modified_date()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_response_with_required_fields() {
        let body = r#"{"models":[
            {"name":"llama3.2:latest","size":2019393189,"modified_at":"2025-03-01T10:30:00.000000000+01:00"},
            {"name":"qwen2.5-coder:latest","size":4683087332,"modified_at":"2025-02-12T08:00:00Z"}
        ]}"#;
        let tags: TagsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(tags.models.len(), 2);
        assert_eq!(tags.models[0].name, "llama3.2:latest");
        assert_eq!(tags.models[0].size_mb(), 1926);
        assert_eq!(tags.models[0].modified_date(), "2025-03-01");
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let body = r#"{"models":[{"name":"llama3.2:latest","size":123}]}"#;
        let parsed: Result<TagsResponse, _> = serde_json::from_str(body);
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_models_key_means_empty_list() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }

    #[test]
    fn status_error_display_includes_code() {
        let err = OllamaError::Status(500);
        assert!(err.to_string().contains("status: 500"));
    }

    #[test]
    fn non_rfc3339_timestamp_falls_back_to_raw() {
        let m = ModelSummary {
            name: "m".to_string(),
            size: 0,
            modified_at: "yesterday".to_string(),
        };
        assert_eq!(m.modified_date(), "yesterday");
    }

    #[test]
    fn model_list_formatting() {
        let models = vec![ModelSummary {
            name: "llama3.2:latest".to_string(),
            size: 2 * 1024 * 1024,
            modified_at: "2025-03-01T10:30:00Z".to_string(),
        }];
        assert_eq!(
            format_model_list(&models),
            "**llama3.2:latest**\nSize: 2 MB\nModified: 2025-03-01"
        );
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(OllamaClient::new("not a url").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:11434").is_ok());
    }
}
