//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DriveError, Result};

/// Default metadata endpoint.
pub const DEFAULT_METADATA_URL: &str = "https://cdws.us-east-1.amazonaws.com/drive/v1/";

/// Default content endpoint.
pub const DEFAULT_CONTENT_URL: &str = "https://content-na.drive.amazonaws.com/cdproxy/";

fn default_timeout_secs() -> u64 {
    30
}

/// Endpoints and transport settings for [`HttpClient`](crate::http::HttpClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL for node metadata requests
    pub metadata_url: String,
    /// Base URL for node content requests
    pub content_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional proxy URL (e.g. "http://proxy:8080")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Optional User-Agent header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            content_url: DEFAULT_CONTENT_URL.to_string(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given endpoints.
    pub fn new(metadata_url: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            metadata_url: metadata_url.into(),
            content_url: content_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Route all requests through a proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check that both endpoints are absolute URLs.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("metadataUrl", &self.metadata_url),
            ("contentUrl", &self.content_url),
        ] {
            reqwest::Url::parse(value)
                .map_err(|e| DriveError::InvalidConfig(format!("{}: {}", field, e)))?;
        }
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| DriveError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DriveError::InvalidConfig(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = ClientConfig::new("not a url", DEFAULT_CONTENT_URL);
        assert!(matches!(
            config.validate(),
            Err(DriveError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_timeout_uses_default() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"metadataUrl": "http://localhost/m/", "contentUrl": "http://localhost/c/"}"#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "cloudtree-config-{}.json",
            std::process::id()
        ));
        let config = ClientConfig::new("http://localhost/m/", "http://localhost/c/")
            .with_timeout(Duration::from_secs(5))
            .with_proxy("http://127.0.0.1:8080");
        config.save(&path).unwrap();

        let loaded = ClientConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
