use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "CHARTSWORTH_SLACK_TOKEN";
pub const DEFAULT_CHANNEL_ENV: &str = "CHARTSWORTH_DEFAULT_CHANNEL";
pub const BASE_DEPLOYMENT_ENV: &str = "CHARTSWORTH_BASE_DEPLOYMENT";
pub const API_URL_ENV: &str = "CHARTSWORTH_SLACK_API_URL";

pub const DEFAULT_BASE_DEPLOYMENT: &str = "app.noteable.io";
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Client configuration, validated once when a client is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsworthConfig {
    /// Bot user OAuth token (xoxb-...)
    pub token: Option<String>,
    /// Channel used when a call does not name one
    pub default_channel: Option<String>,
    /// Host serving notebooks, used to build notebook links
    pub base_deployment: String,
    /// Slack Web API root
    pub api_base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ChartsworthConfig {
    fn default() -> Self {
        Self {
            token: None,
            default_channel: None,
            base_deployment: DEFAULT_BASE_DEPLOYMENT.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ChartsworthConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn with_default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = Some(channel.into());
        self
    }

    pub fn with_base_deployment(mut self, base: impl Into<String>) -> Self {
        self.base_deployment = base.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Default config file location (`~/.chartsworth/config.toml`).
    pub fn default_path() -> PathBuf {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home_dir.join(".chartsworth").join("config.toml")
    }

    /// Load configuration from a TOML file. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| {
                Error::config(format!("invalid config {}: {}", config_path.display(), e))
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Defaults overlaid with the `CHARTSWORTH_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay the `CHARTSWORTH_*` environment variables onto this config.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = get(TOKEN_ENV) {
            self.token = Some(token);
        }
        if let Some(channel) = get(DEFAULT_CHANNEL_ENV) {
            self.default_channel = Some(channel);
        }
        if let Some(base) = get(BASE_DEPLOYMENT_ENV) {
            self.base_deployment = base;
        }
        if let Some(url) = get(API_URL_ENV) {
            self.api_base_url = url;
        }
    }

    /// Reject configs that cannot reach Slack. Blank values count as unset.
    pub fn validate(&self) -> Result<()> {
        let has_token = self
            .token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty());
        if !has_token {
            return Err(Error::config(format!(
                "{} not set as an environment variable or in the config file",
                TOKEN_ENV
            )));
        }

        if self
            .default_channel
            .as_deref()
            .is_some_and(|channel| channel.trim().is_empty())
        {
            return Err(Error::config("default channel must not be blank"));
        }

        if self.api_base_url.trim().is_empty() {
            return Err(Error::config("Slack API base URL must not be blank"));
        }

        Ok(())
    }

    /// Token after validation; empty if `validate` was skipped.
    pub(crate) fn token(&self) -> &str {
        self.token.as_deref().map(str::trim).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ChartsworthConfig::default();
        assert_eq!(config.base_deployment, "app.noteable.io");
        assert_eq!(config.api_base_url, "https://slack.com/api");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let err = ChartsworthConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(TOKEN_ENV));
    }

    #[test]
    fn test_blank_token_is_rejected() {
        let err = ChartsworthConfig::new("   ").validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_blank_default_channel_is_rejected() {
        let config = ChartsworthConfig::new("xoxb-1").with_default_channel(" ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ChartsworthConfig::default();
        config.apply_overrides(lookup(&[
            (TOKEN_ENV, " xoxb-test "),
            (DEFAULT_CHANNEL_ENV, "general"),
            (BASE_DEPLOYMENT_ENV, "notebooks.example.com"),
        ]));

        assert_eq!(config.token.as_deref(), Some("xoxb-test"));
        assert_eq!(config.default_channel.as_deref(), Some("general"));
        assert_eq!(config.base_deployment, "notebooks.example.com");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = ChartsworthConfig::new("xoxb-file").with_default_channel("random");
        config.apply_overrides(lookup(&[(TOKEN_ENV, ""), (DEFAULT_CHANNEL_ENV, "  ")]));

        assert_eq!(config.token.as_deref(), Some("xoxb-file"));
        assert_eq!(config.default_channel.as_deref(), Some("random"));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "token = \"xoxb-from-file\"\ndefault_channel = \"alerts\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = ChartsworthConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.token.as_deref(), Some("xoxb-from-file"));
        assert_eq!(config.default_channel.as_deref(), Some("alerts"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_deployment, DEFAULT_BASE_DEPLOYMENT);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChartsworthConfig::load(Some(dir.path().join("nope.toml").as_path())).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "token = [").unwrap();

        let err = ChartsworthConfig::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
