use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dashboard::DEFAULT_REFRESH_INTERVAL;
use crate::feeds::backend::DEFAULT_API_BASE;

pub const API_URL_ENV: &str = "MENTIONWATCH_API_URL";

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub refresh_interval_secs: u64,
    pub page_size: usize,
    /// Show generated sample data when the backend cannot be reached.
    pub fallback_to_mock: bool,
    /// Fixed seed for the sample data; random when unset.
    pub mock_seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            page_size: 20,
            fallback_to_mock: true,
            mock_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mentionwatch").join("config.toml"))
    }

    /// Reads the config file. An explicit path must exist; the default
    /// location is optional and falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_api_override(std::env::var(API_URL_ENV).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_api_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard.refresh_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.dashboard.page_size, 20);
        assert!(config.dashboard.fallback_to_mock);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [api]
            base_url = "https://monitor.example.com/api"

            [dashboard]
            mock_seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://monitor.example.com/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.dashboard.mock_seed, Some(42));
        assert_eq!(config.dashboard.refresh_interval_secs, 30);
        assert_eq!(config.export.directory, PathBuf::from("."));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("[api\nbase_url = 1").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[export]\ndirectory = \"/tmp/exports\"").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.export.directory, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_env_override_wins() {
        let config = Config::default().with_api_override(Some("http://10.0.0.5/api".to_string()));
        assert_eq!(config.api.base_url, "http://10.0.0.5/api");
        let unchanged = Config::default().with_api_override(Some("  ".to_string()));
        assert_eq!(unchanged.api.base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn test_zero_intervals_are_clamped() {
        let mut config = Config::default();
        config.dashboard.refresh_interval_secs = 0;
        config.api.timeout_secs = 0;
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }
}
