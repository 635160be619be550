//! Client configuration
//!
//! [`ClientConfig`] is the immutable configuration shared by every registry
//! call. It is built once at startup, usually from [`Settings`], and passed
//! explicitly to the components that need it.
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. Command-line flags (applied by the CLI)
//! 2. `~/.config/pluginctl/config.yaml`
//! 3. Built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default catalog base URL
pub const DEFAULT_REPO_URL: &str = "https://grafana.com/api/plugins";

/// End-to-end timeout for registry requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings file name inside the config directory
const CONFIG_FILE: &str = "config.yaml";

/// Default plugin installation root for the current platform
pub fn default_plugins_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/usr/local/var/lib/grafana/plugins")
    } else if cfg!(windows) {
        PathBuf::from("data").join("plugins")
    } else {
        PathBuf::from("/var/lib/grafana/plugins")
    }
}

/// Runtime configuration for the registry client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host version sent in the `grafana-version` and `User-Agent` headers
    pub version: String,

    /// Catalog base URL
    pub repo_url: String,

    /// End-to-end request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            repo_url: DEFAULT_REPO_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_repo_url(mut self, repo_url: impl Into<String>) -> Self {
        self.repo_url = repo_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Value of the `User-Agent` header
    pub fn user_agent(&self) -> String {
        format!("grafana {}", self.version)
    }
}

/// Persisted CLI settings (`config.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Plugin installation root
    #[serde(default)]
    pub plugins_dir: Option<PathBuf>,

    /// Catalog base URL
    #[serde(default)]
    pub repo_url: Option<String>,

    /// Host version reported to the catalog
    #[serde(default)]
    pub version: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Catalog URLs must use http or https
pub fn validate_repo_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("repo_url must start with http:// or https://, got '{url}'");
    }
    Ok(())
}

impl Settings {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                tracing::debug!("No config directory available, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from a specific path, falling back to defaults if the
    /// file does not exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;

        let settings: Settings = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(settings)
    }

    /// Get the default settings file path
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pluginctl")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("pluginctl")))
            .map(|dir| dir.join(CONFIG_FILE))
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.repo_url {
            validate_repo_url(url)?;
        }

        if self.timeout_seconds == Some(0) {
            anyhow::bail!("timeout_seconds must be greater than zero");
        }

        Ok(())
    }

    /// Plugin installation root, or the platform default
    pub fn plugins_dir(&self) -> PathBuf {
        self.plugins_dir.clone().unwrap_or_else(default_plugins_dir)
    }

    /// Build the registry client configuration
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();

        if let Some(version) = &self.version {
            config.version = version.clone();
        }
        if let Some(repo_url) = &self.repo_url {
            config.repo_url = repo_url.clone();
        }
        if let Some(seconds) = self.timeout_seconds {
            config.timeout = Duration::from_secs(seconds);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.repo_url, DEFAULT_REPO_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent(), format!("grafana {}", config.version));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(&temp_dir.path().join("config.yaml")).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.plugins_dir(), default_plugins_dir());
        assert_eq!(settings.client_config(), ClientConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "plugins_dir: /opt/plugins\nrepo_url: http://example.test/api\nversion: 10.1.0\ntimeout_seconds: 3\n",
        )
        .unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.plugins_dir(), PathBuf::from("/opt/plugins"));

        let config = settings.client_config();
        assert_eq!(config.repo_url, "http://example.test/api");
        assert_eq!(config.version, "10.1.0");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent(), "grafana 10.1.0");
    }

    #[test]
    fn test_rejects_non_http_repo_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "repo_url: ftp://example.test\n").unwrap();

        let err = Settings::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("http://"));
    }

    #[test]
    fn test_validate_repo_url() {
        assert!(validate_repo_url("https://grafana.com/api/plugins").is_ok());
        assert!(validate_repo_url("http://localhost:3000").is_ok());
        for url in ["ftp://example.test", "example.test", ""] {
            assert!(validate_repo_url(url).is_err(), "{url:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "timeout_seconds: 0\n").unwrap();

        assert!(Settings::load_from_path(&path).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "plugins_dir: [unterminated\n").unwrap();

        let err = Settings::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings"));
    }
}
