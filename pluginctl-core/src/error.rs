//! Plugin error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the manifest resolver and the registry client
#[derive(Error, Debug)]
pub enum PluginError {
    /// Plugin name is not a single plain path component
    #[error("Invalid plugin name '{name}': must be a single directory name without separators or '..'")]
    InvalidPluginName { name: String },

    /// Neither `dist/plugin.json` nor `plugin.json` could be read
    #[error("Could not find dist/plugin.json or plugin.json on {name} in {}", dir.display())]
    ManifestNotFound { name: String, dir: PathBuf },

    /// A manifest was read but did not yield a plugin id
    #[error("Could not find plugin {name} in {}", dir.display())]
    PluginInvalid { name: String, dir: PathBuf },

    /// The plugin directory could not be stat'ed before removal
    #[error("Plugin directory not found: {}", path.display())]
    DirectoryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Recursive removal of the plugin directory failed
    #[error("Failed to remove plugin directory: {}", path.display())]
    RemovalFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry request could not be constructed
    #[error("Failed to create request for {url}: {reason}")]
    RequestBuildFailed { url: String, reason: String },

    /// Transport-level failure executing the request or reading its body
    #[error("Failed to create request. url: {url}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with a non-success status
    #[error("Registry returned HTTP {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The registry body was not valid JSON for the expected shape
    #[error("Failed to decode registry response from {url}")]
    DecodeFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PluginError {
    /// True for both "no manifest on disk" and "manifest without an id".
    ///
    /// Malformed manifests are deliberately not distinguished from missing
    /// ones, so callers should branch on this rather than on the variant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PluginError::ManifestNotFound { .. } | PluginError::PluginInvalid { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
