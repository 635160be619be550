//! Plugin manifest and catalog schema
//!
//! `InstalledPlugin` mirrors a local `plugin.json`. `PluginRepo`, `Plugin`
//! and `Version` mirror the JSON served by the remote catalog. Every field
//! is optional on the wire and defaults when absent or `null`. Manifest
//! fields also fall back to their default when they hold a value of the
//! wrong type, so one bad field never hides the rest of the manifest.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Version assigned to installed plugins whose manifest omits one
pub const DEFAULT_PLUGIN_VERSION: &str = "0.0.0";

/// A locally installed plugin, as described by its `plugin.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledPlugin {
    /// Plugin identifier (must be non-empty for the plugin to be valid)
    #[serde(deserialize_with = "lenient")]
    pub id: String,

    /// Display name
    #[serde(deserialize_with = "lenient")]
    pub name: String,

    /// Plugin type (e.g. "panel", "datasource", "app")
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: String,

    /// Version information
    #[serde(deserialize_with = "lenient")]
    pub info: PluginInfo,

    /// Host and plugin dependencies
    #[serde(deserialize_with = "lenient")]
    pub dependencies: Dependencies,

    /// Remaining manifest fields, carried through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The `info` block of a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    #[serde(deserialize_with = "lenient")]
    pub version: String,
    #[serde(deserialize_with = "lenient")]
    pub updated: String,
}

/// The `dependencies` block of a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dependencies {
    /// Host version range the plugin supports
    #[serde(deserialize_with = "lenient")]
    pub grafana_version: String,

    /// Other plugins this plugin relies on
    #[serde(deserialize_with = "lenient")]
    pub plugins: Vec<PluginDependency>,
}

/// A plugin listed under `dependencies.plugins`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginDependency {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: String,
    #[serde(deserialize_with = "lenient")]
    pub version: String,
}

impl InstalledPlugin {
    /// Installed version, never empty once resolved by the store
    pub fn version(&self) -> &str {
        &self.info.version
    }
}

/// Listing returned by `GET <repo>/repo`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginRepo {
    #[serde(deserialize_with = "null_as_default")]
    pub plugins: Vec<Plugin>,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
}

impl PluginRepo {
    /// Look up a catalog entry by id
    pub fn get(&self, id: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.id == id)
    }
}

/// A single catalog entry, returned by `GET <repo>/repo/<id>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plugin {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,

    /// Available releases, newest first
    #[serde(deserialize_with = "null_as_default")]
    pub versions: Vec<Version>,
}

impl Plugin {
    /// The newest release advertised by the catalog
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.first()
    }
}

/// A published release of a catalog plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub commit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,

    /// Platform-specific artifacts keyed by `<os>-<arch>`
    #[serde(deserialize_with = "null_as_default")]
    pub arch: BTreeMap<String, Value>,
}

/// Decode a field, falling back to its default on `null` or a mistyped value
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Decode a field, treating `null` like an absent value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
