//! Installed plugin inventory
//!
//! Resolves plugin manifests under an installation root. Each plugin lives
//! in its own directory and describes itself with a `plugin.json`, either in
//! the packaged location (`dist/plugin.json`) or at the top of the plugin
//! directory.
//!
//! ```text
//! <root>/
//! ├── clock-panel/
//! │   └── dist/plugin.json   ← preferred
//! └── worldmap-panel/
//!     └── plugin.json        ← fallback
//! ```

use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{PluginError, Result};
use crate::models::{InstalledPlugin, DEFAULT_PLUGIN_VERSION};

/// Manifest file name
pub const MANIFEST_FILE: &str = "plugin.json";

/// Directory holding the packaged manifest
pub const DIST_DIR: &str = "dist";

/// Filesystem operations needed by the store
pub trait PluginFs {
    /// Read a whole file
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Names of the entries directly under `path`
    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Succeeds if `path` can be stat'ed
    fn stat(&self, path: &Path) -> io::Result<()>;

    /// Remove `path` and everything below it
    fn remove_all(&self, path: &Path) -> io::Result<()>;
}

/// [`PluginFs`] backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl PluginFs for OsFs {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn stat(&self, path: &Path) -> io::Result<()> {
        std::fs::metadata(path).map(|_| ())
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }
}

/// Plugins installed under a single root directory
#[derive(Debug, Clone)]
pub struct PluginStore<F = OsFs> {
    root: PathBuf,
    fs: F,
}

impl PluginStore<OsFs> {
    /// Create a store over the real filesystem
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_fs(root, OsFs)
    }
}

impl<F: PluginFs> PluginStore<F> {
    /// Create a store with a custom filesystem implementation
    pub fn with_fs(root: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    /// The installation root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a plugin is (or would be) installed in
    pub fn plugin_dir(&self, name: &str) -> Result<PathBuf> {
        validate_plugin_name(name)?;
        Ok(self.root.join(name))
    }

    /// Locate and parse the manifest of an installed plugin
    ///
    /// `dist/plugin.json` is tried first and `plugin.json` only if that read
    /// fails. A manifest that is not valid JSON is treated like one without
    /// an id, so it fails with [`PluginError::PluginInvalid`]. Individual
    /// `null` or mistyped fields only fall back to their defaults.
    pub fn read_plugin(&self, name: &str) -> Result<InstalledPlugin> {
        let plugin_dir = self.plugin_dir(name)?;

        let dist_path = plugin_dir.join(DIST_DIR).join(MANIFEST_FILE);
        let data = match self.fs.read_file(&dist_path) {
            Ok(data) => data,
            Err(dist_err) => {
                let path = plugin_dir.join(MANIFEST_FILE);
                self.fs.read_file(&path).map_err(|err| {
                    tracing::debug!(
                        "No manifest for {} ({}: {}; {}: {})",
                        name,
                        dist_path.display(),
                        dist_err,
                        path.display(),
                        err
                    );
                    PluginError::ManifestNotFound {
                        name: name.to_string(),
                        dir: self.root.clone(),
                    }
                })?
            }
        };

        let mut plugin: InstalledPlugin = serde_json::from_slice(&data).unwrap_or_else(|err| {
            tracing::debug!("Ignoring malformed manifest for {}: {}", name, err);
            InstalledPlugin::default()
        });

        if plugin.info.version.is_empty() {
            plugin.info.version = DEFAULT_PLUGIN_VERSION.to_string();
        }

        if plugin.id.is_empty() {
            return Err(PluginError::PluginInvalid {
                name: name.to_string(),
                dir: self.root.clone(),
            });
        }

        Ok(plugin)
    }

    /// All plugins that resolve under the root, sorted by directory name
    ///
    /// Entries that fail to resolve are skipped. An unreadable root yields
    /// an empty list.
    pub fn local_plugins(&self) -> Vec<InstalledPlugin> {
        let mut names = match self.fs.read_dir(&self.root) {
            Ok(names) => names,
            Err(err) => {
                tracing::debug!("Cannot list {}: {}", self.root.display(), err);
                return Vec::new();
            }
        };
        names.sort();

        names
            .iter()
            .filter_map(|name| match self.read_plugin(name) {
                Ok(plugin) => Some(plugin),
                Err(err) => {
                    tracing::debug!("Skipping {}: {}", name, err);
                    None
                }
            })
            .collect()
    }

    /// Recursively delete an installed plugin's directory
    ///
    /// Nothing is touched if the directory cannot be stat'ed. A failed
    /// removal may leave the directory partially deleted.
    pub fn remove_plugin(&self, name: &str) -> Result<()> {
        tracing::info!("Removing plugin: {}", name);
        let plugin_dir = self.plugin_dir(name)?;

        self.fs
            .stat(&plugin_dir)
            .map_err(|source| PluginError::DirectoryNotFound {
                path: plugin_dir.clone(),
                source,
            })?;

        self.fs
            .remove_all(&plugin_dir)
            .map_err(|source| PluginError::RemovalFailed {
                path: plugin_dir,
                source,
            })
    }
}

/// A plugin name must be exactly one plain path component
fn validate_plugin_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == OsStr::new(name) => Ok(()),
        _ => Err(PluginError::InvalidPluginName {
            name: name.to_string(),
        }),
    }
}
