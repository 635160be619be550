//! pluginctl library exports
//!
//! Two independent components are exposed here:
//!
//! - [`store::PluginStore`] resolves plugin manifests under a local
//!   installation root, enumerates installed plugins and removes them.
//! - [`registry::RegistryClient`] queries a remote plugin catalog.
//!
//! ```text
//! Catalog (HTTP)                 Installation root
//!     │                              │
//!     ├── GET /repo                  ├── <plugin>/dist/plugin.json  (preferred)
//!     └── GET /repo/<plugin-id>      └── <plugin>/plugin.json       (fallback)
//!            │                              │
//!            ▼                              ▼
//!     RegistryClient                  PluginStore
//!            └──────────► caller ◄──────────┘
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod store;
pub mod upgrade;

pub use config::{validate_repo_url, ClientConfig, Settings};
pub use error::{PluginError, Result};
pub use models::{Dependencies, InstalledPlugin, Plugin, PluginInfo, PluginRepo, Version};
pub use registry::RegistryClient;
pub use store::{OsFs, PluginFs, PluginStore};
pub use upgrade::{outdated, should_upgrade};
