//! `pluginctl plugins` commands
//!
//! Local inventory commands (`ls`, `remove`) read the installation
//! directory; catalog commands (`list-remote`, `list-versions`, `outdated`)
//! query the plugin registry.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use pluginctl_core::{
    outdated, ClientConfig, InstalledPlugin, PluginError, PluginStore, RegistryClient,
};

/// Resolved configuration shared by every subcommand
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub plugins_dir: PathBuf,
    pub client_config: ClientConfig,
}

impl CommandContext {
    fn store(&self) -> PluginStore {
        PluginStore::new(self.plugins_dir.clone())
    }

    fn registry(&self) -> Result<RegistryClient> {
        RegistryClient::new(&self.client_config).context("Failed to set up the registry client")
    }
}

/// Plugins subcommand for inspecting and managing plugins
#[derive(Parser, Debug)]
pub struct PluginsCommand {
    #[clap(subcommand)]
    pub command: PluginsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PluginsSubcommand {
    /// List installed plugins
    Ls {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// List plugins available in the catalog
    ListRemote {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// List the published versions of a catalog plugin
    ListVersions {
        /// Plugin id
        plugin_id: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show installed plugins that have a newer catalog version
    Outdated {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Remove an installed plugin
    #[clap(alias = "uninstall")]
    Remove {
        /// Plugin directory name
        plugin_id: String,
    },
}

impl PluginsCommand {
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        match self.command {
            PluginsSubcommand::Ls { json } => execute_ls(context, json),
            PluginsSubcommand::ListRemote { json } => execute_list_remote(context, json).await,
            PluginsSubcommand::ListVersions { plugin_id, json } => {
                execute_list_versions(context, &plugin_id, json).await
            }
            PluginsSubcommand::Outdated { json } => execute_outdated(context, json).await,
            PluginsSubcommand::Remove { plugin_id } => execute_remove(context, &plugin_id),
        }
    }
}

fn render_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

/// Table row for installed plugins
#[derive(Tabled)]
struct InstalledRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Version")]
    version: String,
}

fn installed_json(plugin: &InstalledPlugin) -> serde_json::Value {
    serde_json::json!({
        "id": plugin.id,
        "name": plugin.name,
        "type": plugin.kind,
        "version": plugin.version(),
    })
}

fn execute_ls(context: &CommandContext, json_output: bool) -> Result<()> {
    let store = context.store();
    let plugins = store.local_plugins();

    if json_output {
        let json_results: Vec<serde_json::Value> = plugins.iter().map(installed_json).collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if plugins.is_empty() {
        println!("No plugins installed in {}.", store.root().display());
        return Ok(());
    }

    println!("Installed plugins in {}:\n", store.root().display());

    let rows: Vec<InstalledRow> = plugins
        .iter()
        .map(|plugin| InstalledRow {
            id: plugin.id.clone(),
            name: plugin.name.clone(),
            kind: plugin.kind.clone(),
            version: format!("v{}", plugin.version()),
        })
        .collect();

    println!("{}", render_table(&rows));

    Ok(())
}

/// Table row for catalog plugins
#[derive(Tabled)]
struct RemoteRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Latest")]
    latest: String,
}

async fn execute_list_remote(context: &CommandContext, json_output: bool) -> Result<()> {
    let registry = context.registry()?;
    let repo = registry
        .list_all_plugins()
        .await
        .context("Failed to fetch the plugin catalog")?;

    let mut plugins: Vec<_> = repo.plugins.iter().collect();
    plugins.sort_by(|a, b| a.id.cmp(&b.id));

    if json_output {
        let json_results: Vec<serde_json::Value> = plugins
            .iter()
            .map(|plugin| {
                serde_json::json!({
                    "id": plugin.id,
                    "category": plugin.category,
                    "latest_version": plugin.latest_version().map(|v| v.version.as_str()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if plugins.is_empty() {
        println!("No plugins found in {}.", registry.config().repo_url);
        return Ok(());
    }

    println!("Found {} plugin(s):\n", plugins.len());

    let rows: Vec<RemoteRow> = plugins
        .iter()
        .map(|plugin| RemoteRow {
            id: plugin.id.clone(),
            category: plugin.category.clone(),
            latest: plugin
                .latest_version()
                .map(|v| format!("v{}", v.version))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!("{}", render_table(&rows));

    Ok(())
}

async fn execute_list_versions(
    context: &CommandContext,
    plugin_id: &str,
    json_output: bool,
) -> Result<()> {
    let registry = context.registry()?;
    let plugin = registry
        .get_plugin(plugin_id)
        .await
        .with_context(|| format!("Failed to fetch plugin '{plugin_id}' from the catalog"))?;

    if json_output {
        let output = serde_json::json!({
            "id": plugin.id,
            "versions": plugin.versions.iter().map(|v| &v.version).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if plugin.versions.is_empty() {
        println!("No versions published for {plugin_id}.");
        return Ok(());
    }

    println!("Versions of {plugin_id}:");
    for (i, version) in plugin.versions.iter().enumerate() {
        let marker = if i == 0 { " (latest)" } else { "" };
        println!("  v{}{}", version.version, marker);
    }

    Ok(())
}

/// Table row for upgrade candidates
#[derive(Tabled)]
struct OutdatedRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Installed")]
    installed: String,
    #[tabled(rename = "Latest")]
    latest: String,
}

async fn execute_outdated(context: &CommandContext, json_output: bool) -> Result<()> {
    let store = context.store();
    let installed = store.local_plugins();

    if installed.is_empty() {
        if json_output {
            println!("[]");
        } else {
            println!("No plugins installed in {}.", store.root().display());
        }
        return Ok(());
    }

    let registry = context.registry()?;
    let repo = registry
        .list_all_plugins()
        .await
        .context("Failed to fetch the plugin catalog")?;

    let candidates = outdated(&installed, &repo);

    let rows: Vec<OutdatedRow> = candidates
        .iter()
        .map(|(local, remote)| OutdatedRow {
            id: local.id.clone(),
            installed: local.version().to_string(),
            latest: remote
                .latest_version()
                .map(|v| v.version.clone())
                .unwrap_or_default(),
        })
        .collect();

    if json_output {
        let json_results: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.id,
                    "installed": row.installed,
                    "latest": row.latest,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("All installed plugins are up to date.");
        return Ok(());
    }

    println!("{}", render_table(&rows));

    Ok(())
}

fn execute_remove(context: &CommandContext, plugin_id: &str) -> Result<()> {
    let store = context.store();
    match store.remove_plugin(plugin_id) {
        Ok(()) => {
            println!("Removed plugin '{plugin_id}'");
            Ok(())
        }
        Err(PluginError::DirectoryNotFound { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            anyhow::bail!(
                "Plugin '{}' is not installed in {}",
                plugin_id,
                store.root().display()
            )
        }
        Err(err) => Err(err).with_context(|| format!("Failed to remove plugin '{plugin_id}'")),
    }
}
