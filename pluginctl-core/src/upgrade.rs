//! Installed vs. catalog version comparison

use crate::models::{InstalledPlugin, Plugin, PluginRepo};

/// Whether the catalog offers a newer release than `installed`
///
/// Both the installed version and the catalog's latest release must be
/// valid semver; anything unparsable (or a plugin without releases) never
/// triggers an upgrade.
pub fn should_upgrade(installed: &str, remote: &Plugin) -> bool {
    let Some(latest) = remote.latest_version() else {
        return false;
    };

    match (
        semver::Version::parse(installed),
        semver::Version::parse(&latest.version),
    ) {
        (Ok(current), Ok(latest)) => current < latest,
        _ => false,
    }
}

/// Installed plugins paired with a newer catalog entry
pub fn outdated<'a>(
    installed: &'a [InstalledPlugin],
    repo: &'a PluginRepo,
) -> Vec<(&'a InstalledPlugin, &'a Plugin)> {
    installed
        .iter()
        .filter_map(|local| {
            let remote = repo.get(&local.id)?;
            should_upgrade(local.version(), remote).then_some((local, remote))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PluginInfo, Version};

    fn remote(id: &str, versions: &[&str]) -> Plugin {
        Plugin {
            id: id.to_string(),
            versions: versions
                .iter()
                .map(|v| Version {
                    version: v.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn installed(id: &str, version: &str) -> InstalledPlugin {
        InstalledPlugin {
            id: id.to_string(),
            info: PluginInfo {
                version: version.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_should_upgrade() {
        let plugin = remote("clock-panel", &["1.2.0", "1.1.0"]);

        assert!(should_upgrade("1.1.0", &plugin));
        assert!(should_upgrade("0.0.0", &plugin));
        assert!(!should_upgrade("1.2.0", &plugin));
        assert!(!should_upgrade("2.0.0", &plugin));
        assert!(!should_upgrade("not-a-version", &plugin));
        assert!(!should_upgrade("1.0.0", &remote("clock-panel", &["latest"])));
        assert!(!should_upgrade("1.0.0", &remote("clock-panel", &[])));
    }

    #[test]
    fn test_outdated() {
        let repo = PluginRepo {
            plugins: vec![
                remote("clock-panel", &["2.0.0"]),
                remote("worldmap-panel", &["0.3.0"]),
            ],
            ..Default::default()
        };
        let local = vec![
            installed("clock-panel", "1.0.0"),
            installed("worldmap-panel", "0.3.0"),
            installed("private-app", "0.1.0"),
        ];

        let result = outdated(&local, &repo);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0.id, "clock-panel");
        assert_eq!(result[0].1.latest_version().unwrap().version, "2.0.0");
    }
}
