//! Extension discovery from declared capabilities
//!
//! Plugins declare their extension-capable types up front instead of being
//! scanned for them. Discovery narrows the declared types to the configured
//! namespaces, and metadata generation writes a JSON manifest into a
//! per-plugin folder under the metadata root:
//!
//! ```text
//! <metadata_root>/
//!   org.x.plugin-a/
//!     extension-manifest.json
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Coordinate;
use crate::error::{Result, resolution_failed};

use super::ExtensionDiscovery;

/// File written into each generated metadata folder
pub const EXTENSION_MANIFEST_FILE: &str = "extension-manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub plugin: String,
    #[serde(rename = "type")]
    pub extension_type: String,
}

/// Discovery over a table of declared extension types, keyed by `namespace:name`
#[derive(Debug, Clone)]
pub struct ManifestExtensionDiscovery {
    metadata_root: PathBuf,
    declared: HashMap<String, Vec<String>>,
}

impl ManifestExtensionDiscovery {
    pub fn new(metadata_root: impl Into<PathBuf>) -> Self {
        Self {
            metadata_root: metadata_root.into(),
            declared: HashMap::new(),
        }
    }

    /// Declare `extension_type` for the plugin `namespace:name` of `plugin`
    pub fn declare(mut self, plugin: &Coordinate, extension_type: impl Into<String>) -> Self {
        self.declared
            .entry(plugin.short_id())
            .or_default()
            .push(extension_type.into());
        self
    }

    pub fn metadata_root(&self) -> &Path {
        &self.metadata_root
    }

    /// Folder holding the generated metadata of `plugin`
    pub fn metadata_folder(&self, plugin: &Coordinate) -> PathBuf {
        self.metadata_root
            .join(format!("{}.{}", plugin.namespace, plugin.name))
    }
}

impl ExtensionDiscovery for ManifestExtensionDiscovery {
    fn discover(
        &self,
        plugin: &Coordinate,
        _resources: &[PathBuf],
        namespaces: &[String],
    ) -> Result<Vec<String>> {
        let found: Vec<String> = self
            .declared
            .get(&plugin.short_id())
            .into_iter()
            .flatten()
            .filter(|extension_type| {
                namespaces
                    .iter()
                    .any(|namespace| extension_type.starts_with(namespace.as_str()))
            })
            .cloned()
            .collect();
        debug!(plugin = %plugin, found = ?found, "Scanned plugin for extension types");
        Ok(found)
    }

    fn generate_metadata(&self, plugin: &Coordinate, extension_type: &str) -> Result<PathBuf> {
        let folder = self.metadata_folder(plugin);
        fs::create_dir_all(&folder).map_err(|e| {
            resolution_failed(
                plugin.id(),
                format!("Failed to create metadata folder {}: {e}", folder.display()),
            )
        })?;

        let manifest = ExtensionManifest {
            plugin: plugin.classifier_less_id(),
            extension_type: extension_type.to_string(),
        };
        let content = serde_json::to_string_pretty(&manifest)?;
        let manifest_path = folder.join(EXTENSION_MANIFEST_FILE);
        fs::write(&manifest_path, content).map_err(|e| {
            resolution_failed(
                plugin.id(),
                format!("Failed to write {}: {e}", manifest_path.display()),
            )
        })?;

        debug!(plugin = %plugin, folder = %folder.display(), "Generated extension metadata");
        Ok(folder)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn plugin() -> Coordinate {
        Coordinate::parse("org.x:plugin-a:1.0").expect("valid coordinate")
    }

    #[test]
    fn test_discover_filters_by_namespace() {
        let discovery = ManifestExtensionDiscovery::new("/tmp/unused")
            .declare(&plugin(), "org.x.ext.HttpConnector")
            .declare(&plugin(), "com.other.Thing");

        let found = discovery
            .discover(&plugin(), &[], &["org.x".to_string()])
            .expect("discovery should succeed");
        assert_eq!(found, vec!["org.x.ext.HttpConnector".to_string()]);

        let none = discovery
            .discover(&plugin(), &[], &["net.y".to_string()])
            .expect("discovery should succeed");
        assert!(none.is_empty());
    }

    #[test]
    fn test_generate_metadata_writes_manifest() {
        let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
        let discovery = ManifestExtensionDiscovery::new(temp.path());

        let folder = discovery
            .generate_metadata(&plugin(), "org.x.ext.HttpConnector")
            .expect("metadata should be written");
        assert_eq!(folder, temp.path().join("org.x.plugin-a"));

        let content = fs::read_to_string(folder.join(EXTENSION_MANIFEST_FILE))
            .expect("manifest should exist");
        let manifest: ExtensionManifest =
            serde_json::from_str(&content).expect("manifest should parse");
        assert_eq!(manifest.plugin, "org.x:plugin-a:jar:1.0");
        assert_eq!(manifest.extension_type, "org.x.ext.HttpConnector");
    }
}
