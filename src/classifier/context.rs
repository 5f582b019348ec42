//! Classification context: the caller-supplied inputs of one classification

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{COORDINATES_SEPARATOR, Coordinate};
use crate::error::{Result, invalid_coordinates};
use crate::filter::ArtifactPattern;

fn default_true() -> bool {
    true
}

/// Inputs of one classification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationContext {
    /// Component whose dependency closure is classified
    pub root: Coordinate,

    /// Resources already materialized by the caller
    #[serde(default)]
    pub materialized_resources: Vec<PathBuf>,

    /// Plugins to classify, as `namespace:name` or `namespace:name:version`
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Patterns excluded from every boundary
    #[serde(default)]
    pub excluded: Vec<String>,

    /// Patterns excluded from plugin boundaries only
    #[serde(default)]
    pub plugin_exclusions: Vec<String>,

    #[serde(default)]
    pub provided_exclusions: Vec<String>,

    #[serde(default)]
    pub provided_inclusions: Vec<String>,

    #[serde(default)]
    pub test_exclusions: Vec<String>,

    #[serde(default)]
    pub test_inclusions: Vec<String>,

    /// Extra symbol names visible from the base boundary
    #[serde(default)]
    pub extra_base_symbols: Vec<String>,

    /// Namespaces scanned for extension-capable types
    #[serde(default)]
    pub extension_namespaces: Vec<String>,

    /// Whether discovered extensions get generated metadata
    #[serde(default = "default_true")]
    pub extension_metadata_enabled: bool,

    /// Extra symbols a plugin exports for testing, keyed by `namespace:name`
    #[serde(default)]
    pub exported_for_testing: BTreeMap<String, Vec<String>>,

    /// Libraries shared with the application, as `namespace:name[:classifier]`
    #[serde(default)]
    pub application_shared_libs: Vec<String>,
}

impl ClassificationContext {
    pub fn new(root: Coordinate) -> Self {
        Self {
            root,
            materialized_resources: Vec::new(),
            plugins: Vec::new(),
            excluded: Vec::new(),
            plugin_exclusions: Vec::new(),
            provided_exclusions: Vec::new(),
            provided_inclusions: Vec::new(),
            test_exclusions: Vec::new(),
            test_inclusions: Vec::new(),
            extra_base_symbols: Vec::new(),
            extension_namespaces: Vec::new(),
            extension_metadata_enabled: true,
            exported_for_testing: BTreeMap::new(),
            application_shared_libs: Vec::new(),
        }
    }

    /// Parse a context from YAML and validate it
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first validation failure.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let context: Self = serde_yaml::from_str(yaml)?;
        context.validate()?;
        Ok(context)
    }

    /// Parse a context from JSON and validate it
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first validation failure.
    pub fn from_json(json: &str) -> Result<Self> {
        let context: Self = serde_json::from_str(json)?;
        context.validate()?;
        Ok(context)
    }

    /// Check every pattern, plugin request and shared library entry
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` or `InvalidCoordinates`.
    pub fn validate(&self) -> Result<()> {
        let pattern_lists = [
            &self.excluded,
            &self.plugin_exclusions,
            &self.provided_exclusions,
            &self.provided_inclusions,
            &self.test_exclusions,
            &self.test_inclusions,
        ];
        for pattern in pattern_lists.into_iter().flatten() {
            ArtifactPattern::parse(pattern)?;
        }
        for plugin in &self.plugins {
            PluginRequest::parse(plugin)?;
        }
        for library in &self.application_shared_libs {
            SharedLibraryRequest::parse(library)?;
        }
        Ok(())
    }

    pub fn with_materialized_resources(mut self, resources: Vec<PathBuf>) -> Self {
        self.materialized_resources = resources;
        self
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugins.push(plugin.into());
        self
    }

    pub fn with_excluded(mut self, pattern: impl Into<String>) -> Self {
        self.excluded.push(pattern.into());
        self
    }

    pub fn with_provided_exclusion(mut self, pattern: impl Into<String>) -> Self {
        self.provided_exclusions.push(pattern.into());
        self
    }

    pub fn with_provided_inclusion(mut self, pattern: impl Into<String>) -> Self {
        self.provided_inclusions.push(pattern.into());
        self
    }

    pub fn with_test_exclusion(mut self, pattern: impl Into<String>) -> Self {
        self.test_exclusions.push(pattern.into());
        self
    }

    pub fn with_test_inclusion(mut self, pattern: impl Into<String>) -> Self {
        self.test_inclusions.push(pattern.into());
        self
    }

    pub fn with_extension_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.extension_namespaces.push(namespace.into());
        self
    }

    pub fn with_extension_metadata(mut self, enabled: bool) -> Self {
        self.extension_metadata_enabled = enabled;
        self
    }

    pub fn with_exported_for_testing(
        mut self,
        plugin: impl Into<String>,
        symbols: impl IntoIterator<Item = String>,
    ) -> Self {
        self.exported_for_testing
            .entry(plugin.into())
            .or_default()
            .extend(symbols);
        self
    }

    pub fn with_extra_base_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.extra_base_symbols.push(symbol.into());
        self
    }

    pub fn with_application_shared_lib(mut self, library: impl Into<String>) -> Self {
        self.application_shared_libs.push(library.into());
        self
    }

    /// Extra exports declared for `plugin`
    pub fn exports_for_testing(&self, plugin: &Coordinate) -> &[String] {
        self.exported_for_testing
            .get(&plugin.short_id())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A requested plugin: `namespace:name[:version]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequest {
    pub namespace: String,
    pub name: String,
    pub version: Option<String>,
}

impl PluginRequest {
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` unless there are two or three non-empty segments.
    pub fn parse(request: &str) -> Result<Self> {
        let segments: Vec<&str> = request.split(COORDINATES_SEPARATOR).collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(invalid_coordinates(request, "empty segment"));
        }
        match segments.as_slice() {
            [namespace, name] => Ok(Self {
                namespace: (*namespace).to_string(),
                name: (*name).to_string(),
                version: None,
            }),
            [namespace, name, version] => Ok(Self {
                namespace: (*namespace).to_string(),
                name: (*name).to_string(),
                version: Some((*version).to_string()),
            }),
            _ => Err(invalid_coordinates(
                request,
                "expected namespace:name[:version]",
            )),
        }
    }

    pub fn same_artifact(&self, coordinate: &Coordinate) -> bool {
        self.namespace == coordinate.namespace && self.name == coordinate.name
    }
}

/// A requested shared library: `namespace:name[:classifier]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLibraryRequest {
    pub namespace: String,
    pub name: String,
    pub classifier: Option<String>,
}

impl SharedLibraryRequest {
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` unless there are two or three non-empty segments.
    pub fn parse(request: &str) -> Result<Self> {
        let segments: Vec<&str> = request.split(COORDINATES_SEPARATOR).collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(invalid_coordinates(request, "empty segment"));
        }
        match segments.as_slice() {
            [namespace, name] => Ok(Self {
                namespace: (*namespace).to_string(),
                name: (*name).to_string(),
                classifier: None,
            }),
            [namespace, name, classifier] => Ok(Self {
                namespace: (*namespace).to_string(),
                name: (*name).to_string(),
                classifier: Some((*classifier).to_string()),
            }),
            _ => Err(invalid_coordinates(
                request,
                "expected namespace:name[:classifier]",
            )),
        }
    }

    pub fn short_id(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }
}
