//! Classification output types
//!
//! A [`ModuleClassification`] describes one plugin boundary; an
//! [`IsolationResult`] bundles the base boundary, the ordered plugin
//! boundaries and the application boundary produced by one classification.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;

/// One plugin boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleClassification {
    /// Classifier-less coordinate id of the plugin
    pub name: String,
    /// Resources loaded by this boundary, in lookup order
    pub resources: Vec<PathBuf>,
    /// Symbols made visible to dependent boundaries
    pub exported_symbols: Vec<String>,
    /// Names of the modules this one depends on
    pub dependencies: Vec<String>,
}

impl ModuleClassification {
    pub fn new(
        name: impl Into<String>,
        resources: Vec<PathBuf>,
        exported_symbols: Vec<String>,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resources,
            exported_symbols,
            dependencies,
        }
    }

    /// Whether this module was classified from the given artifact (any version)
    pub fn is_artifact(&self, coordinate: &Coordinate) -> bool {
        let mut segments = self.name.split(':');
        segments.next() == Some(coordinate.namespace.as_str())
            && segments.next() == Some(coordinate.name.as_str())
    }
}

/// Result of one classification request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsolationResult {
    /// Base platform boundary
    pub base_resources: Vec<PathBuf>,
    /// Extra symbol names the base boundary exposes
    pub base_symbols: Vec<String>,
    /// Plugin boundaries in discovery order
    pub modules: Vec<ModuleClassification>,
    /// Libraries shared with the application and its plugins
    pub shared_libraries: Vec<PathBuf>,
    /// Application/test boundary
    pub application_resources: Vec<PathBuf>,
}

impl IsolationResult {
    /// Find a module by name
    pub fn module(&self, name: &str) -> Option<&ModuleClassification> {
        self.modules.iter().find(|module| module.name == name)
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.name.as_str()).collect()
    }
}
