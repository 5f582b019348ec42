//! Collaborator interfaces used by the isolation classifier
//!
//! The classifier never reads package descriptors or touches binaries itself.
//! It asks a [`DependencyResolver`] for declared and managed dependencies and
//! for resolved closures, a [`PluginRole`] whether a coordinate is a plugin,
//! an [`ExtensionDiscovery`] for extension-capable types, and a
//! [`ModuleDescriptorReader`] for exported symbols.
//!
//! [`repository::InMemoryRepository`] implements the resolver and the
//! descriptor reader over a declared set of artifacts.

pub mod discovery;
pub mod repository;

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::{Coordinate, Dependency};
use crate::error::Result;
use crate::filter::DependencyFilter;
use crate::graph::DependencyGraph;

pub use discovery::ManifestExtensionDiscovery;
pub use repository::{InMemoryRepository, RepositoryArtifact, RepositoryDescriptor};

/// Archive types that mark a component as a plugin
pub const PLUGIN_ARCHIVE_TYPES: &[&str] = &["plugin", "extension"];

/// Classifier that marks a declared dependency as a plugin
pub const PLUGIN_CLASSIFIER: &str = "plugin";

/// One closure resolution
///
/// `root` is visited first and contributes its own declared dependencies;
/// `direct` edges are merged over them. Without a root, `direct` edges are
/// the top of the closure. First-level nodes listed in `intransitive` are
/// resolved without their own dependencies.
#[derive(Debug, Default)]
pub struct ResolutionRequest<'a> {
    pub root: Option<Dependency>,
    pub direct: Vec<Dependency>,
    pub managed: Vec<Dependency>,
    pub intransitive: Vec<Coordinate>,
    pub filter: Option<&'a dyn DependencyFilter>,
}

impl<'a> ResolutionRequest<'a> {
    pub fn rooted(root: Dependency) -> Self {
        Self {
            root: Some(root),
            ..Self::default()
        }
    }

    pub fn unrooted(direct: Vec<Dependency>) -> Self {
        Self {
            direct,
            ..Self::default()
        }
    }

    pub fn with_direct(mut self, direct: Vec<Dependency>) -> Self {
        self.direct = direct;
        self
    }

    pub fn with_managed(mut self, managed: Vec<Dependency>) -> Self {
        self.managed = managed;
        self
    }

    pub fn with_intransitive(mut self, intransitive: Vec<Coordinate>) -> Self {
        self.intransitive = intransitive;
        self
    }

    pub fn with_filter(mut self, filter: &'a dyn DependencyFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Whether `coordinate`'s own dependencies are cut from the closure
    pub fn is_intransitive(&self, coordinate: &Coordinate) -> bool {
        let key = coordinate.conflict_key();
        self.intransitive
            .iter()
            .any(|cut| cut.conflict_key() == key)
    }

    /// Coordinate naming this request in error messages
    pub fn describe(&self) -> String {
        match &self.root {
            Some(root) => root.coordinate.id(),
            None => self
                .direct
                .iter()
                .map(|dependency| dependency.coordinate.id())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Reads package metadata and resolves closures to resource locations
pub trait DependencyResolver {
    /// Dependencies declared by `coordinate`'s own descriptor
    ///
    /// # Errors
    ///
    /// Returns `ResolutionFailed` when the descriptor cannot be read.
    fn direct_dependencies(&self, coordinate: &Coordinate) -> Result<Vec<Dependency>>;

    /// Managed-version table declared by `coordinate`'s own descriptor
    ///
    /// # Errors
    ///
    /// Returns `ResolutionFailed` when the descriptor cannot be read.
    fn managed_dependencies(&self, coordinate: &Coordinate) -> Result<Vec<Dependency>>;

    /// Resolve a closure to its resource locations, in resolution order
    ///
    /// # Errors
    ///
    /// Returns `ResolutionFailed` naming the node that could not be resolved.
    fn resolve(&self, request: &ResolutionRequest<'_>) -> Result<Vec<PathBuf>>;

    /// Resolve one artifact to its resource location
    ///
    /// # Errors
    ///
    /// Returns `ResolutionFailed` when the artifact has no location.
    fn resolve_artifact(&self, coordinate: &Coordinate) -> Result<PathBuf>;

    /// Snapshot `root`'s graph: its direct edges plus the declared edges of
    /// every component reachable from them
    ///
    /// Components without a readable descriptor are recorded as leaves.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionFailed` when the root descriptor cannot be read.
    fn dependency_graph(&self, root: &Coordinate) -> Result<DependencyGraph> {
        let direct = self.direct_dependencies(root)?;
        let mut pending: Vec<Dependency> = direct.iter().rev().cloned().collect();
        let mut graph = DependencyGraph::new(root.clone(), direct);
        let mut visited: HashSet<Coordinate> = HashSet::new();

        while let Some(dependency) = pending.pop() {
            let coordinate = dependency.coordinate;
            if coordinate.matches_identity(root) || !visited.insert(coordinate.clone()) {
                continue;
            }
            match self.direct_dependencies(&coordinate) {
                Ok(children) => {
                    pending.extend(children.iter().rev().cloned());
                    graph = graph.with_transitive(coordinate, children)?;
                }
                Err(err) => {
                    debug!(coordinate = %coordinate, error = %err, "Recording component as leaf");
                }
            }
        }

        Ok(graph)
    }
}

/// Decides whether a coordinate denotes a plugin
pub trait PluginRole: fmt::Debug + Send + Sync {
    fn is_plugin(&self, coordinate: &Coordinate) -> bool;
}

/// Plugin role declared through archive type or classifier
#[derive(Debug, Clone)]
pub struct DeclaredPluginRole {
    archive_types: Vec<String>,
    classifiers: Vec<String>,
}

impl DeclaredPluginRole {
    pub fn new(archive_types: Vec<String>, classifiers: Vec<String>) -> Self {
        Self {
            archive_types,
            classifiers,
        }
    }
}

impl Default for DeclaredPluginRole {
    fn default() -> Self {
        Self::new(
            PLUGIN_ARCHIVE_TYPES.iter().map(ToString::to_string).collect(),
            vec![PLUGIN_CLASSIFIER.to_string()],
        )
    }
}

impl PluginRole for DeclaredPluginRole {
    fn is_plugin(&self, coordinate: &Coordinate) -> bool {
        self.archive_types.contains(&coordinate.archive_type)
            || coordinate
                .classifier
                .as_ref()
                .is_some_and(|classifier| self.classifiers.contains(classifier))
    }
}

/// Finds extension-capable types in a plugin and writes their metadata
pub trait ExtensionDiscovery: fmt::Debug {
    /// Extension-capable types declared by `plugin` under one of `namespaces`
    ///
    /// # Errors
    ///
    /// Returns an error when the plugin's resources cannot be scanned.
    fn discover(
        &self,
        plugin: &Coordinate,
        resources: &[PathBuf],
        namespaces: &[String],
    ) -> Result<Vec<String>>;

    /// Write metadata for `extension_type` and return the folder holding it
    ///
    /// # Errors
    ///
    /// Returns an error when the metadata cannot be written.
    fn generate_metadata(&self, plugin: &Coordinate, extension_type: &str) -> Result<PathBuf>;
}

/// Supplies the symbols a plugin declares as exported
pub trait ModuleDescriptorReader: fmt::Debug {
    /// # Errors
    ///
    /// Returns an error when the plugin's descriptor cannot be read.
    fn exported_symbols(&self, plugin: &Coordinate, resources: &[PathBuf]) -> Result<Vec<String>>;
}

/// Reader for plugins that carry no module descriptor
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDescriptors;

impl ModuleDescriptorReader for NoDescriptors {
    fn exported_symbols(&self, _plugin: &Coordinate, _resources: &[PathBuf]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn coordinate(spec: &str) -> Coordinate {
        Coordinate::parse(spec).expect("valid coordinate")
    }

    #[test]
    fn test_declared_plugin_role() {
        let role = DeclaredPluginRole::default();

        assert!(role.is_plugin(&coordinate("org.x:a:plugin:1.0")));
        assert!(role.is_plugin(&coordinate("org.x:a:extension:1.0")));
        assert!(role.is_plugin(&coordinate("org.x:a:jar:plugin:1.0")));
        assert!(!role.is_plugin(&coordinate("org.x:a:jar:1.0")));
        assert!(!role.is_plugin(&coordinate("org.x:a:jar:tests:1.0")));
    }

    #[test]
    fn test_request_describe() {
        let rooted = ResolutionRequest::rooted(Dependency::compile(coordinate("org.x:a:1.0")));
        assert_eq!(rooted.describe(), "org.x:a:jar:1.0");

        let unrooted = ResolutionRequest::unrooted(vec![
            Dependency::compile(coordinate("org.x:a:1.0")),
            Dependency::compile(coordinate("org.x:b:1.0")),
        ]);
        assert_eq!(unrooted.describe(), "org.x:a:jar:1.0, org.x:b:jar:1.0");
    }

    #[test]
    fn test_no_descriptors_exports_nothing() {
        let exports = NoDescriptors
            .exported_symbols(&coordinate("org.x:a:1.0"), &[])
            .expect("reader never fails");
        assert!(exports.is_empty());
    }
}
