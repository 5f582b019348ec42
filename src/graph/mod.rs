//! Dependency graph snapshot of a root component
//!
//! The graph holds the root's direct dependency edges plus, per dependency,
//! the set of edges observed below it.
//!
//! ## Identity
//!
//! Transitive lookups match by namespace and name, comparing versions only
//! when both sides carry one. Scope never takes part: a provided edge near
//! the root and a compile edge deeper down are the same logical dependency.
//!
//! ```text
//! root ──provided──> org.x:plugin-a:1.0
//!                      └──compile──> org.x:util:2.0
//!
//! transitive_dependencies_of(org.x:plugin-a)     -> [org.x:util:2.0]
//! transitive_dependencies_of(org.x:plugin-a:1.0) -> [org.x:util:2.0]
//! transitive_dependencies_of(root)               -> InvalidArgument
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, Dependency};
use crate::error::{Result, invalid_argument};

/// Edges recorded below one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitiveEntry {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// Immutable snapshot of a root component's dependency closure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    root: Coordinate,
    #[serde(default)]
    direct: Vec<Dependency>,
    #[serde(default)]
    transitive: Vec<TransitiveEntry>,
}

impl DependencyGraph {
    /// Create a graph for `root` with its direct edges
    pub fn new(root: Coordinate, direct: Vec<Dependency>) -> Self {
        Self {
            root,
            direct,
            transitive: Vec::new(),
        }
    }

    /// Record the edges observed below `coordinate`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `coordinate` is the root.
    pub fn with_transitive(
        mut self,
        coordinate: Coordinate,
        dependencies: Vec<Dependency>,
    ) -> Result<Self> {
        self.check_not_root(&coordinate)?;
        match self
            .transitive
            .iter_mut()
            .find(|entry| entry.coordinate == coordinate)
        {
            Some(entry) => entry.dependencies.extend(dependencies),
            None => self.transitive.push(TransitiveEntry {
                coordinate,
                dependencies,
            }),
        }
        Ok(self)
    }

    /// Parse a graph from YAML, rejecting a root recorded as transitive key
    ///
    /// # Errors
    ///
    /// Returns a parse error or `InvalidArgument`.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let graph: Self = serde_yaml::from_str(yaml)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Check the root never appears as a transitive key
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on violation.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.transitive {
            self.check_not_root(&entry.coordinate)?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Coordinate {
        &self.root
    }

    /// Direct dependency edges of the root, in declaration order
    pub fn direct_dependencies(&self) -> &[Dependency] {
        &self.direct
    }

    /// Edges recorded below `coordinate`, empty when none were recorded
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `coordinate` is the root.
    pub fn transitive_dependencies_of(&self, coordinate: &Coordinate) -> Result<&[Dependency]> {
        self.check_not_root(coordinate)?;
        Ok(self
            .transitive
            .iter()
            .find(|entry| entry.coordinate.matches_identity(coordinate))
            .map(|entry| entry.dependencies.as_slice())
            .unwrap_or_default())
    }

    /// Direct edge of the root matching `coordinate` by identity, any scope
    pub fn find_direct(&self, coordinate: &Coordinate) -> Option<&Dependency> {
        self.direct
            .iter()
            .find(|dependency| dependency.coordinate.matches_identity(coordinate))
    }

    fn check_not_root(&self, coordinate: &Coordinate) -> Result<()> {
        if coordinate.matches_identity(&self.root) {
            return Err(invalid_argument(format!(
                "'{coordinate}' is the graph root and has no transitive dependency set"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::Scope;
    use crate::error::IsoclassError;

    fn coordinate(spec: &str) -> Coordinate {
        Coordinate::parse(spec).expect("valid coordinate")
    }

    fn sample_graph() -> DependencyGraph {
        DependencyGraph::new(
            coordinate("org.x:root:1.0"),
            vec![
                Dependency::provided(coordinate("org.x:plugin-a:1.0")),
                Dependency::compile(coordinate("org.x:lib:2.0")),
            ],
        )
        .with_transitive(
            coordinate("org.x:plugin-a:1.0"),
            vec![Dependency::compile(coordinate("org.x:util:3.0"))],
        )
        .expect("plugin-a is not root")
    }

    #[test]
    fn test_transitive_of_root_is_invalid_argument() {
        let graph = sample_graph();
        let result = graph.transitive_dependencies_of(&coordinate("org.x:root:1.0"));
        assert!(matches!(result, Err(IsoclassError::InvalidArgument { .. })));

        let unversioned_root = Coordinate::new("org.x", "root", "jar", None);
        assert!(graph.transitive_dependencies_of(&unversioned_root).is_err());
    }

    #[test]
    fn test_transitive_lookup_ignores_scope_and_missing_version() {
        let graph = sample_graph();
        let provided_edge = &graph.direct_dependencies()[0];
        assert_eq!(provided_edge.scope, Scope::Provided);

        let found = graph
            .transitive_dependencies_of(&provided_edge.coordinate)
            .expect("lookup should succeed");
        assert_eq!(found.len(), 1);

        let unversioned = Coordinate::new("org.x", "plugin-a", "jar", None);
        let found_unversioned = graph
            .transitive_dependencies_of(&unversioned)
            .expect("lookup should succeed");
        assert_eq!(found, found_unversioned);
    }

    #[test]
    fn test_transitive_lookup_empty_when_unrecorded() {
        let graph = sample_graph();
        let found = graph
            .transitive_dependencies_of(&coordinate("org.x:lib:2.0"))
            .expect("lookup should succeed");
        assert!(found.is_empty());
    }

    #[test]
    fn test_with_transitive_rejects_root() {
        let result = DependencyGraph::new(coordinate("org.x:root:1.0"), vec![])
            .with_transitive(coordinate("org.x:root:1.0"), vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_yaml() {
        let graph = DependencyGraph::from_yaml(
            r"
root: { namespace: org.x, name: root, version: '1.0' }
direct:
  - { namespace: org.x, name: plugin-a, version: '1.0', scope: provided }
transitive:
  - namespace: org.x
    name: plugin-a
    version: '1.0'
    dependencies:
      - { namespace: org.x, name: util, version: '3.0' }
",
        )
        .expect("graph should parse");

        assert_eq!(graph.direct_dependencies().len(), 1);
        let found = graph
            .transitive_dependencies_of(&coordinate("org.x:plugin-a:1.0"))
            .expect("lookup should succeed");
        assert_eq!(found[0].scope, Scope::Compile);
    }

    #[test]
    fn test_from_yaml_rejects_root_as_transitive_key() {
        let result = DependencyGraph::from_yaml(
            r"
root: { namespace: org.x, name: root, version: '1.0' }
transitive:
  - { namespace: org.x, name: root, dependencies: [] }
",
        );
        assert!(result.is_err());
    }
}
