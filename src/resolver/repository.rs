//! In-memory repository of declared artifacts
//!
//! Each artifact contributes a resource location and, shared by every
//! classifier of the same `namespace:name:version`, a descriptor holding its
//! declared dependencies, its managed-version table and its exported
//! symbols.
//!
//! ## Closure resolution
//!
//! - The request root is visited first. Its children are its declared
//!   dependencies with the request's direct edges merged over them.
//! - Only compile edges are followed below a visited node.
//! - Managed versions override declared versions from the second level down
//!   and fill in missing versions anywhere.
//! - Traversal is pre-order and the first node per
//!   `namespace:name:type:classifier` wins.
//! - A node rejected by the request filter is left out of the output, but
//!   its children are still visited.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, Dependency, Scope};
use crate::error::{Result, resolution_failed};

use super::{DependencyResolver, ModuleDescriptorReader, ResolutionRequest};

type DescriptorKey = (String, String, Option<String>);
type ConflictKey = (String, String, String, Option<String>);

fn descriptor_key(coordinate: &Coordinate) -> DescriptorKey {
    (
        coordinate.namespace.clone(),
        coordinate.name.clone(),
        coordinate.version.clone(),
    )
}

/// One declared artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryArtifact {
    #[serde(flatten)]
    pub coordinate: Coordinate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
}

impl RepositoryArtifact {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            location: None,
            dependencies: Vec::new(),
            managed: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn located_at(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn depends_on(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn manages(mut self, dependency: Dependency) -> Self {
        self.managed.push(dependency);
        self
    }

    pub fn exports<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.exports.extend(symbols.into_iter().map(Into::into));
        self
    }
}

/// Serialized form of a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    #[serde(default)]
    pub artifacts: Vec<RepositoryArtifact>,
}

#[derive(Debug, Clone, Default)]
struct Descriptor {
    dependencies: Vec<Dependency>,
    managed: Vec<Dependency>,
    exports: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    descriptors: HashMap<DescriptorKey, Descriptor>,
    locations: HashMap<Coordinate, PathBuf>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(mut self, artifact: RepositoryArtifact) -> Self {
        self.insert(artifact);
        self
    }

    pub fn insert(&mut self, artifact: RepositoryArtifact) {
        let descriptor = self
            .descriptors
            .entry(descriptor_key(&artifact.coordinate))
            .or_default();
        descriptor.dependencies.extend(artifact.dependencies);
        descriptor.managed.extend(artifact.managed);
        descriptor.exports.extend(artifact.exports);

        if let Some(location) = artifact.location {
            self.locations.insert(artifact.coordinate, location);
        }
    }

    fn descriptor(&self, coordinate: &Coordinate) -> Result<&Descriptor> {
        self.descriptors
            .get(&descriptor_key(coordinate))
            .ok_or_else(|| resolution_failed(coordinate.id(), "no descriptor in repository"))
    }

    fn declared(&self, coordinate: &Coordinate) -> &[Dependency] {
        self.descriptors
            .get(&descriptor_key(coordinate))
            .map(|descriptor| descriptor.dependencies.as_slice())
            .unwrap_or_default()
    }

    fn location(&self, coordinate: &Coordinate) -> Result<&PathBuf> {
        self.locations
            .get(coordinate)
            .ok_or_else(|| resolution_failed(coordinate.id(), "artifact not found in repository"))
    }
}

impl From<RepositoryDescriptor> for InMemoryRepository {
    fn from(descriptor: RepositoryDescriptor) -> Self {
        let mut repository = Self::new();
        for artifact in descriptor.artifacts {
            repository.insert(artifact);
        }
        repository
    }
}

impl DependencyResolver for InMemoryRepository {
    fn direct_dependencies(&self, coordinate: &Coordinate) -> Result<Vec<Dependency>> {
        Ok(self.descriptor(coordinate)?.dependencies.clone())
    }

    fn managed_dependencies(&self, coordinate: &Coordinate) -> Result<Vec<Dependency>> {
        Ok(self.descriptor(coordinate)?.managed.clone())
    }

    fn resolve(&self, request: &ResolutionRequest<'_>) -> Result<Vec<PathBuf>> {
        let mut walk = Walk {
            repository: self,
            request,
            managed: managed_versions(&request.managed),
            seen: HashSet::new(),
            resolved: Vec::new(),
        };

        match &request.root {
            Some(root) => walk.visit(root, 0)?,
            None => {
                for dependency in request.direct.iter().filter(|d| d.scope == Scope::Compile) {
                    walk.visit(dependency, 1)?;
                }
            }
        }

        Ok(walk.resolved)
    }

    fn resolve_artifact(&self, coordinate: &Coordinate) -> Result<PathBuf> {
        self.location(coordinate).cloned()
    }
}

impl ModuleDescriptorReader for InMemoryRepository {
    fn exported_symbols(&self, plugin: &Coordinate, _resources: &[PathBuf]) -> Result<Vec<String>> {
        Ok(self
            .descriptors
            .get(&descriptor_key(plugin))
            .map(|descriptor| descriptor.exports.clone())
            .unwrap_or_default())
    }
}

fn managed_versions(managed: &[Dependency]) -> HashMap<ConflictKey, String> {
    let mut versions = HashMap::new();
    for dependency in managed {
        if let Some(version) = &dependency.coordinate.version {
            versions
                .entry(dependency.coordinate.conflict_key())
                .or_insert_with(|| version.clone());
        }
    }
    versions
}

struct Walk<'r, 'q> {
    repository: &'r InMemoryRepository,
    request: &'q ResolutionRequest<'q>,
    managed: HashMap<ConflictKey, String>,
    seen: HashSet<ConflictKey>,
    resolved: Vec<PathBuf>,
}

impl Walk<'_, '_> {
    fn visit(&mut self, dependency: &Dependency, depth: usize) -> Result<()> {
        let coordinate = self.managed_coordinate(&dependency.coordinate, depth);
        if !self.seen.insert(coordinate.conflict_key()) {
            return Ok(());
        }

        let node = Dependency::new(coordinate, dependency.scope);
        let location = self.repository.location(&node.coordinate)?;
        if self
            .request
            .filter
            .is_none_or(|filter| filter.accept(&node))
        {
            self.resolved.push(location.clone());
        }
        if depth == 1 && self.request.is_intransitive(&node.coordinate) {
            return Ok(());
        }

        let children = if depth == 0 {
            merge_direct(self.repository.declared(&node.coordinate), &self.request.direct)
        } else {
            self.repository.declared(&node.coordinate).to_vec()
        };

        for child in children.iter().filter(|child| child.scope == Scope::Compile) {
            self.visit(child, depth + 1)?;
        }
        Ok(())
    }

    fn managed_coordinate(&self, coordinate: &Coordinate, depth: usize) -> Coordinate {
        match self.managed.get(&coordinate.conflict_key()) {
            Some(version) if depth >= 2 || coordinate.version.is_none() => {
                coordinate.clone().with_version(version.clone())
            }
            _ => coordinate.clone(),
        }
    }
}

fn merge_direct(declared: &[Dependency], direct: &[Dependency]) -> Vec<Dependency> {
    let mut merged = declared.to_vec();
    for dependency in direct {
        let key = dependency.coordinate.conflict_key();
        match merged
            .iter_mut()
            .find(|existing| existing.coordinate.conflict_key() == key)
        {
            Some(existing) => *existing = dependency.clone(),
            None => merged.push(dependency.clone()),
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::IsoclassError;
    use crate::filter::{DependencyFilter, PatternExclusionFilter};

    fn coordinate(spec: &str) -> Coordinate {
        Coordinate::parse(spec).expect("valid coordinate")
    }

    fn artifact(spec: &str) -> RepositoryArtifact {
        let coordinate = coordinate(spec);
        let location = format!("/repo/{}-{}.jar", coordinate.name, coordinate.version.clone().unwrap_or_default());
        RepositoryArtifact::new(coordinate).located_at(location)
    }

    fn repository() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_artifact(
                artifact("org.x:a:1.0")
                    .depends_on(Dependency::compile(coordinate("org.x:b:1.0")))
                    .depends_on(Dependency::provided(coordinate("org.x:p:1.0")))
                    .depends_on(Dependency::compile(coordinate("org.x:c:1.0")))
                    .manages(Dependency::compile(coordinate("org.x:d:2.0"))),
            )
            .with_artifact(artifact("org.x:b:1.0").depends_on(Dependency::compile(coordinate("org.x:d:1.0"))))
            .with_artifact(artifact("org.x:c:1.0").depends_on(Dependency::compile(coordinate("org.x:b:1.0"))))
            .with_artifact(artifact("org.x:d:1.0"))
            .with_artifact(artifact("org.x:d:2.0"))
            .with_artifact(artifact("org.x:p:1.0"))
    }

    fn names(resolved: &[PathBuf]) -> Vec<String> {
        resolved
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_rooted_resolution_is_preorder_and_skips_provided() {
        let repository = repository();
        let request = ResolutionRequest::rooted(Dependency::compile(coordinate("org.x:a:1.0")));
        let resolved = repository.resolve(&request).expect("resolution should succeed");

        assert_eq!(names(&resolved), vec!["a-1.0.jar", "b-1.0.jar", "d-1.0.jar", "c-1.0.jar"]);
    }

    #[test]
    fn test_managed_versions_override_below_first_level() {
        let repository = repository();
        let request = ResolutionRequest::rooted(Dependency::compile(coordinate("org.x:a:1.0")))
            .with_managed(vec![Dependency::compile(coordinate("org.x:d:2.0"))]);
        let resolved = repository.resolve(&request).expect("resolution should succeed");

        assert!(names(&resolved).contains(&"d-2.0.jar".to_string()));
        assert!(!names(&resolved).contains(&"d-1.0.jar".to_string()));
    }

    #[test]
    fn test_request_direct_edges_win_over_declared() {
        let repository = repository();
        let request = ResolutionRequest::rooted(Dependency::compile(coordinate("org.x:a:1.0")))
            .with_direct(vec![Dependency::compile(coordinate("org.x:p:1.0"))]);
        let resolved = repository.resolve(&request).expect("resolution should succeed");

        assert_eq!(
            names(&resolved),
            vec!["a-1.0.jar", "b-1.0.jar", "d-1.0.jar", "p-1.0.jar", "c-1.0.jar"]
        );
    }

    #[test]
    fn test_intransitive_direct_edge_drops_its_dependencies() {
        let repository = repository();
        let request = ResolutionRequest::rooted(Dependency::compile(coordinate("org.x:a:1.0")))
            .with_intransitive(vec![coordinate("org.x:b:1.0")]);
        let resolved = repository.resolve(&request).expect("resolution should succeed");

        assert_eq!(names(&resolved), vec!["a-1.0.jar", "b-1.0.jar", "c-1.0.jar"]);
    }

    #[test]
    fn test_filtered_node_children_still_visited() {
        let repository = repository();
        let filter = PatternExclusionFilter::new(&["org.x:b"]).expect("valid pattern");
        let request = ResolutionRequest::rooted(Dependency::compile(coordinate("org.x:a:1.0")))
            .with_filter(&filter);
        let resolved = repository.resolve(&request).expect("resolution should succeed");

        assert_eq!(names(&resolved), vec!["a-1.0.jar", "d-1.0.jar", "c-1.0.jar"]);
        assert!(!filter.accept(&Dependency::compile(coordinate("org.x:b:1.0"))));
    }

    #[test]
    fn test_unrooted_resolution() {
        let repository = repository();
        let request = ResolutionRequest::unrooted(vec![
            Dependency::compile(coordinate("org.x:c:1.0")),
            Dependency::test(coordinate("org.x:p:1.0")),
        ]);
        let resolved = repository.resolve(&request).expect("resolution should succeed");

        assert_eq!(names(&resolved), vec!["c-1.0.jar", "b-1.0.jar", "d-1.0.jar"]);
    }

    #[test]
    fn test_missing_location_names_coordinate() {
        let repository = InMemoryRepository::new().with_artifact(
            artifact("org.x:a:1.0").depends_on(Dependency::compile(coordinate("org.x:ghost:1.0"))),
        );
        let request = ResolutionRequest::rooted(Dependency::compile(coordinate("org.x:a:1.0")));
        let err = repository.resolve(&request).expect_err("ghost has no location");

        assert!(matches!(err, IsoclassError::ResolutionFailed { .. }));
        assert!(err.to_string().contains("org.x:ghost:jar:1.0"));
    }

    #[test]
    fn test_classifier_artifacts_share_descriptor() {
        let repository = InMemoryRepository::new()
            .with_artifact(artifact("org.x:a:1.0").depends_on(Dependency::compile(coordinate("org.x:b:1.0"))))
            .with_artifact(
                RepositoryArtifact::new(coordinate("org.x:a:jar:tests:1.0"))
                    .located_at("/repo/a-1.0-tests.jar"),
            )
            .with_artifact(artifact("org.x:b:1.0"));

        let request = ResolutionRequest::rooted(Dependency::test(coordinate("org.x:a:jar:tests:1.0")));
        let resolved = repository.resolve(&request).expect("resolution should succeed");
        assert_eq!(names(&resolved), vec!["a-1.0-tests.jar", "b-1.0.jar"]);
    }

    #[test]
    fn test_dependency_graph_snapshot() {
        let repository = repository();
        let graph = repository
            .dependency_graph(&coordinate("org.x:a:1.0"))
            .expect("graph should build");

        assert_eq!(graph.direct_dependencies().len(), 3);
        let below_c = graph
            .transitive_dependencies_of(&coordinate("org.x:c:1.0"))
            .expect("lookup should succeed");
        assert_eq!(below_c.len(), 1);
        assert!(graph.transitive_dependencies_of(&coordinate("org.x:a:1.0")).is_err());
    }

    #[test]
    fn test_descriptor_round_trips_through_yaml() {
        let descriptor: RepositoryDescriptor = serde_yaml::from_str(
            r"
artifacts:
  - namespace: org.x
    name: a
    version: '1.0'
    location: /repo/a-1.0.jar
    exports: [org.x.a]
    dependencies:
      - { namespace: org.x, name: b, version: '1.0', scope: provided }
",
        )
        .expect("descriptor should parse");
        let repository = InMemoryRepository::from(descriptor);

        let a = coordinate("org.x:a:1.0");
        assert_eq!(repository.direct_dependencies(&a).expect("declared").len(), 1);
        assert_eq!(
            repository.exported_symbols(&a, &[]).expect("declared"),
            vec!["org.x.a".to_string()]
        );
        assert_eq!(
            repository.resolve_artifact(&a).expect("located"),
            PathBuf::from("/repo/a-1.0.jar")
        );
    }
}
