//! Plugin boundary classification
//!
//! Every requested plugin becomes one [`ModuleClassification`]. Plugins a
//! plugin declares as its own dependencies are classified recursively and
//! linked as module dependencies. Classifications are memoized by module
//! name, and a module currently being classified is linked without being
//! revisited, so dependency cycles terminate. Modules are recorded after
//! their dependencies.
//!
//! A plugin's own boundary never carries the binary of another plugin; those
//! are reached through module dependencies instead.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use tracing::debug;

use crate::domain::{Coordinate, DEFAULT_ARCHIVE_TYPE, Dependency, ModuleClassification, Scope};
use crate::error::{
    Result, ambiguous_extension, invalid_coordinates, plugin_not_provided, resolution_failed,
};
use crate::filter::{AndFilter, DependencyFilter, PatternExclusionFilter, ScopeFilter};
use crate::graph::DependencyGraph;
use crate::resolver::{
    DependencyResolver, ExtensionDiscovery, ModuleDescriptorReader, PluginRole, ResolutionRequest,
};
use crate::snapshot::SnapshotReconciler;

use super::context::{ClassificationContext, PluginRequest};

pub(super) struct PluginClassifier<'a> {
    pub resolver: &'a dyn DependencyResolver,
    pub role: &'a dyn PluginRole,
    pub discovery: Option<&'a dyn ExtensionDiscovery>,
    pub descriptors: &'a dyn ModuleDescriptorReader,
    pub context: &'a ClassificationContext,
    pub graph: &'a DependencyGraph,
}

struct Classification<'a> {
    collaborators: &'a PluginClassifier<'a>,
    filter: AndFilter,
    reconciler: SnapshotReconciler<'a>,
    modules: Vec<ModuleClassification>,
    index: HashMap<String, usize>,
    in_progress: HashSet<String>,
}

impl PluginClassifier<'_> {
    /// Classify the root (when it is a plugin) and every requested plugin
    pub fn classify(&self) -> Result<Vec<ModuleClassification>> {
        let exclusions: Vec<&String> = self
            .context
            .excluded
            .iter()
            .chain(&self.context.plugin_exclusions)
            .collect();
        let mut run = Classification {
            collaborators: self,
            filter: ScopeFilter::compile().and(PatternExclusionFilter::new(&exclusions)?),
            reconciler: SnapshotReconciler::new(&self.context.materialized_resources),
            modules: Vec::new(),
            index: HashMap::new(),
            in_progress: HashSet::new(),
        };

        let root = &self.context.root;
        let mut requests = self
            .context
            .plugins
            .iter()
            .map(|plugin| PluginRequest::parse(plugin))
            .collect::<Result<Vec<_>>>()?;

        if self.role.is_plugin(root) {
            debug!(root = %root, "Root component is a plugin, classifying it first");
            run.classify(root)?;
            requests.retain(|request| !request.same_artifact(root));
        }

        for request in &requests {
            let coordinate = self.plugin_coordinate(request)?;
            run.classify(&coordinate)?;
        }

        debug!(
            modules = ?run.modules.iter().map(|module| module.name.as_str()).collect::<Vec<_>>(),
            "Classified plugin modules"
        );
        Ok(run.modules)
    }

    /// Coordinate of a requested plugin, versioned from the root when needed
    fn plugin_coordinate(&self, request: &PluginRequest) -> Result<Coordinate> {
        if let Some(version) = &request.version {
            return Ok(Coordinate::new(
                request.namespace.clone(),
                request.name.clone(),
                DEFAULT_ARCHIVE_TYPE,
                Some(version.clone()),
            ));
        }

        let root = &self.context.root;
        let plugin = format!("{}:{}", request.namespace, request.name);
        if request.same_artifact(root) {
            return match &root.version {
                Some(version) => Ok(Coordinate::new(
                    request.namespace.clone(),
                    request.name.clone(),
                    DEFAULT_ARCHIVE_TYPE,
                    Some(version.clone()),
                )),
                None => Err(invalid_coordinates(root.id(), "root has no version")),
            };
        }

        self.graph
            .direct_dependencies()
            .iter()
            .find(|dependency| {
                dependency.scope == Scope::Provided && request.same_artifact(&dependency.coordinate)
            })
            .map(|dependency| dependency.coordinate.clone())
            .ok_or_else(|| plugin_not_provided(plugin, root.id()))
    }

    fn own_dependencies(&self, coordinate: &Coordinate) -> Result<Vec<Dependency>> {
        if coordinate.matches_identity(self.graph.root()) {
            return Ok(self.graph.direct_dependencies().to_vec());
        }
        let recorded = self.graph.transitive_dependencies_of(coordinate)?;
        if recorded.is_empty() {
            return self.resolver.direct_dependencies(coordinate);
        }
        Ok(recorded.to_vec())
    }
}

impl Classification<'_> {
    /// Classify one plugin and return its module name
    fn classify(&mut self, coordinate: &Coordinate) -> Result<String> {
        let name = coordinate.classifier_less_id();
        if self.index.contains_key(&name) || !self.in_progress.insert(name.clone()) {
            return Ok(name);
        }

        let collaborators = self.collaborators;
        debug!(plugin = %coordinate, "Classifying plugin");

        let mut dependencies: Vec<String> = Vec::new();
        for dependency in collaborators.own_dependencies(coordinate)? {
            if dependency.scope != Scope::Compile
                || !collaborators.role.is_plugin(&dependency.coordinate)
            {
                continue;
            }
            debug!(plugin = %coordinate, dependency = %dependency.coordinate, "Found plugin dependency");
            let dependency_name = self.classify(&dependency.coordinate)?;
            if !dependencies.contains(&dependency_name) {
                dependencies.push(dependency_name);
            }
        }

        let resources = self.resolve_resources(coordinate)?;

        let mut exported_symbols = collaborators
            .descriptors
            .exported_symbols(coordinate, &resources)?;
        exported_symbols.extend(
            collaborators
                .context
                .exports_for_testing(coordinate)
                .iter()
                .cloned(),
        );

        self.in_progress.remove(&name);
        self.index.insert(name.clone(), self.modules.len());
        self.modules.push(ModuleClassification {
            name: name.clone(),
            resources,
            exported_symbols,
            dependencies,
        });
        Ok(name)
    }

    fn resolve_resources(&self, coordinate: &Coordinate) -> Result<Vec<PathBuf>> {
        let collaborators = self.collaborators;
        let wrap = |err| {
            resolution_failed(
                coordinate.id(),
                format!("Couldn't resolve dependencies for plugin classification: {err}"),
            )
        };

        let managed = collaborators
            .resolver
            .managed_dependencies(coordinate)
            .map_err(wrap)?;
        let filter = PluginClosureFilter {
            closure: &self.filter,
            role: collaborators.role,
            plugin: coordinate,
        };
        let request = ResolutionRequest::rooted(Dependency::compile(coordinate.clone()))
            .with_managed(managed)
            .with_filter(&filter as &dyn DependencyFilter);
        let resolved = collaborators.resolver.resolve(&request).map_err(wrap)?;
        let mut resources = self.reconciler.reconcile(resolved)?;

        let context = collaborators.context;
        let Some(discovery) = collaborators.discovery else {
            return Ok(resources);
        };
        if context.extension_namespaces.is_empty() {
            return Ok(resources);
        }

        let found = discovery.discover(coordinate, &resources, &context.extension_namespaces)?;
        match found.as_slice() {
            [] => {}
            [extension_type] => {
                debug!(plugin = %coordinate, extension = %extension_type, "Plugin discovered as extension");
                if context.extension_metadata_enabled {
                    let metadata = discovery.generate_metadata(coordinate, extension_type)?;
                    resources.insert(0, metadata);
                }
            }
            _ => return Err(ambiguous_extension(coordinate.id(), &found)),
        }
        Ok(resources)
    }
}

/// Closure filter of one plugin, rejecting every other plugin
#[derive(Debug)]
struct PluginClosureFilter<'a> {
    closure: &'a AndFilter,
    role: &'a dyn PluginRole,
    plugin: &'a Coordinate,
}

impl DependencyFilter for PluginClosureFilter<'_> {
    fn accept(&self, dependency: &Dependency) -> bool {
        let other_plugin = self.role.is_plugin(&dependency.coordinate)
            && !dependency.coordinate.matches_identity(self.plugin);
        self.closure.accept(dependency) && !other_plugin
    }
}
