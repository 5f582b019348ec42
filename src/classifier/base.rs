//! Base boundary classification
//!
//! The base boundary holds the closure of the root's provided dependencies,
//! minus excluded components and every component already classified as a
//! plugin. Descriptor-only and bundle resources are dropped and snapshot
//! resources are swapped for their materialized form.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{Dependency, ModuleClassification, Scope};
use crate::error::{Result, resolution_failed};
use crate::filter::boundary_filter;
use crate::graph::DependencyGraph;
use crate::resolver::{DependencyResolver, ResolutionRequest};
use crate::snapshot::SnapshotReconciler;

use super::context::ClassificationContext;

/// Resource suffixes that never hold loadable code
const NON_LOADABLE_SUFFIXES: &[&str] = &[".pom.xml", ".pom", ".zip"];

/// Whether `path` is a metadata or bundle container rather than a binary
pub fn is_non_loadable(path: &Path) -> bool {
    let lowercase = path.to_string_lossy().to_lowercase();
    NON_LOADABLE_SUFFIXES
        .iter()
        .any(|suffix| lowercase.ends_with(suffix))
}

pub(super) fn classify(
    resolver: &dyn DependencyResolver,
    context: &ClassificationContext,
    graph: &DependencyGraph,
    modules: &[ModuleClassification],
) -> Result<Vec<PathBuf>> {
    let direct: Vec<Dependency> = graph
        .direct_dependencies()
        .iter()
        .filter(|dependency| dependency.scope == Scope::Provided)
        .map(|dependency| dependency.with_scope(Scope::Compile))
        .collect();
    debug!(
        dependencies = ?direct.iter().map(|d| d.coordinate.id()).collect::<Vec<_>>(),
        "Selected provided dependencies for base boundary"
    );

    let mut managed: Vec<Dependency> = Vec::new();
    let mut seen: HashSet<Dependency> = HashSet::new();
    for dependency in &direct {
        for entry in resolver.managed_dependencies(&dependency.coordinate)? {
            if seen.insert(entry.clone()) {
                managed.push(entry);
            }
        }
    }

    let mut exclusions: Vec<String> = context.provided_exclusions.clone();
    exclusions.extend(context.excluded.iter().cloned());
    exclusions.extend(modules.iter().map(|module| module.name.clone()));
    debug!(
        exclusions = ?exclusions,
        "Resolving base boundary with exclusion patterns"
    );

    let filter = boundary_filter(&context.provided_inclusions, &exclusions)?;
    let request = ResolutionRequest::unrooted(direct)
        .with_managed(managed)
        .with_filter(&filter);
    let resolved = resolver.resolve(&request).map_err(|err| {
        resolution_failed(
            request.describe(),
            format!("Couldn't resolve dependencies for base boundary: {err}"),
        )
    })?;

    let loadable: Vec<PathBuf> = resolved
        .into_iter()
        .filter(|resource| !is_non_loadable(resource))
        .collect();

    SnapshotReconciler::new(&context.materialized_resources).reconcile(loadable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_loadable_suffixes() {
        assert!(is_non_loadable(Path::new("/m2/org/x/lib/1.0/lib-1.0.pom")));
        assert!(is_non_loadable(Path::new("/m2/org/x/lib/1.0/lib-1.0.POM.XML")));
        assert!(is_non_loadable(Path::new("/m2/org/x/dist/1.0/dist-1.0.Zip")));
        assert!(!is_non_loadable(Path::new("/m2/org/x/lib/1.0/lib-1.0.jar")));
    }
}
