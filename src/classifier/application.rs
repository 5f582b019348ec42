//! Application boundary classification
//!
//! The application boundary holds the root's own binary (unless the root is
//! a plugin) followed by the closure of the root's test artifact. Test edges
//! of the root are promoted to compile; when the root is a plugin its compile
//! edges are demoted to provided because they already live in the plugin's
//! boundary. A test-scoped `tests` artifact is taken without its own
//! dependencies.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::domain::{
    COORDINATES_SEPARATOR, Coordinate, DEFAULT_ARCHIVE_TYPE, Dependency, ModuleClassification,
    Scope, TESTS_CLASSIFIER,
};
use crate::error::{Result, resolution_failed};
use crate::filter::boundary_filter;
use crate::graph::DependencyGraph;
use crate::resolver::{DependencyResolver, ResolutionRequest};
use crate::snapshot::SnapshotReconciler;

use super::context::ClassificationContext;

pub(super) fn classify(
    resolver: &dyn DependencyResolver,
    context: &ClassificationContext,
    graph: &DependencyGraph,
    modules: &[ModuleClassification],
) -> Result<Vec<PathBuf>> {
    let root = &context.root;
    let root_is_plugin = modules.iter().any(|module| module.is_artifact(root));

    let mut resources: Vec<PathBuf> = Vec::new();
    let mut exclusions: Vec<String> = Vec::new();

    if root_is_plugin {
        debug!(root = %root, "Root is a plugin, excluding it from the application boundary");
        exclusions.push(
            [
                root.namespace.as_str(),
                root.name.as_str(),
                "*",
                root.version.as_deref().unwrap_or("*"),
            ]
            .join(COORDINATES_SEPARATOR),
        );
    } else {
        let root_binary = Coordinate::new(
            root.namespace.clone(),
            root.name.clone(),
            DEFAULT_ARCHIVE_TYPE,
            root.version.clone(),
        );
        match resolver.resolve_artifact(&root_binary) {
            Ok(location) => {
                debug!(root = %root, location = %location.display(), "Adding root binary to application boundary");
                resources.push(location);
            }
            Err(err) => {
                warn!(
                    root = %root,
                    error = %err,
                    "Root is not a plugin but its own binary couldn't be resolved, continuing without it"
                );
            }
        }
    }

    let intransitive: Vec<Coordinate> = graph
        .direct_dependencies()
        .iter()
        .filter(|dependency| {
            dependency.scope == Scope::Test
                && dependency.coordinate.classifier.as_deref() == Some(TESTS_CLASSIFIER)
        })
        .map(|dependency| dependency.coordinate.clone())
        .collect();

    let direct: Vec<Dependency> = graph
        .direct_dependencies()
        .iter()
        .map(|dependency| match dependency.scope {
            Scope::Test => dependency.with_scope(Scope::Compile),
            Scope::Compile if root_is_plugin => dependency.with_scope(Scope::Provided),
            _ => dependency.clone(),
        })
        .collect();

    exclusions.extend(context.excluded.iter().cloned());
    exclusions.extend(context.test_exclusions.iter().cloned());

    let wrap = |err| {
        resolution_failed(
            root.id(),
            format!("Couldn't resolve dependencies for application classification: {err}"),
        )
    };

    let mut managed = resolver.managed_dependencies(root).map_err(wrap)?;
    managed.extend(direct.iter().cloned());
    debug!(
        direct = ?direct.iter().map(ToString::to_string).collect::<Vec<_>>(),
        exclusions = ?exclusions,
        intransitive = ?intransitive.iter().map(Coordinate::id).collect::<Vec<_>>(),
        "Resolving application boundary"
    );

    let root_tests = Dependency::test(
        Coordinate::new(
            root.namespace.clone(),
            root.name.clone(),
            DEFAULT_ARCHIVE_TYPE,
            root.version.clone(),
        )
        .with_classifier(TESTS_CLASSIFIER),
    );
    let filter = boundary_filter(&context.test_inclusions, &exclusions)?;
    let request = ResolutionRequest::rooted(root_tests)
        .with_direct(direct)
        .with_managed(managed)
        .with_intransitive(intransitive)
        .with_filter(&filter);
    resources.extend(resolver.resolve(&request).map_err(wrap)?);

    SnapshotReconciler::new(&context.materialized_resources).reconcile(resources)
}
