//! Application shared libraries
//!
//! A shared library is loaded once and visible to the application and its
//! plugins. It has to be declared as a direct dependency of the root (or be
//! the root itself), and it is moved out of the application boundary.

use std::path::PathBuf;

use tracing::debug;

use crate::domain::{Coordinate, DEFAULT_ARCHIVE_TYPE};
use crate::error::{Result, library_not_declared, resolution_failed};
use crate::graph::DependencyGraph;
use crate::resolver::DependencyResolver;
use crate::snapshot::{SnapshotReconciler, is_snapshot};

use super::context::{ClassificationContext, SharedLibraryRequest};

pub(super) fn classify(
    resolver: &dyn DependencyResolver,
    context: &ClassificationContext,
    graph: &DependencyGraph,
    application: &mut Vec<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let root = &context.root;
    let reconciler = SnapshotReconciler::new(&context.materialized_resources);
    let mut shared = Vec::new();

    for library in &context.application_shared_libs {
        let request = SharedLibraryRequest::parse(library)?;
        let declared = graph
            .direct_dependencies()
            .iter()
            .map(|dependency| &dependency.coordinate)
            .chain(std::iter::once(root))
            .find(|coordinate| {
                coordinate.namespace == request.namespace && coordinate.name == request.name
            })
            .ok_or_else(|| library_not_declared(request.short_id(), root.id()))?;

        let mut coordinate = Coordinate::new(
            request.namespace.clone(),
            request.name.clone(),
            DEFAULT_ARCHIVE_TYPE,
            declared.version.clone(),
        );
        if let Some(classifier) = &request.classifier {
            coordinate = coordinate.with_classifier(classifier.clone());
        }

        let resolved = resolver.resolve_artifact(&coordinate).map_err(|err| {
            resolution_failed(
                coordinate.id(),
                format!("Couldn't resolve application shared library: {err}"),
            )
        })?;
        let location = if is_snapshot(&resolved) {
            reconciler.materialized_for(&resolved)?
        } else {
            resolved.clone()
        };

        application.retain(|resource| resource != &resolved && resource != &location);
        debug!(library = %coordinate, location = %location.display(), "Classified application shared library");
        shared.push(location);
    }

    Ok(shared)
}
