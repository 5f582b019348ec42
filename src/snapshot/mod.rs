//! Snapshot reconciliation
//!
//! Offline resolution yields normalized snapshot file names
//! (`lib-1.0-SNAPSHOT.jar`) while the materialized resource list may hold
//! the timestamped binary (`lib-1.0-20240101.120000-3.jar`) or both the
//! primary and the `-tests` binary of the same artifact. Resolved snapshot
//! resources are swapped for the materialized resource found in the same
//! folder:
//!
//! - exactly one materialized resource in the folder: use it
//! - several: a `-tests.jar` resolved resource takes the `-tests.jar` entry,
//!   anything else takes the first plain `.jar` entry
//! - none matching: `UnmatchedSnapshot`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{Result, unmatched_snapshot};

/// File name pattern of a snapshot-versioned binary
pub const SNAPSHOT_FILE_PATTERN: &str = "*-SNAPSHOT*.*";

const TESTS_JAR_SUFFIX: &str = "-tests.jar";
const JAR_SUFFIX: &str = ".jar";

/// Whether `path`'s file name is snapshot-versioned
pub fn is_snapshot(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let candidate = CandidatePath::from(file_name);
    match Glob::new(SNAPSHOT_FILE_PATTERN) {
        Ok(glob) => glob.matched(&candidate).is_some(),
        Err(_) => file_name.contains("-SNAPSHOT"),
    }
}

/// Materialized resources grouped by containing folder
#[derive(Debug, Default)]
pub struct SnapshotReconciler<'a> {
    folders: HashMap<&'a Path, Vec<&'a PathBuf>>,
}

impl<'a> SnapshotReconciler<'a> {
    pub fn new(materialized: &'a [PathBuf]) -> Self {
        let mut folders: HashMap<&Path, Vec<&PathBuf>> = HashMap::new();
        for resource in materialized {
            if let Some(folder) = resource.parent() {
                folders.entry(folder).or_default().push(resource);
            }
        }
        Self { folders }
    }

    /// Replace every snapshot resource in `resolved` with its materialized form
    ///
    /// # Errors
    ///
    /// Returns `UnmatchedSnapshot` for the first snapshot resource without a
    /// materialized counterpart.
    pub fn reconcile(&self, resolved: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        resolved
            .into_iter()
            .map(|resource| {
                if is_snapshot(&resource) {
                    self.materialized_for(&resource)
                } else {
                    Ok(resource)
                }
            })
            .collect()
    }

    /// Materialized resource standing in for one resolved snapshot resource
    ///
    /// # Errors
    ///
    /// Returns `UnmatchedSnapshot` when no materialized resource matches.
    pub fn materialized_for(&self, resolved: &Path) -> Result<PathBuf> {
        debug!(resource = %resolved.display(), "Matching resolved snapshot to materialized resource");
        let candidates = resolved
            .parent()
            .and_then(|folder| self.folders.get(folder))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let matched = match candidates {
            [single] => Some(*single),
            [] => None,
            several => pick_by_suffix(resolved, several),
        };

        match matched {
            Some(materialized) => {
                debug!(
                    resolved = %resolved.display(),
                    materialized = %materialized.display(),
                    "Replacing resolved snapshot resource"
                );
                Ok(materialized.clone())
            }
            None => Err(unmatched_snapshot(resolved.display().to_string())),
        }
    }
}

fn pick_by_suffix<'a>(resolved: &Path, candidates: &[&'a PathBuf]) -> Option<&'a PathBuf> {
    let wants_tests = resolved
        .to_string_lossy()
        .to_lowercase()
        .ends_with(TESTS_JAR_SUFFIX);
    candidates.iter().copied().find(|candidate| {
        let name = candidate.to_string_lossy().to_lowercase();
        if wants_tests {
            name.ends_with(TESTS_JAR_SUFFIX)
        } else {
            !name.ends_with(TESTS_JAR_SUFFIX) && name.ends_with(JAR_SUFFIX)
        }
    })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    const FOLDER: &str = "/m2/org/x/lib/1.0-SNAPSHOT";

    fn path(name: &str) -> PathBuf {
        Path::new(FOLDER).join(name)
    }

    #[test]
    fn test_is_snapshot() {
        assert!(is_snapshot(&path("lib-1.0-SNAPSHOT.jar")));
        assert!(is_snapshot(&path("lib-1.0-SNAPSHOT-tests.jar")));
        assert!(!is_snapshot(Path::new("/m2/org/x/lib/1.0/lib-1.0.jar")));
        assert!(!is_snapshot(Path::new("/m2/org/x/lib/1.0-SNAPSHOT")));
    }

    #[test]
    fn test_single_materialized_resource_is_used() {
        let materialized = vec![path("lib-1.0-20240101.120000-3.jar")];
        let reconciler = SnapshotReconciler::new(&materialized);

        let reconciled = reconciler
            .reconcile(vec![path("lib-1.0-SNAPSHOT.jar")])
            .expect("snapshot should match");
        assert_eq!(reconciled, materialized);
    }

    #[test]
    fn test_tests_suffix_selects_tests_resource() {
        let materialized = vec![path("lib-1.0-SNAPSHOT.jar"), path("lib-1.0-SNAPSHOT-tests.jar")];
        let reconciler = SnapshotReconciler::new(&materialized);

        let reconciled = reconciler
            .materialized_for(&path("lib-1.0-SNAPSHOT-tests.jar"))
            .expect("snapshot should match");
        assert_eq!(reconciled, path("lib-1.0-SNAPSHOT-tests.jar"));

        let primary = reconciler
            .materialized_for(&path("lib-1.0-SNAPSHOT.jar"))
            .expect("snapshot should match");
        assert_eq!(primary, path("lib-1.0-SNAPSHOT.jar"));
    }

    #[test]
    fn test_suffix_match_ignores_case() {
        let materialized = vec![path("lib-1.0-SNAPSHOT.JAR"), path("lib-1.0-SNAPSHOT-TESTS.JAR")];
        let reconciler = SnapshotReconciler::new(&materialized);

        let tests = reconciler
            .materialized_for(&path("lib-1.0-SNAPSHOT-tests.jar"))
            .expect("snapshot should match");
        assert_eq!(tests, path("lib-1.0-SNAPSHOT-TESTS.JAR"));

        let primary = reconciler
            .materialized_for(&path("lib-1.0-SNAPSHOT.jar"))
            .expect("snapshot should match");
        assert_eq!(primary, path("lib-1.0-SNAPSHOT.JAR"));
    }

    #[test]
    fn test_unmatched_snapshot_fails() {
        let materialized = vec![PathBuf::from("/elsewhere/lib-1.0-SNAPSHOT.jar")];
        let reconciler = SnapshotReconciler::new(&materialized);

        let result = reconciler.reconcile(vec![path("lib-1.0-SNAPSHOT.jar")]);
        assert!(matches!(
            result,
            Err(crate::error::IsoclassError::UnmatchedSnapshot { .. })
        ));
    }

    #[test]
    fn test_non_snapshot_resources_pass_through() {
        let reconciler = SnapshotReconciler::new(&[]);
        let resolved = vec![PathBuf::from("/m2/org/x/lib/1.0/lib-1.0.jar")];

        let reconciled = reconciler
            .reconcile(resolved.clone())
            .expect("release resources are kept");
        assert_eq!(reconciled, resolved);
    }

    #[test]
    fn test_several_candidates_without_plain_jar_fail() {
        let materialized = vec![path("lib-1.0-SNAPSHOT.zip"), path("lib-1.0-SNAPSHOT.pom")];
        let reconciler = SnapshotReconciler::new(&materialized);

        assert!(reconciler.materialized_for(&path("lib-1.0-SNAPSHOT.jar")).is_err());
    }
}
