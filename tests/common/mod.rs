//! Common fixtures for isoclass integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use isoclass::Coordinate;
use isoclass::resolver::RepositoryArtifact;
use tempfile::TempDir;

/// Parse a coordinate, panicking on malformed fixtures
pub fn coordinate(spec: &str) -> Coordinate {
    Coordinate::parse(spec).expect("fixture coordinate should parse")
}

/// Repository-style location of an artifact
///
/// `org.x:lib:jar:tests:1.0` lives at `/m2/org.x/lib/1.0/lib-1.0-tests.jar`.
pub fn location(coordinate: &Coordinate) -> PathBuf {
    let version = coordinate.version.clone().unwrap_or_default();
    let classifier = coordinate
        .classifier
        .as_ref()
        .map(|classifier| format!("-{classifier}"))
        .unwrap_or_default();
    PathBuf::from(format!(
        "/m2/{}/{}/{}/{}-{}{}.{}",
        coordinate.namespace,
        coordinate.name,
        version,
        coordinate.name,
        version,
        classifier,
        coordinate.archive_type
    ))
}

/// Location of the artifact described by `spec`
pub fn location_of(spec: &str) -> PathBuf {
    location(&coordinate(spec))
}

/// Artifact located at its repository-style location
pub fn artifact(spec: &str) -> RepositoryArtifact {
    let coordinate = coordinate(spec);
    let location = location(&coordinate);
    RepositoryArtifact::new(coordinate).located_at(location)
}

/// Artifact with a descriptor but no binary of its own
pub fn descriptor_only(spec: &str) -> RepositoryArtifact {
    RepositoryArtifact::new(coordinate(spec))
}

/// A temporary directory for generated files
pub struct TestWorkspace {
    pub temp: TempDir,
    pub path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the workspace and return its path
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }
}
