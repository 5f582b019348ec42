//! Configuration file loading
//!
//! Two kinds of files are read, each as YAML (`.yaml`, `.yml`) or JSON
//! (`.json`):
//! - a classification context, see [`ClassificationContext`]
//! - a repository descriptor, see [`RepositoryDescriptor`]

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::classifier::ClassificationContext;
use crate::error::{Result, config_invalid, config_parse_failed, config_read_failed};
use crate::resolver::{InMemoryRepository, RepositoryDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("yaml" | "yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(config_invalid(format!(
            "Unsupported configuration file '{}': expected .yaml, .yml or .json",
            path.display()
        ))),
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = format_of(path)?;
    let content = fs::read_to_string(path)
        .map_err(|e| config_read_failed(path.display().to_string(), e.to_string()))?;
    debug!(path = %path.display(), ?format, "Loading configuration file");

    match format {
        Format::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string())),
        Format::Json => serde_json::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string())),
    }
}

/// Load and validate a classification context
///
/// # Errors
///
/// Returns a configuration error when the file cannot be read, parsed or
/// validated.
pub fn load_context(path: impl AsRef<Path>) -> Result<ClassificationContext> {
    let context: ClassificationContext = load(path.as_ref())?;
    context.validate()?;
    Ok(context)
}

/// Load a repository descriptor into an in-memory repository
///
/// # Errors
///
/// Returns a configuration error when the file cannot be read or parsed.
pub fn load_repository(path: impl AsRef<Path>) -> Result<InMemoryRepository> {
    let descriptor: RepositoryDescriptor = load(path.as_ref())?;
    debug!(artifacts = descriptor.artifacts.len(), "Loaded repository descriptor");
    Ok(InMemoryRepository::from(descriptor))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::IsoclassError;
    use crate::resolver::DependencyResolver;

    #[test]
    fn test_load_context_yaml() {
        let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("context.yaml");
        fs::write(
            &path,
            "root: { namespace: org.x, name: root, version: '1.0' }\nplugins: ['org.x:plugin-a']\n",
        )
        .expect("Failed to write context");

        let context = load_context(&path).expect("context should load");
        assert_eq!(context.plugins, vec!["org.x:plugin-a"]);
    }

    #[test]
    fn test_load_context_json_validates_patterns() {
        let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("context.json");
        fs::write(
            &path,
            r#"{"root": {"namespace": "org.x", "name": "root", "version": "1.0"}, "excluded": ["a:b:c:d:e"]}"#,
        )
        .expect("Failed to write context");

        assert!(matches!(
            load_context(&path),
            Err(IsoclassError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_context("context.toml").expect_err("toml is not supported");
        assert!(matches!(err, IsoclassError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_missing_file() {
        let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
        let err = load_context(temp.path().join("missing.yaml")).expect_err("file is missing");
        assert!(matches!(err, IsoclassError::ConfigReadFailed { .. }));
    }

    #[test]
    fn test_parse_error_names_path() {
        let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("broken.yaml");
        fs::write(&path, "root: [unclosed").expect("Failed to write context");

        let err = load_context(&path).expect_err("yaml is malformed");
        assert!(matches!(err, IsoclassError::ConfigParseFailed { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_load_repository() {
        let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("repository.yml");
        fs::write(
            &path,
            r"
artifacts:
  - namespace: org.x
    name: lib
    version: '1.0'
    location: /repo/lib-1.0.jar
",
        )
        .expect("Failed to write repository");

        let repository = load_repository(&path).expect("repository should load");
        let lib = crate::domain::Coordinate::parse("org.x:lib:1.0").expect("valid coordinate");
        assert!(repository.resolve_artifact(&lib).is_ok());
    }
}
