//! Component coordinates and dependency edges
//!
//! A [`Coordinate`] identifies a packaged unit of code by
//! `namespace:name:type[:classifier]:version`. A [`Dependency`] pairs a
//! coordinate with the [`Scope`] it was declared under.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, invalid_coordinates};

/// Separator between coordinate segments
pub const COORDINATES_SEPARATOR: &str = ":";

/// Archive type used when a coordinate does not declare one
pub const DEFAULT_ARCHIVE_TYPE: &str = "jar";

/// Classifier of a component's test artifact
pub const TESTS_CLASSIFIER: &str = "tests";

/// Identity of a packaged unit of code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub namespace: String,
    pub name: String,
    #[serde(rename = "type", default = "default_archive_type")]
    pub archive_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

fn default_archive_type() -> String {
    DEFAULT_ARCHIVE_TYPE.to_string()
}

impl Coordinate {
    /// Create a classifier-less coordinate
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        archive_type: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            archive_type: archive_type.into(),
            classifier: None,
            version,
        }
    }

    /// Parse `namespace:name[:type[:classifier]]:version`
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoordinates` when the segment count is outside 3..=5
    /// or a segment is empty.
    pub fn parse(coordinates: &str) -> Result<Self> {
        let segments: Vec<&str> = coordinates.split(COORDINATES_SEPARATOR).collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(invalid_coordinates(coordinates, "empty segment"));
        }

        let (archive_type, classifier) = match segments.len() {
            3 => (DEFAULT_ARCHIVE_TYPE, None),
            4 => (segments[2], None),
            5 => (segments[2], Some(segments[3].to_string())),
            _ => {
                return Err(invalid_coordinates(
                    coordinates,
                    "expected namespace:name[:type[:classifier]]:version",
                ));
            }
        };

        Ok(Self {
            namespace: segments[0].to_string(),
            name: segments[1].to_string(),
            archive_type: archive_type.to_string(),
            classifier,
            version: segments.last().map(|v| (*v).to_string()),
        })
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_archive_type(mut self, archive_type: impl Into<String>) -> Self {
        self.archive_type = archive_type.into();
        self
    }

    /// Same coordinate without its classifier
    pub fn without_classifier(&self) -> Self {
        Self {
            classifier: None,
            ..self.clone()
        }
    }

    /// Full id: `namespace:name:type[:classifier]:version`
    pub fn id(&self) -> String {
        let mut id = format!("{}:{}:{}", self.namespace, self.name, self.archive_type);
        if let Some(classifier) = &self.classifier {
            id.push(':');
            id.push_str(classifier);
        }
        id.push(':');
        id.push_str(self.version.as_deref().unwrap_or_default());
        id
    }

    /// Id without classifier, used as a module name
    pub fn classifier_less_id(&self) -> String {
        self.without_classifier().id()
    }

    /// `namespace:name` key
    pub fn short_id(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }

    /// Same namespace and name
    pub fn same_artifact(&self, other: &Coordinate) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }

    /// Graph identity: namespace and name, version only when both sides have one
    pub fn matches_identity(&self, other: &Coordinate) -> bool {
        if !self.same_artifact(other) {
            return false;
        }
        match (&self.version, &other.version) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => true,
        }
    }

    /// Key used to deduplicate resolved nodes
    pub fn conflict_key(&self) -> (String, String, String, Option<String>) {
        (
            self.namespace.clone(),
            self.name.clone(),
            self.archive_type.clone(),
            self.classifier.clone(),
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Resolution scope of a dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Build-time dependency, part of the component's own closure
    #[default]
    Compile,
    /// Runtime-provided dependency, supplied by the hosting boundary
    Provided,
    /// Test-only dependency
    Test,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Test => "test",
        };
        f.write_str(name)
    }
}

/// A coordinate declared under a resolution scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default)]
    pub scope: Scope,
}

impl Dependency {
    pub fn new(coordinate: Coordinate, scope: Scope) -> Self {
        Self { coordinate, scope }
    }

    pub fn compile(coordinate: Coordinate) -> Self {
        Self::new(coordinate, Scope::Compile)
    }

    pub fn provided(coordinate: Coordinate) -> Self {
        Self::new(coordinate, Scope::Provided)
    }

    pub fn test(coordinate: Coordinate) -> Self {
        Self::new(coordinate, Scope::Test)
    }

    /// New edge for the same coordinate under another scope
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            coordinate: self.coordinate.clone(),
            scope,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.coordinate, self.scope)
    }
}
