//! Domain models for isoclass
//!
//! This module contains the value types the classifier consumes and
//! produces. They carry no resolution logic of their own.

pub mod classification;
pub mod coordinate;

pub use classification::{IsolationResult, ModuleClassification};
pub use coordinate::{
    COORDINATES_SEPARATOR, Coordinate, DEFAULT_ARCHIVE_TYPE, Dependency, Scope, TESTS_CLASSIFIER,
};
