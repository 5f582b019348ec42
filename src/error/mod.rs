//! Error types and handling for isoclass
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Malformed patterns, coordinates and configuration files
//! - [`resolution`]: Failures of the underlying graph/resource resolution
//! - [`consistency`]: Classification invariants that did not hold
//! - [`lifecycle`]: Artifact phase transitions and composite registries
//!
//! Soft failures (the root artifact having no compiled output of its own)
//! are never represented here; they are logged and classification continues.

pub mod config;
pub mod consistency;
pub mod lifecycle;
pub mod resolution;

pub use config::{
    invalid as config_invalid, invalid_coordinates, invalid_pattern,
    parse_failed as config_parse_failed, read_failed as config_read_failed,
    unknown_phase as unknown_lifecycle_phase,
};
pub use consistency::{
    ambiguous_extension, library_not_declared, plugin_dependency_not_found, plugin_not_provided,
    unmatched_snapshot,
};
pub use lifecycle::{illegal_transition, phase_failed, unsupported_operation};
pub use resolution::{failed as resolution_failed, invalid_argument};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for classification and lifecycle operations
#[derive(Error, Diagnostic, Debug)]
pub enum IsoclassError {
    // Configuration errors
    #[error("Invalid filter pattern '{pattern}': {reason}")]
    #[diagnostic(
        code(isoclass::config::invalid_pattern),
        help("Patterns have the form namespace[:name[:type[:version]]], '*' matches any segment")
    )]
    InvalidPattern { pattern: String, reason: String },

    #[error("Artifact coordinates '{coordinates}' is not a valid format: {reason}")]
    #[diagnostic(code(isoclass::config::invalid_coordinates))]
    InvalidCoordinates { coordinates: String, reason: String },

    #[error("Unknown lifecycle phase: {phase}")]
    #[diagnostic(
        code(isoclass::config::unknown_phase),
        help("Recognized phases: not in lifecycle, initialise, start, stop, dispose")
    )]
    UnknownLifecyclePhase { phase: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(isoclass::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(isoclass::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration: {path}: {reason}")]
    #[diagnostic(code(isoclass::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // Resolution errors
    #[error("Couldn't resolve '{coordinate}': {reason}")]
    #[diagnostic(code(isoclass::resolution::failed))]
    ResolutionFailed { coordinate: String, reason: String },

    #[error("Invalid argument: {message}")]
    #[diagnostic(code(isoclass::resolution::invalid_argument))]
    InvalidArgument { message: String },

    // Consistency errors
    #[error(
        "Plugin '{plugin}' in order to be resolved has to be declared as provided dependency of '{root}'"
    )]
    #[diagnostic(
        code(isoclass::consistency::plugin_not_provided),
        help("Declare the plugin as a provided-scope direct dependency of the root component")
    )]
    PluginNotProvided { plugin: String, root: String },

    #[error(
        "Application shared lib '{library}' in order to be resolved has to be declared as test dependency of '{root}'"
    )]
    #[diagnostic(code(isoclass::consistency::library_not_declared))]
    LibraryNotDeclared { library: String, root: String },

    #[error("Unable to find a plugin dependency: {name} (required by '{module}')")]
    #[diagnostic(code(isoclass::consistency::plugin_dependency_not_found))]
    PluginDependencyNotFound { module: String, name: String },

    #[error("Plugin '{plugin}' declares more than one extension: {types}")]
    #[diagnostic(
        code(isoclass::consistency::ambiguous_extension),
        help("A plugin may declare at most one extension-capable type")
    )]
    AmbiguousExtension { plugin: String, types: String },

    #[error("{path} resolved snapshot version couldn't be matched to an already materialized resource")]
    #[diagnostic(
        code(isoclass::consistency::unmatched_snapshot),
        help("Make sure the timestamped snapshot binary is part of the materialized resource list")
    )]
    UnmatchedSnapshot { path: String },

    // Lifecycle errors
    #[error("Illegal lifecycle transition for '{artifact}': {from} -> {to}")]
    #[diagnostic(code(isoclass::lifecycle::illegal_transition))]
    IllegalTransition {
        artifact: String,
        from: String,
        to: String,
    },

    #[error("Unsupported operation: {operation}")]
    #[diagnostic(
        code(isoclass::lifecycle::unsupported),
        help("Register against the concrete boundary registry, not the composite")
    )]
    UnsupportedOperation { operation: String },

    #[error("Error in phase '{phase}' of '{artifact}': {reason}")]
    #[diagnostic(code(isoclass::lifecycle::phase_failed))]
    PhaseFailed {
        artifact: String,
        phase: String,
        reason: String,
    },
}

impl IsoclassError {
    /// Whether this error belongs to the configuration family (never retried)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            IsoclassError::InvalidPattern { .. }
                | IsoclassError::InvalidCoordinates { .. }
                | IsoclassError::UnknownLifecyclePhase { .. }
                | IsoclassError::ConfigInvalid { .. }
                | IsoclassError::ConfigReadFailed { .. }
                | IsoclassError::ConfigParseFailed { .. }
        )
    }
}

impl From<std::io::Error> for IsoclassError {
    fn from(err: std::io::Error) -> Self {
        IsoclassError::ConfigReadFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for IsoclassError {
    fn from(err: serde_yaml::Error) -> Self {
        IsoclassError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for IsoclassError {
    fn from(err: serde_json::Error) -> Self {
        IsoclassError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, IsoclassError>;
