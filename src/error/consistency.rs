//! Consistency errors
//!
//! Raised when a classification invariant does not hold. All of them abort
//! the classification.

use super::IsoclassError;

/// Creates an error for a plugin that is not a provided dependency of the root
pub fn plugin_not_provided(plugin: impl Into<String>, root: impl Into<String>) -> IsoclassError {
    IsoclassError::PluginNotProvided {
        plugin: plugin.into(),
        root: root.into(),
    }
}

/// Creates an error for a shared library that is not declared by the root
pub fn library_not_declared(library: impl Into<String>, root: impl Into<String>) -> IsoclassError {
    IsoclassError::LibraryNotDeclared {
        library: library.into(),
        root: root.into(),
    }
}

/// Creates an error for a module dependency missing from the classified set
pub fn plugin_dependency_not_found(
    module: impl Into<String>,
    name: impl Into<String>,
) -> IsoclassError {
    IsoclassError::PluginDependencyNotFound {
        module: module.into(),
        name: name.into(),
    }
}

/// Creates an error for a plugin declaring several extension types
pub fn ambiguous_extension(plugin: impl Into<String>, types: &[String]) -> IsoclassError {
    IsoclassError::AmbiguousExtension {
        plugin: plugin.into(),
        types: types.join(", "),
    }
}

/// Creates an error for a snapshot resource without a materialized match
pub fn unmatched_snapshot(path: impl Into<String>) -> IsoclassError {
    IsoclassError::UnmatchedSnapshot { path: path.into() }
}
