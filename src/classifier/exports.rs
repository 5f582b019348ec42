//! Module export resolution
//!
//! A module never re-exports a symbol already exported by one of its module
//! dependencies. Subtraction uses the exports each module declared before
//! resolution, so the result does not depend on module order and resolving
//! twice changes nothing.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::ModuleClassification;
use crate::error::{Result, plugin_dependency_not_found};

/// Remove from every module the symbols exported by its module dependencies
///
/// # Errors
///
/// Returns `PluginDependencyNotFound` when a module names a dependency that
/// is not part of `modules`.
pub fn resolve_exports(modules: &mut [ModuleClassification]) -> Result<()> {
    let declared: HashMap<String, HashSet<String>> = modules
        .iter()
        .map(|module| {
            (
                module.name.clone(),
                module.exported_symbols.iter().cloned().collect(),
            )
        })
        .collect();

    for module in modules.iter_mut() {
        for dependency in &module.dependencies {
            let exported_by_dependency = declared
                .get(dependency)
                .ok_or_else(|| plugin_dependency_not_found(module.name.clone(), dependency.clone()))?;

            let before = module.exported_symbols.len();
            module
                .exported_symbols
                .retain(|symbol| !exported_by_dependency.contains(symbol));
            if module.exported_symbols.len() != before {
                debug!(
                    module = %module.name,
                    dependency = %dependency,
                    removed = before - module.exported_symbols.len(),
                    "Removed symbols already exported by module dependency"
                );
            }
        }
    }
    Ok(())
}
