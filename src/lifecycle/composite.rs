//! Registries of nested isolation boundaries
//!
//! A plugin boundary consults its own registry before its host's. The
//! composite registry answers lookups from the child first and the parent
//! second, and refuses registration: every registration has to target one
//! concrete boundary.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, invalid_argument, unsupported_operation};

/// An extension known to a boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub extension_type: String,
}

/// Provider of named configurations for one extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationProvider {
    pub name: String,
    pub extension: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// A named configuration created by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

pub trait ExtensionRegistry: Send + Sync {
    fn extension(&self, name: &str) -> Option<Arc<ExtensionDeclaration>>;

    /// Every extension, in registration order
    fn extensions(&self) -> Vec<Arc<ExtensionDeclaration>>;

    fn configuration_provider(&self, name: &str) -> Option<Arc<ConfigurationProvider>>;

    fn configuration(&self, name: &str) -> Option<Arc<Configuration>>;

    /// # Errors
    ///
    /// Returns `UnsupportedOperation` when the registry does not accept
    /// registrations.
    fn register_extension(&mut self, extension: ExtensionDeclaration) -> Result<()>;

    /// # Errors
    ///
    /// Returns `UnsupportedOperation` when the registry does not accept
    /// registrations.
    fn register_configuration_provider(&mut self, provider: ConfigurationProvider) -> Result<()>;

    /// # Errors
    ///
    /// Returns `InvalidArgument` when no provider has this name.
    fn resolve_configuration_provider(&self, name: &str) -> Result<Arc<ConfigurationProvider>> {
        self.configuration_provider(name).ok_or_else(|| {
            invalid_argument(format!("No configuration provider registered with name '{name}'"))
        })
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` when no configuration has this name.
    fn resolve_configuration(&self, name: &str) -> Result<Arc<Configuration>> {
        self.configuration(name)
            .ok_or_else(|| invalid_argument(format!("No configuration found with name '{name}'")))
    }
}

/// Registry of one concrete boundary
#[derive(Debug, Default)]
pub struct BoundaryRegistry {
    extensions: Vec<Arc<ExtensionDeclaration>>,
    providers: HashMap<String, Arc<ConfigurationProvider>>,
    configurations: HashMap<String, Arc<Configuration>>,
}

impl BoundaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a configuration created by one of this boundary's providers
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when its provider is not registered here.
    pub fn register_configuration(&mut self, configuration: Configuration) -> Result<()> {
        if !self.providers.contains_key(&configuration.provider) {
            return Err(invalid_argument(format!(
                "Configuration '{}' refers to unknown provider '{}'",
                configuration.name, configuration.provider
            )));
        }
        self.configurations
            .insert(configuration.name.clone(), Arc::new(configuration));
        Ok(())
    }
}

impl ExtensionRegistry for BoundaryRegistry {
    fn extension(&self, name: &str) -> Option<Arc<ExtensionDeclaration>> {
        self.extensions
            .iter()
            .find(|extension| extension.name == name)
            .cloned()
    }

    fn extensions(&self) -> Vec<Arc<ExtensionDeclaration>> {
        self.extensions.clone()
    }

    fn configuration_provider(&self, name: &str) -> Option<Arc<ConfigurationProvider>> {
        self.providers.get(name).cloned()
    }

    fn configuration(&self, name: &str) -> Option<Arc<Configuration>> {
        self.configurations.get(name).cloned()
    }

    fn register_extension(&mut self, extension: ExtensionDeclaration) -> Result<()> {
        self.extensions.retain(|existing| existing.name != extension.name);
        self.extensions.push(Arc::new(extension));
        Ok(())
    }

    fn register_configuration_provider(&mut self, provider: ConfigurationProvider) -> Result<()> {
        self.providers
            .insert(provider.name.clone(), Arc::new(provider));
        Ok(())
    }
}

/// Read-only view over a child boundary and its parent
#[derive(Clone)]
pub struct CompositeRegistry {
    child: Arc<dyn ExtensionRegistry>,
    parent: Arc<dyn ExtensionRegistry>,
}

impl std::fmt::Debug for CompositeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRegistry")
            .field("child_extensions", &self.child.extensions().len())
            .field("parent_extensions", &self.parent.extensions().len())
            .finish()
    }
}

impl CompositeRegistry {
    pub fn new(child: Arc<dyn ExtensionRegistry>, parent: Arc<dyn ExtensionRegistry>) -> Self {
        Self { child, parent }
    }
}

impl ExtensionRegistry for CompositeRegistry {
    fn extension(&self, name: &str) -> Option<Arc<ExtensionDeclaration>> {
        self.child
            .extension(name)
            .or_else(|| self.parent.extension(name))
    }

    fn extensions(&self) -> Vec<Arc<ExtensionDeclaration>> {
        let mut names = HashSet::new();
        self.child
            .extensions()
            .into_iter()
            .chain(self.parent.extensions())
            .filter(|extension| names.insert(extension.name.clone()))
            .collect()
    }

    fn configuration_provider(&self, name: &str) -> Option<Arc<ConfigurationProvider>> {
        self.child
            .configuration_provider(name)
            .or_else(|| self.parent.configuration_provider(name))
    }

    fn configuration(&self, name: &str) -> Option<Arc<Configuration>> {
        self.child
            .configuration(name)
            .or_else(|| self.parent.configuration(name))
    }

    fn register_extension(&mut self, extension: ExtensionDeclaration) -> Result<()> {
        Err(unsupported_operation(format!(
            "register extension '{}' on a composite registry",
            extension.name
        )))
    }

    fn register_configuration_provider(&mut self, provider: ConfigurationProvider) -> Result<()> {
        Err(unsupported_operation(format!(
            "register configuration provider '{}' on a composite registry",
            provider.name
        )))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::IsoclassError;

    fn extension(name: &str) -> ExtensionDeclaration {
        ExtensionDeclaration {
            name: name.to_string(),
            extension_type: format!("org.x.ext.{name}"),
        }
    }

    fn provider(name: &str, extension: &str) -> ConfigurationProvider {
        ConfigurationProvider {
            name: name.to_string(),
            extension: extension.to_string(),
            properties: BTreeMap::new(),
        }
    }

    fn composite() -> CompositeRegistry {
        let mut parent = BoundaryRegistry::new();
        parent.register_extension(extension("http")).expect("concrete registry");
        parent.register_extension(extension("db")).expect("concrete registry");
        parent
            .register_configuration_provider(provider("shared-config", "http"))
            .expect("concrete registry");
        parent
            .register_configuration(Configuration {
                name: "listener".to_string(),
                provider: "shared-config".to_string(),
                properties: BTreeMap::new(),
            })
            .expect("provider is registered");

        let mut child = BoundaryRegistry::new();
        child.register_extension(extension("http")).expect("concrete registry");
        child
            .register_configuration_provider(provider("local-config", "http"))
            .expect("concrete registry");
        child
            .register_configuration_provider(provider("shared-config", "db"))
            .expect("concrete registry");

        CompositeRegistry::new(Arc::new(child), Arc::new(parent))
    }

    #[test]
    fn test_child_wins_then_parent() {
        let registry = composite();

        let shadowed = registry
            .resolve_configuration_provider("shared-config")
            .expect("child has it");
        assert_eq!(shadowed.extension, "db");

        assert!(registry.resolve_configuration_provider("local-config").is_ok());
        assert_eq!(
            registry
                .resolve_configuration("listener")
                .expect("parent has it")
                .provider,
            "shared-config"
        );
        assert!(registry.extension("db").is_some());
    }

    #[test]
    fn test_missing_everywhere_is_invalid_argument() {
        let registry = composite();

        assert!(matches!(
            registry.resolve_configuration_provider("nowhere"),
            Err(IsoclassError::InvalidArgument { .. })
        ));
        assert!(matches!(
            registry.resolve_configuration("nowhere"),
            Err(IsoclassError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_extensions_union_child_first() {
        let registry = composite();
        let names: Vec<String> = registry
            .extensions()
            .iter()
            .map(|extension| extension.name.clone())
            .collect();
        assert_eq!(names, vec!["http", "db"]);
    }

    #[test]
    fn test_registration_is_unsupported() {
        let mut registry = composite();

        assert!(matches!(
            registry.register_extension(extension("jms")),
            Err(IsoclassError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            registry.register_configuration_provider(provider("p", "jms")),
            Err(IsoclassError::UnsupportedOperation { .. })
        ));
        assert!(registry.extension("jms").is_none());
    }

    #[test]
    fn test_configuration_requires_known_provider() {
        let mut registry = BoundaryRegistry::new();
        let result = registry.register_configuration(Configuration {
            name: "orphan".to_string(),
            provider: "missing".to_string(),
            properties: BTreeMap::new(),
        });
        assert!(result.is_err());
    }
}
