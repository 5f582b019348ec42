//! Isolation classification
//!
//! Partitions the dependency closure of a root component into isolated
//! loading boundaries:
//!
//! ```text
//!            ┌────────────────────────────┐
//!            │ base (provided closure)    │
//!            └─────────────▲──────────────┘
//!         ┌────────────────┴──────────────┐
//!    ┌────┴─────┐    ┌──────────┐    ┌────┴─────┐
//!    │ plugin a │───>│ plugin b │    │ plugin c │   module boundaries
//!    └────▲─────┘    └──────────┘    └────▲─────┘
//!         └───────────────┬───────────────┘
//!            ┌────────────┴───────────────┐
//!            │ application (test closure) │
//!            └────────────────────────────┘
//! ```
//!
//! Classification runs in a fixed order: the root's graph is snapshot, the
//! requested plugins are classified, module exports are resolved, then the
//! base boundary and the application boundary are resolved, and finally
//! application shared libraries are split out of the application boundary.
//! Any failure aborts the whole classification; the only tolerated failure
//! is a root without a binary of its own.

pub mod context;
pub mod exports;

mod application;
mod base;
mod plugin;
mod shared_libs;

use tracing::debug;

use crate::domain::IsolationResult;
use crate::error::Result;
use crate::resolver::{
    DeclaredPluginRole, DependencyResolver, ExtensionDiscovery, ModuleDescriptorReader,
    NoDescriptors, PluginRole,
};

pub use base::is_non_loadable;
pub use context::{ClassificationContext, PluginRequest, SharedLibraryRequest};
pub use exports::resolve_exports;

use plugin::PluginClassifier;

/// Classifies a root component's closure using the given collaborators
#[derive(Debug)]
pub struct IsolationClassifier<R> {
    resolver: R,
    plugin_role: Box<dyn PluginRole>,
    extension_discovery: Option<Box<dyn ExtensionDiscovery>>,
    descriptor_reader: Box<dyn ModuleDescriptorReader>,
}

impl<R: DependencyResolver> IsolationClassifier<R> {
    /// Classifier recognizing plugins by declaration, without extension
    /// discovery or module descriptors
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            plugin_role: Box::new(DeclaredPluginRole::default()),
            extension_discovery: None,
            descriptor_reader: Box::new(NoDescriptors),
        }
    }

    pub fn with_plugin_role(mut self, role: impl PluginRole + 'static) -> Self {
        self.plugin_role = Box::new(role);
        self
    }

    pub fn with_extension_discovery(mut self, discovery: impl ExtensionDiscovery + 'static) -> Self {
        self.extension_discovery = Some(Box::new(discovery));
        self
    }

    pub fn with_descriptor_reader(mut self, reader: impl ModuleDescriptorReader + 'static) -> Self {
        self.descriptor_reader = Box::new(reader);
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Classify the closure of `context.root`
    ///
    /// # Errors
    ///
    /// Returns the first configuration, resolution or consistency error.
    /// No partial result is produced.
    pub fn classify(&self, context: &ClassificationContext) -> Result<IsolationResult> {
        context.validate()?;
        debug!(root = %context.root, "Building isolation classification");

        let graph = self.resolver.dependency_graph(&context.root)?;
        debug!(
            root = %context.root,
            direct = graph.direct_dependencies().len(),
            "Resolved root direct dependencies"
        );

        let mut modules = PluginClassifier {
            resolver: &self.resolver,
            role: self.plugin_role.as_ref(),
            discovery: self.extension_discovery.as_deref(),
            descriptors: self.descriptor_reader.as_ref(),
            context,
            graph: &graph,
        }
        .classify()?;
        resolve_exports(&mut modules)?;

        let base_resources = base::classify(&self.resolver, context, &graph, &modules)?;
        let mut application_resources =
            application::classify(&self.resolver, context, &graph, &modules)?;
        let shared_libraries =
            shared_libs::classify(&self.resolver, context, &graph, &mut application_resources)?;

        debug!(
            base = base_resources.len(),
            modules = modules.len(),
            shared = shared_libraries.len(),
            application = application_resources.len(),
            "Isolation classification complete"
        );

        Ok(IsolationResult {
            base_resources,
            base_symbols: context.extra_base_symbols.clone(),
            modules,
            shared_libraries,
            application_resources,
        })
    }
}
