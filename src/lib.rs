//! isoclass - isolation boundary classification
//!
//! Partitions the resolved dependency closure of a root component into a
//! base boundary, one boundary per plugin (linked by the plugins they depend
//! on, with de-duplicated exports) and an application boundary. Also tracks
//! the lifecycle of deployed artifacts and composes the registries of nested
//! boundaries.
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod graph;
pub mod lifecycle;
pub mod resolver;
pub mod snapshot;

pub use classifier::{ClassificationContext, IsolationClassifier};
pub use domain::{Coordinate, Dependency, IsolationResult, ModuleClassification, Scope};
pub use error::{IsoclassError, Result};
pub use graph::DependencyGraph;
