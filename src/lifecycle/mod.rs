//! Artifact lifecycle
//!
//! An artifact moves through
//!
//! ```text
//! Created ──> Initialised ──> Started <──> Stopped
//!    │             │                          │
//!    └─────────────┴──────> Destroyed <───────┘
//! ```
//!
//! and can land in `DeploymentFailed` from any state when a phase action
//! fails. Transitions on one artifact must be serialized by the caller.

pub mod composite;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, illegal_transition, phase_failed, unknown_lifecycle_phase};

pub const NOT_IN_LIFECYCLE_PHASE: &str = "not in lifecycle";
pub const INITIALISE_PHASE: &str = "initialise";
pub const START_PHASE: &str = "start";
pub const STOP_PHASE: &str = "stop";
pub const DISPOSE_PHASE: &str = "dispose";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Created,
    Initialised,
    Started,
    Stopped,
    Destroyed,
    DeploymentFailed,
}

impl ArtifactStatus {
    /// Whether an artifact in this status may move to `next`
    pub fn can_transition_to(self, next: ArtifactStatus) -> bool {
        use ArtifactStatus::{Created, Destroyed, DeploymentFailed, Initialised, Started, Stopped};

        matches!(
            (self, next),
            (Created, Initialised)
                | (Initialised | Stopped, Started)
                | (Started, Stopped)
                | (Created | Initialised | Stopped | DeploymentFailed, Destroyed)
                | (_, DeploymentFailed)
        )
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactStatus::Created => "created",
            ArtifactStatus::Initialised => "initialised",
            ArtifactStatus::Started => "started",
            ArtifactStatus::Stopped => "stopped",
            ArtifactStatus::Destroyed => "destroyed",
            ArtifactStatus::DeploymentFailed => "deployment failed",
        };
        f.write_str(name)
    }
}

/// Map a lifecycle phase name to the status it leaves the artifact in
///
/// # Errors
///
/// Returns `UnknownLifecyclePhase` for any unrecognized name.
pub fn status_for_phase(phase: &str) -> Result<ArtifactStatus> {
    match phase {
        NOT_IN_LIFECYCLE_PHASE => Ok(ArtifactStatus::Created),
        INITIALISE_PHASE => Ok(ArtifactStatus::Initialised),
        START_PHASE => Ok(ArtifactStatus::Started),
        STOP_PHASE => Ok(ArtifactStatus::Stopped),
        DISPOSE_PHASE => Ok(ArtifactStatus::Destroyed),
        unknown => Err(unknown_lifecycle_phase(unknown)),
    }
}

/// Observer of status changes
pub trait StatusListener: Send + Sync {
    fn on_status_change(&self, artifact: &str, from: ArtifactStatus, to: ArtifactStatus);
}

/// Lifecycle state of one artifact
pub struct ArtifactLifecycle {
    artifact: String,
    status: ArtifactStatus,
    listeners: Vec<Arc<dyn StatusListener>>,
}

impl fmt::Debug for ArtifactLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactLifecycle")
            .field("artifact", &self.artifact)
            .field("status", &self.status)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ArtifactLifecycle {
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            status: ArtifactStatus::Created,
            listeners: Vec::new(),
        }
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn status(&self) -> ArtifactStatus {
        self.status
    }

    pub fn add_listener(&mut self, listener: Arc<dyn StatusListener>) {
        self.listeners.push(listener);
    }

    /// Apply a phase notification from the hosting lifecycle manager
    ///
    /// Notifying the current status again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLifecyclePhase` or `IllegalTransition`.
    pub fn on_phase_notification(&mut self, phase: &str) -> Result<ArtifactStatus> {
        let next = status_for_phase(phase)?;
        if next != self.status {
            self.transition(next)?;
        }
        Ok(self.status)
    }

    /// # Errors
    ///
    /// Returns `IllegalTransition` or, when `action` fails, `PhaseFailed`.
    pub fn initialise<F, E>(&mut self, action: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<(), E>,
        E: fmt::Display,
    {
        self.run_phase(INITIALISE_PHASE, ArtifactStatus::Initialised, action)
    }

    /// # Errors
    ///
    /// Returns `IllegalTransition` or, when `action` fails, `PhaseFailed`.
    pub fn start<F, E>(&mut self, action: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<(), E>,
        E: fmt::Display,
    {
        self.run_phase(START_PHASE, ArtifactStatus::Started, action)
    }

    /// # Errors
    ///
    /// Returns `IllegalTransition` or, when `action` fails, `PhaseFailed`.
    pub fn stop<F, E>(&mut self, action: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<(), E>,
        E: fmt::Display,
    {
        self.run_phase(STOP_PHASE, ArtifactStatus::Stopped, action)
    }

    /// # Errors
    ///
    /// Returns `IllegalTransition` or, when `action` fails, `PhaseFailed`.
    pub fn dispose<F, E>(&mut self, action: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<(), E>,
        E: fmt::Display,
    {
        self.run_phase(DISPOSE_PHASE, ArtifactStatus::Destroyed, action)
    }

    fn run_phase<F, E>(&mut self, phase: &str, target: ArtifactStatus, action: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<(), E>,
        E: fmt::Display,
    {
        if !self.status.can_transition_to(target) {
            return Err(illegal_transition(self.artifact.clone(), self.status, target));
        }

        debug!(artifact = %self.artifact, phase, "Running lifecycle phase");
        match action() {
            Ok(()) => self.transition(target),
            Err(err) => {
                warn!(artifact = %self.artifact, phase, error = %err, "Lifecycle phase failed");
                self.transition(ArtifactStatus::DeploymentFailed)?;
                Err(phase_failed(self.artifact.clone(), phase, err.to_string()))
            }
        }
    }

    fn transition(&mut self, next: ArtifactStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(illegal_transition(self.artifact.clone(), self.status, next));
        }
        let previous = self.status;
        self.status = next;
        debug!(artifact = %self.artifact, from = %previous, to = %next, "Artifact status changed");
        for listener in &self.listeners {
            listener.on_status_change(&self.artifact, previous, next);
        }
        Ok(())
    }
}
