//! Lifecycle errors

use super::IsoclassError;

/// Creates an illegal transition error
pub fn illegal_transition(
    artifact: impl Into<String>,
    from: impl std::fmt::Display,
    to: impl std::fmt::Display,
) -> IsoclassError {
    IsoclassError::IllegalTransition {
        artifact: artifact.into(),
        from: from.to_string(),
        to: to.to_string(),
    }
}

/// Creates an unsupported operation error
pub fn unsupported_operation(operation: impl Into<String>) -> IsoclassError {
    IsoclassError::UnsupportedOperation {
        operation: operation.into(),
    }
}

/// Creates a phase failed error
pub fn phase_failed(
    artifact: impl Into<String>,
    phase: impl Into<String>,
    reason: impl Into<String>,
) -> IsoclassError {
    IsoclassError::PhaseFailed {
        artifact: artifact.into(),
        phase: phase.into(),
        reason: reason.into(),
    }
}
