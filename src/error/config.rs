//! Configuration errors

use super::IsoclassError;

/// Creates an invalid filter pattern error
pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> IsoclassError {
    IsoclassError::InvalidPattern {
        pattern: pattern.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid coordinates error
pub fn invalid_coordinates(
    coordinates: impl Into<String>,
    reason: impl Into<String>,
) -> IsoclassError {
    IsoclassError::InvalidCoordinates {
        coordinates: coordinates.into(),
        reason: reason.into(),
    }
}

/// Creates an unknown lifecycle phase error
pub fn unknown_phase(phase: impl Into<String>) -> IsoclassError {
    IsoclassError::UnknownLifecyclePhase {
        phase: phase.into(),
    }
}

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> IsoclassError {
    IsoclassError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates a configuration read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> IsoclassError {
    IsoclassError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a configuration parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> IsoclassError {
    IsoclassError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
