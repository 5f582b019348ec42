//! Resolution errors

use super::IsoclassError;

/// Creates a resolution failed error naming the coordinate being resolved
pub fn failed(coordinate: impl Into<String>, reason: impl Into<String>) -> IsoclassError {
    IsoclassError::ResolutionFailed {
        coordinate: coordinate.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid argument error
pub fn invalid_argument(message: impl Into<String>) -> IsoclassError {
    IsoclassError::InvalidArgument {
        message: message.into(),
    }
}
