//! Errors reported while applying a field mask.

use crate::message::FieldError;
use thiserror::Error;

/// UpdateError represents a failure to resolve or apply a field mask.
///
/// Errors abort an update at the path that caused them; paths processed
/// before it stay applied unless the update runs in atomic mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The mask is absent or failed its own validity check against the target.
    #[error("invalid field mask")]
    InvalidFieldMask,

    /// A mask path is empty.
    #[error("invalid path")]
    InvalidPath,

    /// A path segment does not name a field of the message reached so far.
    #[error("unknown field: '{path}'")]
    UnknownField { path: String },

    /// A non-final path segment names a field that is not a singular message.
    #[error("unsupported nested type: '{path}'")]
    UnsupportedNestedType { path: String },

    /// The target and update messages are not of the same type.
    #[error("message type mismatch: expected {expected}, got {actual}")]
    MessageTypeMismatch { expected: String, actual: String },

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl UpdateError {
    /// Creates an unknown field error for the given leading path segments.
    pub fn unknown_field(segments: &[&str]) -> Self {
        UpdateError::UnknownField {
            path: segments.join("."),
        }
    }

    /// Creates an unsupported nested type error for the given leading path segments.
    pub fn unsupported_nested_type(segments: &[&str]) -> Self {
        UpdateError::UnsupportedNestedType {
            path: segments.join("."),
        }
    }
}
