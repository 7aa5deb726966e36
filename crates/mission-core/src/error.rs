//! Core domain errors.

use thiserror::Error;

/// Core domain errors for Mission Control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A required field is missing or empty.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Task not found.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Calendar event not found.
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// The backing store could not be read or written.
    #[error("Storage fault: {0}")]
    Storage(String),
}

impl CoreError {
    /// Shorthand for a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns true for either not-found variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TaskNotFound(_) | Self::EventNotFound(_))
    }
}
