//! Error types for design operations.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for design operations.
pub type DesignResult<T> = Result<T, DesignError>;

/// Errors that can occur in design operations.
#[derive(Debug, Error)]
pub enum DesignError {
    /// Element not found in the collection.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Element is locked and cannot be removed or edited destructively.
    #[error("Element is locked: {0}")]
    ElementLocked(String),

    /// Invalid operation on the design.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Document failed structural validation.
    #[error("Invalid design document: {0}")]
    Validation(#[from] ValidationError),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Share link payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// No preview renderer is attached to the session.
    #[error("Preview renderer not available")]
    PreviewUnavailable,

    /// The preview renderer failed.
    #[error("Rendering error: {0}")]
    Render(String),
}
