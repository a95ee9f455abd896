//! Core library errors.

use thiserror::Error;

use crate::ds::DeliveryServiceError;

/// Errors that can occur in community operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Transport or remote-reported failure, passed through unchanged.
    #[error(transparent)]
    Delivery(#[from] DeliveryServiceError),

    /// A response lacked a node the operation requires.
    #[error("Missing expected node: {0}")]
    MissingNode(&'static str),

    /// A required node was present but lacked an attribute.
    #[error("Missing expected attribute {attr} on node {node}")]
    MissingAttribute {
        node: &'static str,
        attr: &'static str,
    },

    /// JSON error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Collaborator (metadata cache, history) failure.
    #[error("Handler error: {0}")]
    HandlerError(String),
}
