//! # Framework Errors
//!
//! This module defines the error type shared by the action factory, the reducer
//! and the store binding. Reducer misuse (missing ids, unknown forms) is never an
//! error: those cases are logged and absorbed into state. Only construction,
//! parsing, binding and serialization failures cross the API boundary.

/// Errors that can occur within the resource framework itself.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Expected resource name")]
    MissingResourceName,
    #[error("Invalid resource name '{0}': must not contain '/'")]
    InvalidResourceName(String),
    #[error("Invalid action type: {0}")]
    InvalidActionType(String),
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Validates a resource name and returns its upper-cased wire form.
pub(crate) fn wire_name(resource_name: &str) -> Result<String, ResourceError> {
    if resource_name.is_empty() {
        return Err(ResourceError::MissingResourceName);
    }
    if resource_name.contains('/') {
        return Err(ResourceError::InvalidResourceName(resource_name.to_string()));
    }
    Ok(resource_name.to_uppercase())
}
