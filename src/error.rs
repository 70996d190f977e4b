//! Error types for integration lifecycle operations.

use thiserror::Error;

/// Errors that can occur while loading or initializing an integration.
///
/// These are never returned from action methods. Binders store them in their
/// state and callers observe them through `error()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    /// Remote script could not be fetched or executed
    #[error("Failed to load resource {url}: {reason}")]
    ResourceLoadFailed { url: String, reason: String },

    /// Script loaded but the expected global handle never appeared
    #[error("Global handle '{handle}' not found after loading {url}")]
    HandleMissing { handle: String, url: String },

    /// Global handle rejected its configuration
    #[error("Initialization of '{handle}' failed: {reason}")]
    InitFailed { handle: String, reason: String },

    /// Caller supplied an unusable configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two composed integrations expose the same action name
    #[error("Action exposed by more than one integration: {0}")]
    ActionCollision(String),
}

impl IntegrationError {
    /// URL of the resource involved, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            IntegrationError::ResourceLoadFailed { url, .. }
            | IntegrationError::HandleMissing { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Result type for integration host operations
pub type Result<T> = std::result::Result<T, IntegrationError>;
