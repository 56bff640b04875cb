//! Error types for remote store calls
//!
//! Every remote operation can fail for connectivity or permission reasons;
//! none of these failures is fatal to the process.

use goaltrack_model::Collection;

/// Result of a remote store call
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote store failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Network or backend unavailable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Security rules rejected the call
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// No authenticated user for the call
    #[error("not authenticated")]
    Unauthenticated,

    /// Document does not exist in the user's partition
    #[error("{collection} document not found: {id}")]
    NotFound { collection: Collection, id: String },

    /// Backend refused the write as malformed
    #[error("write rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Create not-found error
    #[inline]
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Check if the failure is transient
    ///
    /// No operation retries automatically; this only informs the message
    /// shown to the user.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Short user-facing description
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "You appear to be offline. Please try again.",
            Self::PermissionDenied(_) | Self::Unauthenticated => {
                "You don't have permission to do that."
            }
            Self::NotFound { .. } => "That item no longer exists.",
            Self::Rejected(_) => "The change could not be saved.",
        }
    }
}
