//! Error types for the sync client
//!
//! A `SyncError` means the action never started: input was rejected or the
//! referenced record is unknown. Remote failures of a started mutation are
//! not errors at this level; they are reported as
//! [`MutationOutcome::RolledBack`](crate::MutationOutcome::RolledBack).

use goaltrack_model::{Collection, ValidationError};
use goaltrack_store::StoreError;

/// Result of a sync client call
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync client error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// Input rejected before any network call
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// No user is signed in
    #[error("no user is signed in")]
    NotSignedIn,

    /// Referenced record is not in the local cache
    #[error("{collection} record not loaded: {id}")]
    NotCached {
        /// Collection that was searched
        collection: Collection,
        /// Id that was not found
        id: String,
    },

    /// Referenced record is still awaiting server confirmation
    #[error("{collection} record is still being saved: {id}")]
    PendingReference {
        /// Collection of the referenced record
        collection: Collection,
        /// Temporary id of the referenced record
        id: String,
    },

    /// Remote read failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Create not-cached error
    #[inline]
    pub fn not_cached(collection: Collection, id: impl ToString) -> Self {
        Self::NotCached {
            collection,
            id: id.to_string(),
        }
    }

    /// Create pending-reference error
    #[inline]
    pub fn pending(collection: Collection, id: impl ToString) -> Self {
        Self::PendingReference {
            collection,
            id: id.to_string(),
        }
    }

    /// Check if the error is an inline validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
