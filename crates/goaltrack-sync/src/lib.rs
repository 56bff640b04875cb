//! goaltrack sync layer
//!
//! Optimistic mutations over a [`RemoteStore`](goaltrack_store::RemoteStore):
//! the local cache changes immediately, the store write runs, and the
//! change is either committed (temporary ids swapped for server ids) or
//! rolled back to the snapshot taken just before the apply.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use goaltrack_sync::prelude::*;
//!
//! let client = SyncClient::new(store, identity);
//! client.refresh_all(None).await?;
//!
//! let goal = client.add_goal("Run a marathon").await?;
//! let goal_id = goal.outcome.committed().cloned().unwrap();
//!
//! let todo = client.add_todo("Buy shoes", Some(&goal_id)).await?;
//! assert!(todo.progress_sync.is_some());
//! ```

#![warn(missing_docs)]

mod cache;
mod client;
mod config;
mod error;
mod goals;
mod logs;
mod mutation;
mod notify;
mod todos;

pub use cache::{CollectionCache, FetchTicket, LocalCache, Snapshot};
pub use client::SyncClient;
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use logs::{DailyLogDraft, DailyLogUpdate};
pub use mutation::{Action, MutationOutcome, MutationReport, ProgressSync};
pub use notify::{Notice, Notifier, TracingNotifier};

/// Common imports for driving a client
pub mod prelude {
    pub use crate::{
        Action, DailyLogDraft, DailyLogUpdate, MutationOutcome, MutationReport, Notifier,
        ProgressSync, SyncClient, SyncConfig, SyncError, SyncResult,
    };
    pub use goaltrack_model::{
        ActivityId, DailyLogId, DateRange, GoalId, RecordId, TodoId, UserProfile,
    };
    pub use goaltrack_store::{IdentityProvider, RemoteStore, StoreError};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
