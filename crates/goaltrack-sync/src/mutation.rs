//! Mutation lifecycle
//!
//! Each mutation moves `idle → pending → committed | rolled back`. Instead of
//! threading callbacks, the lifecycle is returned to the caller as a
//! [`MutationReport`]: the snapshot captured before the optimistic apply,
//! the outcome, and what happened to the secondary progress push and the
//! reconciling refresh.

use crate::cache::{CollectionCache, Snapshot};
use goaltrack_model::{GoalId, Record};
use goaltrack_store::StoreError;
use serde::Serialize;
use std::fmt;

/// User action behind a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    /// Create a goal
    AddGoal,
    /// Delete a goal
    DeleteGoal,
    /// Create one todo
    AddTodo,
    /// Create a batch of todos
    AddTodos,
    /// Flip a todo's done flag
    ToggleTodo,
    /// Delete a todo
    DeleteTodo,
    /// Create an activity label
    AddActivity,
    /// Log minutes against an activity
    AddDailyLog,
    /// Edit a daily log
    UpdateDailyLog,
    /// Delete a daily log
    DeleteDailyLog,
}

impl Action {
    /// Human-readable verb phrase
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Action::AddGoal => "add goal",
            Action::DeleteGoal => "delete goal",
            Action::AddTodo => "add todo",
            Action::AddTodos => "add todos",
            Action::ToggleTodo => "update todo",
            Action::DeleteTodo => "delete todo",
            Action::AddActivity => "add activity",
            Action::AddDailyLog => "log time",
            Action::UpdateDailyLog => "update time log",
            Action::DeleteDailyLog => "delete time log",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// How a mutation settled
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<C> {
    /// The store accepted the write; carries server ids or the applied value
    Committed(C),
    /// The store refused the write; the snapshot was restored
    RolledBack(StoreError),
}

impl<C> MutationOutcome<C> {
    /// Whether the write was committed
    #[inline]
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    /// Committed value, if any
    #[inline]
    #[must_use]
    pub fn committed(&self) -> Option<&C> {
        match self {
            Self::Committed(value) => Some(value),
            Self::RolledBack(_) => None,
        }
    }

    /// Failure, if rolled back
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Self::Committed(_) => None,
            Self::RolledBack(error) => Some(error),
        }
    }
}

/// Result of the best-effort goal percentage push
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressSync {
    /// Store now holds `percent` for the goal
    Pushed {
        /// Goal whose percentage was pushed
        goal_id: GoalId,
        /// Percentage the store holds after clamping
        percent: u8,
    },
    /// Push failed; the cached value stays until the next refresh
    Failed {
        /// Goal whose percentage was pushed
        goal_id: GoalId,
        /// Percentage that was attempted
        percent: u8,
        /// Why the store refused it
        error: StoreError,
    },
}

impl ProgressSync {
    /// Goal the push was for
    #[must_use]
    pub fn goal_id(&self) -> &GoalId {
        match self {
            Self::Pushed { goal_id, .. } | Self::Failed { goal_id, .. } => goal_id,
        }
    }

    /// Percentage that was pushed
    #[must_use]
    pub fn percent(&self) -> u8 {
        match self {
            Self::Pushed { percent, .. } | Self::Failed { percent, .. } => *percent,
        }
    }
}

/// Everything that happened during one mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReport<T, C> {
    /// Action performed
    pub action: Action,
    /// Collection state captured before the optimistic apply
    pub snapshot: Snapshot<T>,
    /// Commit or rollback
    pub outcome: MutationOutcome<C>,
    /// Secondary goal progress push, for goal-linked todo mutations
    pub progress_sync: Option<ProgressSync>,
    /// Whether the reconciling refresh landed
    pub refreshed: bool,
}

impl<T, C> MutationReport<T, C> {
    /// Whether the write was committed
    #[inline]
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.outcome.is_committed()
    }
}

/// An optimistic write that has been applied but not settled
///
/// Dropping a `Pending` without settling leaves the optimistic state in
/// place.
#[must_use = "a pending mutation must be committed or rolled back"]
pub(crate) struct Pending<'a, T: Record> {
    cache: &'a CollectionCache<T>,
    snapshot: Snapshot<T>,
}

impl<'a, T: Record> Pending<'a, T> {
    /// Supersede fetches, capture a snapshot and apply the optimistic change
    pub(crate) fn begin(cache: &'a CollectionCache<T>, apply: impl FnOnce(&CollectionCache<T>)) -> Self {
        cache.supersede();
        let snapshot = cache.snapshot();
        apply(cache);
        tracing::debug!(collection = %T::COLLECTION, "optimistic state applied");
        Self { cache, snapshot }
    }

    /// Reconcile with the server's answer
    pub(crate) fn commit(self, reconcile: impl FnOnce(&CollectionCache<T>)) -> Snapshot<T> {
        reconcile(self.cache);
        self.snapshot
    }

    /// Restore the captured snapshot
    pub(crate) fn rollback(self) -> Snapshot<T> {
        self.cache.restore(self.snapshot.clone());
        tracing::debug!(collection = %T::COLLECTION, "optimistic state rolled back");
        self.snapshot
    }
}

/// Swap provisional ids for server ids pairwise; returns how many matched
///
/// A length mismatch or a provisional record that is already gone leaves
/// temporary ids in the cache until the next refresh.
pub(crate) fn commit_ids<T: Record>(
    cache: &CollectionCache<T>,
    temporary: &[T::Id],
    server: &[T::Id],
) -> usize {
    if temporary.len() != server.len() {
        tracing::warn!(
            collection = %T::COLLECTION,
            provisional = temporary.len(),
            committed = server.len(),
            "store returned a different number of ids"
        );
    }
    let mut swapped = 0;
    for (temp, id) in temporary.iter().zip(server) {
        if cache.replace_id(temp, id) {
            swapped += 1;
        } else {
            tracing::warn!(collection = %T::COLLECTION, %temp, %id, "provisional record missing at commit");
        }
    }
    swapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use goaltrack_model::{RecordId, Todo, TodoId};

    #[test]
    fn rollback_restores_snapshot() {
        let cache = CollectionCache::<Todo>::new();
        cache.insert_front([Todo::new(TodoId::new("a"), "a", None, Utc::now())]);
        let before = cache.snapshot();

        let pending = Pending::begin(&cache, |c| {
            c.insert_front([Todo::new(TodoId::temporary(), "b", None, Utc::now())]);
        });
        assert_eq!(cache.len(), 2);

        let snapshot = pending.rollback();
        assert_eq!(snapshot, before);
        assert_eq!(cache.snapshot(), before);
    }

    #[test]
    fn begin_supersedes_fetches() {
        let cache = CollectionCache::<Todo>::new();
        let ticket = cache.begin_fetch();
        let pending = Pending::begin(&cache, |_| {});
        let _ = pending.commit(|_| {});

        assert!(!cache.finish_fetch(ticket, Vec::new()));
    }

    #[test]
    fn outcome_accessors() {
        let ok: MutationOutcome<u8> = MutationOutcome::Committed(3);
        let err: MutationOutcome<u8> =
            MutationOutcome::RolledBack(StoreError::Unavailable("x".into()));

        assert_eq!(ok.committed(), Some(&3));
        assert!(ok.error().is_none());
        assert!(!err.is_committed());
        assert!(err.error().unwrap().is_retryable());
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::AddDailyLog.to_string(), "log time");
    }

    #[test]
    fn commit_ids_reports_short_answers() {
        let cache = CollectionCache::<Todo>::new();
        let temps = [TodoId::temporary(), TodoId::temporary()];
        cache.insert_front(temps.iter().map(|id| Todo::new(id.clone(), "t", None, Utc::now())));

        let swapped = commit_ids(&cache, &temps, &[TodoId::new("server-1")]);

        assert_eq!(swapped, 1);
        assert!(cache.contains(&TodoId::new("server-1")));
        assert!(cache.contains(&temps[1]));
    }

    #[test]
    fn commit_ids_skips_missing_provisional_records() {
        let cache = CollectionCache::<Todo>::new();
        let temp = TodoId::temporary();

        assert_eq!(commit_ids(&cache, &[temp], &[TodoId::new("server-1")]), 0);
        assert!(cache.is_empty());
    }
}
