//! Goal mutations

use crate::client::SyncClient;
use crate::error::{SyncError, SyncResult};
use crate::mutation::{commit_ids, Action, MutationReport, Pending};
use chrono::Utc;
use goaltrack_model::{validation, Collection, Goal, GoalId, RecordId};

impl SyncClient {
    /// Create a goal
    ///
    /// The goal shows up in the cache immediately under a temporary id,
    /// which is swapped for the server id on commit.
    ///
    /// # Errors
    /// `Validation` for a bad title, `NotSignedIn` without a user
    pub async fn add_goal(&self, title: &str) -> SyncResult<MutationReport<Goal, GoalId>> {
        let title = validation::title(title, &self.config.limits)?;
        let user = self.user()?;

        let temp = GoalId::temporary();
        let provisional = Goal::new(temp.clone(), title.clone(), Utc::now());
        let pending = Pending::begin(self.cache.goals(), |goals| goals.insert_front([provisional]));

        let result = self.store.create_goal(&user, &title).await.map(|goal| goal.id);
        let (snapshot, outcome) = self.settle(Action::AddGoal, pending, result, |goals, id| {
            commit_ids(goals, std::slice::from_ref(&temp), std::slice::from_ref(id));
        });

        Ok(self.finish(&user, Action::AddGoal, snapshot, outcome, None).await)
    }

    /// Delete a goal
    ///
    /// Todos linked to it are kept; their link dangles and they stop
    /// counting toward any goal.
    ///
    /// # Errors
    /// `NotSignedIn`, `NotCached` for an unknown goal, `PendingReference` for
    /// a goal still being created
    pub async fn delete_goal(&self, goal_id: &GoalId) -> SyncResult<MutationReport<Goal, ()>> {
        let user = self.user()?;
        if goal_id.is_temporary() {
            return Err(SyncError::pending(Collection::Goals, goal_id));
        }
        if !self.cache.goals().contains(goal_id) {
            return Err(SyncError::not_cached(Collection::Goals, goal_id));
        }

        let pending = Pending::begin(self.cache.goals(), |goals| {
            goals.remove(goal_id);
        });

        let result = self.store.delete_goal(&user, goal_id).await;
        let (snapshot, outcome) = self.settle(Action::DeleteGoal, pending, result, |_, _| {});

        Ok(self.finish(&user, Action::DeleteGoal, snapshot, outcome, None).await)
    }
}
