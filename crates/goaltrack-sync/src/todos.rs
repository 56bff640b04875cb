//! Todo mutations
//!
//! Every committed mutation of a goal-linked todo is followed by a progress
//! push for that goal, computed from the cached todos (count-based ratio).

use crate::client::SyncClient;
use crate::error::{SyncError, SyncResult};
use crate::mutation::{commit_ids, Action, MutationReport, Pending};
use chrono::Utc;
use goaltrack_model::{validation, Collection, GoalId, RecordId, Todo, TodoId};

impl SyncClient {
    /// Create a todo, optionally linked to a goal
    ///
    /// # Errors
    /// `Validation` for a bad title, `NotSignedIn`, `PendingReference` when
    /// linking to a goal that is still being created
    pub async fn add_todo(
        &self,
        title: &str,
        goal_id: Option<&GoalId>,
    ) -> SyncResult<MutationReport<Todo, TodoId>> {
        let title = validation::title(title, &self.config.limits)?;
        let user = self.user()?;
        self.check_goal_link(goal_id)?;

        let temp = TodoId::temporary();
        let provisional = Todo::new(temp.clone(), title.clone(), goal_id.cloned(), Utc::now());
        let pending = Pending::begin(self.cache.todos(), |todos| todos.insert_front([provisional]));

        let result = self
            .store
            .create_todo(&user, &title, goal_id)
            .await
            .map(|todo| todo.id);
        let (snapshot, outcome) = self.settle(Action::AddTodo, pending, result, |todos, id| {
            commit_ids(todos, std::slice::from_ref(&temp), std::slice::from_ref(id));
        });

        let progress_sync = if outcome.is_committed() {
            self.push_goal_progress(&user, goal_id).await
        } else {
            None
        };
        Ok(self
            .finish(&user, Action::AddTodo, snapshot, outcome, progress_sync)
            .await)
    }

    /// Create several todos in one atomic batch
    ///
    /// Blank titles are skipped. The goal's progress is pushed once for the
    /// whole batch.
    ///
    /// # Errors
    /// `Validation` for an empty or oversized batch or a bad title,
    /// `NotSignedIn`, `PendingReference` for a goal still being created
    pub async fn add_todos_bulk<S: AsRef<str>>(
        &self,
        titles: &[S],
        goal_id: Option<&GoalId>,
    ) -> SyncResult<MutationReport<Todo, Vec<TodoId>>> {
        let titles = validation::bulk_titles(titles, &self.config.limits)?;
        let user = self.user()?;
        self.check_goal_link(goal_id)?;

        let temps: Vec<TodoId> = titles.iter().map(|_| TodoId::temporary()).collect();
        let now = Utc::now();
        let provisional: Vec<Todo> = temps
            .iter()
            .zip(&titles)
            .map(|(id, title)| Todo::new(id.clone(), title.clone(), goal_id.cloned(), now))
            .collect();
        let pending = Pending::begin(self.cache.todos(), |todos| todos.insert_front(provisional));

        let result = self
            .store
            .create_todos_bulk(&user, &titles, goal_id)
            .await
            .map(|todos| todos.into_iter().map(|t| t.id).collect::<Vec<_>>());
        let (snapshot, outcome) = self.settle(Action::AddTodos, pending, result, |todos, ids| {
            commit_ids(todos, &temps, ids);
        });

        let progress_sync = if outcome.is_committed() {
            self.push_goal_progress(&user, goal_id).await
        } else {
            None
        };
        Ok(self
            .finish(&user, Action::AddTodos, snapshot, outcome, progress_sync)
            .await)
    }

    /// Flip a todo between done and open
    ///
    /// The committed value is the new `is_done`.
    ///
    /// # Errors
    /// `NotSignedIn`, `NotCached` for an unknown todo, `PendingReference` for a
    /// todo still being created
    pub async fn toggle_todo(&self, todo_id: &TodoId) -> SyncResult<MutationReport<Todo, bool>> {
        let user = self.user()?;
        let current = self.cached_todo(todo_id)?;
        let is_done = !current.is_done;

        let pending = Pending::begin(self.cache.todos(), |todos| {
            todos.update(todo_id, |todo| todo.is_done = is_done);
        });

        let result = self
            .store
            .set_todo_done(&user, todo_id, is_done)
            .await
            .map(|()| is_done);
        let (snapshot, outcome) = self.settle(Action::ToggleTodo, pending, result, |_, _| {});

        let progress_sync = if outcome.is_committed() {
            self.push_goal_progress(&user, current.linked_goal()).await
        } else {
            None
        };
        Ok(self
            .finish(&user, Action::ToggleTodo, snapshot, outcome, progress_sync)
            .await)
    }

    /// Delete a todo
    ///
    /// # Errors
    /// `NotSignedIn`, `NotCached` for an unknown todo, `PendingReference` for a
    /// todo still being created
    pub async fn delete_todo(&self, todo_id: &TodoId) -> SyncResult<MutationReport<Todo, ()>> {
        let user = self.user()?;
        let current = self.cached_todo(todo_id)?;

        let pending = Pending::begin(self.cache.todos(), |todos| {
            todos.remove(todo_id);
        });

        let result = self.store.delete_todo(&user, todo_id).await;
        let (snapshot, outcome) = self.settle(Action::DeleteTodo, pending, result, |_, _| {});

        let progress_sync = if outcome.is_committed() {
            self.push_goal_progress(&user, current.linked_goal()).await
        } else {
            None
        };
        Ok(self
            .finish(&user, Action::DeleteTodo, snapshot, outcome, progress_sync)
            .await)
    }

    fn cached_todo(&self, todo_id: &TodoId) -> SyncResult<Todo> {
        if todo_id.is_temporary() {
            return Err(SyncError::pending(Collection::Todos, todo_id));
        }
        self.cache
            .todos()
            .get(todo_id)
            .ok_or_else(|| SyncError::not_cached(Collection::Todos, todo_id))
    }

    /// A link must not point at an unconfirmed goal; unknown goals are
    /// tolerated as dangling
    fn check_goal_link(&self, goal_id: Option<&GoalId>) -> SyncResult<()> {
        let Some(goal_id) = goal_id else {
            return Ok(());
        };
        if goal_id.is_temporary() {
            return Err(SyncError::pending(Collection::Goals, goal_id));
        }
        if !self.cache.goals().contains(goal_id) {
            tracing::debug!(%goal_id, "linking todo to a goal that is not cached");
        }
        Ok(())
    }
}
