//! Optimistic mutation tests
//!
//! Commit and rollback behaviour of goal and todo mutations against the
//! in-memory store.

use async_trait::async_trait;
use goaltrack_model::{
    Activity, DailyLog, DailyLogId, DailyLogPatch, Goal, GoalId, NewDailyLog, RecordId, Todo,
    TodoId, UserId, UserProfile,
};
use goaltrack_store::{MemoryStore, RemoteStore, StaticIdentity, StoreError, StoreOp, StoreResult};
use goaltrack_sync::{Action, MutationOutcome, ProgressSync, SyncClient, SyncConfig, SyncError};
use goaltrack_test_utils::{goal, setup_client, setup_client_with, todo, user};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

fn no_refresh() -> SyncConfig {
    SyncConfig::default().with_refresh_after_settle(false)
}

#[tokio::test]
async fn test_add_goal_commits_with_server_id() {
    let h = setup_client();

    let report = h.client.add_goal("Run a marathon").await.unwrap();

    let server_id = report.outcome.committed().cloned().unwrap();
    assert!(!server_id.is_temporary());
    assert!(report.snapshot.is_empty());
    assert!(report.refreshed);

    let goals = h.client.goals();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].id, server_id);
    assert_eq!(goals[0].title, "Run a marathon");
    assert_eq!(h.store.partition(&user()).goals.len(), 1);
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn test_committed_ids_replace_temporary_ids_without_refresh() {
    let h = setup_client_with(no_refresh());

    let report = h.client.add_todo("Stretch", None).await.unwrap();

    assert!(!report.refreshed);
    let todos = h.client.todos();
    assert_eq!(todos.len(), 1);
    assert_eq!(Some(&todos[0].id), report.outcome.committed());
    assert!(todos.iter().all(|t| !t.id.is_temporary()));
}

#[tokio::test]
async fn test_failed_write_restores_snapshot() {
    let h = setup_client_with(no_refresh());
    h.store.with_partition(&user(), |p| p.goals.push(goal("g-1", "Existing")));
    h.client.refresh_goals().await.unwrap();
    let before = h.client.cache().goals().snapshot();

    h.store
        .fail_next(StoreOp::CreateGoal, StoreError::Unavailable("timeout".into()));
    let report = h.client.add_goal("Doomed").await.unwrap();

    assert!(matches!(report.outcome, MutationOutcome::RolledBack(StoreError::Unavailable(_))));
    assert_eq!(report.snapshot, before);
    assert_eq!(h.client.cache().goals().snapshot(), before);
    assert_eq!(h.store.partition(&user()).goals.len(), 1);
}

#[tokio::test]
async fn test_rollback_raises_one_notice() {
    let h = setup_client();
    h.store.set_writes_offline(true);

    let report = h.client.add_todo("Offline todo", None).await.unwrap();

    assert!(!report.is_committed());
    assert!(h.client.todos().is_empty());
    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].action, Action::AddTodo);
    assert!(notices[0].message.starts_with("Failed to add todo."));
    assert!(notices[0].retryable);
}

#[tokio::test]
async fn test_refresh_runs_after_failure_too() {
    let h = setup_client();
    h.store.set_writes_offline(true);
    h.store.with_partition(&user(), |p| p.goals.push(goal("g-other", "From elsewhere")));

    let report = h.client.add_goal("Will fail").await.unwrap();

    assert!(!report.is_committed());
    assert!(report.refreshed);
    assert_eq!(h.client.goals()[0].id, GoalId::new("g-other"));
}

#[tokio::test]
async fn test_bulk_add_pushes_progress_once() {
    let h = setup_client();
    let goal_id = h.client.add_goal("Learn Rust").await.unwrap().outcome.committed().cloned().unwrap();
    let progress_calls = h.store.calls(StoreOp::SetGoalProgress);

    let report = h
        .client
        .add_todos_bulk(&["Read the book", "", "Write a CLI", "Ship it"], Some(&goal_id))
        .await
        .unwrap();

    let ids = report.outcome.committed().cloned().unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids.iter().collect::<std::collections::HashSet<_>>().len(), 3);
    assert_eq!(h.client.todos().len(), 3);
    assert_eq!(h.store.calls(StoreOp::SetGoalProgress), progress_calls + 1);
    assert_eq!(
        report.progress_sync,
        Some(ProgressSync::Pushed { goal_id: goal_id.clone(), percent: 0 })
    );
    assert_eq!(h.client.goal_progress(&goal_id).unwrap().total, 3);
}

#[tokio::test]
async fn test_bulk_add_is_bounded() {
    let h = setup_client();
    let titles: Vec<String> = (0..51).map(|i| format!("todo {i}")).collect();

    let err = h.client.add_todos_bulk(titles.as_slice(), None).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.store.write_calls(), 0);
}

#[tokio::test]
async fn test_toggle_updates_goal_percent() {
    let h = setup_client();
    h.store.with_partition(&user(), |p| {
        p.goals.push(goal("g-1", "Fitness"));
        p.todos.push(todo("t-1", Some("g-1"), false));
        p.todos.push(todo("t-2", Some("g-1"), false));
    });
    h.client.refresh_all(None).await.unwrap();

    let report = h.client.toggle_todo(&TodoId::new("t-1")).await.unwrap();

    assert_eq!(report.outcome, MutationOutcome::Committed(true));
    assert_eq!(report.progress_sync.as_ref().map(ProgressSync::percent), Some(50));
    assert_eq!(h.store.partition(&user()).goals[0].current_percent, 50);
    assert_eq!(h.client.goals()[0].current_percent, 50);
    assert_eq!(h.client.progress()[&GoalId::new("g-1")].percent, 50);
}

#[tokio::test]
async fn test_failed_progress_push_keeps_todo_change() {
    let h = setup_client();
    h.store.with_partition(&user(), |p| {
        p.goals.push(goal("g-1", "Fitness"));
        p.todos.push(todo("t-1", Some("g-1"), false));
    });
    h.client.refresh_all(None).await.unwrap();
    h.store
        .fail_next(StoreOp::SetGoalProgress, StoreError::PermissionDenied("rules".into()));

    let report = h.client.toggle_todo(&TodoId::new("t-1")).await.unwrap();

    assert!(report.is_committed());
    assert!(matches!(report.progress_sync, Some(ProgressSync::Failed { percent: 100, .. })));
    assert!(h.store.partition(&user()).todos[0].is_done);
    assert!(h.client.todos()[0].is_done);
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn test_toggle_rollback_skips_progress_push() {
    let h = setup_client_with(no_refresh());
    h.store.with_partition(&user(), |p| {
        p.goals.push(goal("g-1", "Fitness"));
        p.todos.push(todo("t-1", Some("g-1"), false));
    });
    h.client.refresh_all(None).await.unwrap();
    h.store.fail_next(StoreOp::SetTodoDone, StoreError::Unauthenticated);

    let report = h.client.toggle_todo(&TodoId::new("t-1")).await.unwrap();

    assert!(!report.is_committed());
    assert!(report.progress_sync.is_none());
    assert!(!h.client.todos()[0].is_done);
    assert_eq!(h.store.calls(StoreOp::SetGoalProgress), 0);
    assert!(!h.notifier.notices()[0].retryable);
}

#[tokio::test]
async fn test_delete_todo_recomputes_progress() {
    let h = setup_client();
    h.store.with_partition(&user(), |p| {
        p.goals.push(goal("g-1", "Fitness"));
        p.todos.push(todo("t-1", Some("g-1"), true));
        p.todos.push(todo("t-2", Some("g-1"), false));
    });
    h.client.refresh_all(None).await.unwrap();

    let report = h.client.delete_todo(&TodoId::new("t-2")).await.unwrap();

    assert!(report.is_committed());
    assert_eq!(report.snapshot.len(), 2);
    assert_eq!(report.progress_sync.map(|p| p.percent()), Some(100));
    assert_eq!(h.client.todos().len(), 1);
}

#[tokio::test]
async fn test_delete_goal_leaves_todos_dangling() {
    let h = setup_client();
    h.store.with_partition(&user(), |p| {
        p.goals.push(goal("g-1", "Fitness"));
        p.todos.push(todo("t-1", Some("g-1"), false));
    });
    h.client.refresh_all(None).await.unwrap();

    let report = h.client.delete_goal(&GoalId::new("g-1")).await.unwrap();

    assert!(report.is_committed());
    assert!(h.client.goals().is_empty());
    assert_eq!(h.client.todos()[0].goal_id, Some(GoalId::new("g-1")));
    assert!(h.client.progress().is_empty());
}

#[tokio::test]
async fn test_rejects_without_user() {
    let h = setup_client();
    h.identity.sign_out();

    let result = h.client.add_goal("Nobody").await;

    assert_eq!(result.unwrap_err(), SyncError::NotSignedIn);
    assert_eq!(h.store.write_calls(), 0);
}

#[tokio::test]
async fn test_rejects_links_to_pending_goal() {
    let h = setup_client();

    let err = h.client.add_todo("Early", Some(&GoalId::temporary())).await.unwrap_err();
    assert!(matches!(err, SyncError::PendingReference { .. }));

    let err = h.client.toggle_todo(&TodoId::temporary()).await.unwrap_err();
    assert!(matches!(err, SyncError::PendingReference { .. }));

    let err = h.client.toggle_todo(&TodoId::new("missing")).await.unwrap_err();
    assert!(matches!(err, SyncError::NotCached { .. }));
    assert_eq!(h.store.write_calls(), 0);
}

#[tokio::test]
async fn test_blank_title_never_reaches_store() {
    let h = setup_client();

    let err = h.client.add_goal("   ").await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.store.write_calls(), 0);
    assert!(h.client.goals().is_empty());
}

#[tokio::test]
async fn test_refresh_picks_up_other_session_edits() {
    let h = setup_client();
    h.client.refresh_all(None).await.unwrap();
    assert!(h.client.goals().is_empty());

    h.store.with_partition(&user(), |p| p.goals.push(goal("g-x", "Added on phone")));

    assert!(h.client.refresh_goals().await.unwrap());
    assert_eq!(h.client.goals()[0].title, "Added on phone");
}

#[tokio::test]
async fn test_reset_clears_cache() {
    let h = setup_client();
    h.client.add_goal("Something").await.unwrap();

    h.client.reset();

    assert!(h.client.goals().is_empty());
    assert!(!h.client.cache().goals().is_loaded());
    assert!(h.client.log_window().is_none());
}

#[tokio::test]
async fn test_failed_bulk_add_rolls_back_every_provisional_todo() {
    let h = setup_client_with(no_refresh());
    h.store.with_partition(&user(), |p| p.goals.push(goal("g-1", "Fitness")));
    h.client.refresh_all(None).await.unwrap();
    h.store
        .fail_next(StoreOp::CreateTodosBulk, StoreError::Unavailable("timeout".into()));

    let report = h
        .client
        .add_todos_bulk(&["Warm up", "Intervals", "Cool down"], Some(&GoalId::new("g-1")))
        .await
        .unwrap();

    assert!(!report.is_committed());
    assert_eq!(h.client.cache().todos().snapshot(), report.snapshot);
    assert!(h.client.todos().is_empty());
    assert!(report.progress_sync.is_none());
    assert_eq!(h.notifier.count(), 1);
    assert_eq!(h.store.calls(StoreOp::SetGoalProgress), 0);
    assert!(h.store.partition(&user()).todos.is_empty());
}

#[tokio::test]
async fn test_failed_goal_delete_restores_goal() {
    let h = setup_client_with(no_refresh());
    h.store.with_partition(&user(), |p| {
        p.goals.push(goal("g-1", "Fitness"));
        p.goals.push(goal("g-2", "Reading"));
    });
    h.client.refresh_goals().await.unwrap();
    h.store
        .fail_next(StoreOp::DeleteGoal, StoreError::PermissionDenied("rules".into()));

    let report = h.client.delete_goal(&GoalId::new("g-1")).await.unwrap();

    assert!(!report.is_committed());
    assert_eq!(h.client.goals(), report.snapshot.items());
    assert_eq!(h.client.goals().len(), 2);
    assert_eq!(h.notifier.notices()[0].action, Action::DeleteGoal);
}

#[tokio::test]
async fn test_switching_user_hides_previous_cache() {
    let h = setup_client();
    h.store.with_partition(&user(), |p| {
        p.goals.push(goal("g-a", "Private goal"));
        p.todos.push(todo("t-a", Some("g-a"), false));
    });
    h.client.refresh_all(None).await.unwrap();
    assert_eq!(h.client.goals().len(), 1);

    h.identity.sign_out();
    assert!(h.client.goals().is_empty());
    assert!(h.client.progress().is_empty());
    assert!(h.client.log_window().is_none());

    h.identity.sign_in(UserProfile::new("user-2"));
    assert!(h.client.todos().is_empty());
    let err = h.client.toggle_todo(&TodoId::new("t-a")).await.unwrap_err();
    assert!(matches!(err, SyncError::NotCached { .. }));
    assert_eq!(h.store.write_calls(), 0);
}

#[tokio::test]
async fn test_direct_user_switch_clears_cache() {
    let h = setup_client();
    h.store.with_partition(&user(), |p| p.goals.push(goal("g-a", "Private goal")));
    h.client.refresh_goals().await.unwrap();

    h.identity.sign_in(UserProfile::new("user-2"));

    assert!(h.client.goals().is_empty());
    assert!(h.client.goal_progress(&GoalId::new("g-a")).is_none());
    assert!(h.client.refresh_goals().await.unwrap());
    assert!(h.client.goals().is_empty());
}

/// Store whose first `list_todos` answers with data read before a gate opens
struct GatedStore {
    inner: MemoryStore,
    gate: Notify,
    armed: AtomicBool,
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn list_goals(&self, user: &UserId) -> StoreResult<Vec<Goal>> {
        self.inner.list_goals(user).await
    }
    async fn create_goal(&self, user: &UserId, title: &str) -> StoreResult<Goal> {
        self.inner.create_goal(user, title).await
    }
    async fn set_goal_progress(&self, user: &UserId, goal_id: &GoalId, percent: i32) -> StoreResult<u8> {
        self.inner.set_goal_progress(user, goal_id, percent).await
    }
    async fn delete_goal(&self, user: &UserId, goal_id: &GoalId) -> StoreResult<()> {
        self.inner.delete_goal(user, goal_id).await
    }
    async fn list_todos(&self, user: &UserId) -> StoreResult<Vec<Todo>> {
        let stale = self.inner.list_todos(user).await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.gate.notified().await;
        }
        stale
    }
    async fn create_todo(&self, user: &UserId, title: &str, goal_id: Option<&GoalId>) -> StoreResult<Todo> {
        self.inner.create_todo(user, title, goal_id).await
    }
    async fn create_todos_bulk(
        &self,
        user: &UserId,
        titles: &[String],
        goal_id: Option<&GoalId>,
    ) -> StoreResult<Vec<Todo>> {
        self.inner.create_todos_bulk(user, titles, goal_id).await
    }
    async fn set_todo_done(&self, user: &UserId, todo_id: &TodoId, is_done: bool) -> StoreResult<()> {
        self.inner.set_todo_done(user, todo_id, is_done).await
    }
    async fn delete_todo(&self, user: &UserId, todo_id: &TodoId) -> StoreResult<()> {
        self.inner.delete_todo(user, todo_id).await
    }
    async fn list_activities(&self, user: &UserId) -> StoreResult<Vec<Activity>> {
        self.inner.list_activities(user).await
    }
    async fn create_activity(&self, user: &UserId, name: &str) -> StoreResult<Activity> {
        self.inner.create_activity(user, name).await
    }
    async fn list_daily_logs(
        &self,
        user: &UserId,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> StoreResult<Vec<DailyLog>> {
        self.inner.list_daily_logs(user, start, end).await
    }
    async fn create_daily_log(&self, user: &UserId, entry: &NewDailyLog) -> StoreResult<DailyLog> {
        self.inner.create_daily_log(user, entry).await
    }
    async fn update_daily_log(
        &self,
        user: &UserId,
        log_id: &DailyLogId,
        patch: &DailyLogPatch,
    ) -> StoreResult<()> {
        self.inner.update_daily_log(user, log_id, patch).await
    }
    async fn delete_daily_log(&self, user: &UserId, log_id: &DailyLogId) -> StoreResult<()> {
        self.inner.delete_daily_log(user, log_id).await
    }
}

#[tokio::test]
async fn test_stale_fetch_does_not_clobber_optimistic_add() {
    let store = Arc::new(GatedStore {
        inner: MemoryStore::new(),
        gate: Notify::new(),
        armed: AtomicBool::new(true),
    });
    let identity = Arc::new(StaticIdentity::signed_in(goaltrack_test_utils::profile()));
    let client = SyncClient::new(store.clone(), identity).with_config(no_refresh());

    let (refreshed, added) = tokio::join!(client.refresh_todos(), async {
        let report = client.add_todo("Written mid-fetch", None).await;
        store.gate.notify_one();
        report
    });

    assert_eq!(refreshed, Ok(false));
    assert!(added.unwrap().is_committed());
    assert_eq!(client.todos().len(), 1);
    assert_eq!(client.todos()[0].title, "Written mid-fetch");
}
