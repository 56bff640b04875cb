//! In-memory remote store
//!
//! A [`RemoteStore`] backed by per-user partitions in process memory. Used by
//! tests and the demo binary in place of the managed document store, with
//! fault injection so rollback paths can be exercised deterministically.

use crate::error::{StoreError, StoreResult};
use crate::remote::{clamp_percent, RemoteStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashmap::DashMap;
use goaltrack_model::{
    Activity, ActivityId, Collection, DailyLog, DailyLogId, DailyLogPatch, Goal, GoalId,
    NewDailyLog, RecordId, Todo, TodoId, UserId,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Store operation, used for fault injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListGoals,
    CreateGoal,
    SetGoalProgress,
    DeleteGoal,
    ListTodos,
    CreateTodo,
    CreateTodosBulk,
    SetTodoDone,
    DeleteTodo,
    ListActivities,
    CreateActivity,
    ListDailyLogs,
    CreateDailyLog,
    UpdateDailyLog,
    DeleteDailyLog,
}

impl StoreOp {
    /// Whether the operation writes
    #[inline]
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::ListGoals | Self::ListTodos | Self::ListActivities | Self::ListDailyLogs
        )
    }
}

/// Documents of one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub goals: Vec<Goal>,
    pub todos: Vec<Todo>,
    pub activities: Vec<Activity>,
    pub daily_logs: Vec<DailyLog>,
}

#[derive(Debug, Default)]
struct Faults {
    offline: bool,
    writes_offline: bool,
    queued: HashMap<StoreOp, VecDeque<StoreError>>,
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: DashMap<UserId, Partition>,
    faults: Mutex<Faults>,
    calls: DashMap<StoreOp, usize>,
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call of `op` with `error`
    ///
    /// Queued errors are consumed in order, one per call.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.faults.lock().queued.entry(op).or_default().push_back(error);
    }

    /// Fail every call while offline
    pub fn set_offline(&self, offline: bool) {
        self.faults.lock().offline = offline;
    }

    /// Fail every write while set, reads still succeed
    pub fn set_writes_offline(&self, offline: bool) {
        self.faults.lock().writes_offline = offline;
    }

    /// Number of calls made for `op`, including failed ones
    #[must_use]
    pub fn calls(&self, op: StoreOp) -> usize {
        self.calls.get(&op).map_or(0, |c| *c)
    }

    /// Total number of write calls made
    #[must_use]
    pub fn write_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|entry| entry.key().is_write())
            .map(|entry| *entry.value())
            .sum()
    }

    /// Copy of a user's documents
    #[must_use]
    pub fn partition(&self, user: &UserId) -> Partition {
        self.partitions
            .get(user)
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Edit a user's documents directly, as another session would
    pub fn with_partition<R>(&self, user: &UserId, f: impl FnOnce(&mut Partition) -> R) -> R {
        let mut partition = self.partitions.entry(user.clone()).or_default();
        f(&mut partition)
    }

    /// Record the call and apply any injected fault
    fn enter(&self, op: StoreOp) -> StoreResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;

        let mut faults = self.faults.lock();
        if let Some(error) = faults.queued.get_mut(&op).and_then(VecDeque::pop_front) {
            tracing::debug!(?op, %error, "injected store failure");
            return Err(error);
        }
        if faults.offline || (faults.writes_offline && op.is_write()) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    /// Strictly increasing server timestamp
    fn stamp(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::milliseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_goals(&self, user: &UserId) -> StoreResult<Vec<Goal>> {
        self.enter(StoreOp::ListGoals)?;
        let mut goals = self.partition(user).goals;
        newest_first(&mut goals, |g| g.created_at);
        Ok(goals)
    }

    async fn create_goal(&self, user: &UserId, title: &str) -> StoreResult<Goal> {
        self.enter(StoreOp::CreateGoal)?;
        let goal = Goal::new(GoalId::generate(), title, self.stamp());
        self.with_partition(user, |p| p.goals.push(goal.clone()));
        Ok(goal)
    }

    async fn set_goal_progress(
        &self,
        user: &UserId,
        goal_id: &GoalId,
        percent: i32,
    ) -> StoreResult<u8> {
        self.enter(StoreOp::SetGoalProgress)?;
        let stored = clamp_percent(percent);
        self.with_partition(user, |p| {
            let goal = p
                .goals
                .iter_mut()
                .find(|g| &g.id == goal_id)
                .ok_or_else(|| StoreError::not_found(Collection::Goals, goal_id.as_str()))?;
            goal.current_percent = stored;
            Ok(stored)
        })
    }

    async fn delete_goal(&self, user: &UserId, goal_id: &GoalId) -> StoreResult<()> {
        self.enter(StoreOp::DeleteGoal)?;
        self.with_partition(user, |p| p.goals.retain(|g| &g.id != goal_id));
        Ok(())
    }

    async fn list_todos(&self, user: &UserId) -> StoreResult<Vec<Todo>> {
        self.enter(StoreOp::ListTodos)?;
        let mut todos = self.partition(user).todos;
        newest_first(&mut todos, |t| t.created_at);
        Ok(todos)
    }

    async fn create_todo(
        &self,
        user: &UserId,
        title: &str,
        goal_id: Option<&GoalId>,
    ) -> StoreResult<Todo> {
        self.enter(StoreOp::CreateTodo)?;
        let todo = Todo::new(TodoId::generate(), title, goal_id.cloned(), self.stamp());
        self.with_partition(user, |p| p.todos.push(todo.clone()));
        Ok(todo)
    }

    async fn create_todos_bulk(
        &self,
        user: &UserId,
        titles: &[String],
        goal_id: Option<&GoalId>,
    ) -> StoreResult<Vec<Todo>> {
        self.enter(StoreOp::CreateTodosBulk)?;
        if titles.is_empty() {
            return Err(StoreError::Rejected("empty batch".to_string()));
        }
        let batch: Vec<Todo> = titles
            .iter()
            .map(|title| Todo::new(TodoId::generate(), title, goal_id.cloned(), self.stamp()))
            .collect();
        self.with_partition(user, |p| p.todos.extend(batch.iter().cloned()));
        Ok(batch)
    }

    async fn set_todo_done(&self, user: &UserId, todo_id: &TodoId, is_done: bool) -> StoreResult<()> {
        self.enter(StoreOp::SetTodoDone)?;
        self.with_partition(user, |p| {
            let todo = p
                .todos
                .iter_mut()
                .find(|t| &t.id == todo_id)
                .ok_or_else(|| StoreError::not_found(Collection::Todos, todo_id.as_str()))?;
            todo.is_done = is_done;
            Ok(())
        })
    }

    async fn delete_todo(&self, user: &UserId, todo_id: &TodoId) -> StoreResult<()> {
        self.enter(StoreOp::DeleteTodo)?;
        self.with_partition(user, |p| p.todos.retain(|t| &t.id != todo_id));
        Ok(())
    }

    async fn list_activities(&self, user: &UserId) -> StoreResult<Vec<Activity>> {
        self.enter(StoreOp::ListActivities)?;
        let mut activities = self.partition(user).activities;
        activities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(activities)
    }

    async fn create_activity(&self, user: &UserId, name: &str) -> StoreResult<Activity> {
        self.enter(StoreOp::CreateActivity)?;
        let activity = Activity::new(ActivityId::generate(), name);
        self.with_partition(user, |p| p.activities.push(activity.clone()));
        Ok(activity)
    }

    async fn list_daily_logs(
        &self,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyLog>> {
        self.enter(StoreOp::ListDailyLogs)?;
        let mut logs: Vec<DailyLog> = self
            .partition(user)
            .daily_logs
            .into_iter()
            .filter(|l| l.date >= start && l.date <= end)
            .collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(logs)
    }

    async fn create_daily_log(&self, user: &UserId, entry: &NewDailyLog) -> StoreResult<DailyLog> {
        self.enter(StoreOp::CreateDailyLog)?;
        if entry.duration_minutes == 0 {
            return Err(StoreError::Rejected("duration must be positive".to_string()));
        }
        let log = DailyLog::from_entry(DailyLogId::generate(), entry.clone(), self.stamp());
        self.with_partition(user, |p| p.daily_logs.push(log.clone()));
        Ok(log)
    }

    async fn update_daily_log(
        &self,
        user: &UserId,
        log_id: &DailyLogId,
        patch: &DailyLogPatch,
    ) -> StoreResult<()> {
        self.enter(StoreOp::UpdateDailyLog)?;
        self.with_partition(user, |p| {
            let log = p
                .daily_logs
                .iter_mut()
                .find(|l| &l.id == log_id)
                .ok_or_else(|| StoreError::not_found(Collection::DailyLogs, log_id.as_str()))?;
            log.apply(patch);
            Ok(())
        })
    }

    async fn delete_daily_log(&self, user: &UserId, log_id: &DailyLogId) -> StoreResult<()> {
        self.enter(StoreOp::DeleteDailyLog)?;
        self.with_partition(user, |p| p.daily_logs.retain(|l| &l.id != log_id));
        Ok(())
    }
}
