//! Remote Store Adapter
//!
//! The managed document store is an external collaborator. This trait is the
//! whole surface the client needs from it: four collections per user
//! partition, ordered reads, single and batched writes.

use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use goaltrack_model::{
    Activity, DailyLog, DailyLogId, DailyLogPatch, Goal, GoalId, NewDailyLog, Todo, TodoId,
    UserId,
};

/// Clamp a requested percentage into `0..=100`
#[inline]
#[must_use]
pub fn clamp_percent(percent: i32) -> u8 {
    // clamped range always fits
    u8::try_from(percent.clamp(0, 100)).unwrap_or(100)
}

/// Per-user document store
///
/// Reads are ordered:
/// - goals and todos newest first by creation time
/// - activities by name
/// - daily logs by date, then creation time, newest first
///
/// Create operations return the stored record with its server id and
/// server timestamp.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All goals of the user
    async fn list_goals(&self, user: &UserId) -> StoreResult<Vec<Goal>>;

    /// Create a goal with zero progress
    async fn create_goal(&self, user: &UserId, title: &str) -> StoreResult<Goal>;

    /// Store a goal's cached percentage, clamped to `0..=100`
    ///
    /// Returns the value actually stored.
    async fn set_goal_progress(&self, user: &UserId, goal_id: &GoalId, percent: i32)
        -> StoreResult<u8>;

    /// Delete a goal; linked todos are left dangling
    async fn delete_goal(&self, user: &UserId, goal_id: &GoalId) -> StoreResult<()>;

    /// All todos of the user
    async fn list_todos(&self, user: &UserId) -> StoreResult<Vec<Todo>>;

    /// Create an open todo
    async fn create_todo(
        &self,
        user: &UserId,
        title: &str,
        goal_id: Option<&GoalId>,
    ) -> StoreResult<Todo>;

    /// Create several open todos in one atomic batch
    ///
    /// Either every todo is written or none is. Results follow `titles` order.
    async fn create_todos_bulk(
        &self,
        user: &UserId,
        titles: &[String],
        goal_id: Option<&GoalId>,
    ) -> StoreResult<Vec<Todo>>;

    /// Mark a todo done or open
    async fn set_todo_done(&self, user: &UserId, todo_id: &TodoId, is_done: bool)
        -> StoreResult<()>;

    /// Delete a todo
    async fn delete_todo(&self, user: &UserId, todo_id: &TodoId) -> StoreResult<()>;

    /// All activities of the user
    async fn list_activities(&self, user: &UserId) -> StoreResult<Vec<Activity>>;

    /// Create an activity label
    async fn create_activity(&self, user: &UserId, name: &str) -> StoreResult<Activity>;

    /// Daily logs dated within `start..=end`
    async fn list_daily_logs(
        &self,
        user: &UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyLog>>;

    /// Create a daily log
    async fn create_daily_log(&self, user: &UserId, entry: &NewDailyLog) -> StoreResult<DailyLog>;

    /// Apply a partial update to a daily log
    async fn update_daily_log(
        &self,
        user: &UserId,
        log_id: &DailyLogId,
        patch: &DailyLogPatch,
    ) -> StoreResult<()>;

    /// Delete a daily log
    async fn delete_daily_log(&self, user: &UserId, log_id: &DailyLogId) -> StoreResult<()>;
}
