//! Entity types
//!
//! Documents as they live in a user's partition of the remote store:
//! - [`Goal`] with its cached progress percentage
//! - [`Todo`], optionally linked to a goal
//! - [`Activity`] labels for time logging
//! - [`DailyLog`] minutes spent on an activity on a calendar day

use crate::ids::{ActivityId, DailyLogId, GoalId, RecordId, TodoId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collections of a user partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// Goals
    Goals,
    /// Todos
    Todos,
    /// Activities
    Activities,
    /// Daily time logs
    DailyLogs,
}

impl Collection {
    /// Document-store collection name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Goals => "goals",
            Collection::Todos => "todos",
            Collection::Activities => "activities",
            Collection::DailyLogs => "dailyLogs",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored document with a typed id
pub trait Record: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Id type of this record
    type Id: RecordId + Send + Sync + 'static;

    /// Collection the record belongs to
    const COLLECTION: Collection;

    /// Record id
    fn id(&self) -> &Self::Id;

    /// Mutable record id (used when a provisional id is reconciled)
    fn id_mut(&mut self) -> &mut Self::Id;
}

/// A user-defined objective tracked by completion percentage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    /// Cached derived value, authoritative state is the todo linkage
    #[serde(default)]
    pub current_percent: u8,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Create a goal with zero progress
    #[inline]
    #[must_use]
    pub fn new(id: GoalId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            current_percent: 0,
            created_at,
        }
    }
}

impl Record for Goal {
    type Id = GoalId;
    const COLLECTION: Collection = Collection::Goals;

    fn id(&self) -> &GoalId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut GoalId {
        &mut self.id
    }
}

/// A discrete task, optionally linked to a goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub goal_id: Option<GoalId>,
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Create an open todo
    #[inline]
    #[must_use]
    pub fn new(
        id: TodoId,
        title: impl Into<String>,
        goal_id: Option<GoalId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            is_done: false,
            goal_id,
            created_at,
        }
    }

    /// Goal link, treating an empty id as no link
    #[inline]
    #[must_use]
    pub fn linked_goal(&self) -> Option<&GoalId> {
        self.goal_id.as_ref().filter(|g| !g.as_str().is_empty())
    }
}

impl Record for Todo {
    type Id = TodoId;
    const COLLECTION: Collection = Collection::Todos;

    fn id(&self) -> &TodoId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut TodoId {
        &mut self.id
    }
}

/// A named category for time logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
}

impl Activity {
    #[inline]
    #[must_use]
    pub fn new(id: ActivityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Record for Activity {
    type Id = ActivityId;
    const COLLECTION: Collection = Collection::Activities;

    fn id(&self) -> &ActivityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut ActivityId {
        &mut self.id
    }
}

/// A dated record of minutes spent on an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub id: DailyLogId,
    pub activity_id: ActivityId,
    /// Denormalized copy of the activity name at logging time
    pub activity_name: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DailyLog {
    /// Materialize a log from a validated entry
    #[must_use]
    pub fn from_entry(id: DailyLogId, entry: NewDailyLog, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            activity_id: entry.activity_id,
            activity_name: entry.activity_name,
            date: entry.date,
            duration_minutes: entry.duration_minutes,
            notes: entry.notes,
            created_at,
        }
    }

    /// Apply a partial update in place; absent fields are left untouched
    pub fn apply(&mut self, patch: &DailyLogPatch) {
        if let Some(activity_id) = &patch.activity_id {
            self.activity_id = activity_id.clone();
        }
        if let Some(name) = &patch.activity_name {
            self.activity_name = name.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(minutes) = patch.duration_minutes {
            self.duration_minutes = minutes;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}

impl Record for DailyLog {
    type Id = DailyLogId;
    const COLLECTION: Collection = Collection::DailyLogs;

    fn id(&self) -> &DailyLogId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut DailyLogId {
        &mut self.id
    }
}

/// A validated daily log ready for persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDailyLog {
    pub activity_id: ActivityId,
    pub activity_name: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

/// Partial update of a daily log
///
/// `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogPatch {
    pub activity_id: Option<ActivityId>,
    pub activity_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub duration_minutes: Option<u32>,
    pub notes: Option<Option<String>>,
}

impl DailyLogPatch {
    /// Whether the patch changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activity_id.is_none()
            && self.activity_name.is_none()
            && self.date.is_none()
            && self.duration_minutes.is_none()
            && self.notes.is_none()
    }
}

/// Profile fields issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl UserProfile {
    /// Profile with only an id
    #[inline]
    #[must_use]
    pub fn new(uid: impl Into<UserId>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            photo_url: None,
        }
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// With email
    #[inline]
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> DailyLog {
        DailyLog {
            id: DailyLogId::new("l1"),
            activity_id: ActivityId::new("a1"),
            activity_name: "Reading".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            duration_minutes: 30,
            notes: Some("chapter 4".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn patch_touches_only_present_fields() {
        let mut log = sample_log();
        let before = log.clone();

        log.apply(&DailyLogPatch {
            duration_minutes: Some(45),
            ..DailyLogPatch::default()
        });

        assert_eq!(log.duration_minutes, 45);
        assert_eq!(log.notes, before.notes);
        assert_eq!(log.activity_name, before.activity_name);
    }

    #[test]
    fn patch_can_clear_notes() {
        let mut log = sample_log();
        log.apply(&DailyLogPatch {
            notes: Some(None),
            ..DailyLogPatch::default()
        });
        assert!(log.notes.is_none());
    }

    #[test]
    fn empty_goal_link_is_no_link() {
        let todo = Todo::new(TodoId::new("t1"), "x", Some(GoalId::new("")), Utc::now());
        assert!(todo.linked_goal().is_none());
    }

    #[test]
    fn goal_deserializes_camel_case() {
        let goal: Goal = serde_json::from_str(
            r#"{"id":"g1","title":"Run","currentPercent":40,"createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(goal.current_percent, 40);
        assert_eq!(Goal::COLLECTION.name(), "goals");
    }
}
