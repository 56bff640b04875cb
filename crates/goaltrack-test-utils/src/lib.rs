//! Testing utilities for goaltrack workspace
//!
//! Shared fixtures, a recording notifier and a ready-to-use client wired to
//! an in-memory store.

#![allow(missing_docs)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use goaltrack_model::{
    Activity, ActivityId, DailyLog, DailyLogId, Goal, GoalId, NewDailyLog, Todo, TodoId,
    UserId, UserProfile,
};
use goaltrack_store::{MemoryStore, StaticIdentity};
use goaltrack_sync::{Notice, Notifier, SyncClient, SyncConfig};
use parking_lot::Mutex;
use std::sync::Arc;

pub const TEST_UID: &str = "user-1";

/// Fixed instant so ordering in fixtures is deterministic
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

/// `epoch()` plus `minutes`
pub fn at(minutes: i64) -> DateTime<Utc> {
    epoch() + Duration::minutes(minutes)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn user() -> UserId {
    UserId::new(TEST_UID)
}

pub fn profile() -> UserProfile {
    UserProfile::new(TEST_UID)
        .with_display_name("Test User")
        .with_email("test@example.com")
}

pub fn goal(id: &str, title: &str) -> Goal {
    Goal::new(GoalId::new(id), title, epoch())
}

pub fn todo(id: &str, goal_id: Option<&str>, is_done: bool) -> Todo {
    let mut todo = Todo::new(TodoId::new(id), format!("todo {id}"), goal_id.map(GoalId::new), epoch());
    todo.is_done = is_done;
    todo
}

pub fn activity(id: &str, name: &str) -> Activity {
    Activity::new(ActivityId::new(id), name)
}

pub fn daily_log(id: &str, activity: &Activity, date: NaiveDate, minutes: u32) -> DailyLog {
    let entry = NewDailyLog {
        activity_id: activity.id.clone(),
        activity_name: activity.name.clone(),
        date,
        duration_minutes: minutes,
        notes: None,
    };
    DailyLog::from_entry(DailyLogId::new(id), entry, epoch())
}

/// Notifier that keeps every notice for later assertions
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Everything a sync test needs
pub struct TestHarness {
    pub client: SyncClient,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<StaticIdentity>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Client signed in as [`TEST_UID`] over an empty in-memory store
pub fn setup_client() -> TestHarness {
    setup_client_with(SyncConfig::default())
}

pub fn setup_client_with(config: SyncConfig) -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(StaticIdentity::signed_in(profile()));
    let notifier = Arc::new(RecordingNotifier::new());
    let client = SyncClient::new(store.clone(), identity.clone())
        .with_notifier(notifier.clone())
        .with_config(config);
    TestHarness {
        client,
        store,
        identity,
        notifier,
    }
}
