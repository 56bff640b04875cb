//! Activity and daily-log mutations

use crate::client::SyncClient;
use crate::error::{SyncError, SyncResult};
use crate::mutation::{commit_ids, Action, MutationReport, Pending};
use chrono::{NaiveDate, Utc};
use goaltrack_model::{
    validation, Activity, ActivityId, Collection, DailyLog, DailyLogId, DailyLogPatch,
    NewDailyLog, RecordId, ValidationError,
};

/// Raw daily-log input, validated by [`SyncClient::add_daily_log`]
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLogDraft {
    /// Activity the time was spent on; must be loaded and confirmed
    pub activity_id: ActivityId,
    /// Day the time counts toward
    pub date: NaiveDate,
    /// Minutes as typed; fractional values round to whole minutes
    pub duration_minutes: f64,
    /// Free-form notes
    pub notes: Option<String>,
}

impl DailyLogDraft {
    /// Create a draft without notes
    #[inline]
    #[must_use]
    pub fn new(activity_id: ActivityId, date: NaiveDate, duration_minutes: f64) -> Self {
        Self {
            activity_id,
            date,
            duration_minutes,
            notes: None,
        }
    }

    /// With notes
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Raw daily-log edit, validated by [`SyncClient::update_daily_log`]
///
/// `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyLogUpdate {
    /// New activity
    pub activity_id: Option<ActivityId>,
    /// New day
    pub date: Option<NaiveDate>,
    /// New duration in minutes, rounded like a draft
    pub duration_minutes: Option<f64>,
    /// New notes, or `Some(None)` to clear them
    pub notes: Option<Option<String>>,
}

impl DailyLogUpdate {
    /// Change the duration
    #[inline]
    #[must_use]
    pub fn duration(mut self, minutes: f64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Move to another day
    #[inline]
    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Reassign to another activity
    #[inline]
    #[must_use]
    pub fn activity(mut self, activity_id: ActivityId) -> Self {
        self.activity_id = Some(activity_id);
        self
    }

    /// Replace or clear the notes
    #[inline]
    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }
}

impl SyncClient {
    /// Create an activity label
    ///
    /// # Errors
    /// `Validation` for a bad name, `NotSignedIn`
    pub async fn add_activity(&self, name: &str) -> SyncResult<MutationReport<Activity, ActivityId>> {
        let name = validation::activity_name(name, &self.config.limits)?;
        let user = self.user()?;

        let temp = ActivityId::temporary();
        let provisional = Activity::new(temp.clone(), name.clone());
        let pending = Pending::begin(self.cache.activities(), |activities| {
            activities.insert_front([provisional]);
        });

        let result = self
            .store
            .create_activity(&user, &name)
            .await
            .map(|activity| activity.id);
        let (snapshot, outcome) = self.settle(Action::AddActivity, pending, result, |activities, id| {
            commit_ids(activities, std::slice::from_ref(&temp), std::slice::from_ref(id));
        });

        Ok(self
            .finish(&user, Action::AddActivity, snapshot, outcome, None)
            .await)
    }

    /// Log minutes spent on an activity
    ///
    /// The duration is checked before anything else; NaN, infinite, zero
    /// and negative values never reach the store.
    ///
    /// # Errors
    /// `Validation` for a bad duration or notes, `NotSignedIn`, `NotCached`
    /// or `PendingReference` for the activity
    pub async fn add_daily_log(
        &self,
        draft: DailyLogDraft,
    ) -> SyncResult<MutationReport<DailyLog, DailyLogId>> {
        let limits = &self.config.limits;
        let duration_minutes = validation::duration_minutes(draft.duration_minutes, limits)?;
        let notes = validation::notes(draft.notes.as_deref(), limits)?;
        let user = self.user()?;
        let activity = self.cached_activity(&draft.activity_id)?;

        let entry = NewDailyLog {
            activity_id: activity.id,
            activity_name: activity.name,
            date: draft.date,
            duration_minutes,
            notes,
        };
        let temp = DailyLogId::temporary();
        let provisional = DailyLog::from_entry(temp.clone(), entry.clone(), Utc::now());
        let pending = Pending::begin(self.cache.daily_logs(), |logs| {
            logs.insert_front([provisional]);
        });

        let result = self
            .store
            .create_daily_log(&user, &entry)
            .await
            .map(|log| log.id);
        let (snapshot, outcome) = self.settle(Action::AddDailyLog, pending, result, |logs, id| {
            commit_ids(logs, std::slice::from_ref(&temp), std::slice::from_ref(id));
        });

        Ok(self
            .finish(&user, Action::AddDailyLog, snapshot, outcome, None)
            .await)
    }

    /// Edit a daily log; only the given fields change
    ///
    /// # Errors
    /// `Validation` for bad fields or an empty update, `NotSignedIn`,
    /// `NotCached` / `PendingReference` for the log or the new activity
    pub async fn update_daily_log(
        &self,
        log_id: &DailyLogId,
        update: DailyLogUpdate,
    ) -> SyncResult<MutationReport<DailyLog, ()>> {
        let limits = &self.config.limits;
        let duration_minutes = update
            .duration_minutes
            .map(|minutes| validation::duration_minutes(minutes, limits))
            .transpose()?;
        let notes = update
            .notes
            .as_ref()
            .map(|notes| validation::notes(notes.as_deref(), limits))
            .transpose()?;
        if duration_minutes.is_none()
            && notes.is_none()
            && update.date.is_none()
            && update.activity_id.is_none()
        {
            return Err(ValidationError::EmptyPatch.into());
        }

        let user = self.user()?;
        self.cached_log(log_id)?;
        let activity = update
            .activity_id
            .as_ref()
            .map(|id| self.cached_activity(id))
            .transpose()?;

        let patch = DailyLogPatch {
            activity_name: activity.as_ref().map(|a| a.name.clone()),
            activity_id: activity.map(|a| a.id),
            date: update.date,
            duration_minutes,
            notes,
        };
        let pending = Pending::begin(self.cache.daily_logs(), |logs| {
            logs.update(log_id, |log| log.apply(&patch));
        });

        let result = self.store.update_daily_log(&user, log_id, &patch).await;
        let (snapshot, outcome) = self.settle(Action::UpdateDailyLog, pending, result, |_, _| {});

        Ok(self
            .finish(&user, Action::UpdateDailyLog, snapshot, outcome, None)
            .await)
    }

    /// Delete a daily log
    ///
    /// # Errors
    /// `NotSignedIn`, `NotCached` / `PendingReference` for the log
    pub async fn delete_daily_log(
        &self,
        log_id: &DailyLogId,
    ) -> SyncResult<MutationReport<DailyLog, ()>> {
        let user = self.user()?;
        self.cached_log(log_id)?;

        let pending = Pending::begin(self.cache.daily_logs(), |logs| {
            logs.remove(log_id);
        });

        let result = self.store.delete_daily_log(&user, log_id).await;
        let (snapshot, outcome) = self.settle(Action::DeleteDailyLog, pending, result, |_, _| {});

        Ok(self
            .finish(&user, Action::DeleteDailyLog, snapshot, outcome, None)
            .await)
    }

    fn cached_activity(&self, activity_id: &ActivityId) -> SyncResult<Activity> {
        if activity_id.is_temporary() {
            return Err(SyncError::pending(Collection::Activities, activity_id));
        }
        self.cache
            .activities()
            .get(activity_id)
            .ok_or_else(|| SyncError::not_cached(Collection::Activities, activity_id))
    }

    fn cached_log(&self, log_id: &DailyLogId) -> SyncResult<DailyLog> {
        if log_id.is_temporary() {
            return Err(SyncError::pending(Collection::DailyLogs, log_id));
        }
        self.cache
            .daily_logs()
            .get(log_id)
            .ok_or_else(|| SyncError::not_cached(Collection::DailyLogs, log_id))
    }
}
