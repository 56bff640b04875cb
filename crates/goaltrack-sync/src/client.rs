//! Sync client
//!
//! Owns the wiring between the injected collaborators:
//! - remote store (writes and reconciling reads)
//! - identity provider (who the partition belongs to)
//! - local cache (optimistic state)
//! - notifier (rollback notices)
//!
//! Mutations live in `goals`, `todos` and `logs`; this module holds reads
//! and the settle/reconcile plumbing they share.

use crate::cache::{LocalCache, Snapshot};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::mutation::{Action, MutationOutcome, MutationReport, Pending, ProgressSync};
use crate::notify::{Notice, Notifier, TracingNotifier};
use chrono::{Local, NaiveDate};
use goaltrack_model::{
    Activity, Collection, DailyLog, DateRange, Goal, GoalId, Record, RecordId, Todo, UserId,
};
use goaltrack_progress::{
    aggregate, minutes_by_activity, minutes_by_day, progress_for, ActivityTotal, DayTotal,
    GoalProgress, ProgressMap,
};
use goaltrack_store::{IdentityProvider, RemoteStore, StoreResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// Optimistic client over a remote store
pub struct SyncClient {
    pub(crate) store: Arc<dyn RemoteStore>,
    identity: Arc<dyn IdentityProvider>,
    pub(crate) cache: Arc<LocalCache>,
    notifier: Arc<dyn Notifier>,
    pub(crate) config: SyncConfig,
    log_window: Mutex<Option<DateRange>>,
    owner: Mutex<Option<UserId>>,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owner = self.owner.lock().clone();
        let log_window = *self.log_window.lock();
        f.debug_struct("SyncClient")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .field("owner", &owner)
            .field("log_window", &log_window)
            .finish_non_exhaustive()
    }
}

impl SyncClient {
    /// Create a client with an empty cache and log-only notices
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            cache: Arc::new(LocalCache::new()),
            notifier: Arc::new(TracingNotifier),
            config: SyncConfig::default(),
            log_window: Mutex::new(None),
            owner: Mutex::new(None),
        }
    }

    /// With a shared cache
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<LocalCache>) -> Self {
        self.cache = cache;
        self
    }

    /// With a notifier
    #[inline]
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Get the local cache
    ///
    /// Raw access skips the signed-in user check done by the read methods.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    /// Daily-log window currently loaded, if any
    #[must_use]
    pub fn log_window(&self) -> Option<DateRange> {
        self.bind_owner();
        *self.log_window.lock()
    }

    /// Forget all cached state, e.g. after sign-out
    pub fn reset(&self) {
        let mut owner = self.owner.lock();
        self.clear_locked(&mut owner);
    }

    pub(crate) fn user(&self) -> SyncResult<UserId> {
        self.bind_owner().ok_or(SyncError::NotSignedIn)
    }

    /// Tie the cache to the signed-in user
    ///
    /// Cached records belong to exactly one user. When the identity has
    /// changed, or nobody is signed in, the cache is emptied before anything
    /// is read from it.
    fn bind_owner(&self) -> Option<UserId> {
        let current = self.identity.current_user_id();
        let mut owner = self.owner.lock();
        if *owner != current {
            if owner.is_some() {
                tracing::info!(previous = ?*owner, current = ?current, "signed-in user changed");
                self.clear_locked(&mut owner);
            }
            owner.clone_from(&current);
        }
        current
    }

    fn clear_locked(&self, owner: &mut Option<UserId>) {
        self.cache.clear();
        *self.log_window.lock() = None;
        *owner = None;
        tracing::info!("local cache cleared");
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Cached goals
    #[must_use]
    pub fn goals(&self) -> Vec<Goal> {
        self.bind_owner();
        self.cache.goals().items()
    }

    /// Cached todos
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.bind_owner();
        self.cache.todos().items()
    }

    /// Cached activities
    #[must_use]
    pub fn activities(&self) -> Vec<Activity> {
        self.bind_owner();
        self.cache.activities().items()
    }

    /// Cached daily logs
    #[must_use]
    pub fn daily_logs(&self) -> Vec<DailyLog> {
        self.bind_owner();
        self.cache.daily_logs().items()
    }

    /// Progress of every cached goal, derived from the cached todos
    #[must_use]
    pub fn progress(&self) -> ProgressMap {
        aggregate(&self.goals(), &self.todos())
    }

    /// Progress of one cached goal
    #[must_use]
    pub fn goal_progress(&self, goal_id: &GoalId) -> Option<GoalProgress> {
        self.bind_owner();
        self.cache
            .goals()
            .contains(goal_id)
            .then(|| progress_for(goal_id, &self.todos()))
    }

    /// Cached minutes per activity
    #[must_use]
    pub fn activity_totals(&self) -> Vec<ActivityTotal> {
        minutes_by_activity(&self.daily_logs())
    }

    /// Cached minutes per day over `range`
    #[must_use]
    pub fn day_totals(&self, range: DateRange) -> Vec<DayTotal> {
        minutes_by_day(&self.daily_logs(), range.start, range.end)
    }

    /// Reload goals; returns whether the result was applied
    ///
    /// # Errors
    /// `NotSignedIn`, or `Store` when the read fails
    pub async fn refresh_goals(&self) -> SyncResult<bool> {
        let user = self.user()?;
        Ok(self.fetch_goals(&user).await?)
    }

    /// Reload todos; returns whether the result was applied
    ///
    /// # Errors
    /// `NotSignedIn`, or `Store` when the read fails
    pub async fn refresh_todos(&self) -> SyncResult<bool> {
        let user = self.user()?;
        Ok(self.fetch_todos(&user).await?)
    }

    /// Reload activities; returns whether the result was applied
    ///
    /// # Errors
    /// `NotSignedIn`, or `Store` when the read fails
    pub async fn refresh_activities(&self) -> SyncResult<bool> {
        let user = self.user()?;
        Ok(self.fetch_activities(&user).await?)
    }

    /// Load daily logs for `range`, making it the current window
    ///
    /// # Errors
    /// `NotSignedIn`, or `Store` when the read fails
    pub async fn refresh_daily_logs(&self, range: DateRange) -> SyncResult<bool> {
        let user = self.user()?;
        *self.log_window.lock() = Some(range);
        Ok(self.fetch_daily_logs(&user, range).await?)
    }

    /// Reload every collection concurrently
    ///
    /// Without a range, the daily-log window defaults to the configured
    /// number of days ending today.
    ///
    /// # Errors
    /// `NotSignedIn`, or the first failing read
    pub async fn refresh_all(&self, range: Option<DateRange>) -> SyncResult<()> {
        let user = self.user()?;
        let range = range.unwrap_or_else(|| self.default_window(Local::now().date_naive()));
        *self.log_window.lock() = Some(range);

        futures::try_join!(
            self.fetch_goals(&user),
            self.fetch_todos(&user),
            self.fetch_activities(&user),
            self.fetch_daily_logs(&user, range),
        )?;
        tracing::info!(uid = %user, "all collections refreshed");
        Ok(())
    }

    pub(crate) fn default_window(&self, today: NaiveDate) -> DateRange {
        DateRange::ending_on(today, self.config.log_window_days)
    }

    async fn fetch_goals(&self, user: &UserId) -> StoreResult<bool> {
        let ticket = self.cache.goals().begin_fetch();
        let goals = self.store.list_goals(user).await?;
        Ok(self.cache.goals().finish_fetch(ticket, goals))
    }

    async fn fetch_todos(&self, user: &UserId) -> StoreResult<bool> {
        let ticket = self.cache.todos().begin_fetch();
        let todos = self.store.list_todos(user).await?;
        Ok(self.cache.todos().finish_fetch(ticket, todos))
    }

    async fn fetch_activities(&self, user: &UserId) -> StoreResult<bool> {
        let ticket = self.cache.activities().begin_fetch();
        let activities = self.store.list_activities(user).await?;
        Ok(self.cache.activities().finish_fetch(ticket, activities))
    }

    async fn fetch_daily_logs(&self, user: &UserId, range: DateRange) -> StoreResult<bool> {
        let ticket = self.cache.daily_logs().begin_fetch();
        let logs = self.store.list_daily_logs(user, range.start, range.end).await?;
        Ok(self.cache.daily_logs().finish_fetch(ticket, logs))
    }

    // ------------------------------------------------------------------
    // Settle / reconcile
    // ------------------------------------------------------------------

    /// Commit or roll back a pending mutation from the store's answer
    pub(crate) fn settle<T: Record, C>(
        &self,
        action: Action,
        pending: Pending<'_, T>,
        result: StoreResult<C>,
        reconcile: impl FnOnce(&crate::cache::CollectionCache<T>, &C),
    ) -> (Snapshot<T>, MutationOutcome<C>) {
        match result {
            Ok(value) => {
                let snapshot = pending.commit(|cache| reconcile(cache, &value));
                tracing::info!(%action, "mutation committed");
                (snapshot, MutationOutcome::Committed(value))
            }
            Err(error) => {
                let snapshot = pending.rollback();
                tracing::warn!(%action, %error, "mutation rolled back");
                self.notifier.notify(Notice::rolled_back(action, &error));
                (snapshot, MutationOutcome::RolledBack(error))
            }
        }
    }

    /// Recompute a goal's percentage from cached todos and push it
    ///
    /// Best effort: a failed push is reported, never rolled back. Goals that
    /// are not cached (dangling links) are skipped.
    pub(crate) async fn push_goal_progress(
        &self,
        user: &UserId,
        goal_id: Option<&GoalId>,
    ) -> Option<ProgressSync> {
        let goal_id = goal_id?;
        if goal_id.is_temporary() || !self.cache.goals().contains(goal_id) {
            tracing::debug!(%goal_id, "skipping progress push for unknown goal");
            return None;
        }

        let progress = progress_for(goal_id, &self.cache.todos().items());
        self.cache.goals().supersede();
        self.cache
            .goals()
            .update(goal_id, |goal| goal.current_percent = progress.percent);

        match self
            .store
            .set_goal_progress(user, goal_id, i32::from(progress.percent))
            .await
        {
            Ok(percent) => {
                tracing::debug!(%goal_id, percent, "goal progress pushed");
                Some(ProgressSync::Pushed {
                    goal_id: goal_id.clone(),
                    percent,
                })
            }
            Err(error) => {
                tracing::warn!(%goal_id, %error, "goal progress push failed, keeping todo change");
                Some(ProgressSync::Failed {
                    goal_id: goal_id.clone(),
                    percent: progress.percent,
                    error,
                })
            }
        }
    }

    /// Assemble the report, running the reconciling refresh first
    pub(crate) async fn finish<T: Record, C>(
        &self,
        user: &UserId,
        action: Action,
        snapshot: Snapshot<T>,
        outcome: MutationOutcome<C>,
        progress_sync: Option<ProgressSync>,
    ) -> MutationReport<T, C> {
        // the cache must not keep records restored for a user who signed
        // out while the write was in flight
        let refreshed = if self.bind_owner().as_ref() == Some(user) {
            self.reconcile(user, T::COLLECTION, progress_sync.is_some())
                .await
        } else {
            self.reset();
            false
        };
        MutationReport {
            action,
            snapshot,
            outcome,
            progress_sync,
            refreshed,
        }
    }

    /// Refresh after a mutation settles, on both success and failure
    async fn reconcile(&self, user: &UserId, collection: Collection, with_goals: bool) -> bool {
        if !self.config.refresh_after_settle {
            return false;
        }
        let mut refreshed = self.refresh_quietly(user, collection).await;
        if with_goals && collection != Collection::Goals {
            refreshed &= self.refresh_quietly(user, Collection::Goals).await;
        }
        refreshed
    }

    async fn refresh_quietly(&self, user: &UserId, collection: Collection) -> bool {
        let result = match collection {
            Collection::Goals => self.fetch_goals(user).await,
            Collection::Todos => self.fetch_todos(user).await,
            Collection::Activities => self.fetch_activities(user).await,
            Collection::DailyLogs => match self.log_window() {
                Some(range) => self.fetch_daily_logs(user, range).await,
                None => Ok(false),
            },
        };
        result.unwrap_or_else(|error| {
            tracing::warn!(%collection, %error, "reconciling refresh failed");
            false
        })
    }
}
