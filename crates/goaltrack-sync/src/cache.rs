//! Local collection cache
//!
//! [`LocalCache`] is the only writer-owned copy of a user's documents on the
//! client. It is constructed explicitly and handed to the client, so tests
//! and views can share or replace it.
//!
//! Each collection carries an epoch. A fetch takes a [`FetchTicket`] stamped
//! with the epoch at start; [`CollectionCache::supersede`] bumps the epoch so
//! that a fetch started before an optimistic write cannot overwrite it with
//! stale data when it lands.

use goaltrack_model::{Activity, Collection, DailyLog, Goal, Record, Todo};
use parking_lot::RwLock;

/// Copy of a collection's records at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    items: Vec<T>,
}

impl<T> Snapshot<T> {
    /// Records in cache order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the snapshot is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the records
    #[inline]
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Handle for an in-flight fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    /// Collection being fetched
    pub collection: Collection,
    epoch: u64,
}

#[derive(Debug)]
struct CacheState<T> {
    items: Vec<T>,
    epoch: u64,
    loaded: bool,
}

/// Cached records of one collection
#[derive(Debug)]
pub struct CollectionCache<T: Record> {
    state: RwLock<CacheState<T>>,
}

impl<T: Record> Default for CollectionCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> CollectionCache<T> {
    /// Create an empty, unloaded cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                items: Vec::new(),
                epoch: 0,
                loaded: false,
            }),
        }
    }

    /// Collection cached here
    #[inline]
    #[must_use]
    pub fn collection(&self) -> Collection {
        T::COLLECTION
    }

    /// Copy of the cached records
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.state.read().items.clone()
    }

    /// Copy of one record
    #[must_use]
    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.state.read().items.iter().find(|r| r.id() == id).cloned()
    }

    /// Whether a record is cached
    #[must_use]
    pub fn contains(&self, id: &T::Id) -> bool {
        self.state.read().items.iter().any(|r| r.id() == id)
    }

    /// Number of cached records
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    /// Whether nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    /// Whether a fetch has completed at least once
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    /// Current epoch
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.state.read().epoch
    }

    /// Capture the current records
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            items: self.items(),
        }
    }

    /// Replace the records with a snapshot, verbatim
    pub fn restore(&self, snapshot: Snapshot<T>) {
        self.state.write().items = snapshot.items;
    }

    /// Prepend records, keeping their given order
    pub fn insert_front(&self, records: impl IntoIterator<Item = T>) {
        let mut state = self.state.write();
        let tail = std::mem::take(&mut state.items);
        state.items = records.into_iter().chain(tail).collect();
    }

    /// Swap a provisional id for the server id, in place
    ///
    /// Only the matching record's id changes. Returns whether a record
    /// matched.
    pub fn replace_id(&self, temporary: &T::Id, server: &T::Id) -> bool {
        let mut state = self.state.write();
        match state.items.iter_mut().find(|r| r.id() == temporary) {
            Some(record) => {
                *record.id_mut() = server.clone();
                true
            }
            None => false,
        }
    }

    /// Mutate one record in place; returns whether it was found
    pub fn update(&self, id: &T::Id, f: impl FnOnce(&mut T)) -> bool {
        let mut state = self.state.write();
        match state.items.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    /// Remove one record
    pub fn remove(&self, id: &T::Id) -> Option<T> {
        let mut state = self.state.write();
        let idx = state.items.iter().position(|r| r.id() == id)?;
        Some(state.items.remove(idx))
    }

    /// Invalidate every fetch started before now
    pub fn supersede(&self) {
        let mut state = self.state.write();
        state.epoch += 1;
        tracing::trace!(collection = %T::COLLECTION, epoch = state.epoch, "in-flight fetches superseded");
    }

    /// Empty the cache and mark it unloaded, superseding in-flight fetches
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.epoch += 1;
        state.items.clear();
        state.loaded = false;
    }

    /// Start a fetch
    #[must_use]
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket {
            collection: T::COLLECTION,
            epoch: self.epoch(),
        }
    }

    /// Land a fetch result
    ///
    /// Discarded when the ticket has been superseded. Returns whether the
    /// records were applied.
    pub fn finish_fetch(&self, ticket: FetchTicket, records: Vec<T>) -> bool {
        let mut state = self.state.write();
        if ticket.epoch != state.epoch {
            tracing::debug!(
                collection = %T::COLLECTION,
                ticket = ticket.epoch,
                current = state.epoch,
                "discarding superseded fetch"
            );
            return false;
        }
        state.items = records;
        state.loaded = true;
        true
    }
}

/// Cached documents of the signed-in user
#[derive(Debug, Default)]
pub struct LocalCache {
    goals: CollectionCache<Goal>,
    todos: CollectionCache<Todo>,
    activities: CollectionCache<Activity>,
    daily_logs: CollectionCache<DailyLog>,
}

impl LocalCache {
    /// Create an empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Goals
    #[inline]
    #[must_use]
    pub fn goals(&self) -> &CollectionCache<Goal> {
        &self.goals
    }

    /// Todos
    #[inline]
    #[must_use]
    pub fn todos(&self) -> &CollectionCache<Todo> {
        &self.todos
    }

    /// Activities
    #[inline]
    #[must_use]
    pub fn activities(&self) -> &CollectionCache<Activity> {
        &self.activities
    }

    /// Daily logs
    #[inline]
    #[must_use]
    pub fn daily_logs(&self) -> &CollectionCache<DailyLog> {
        &self.daily_logs
    }

    /// Drop everything, e.g. after sign-out
    pub fn clear(&self) {
        self.goals.reset();
        self.todos.reset();
        self.activities.reset();
        self.daily_logs.reset();
    }

    /// Supersede in-flight fetches of one collection
    pub fn supersede(&self, collection: Collection) {
        match collection {
            Collection::Goals => self.goals.supersede(),
            Collection::Todos => self.todos.supersede(),
            Collection::Activities => self.activities.supersede(),
            Collection::DailyLogs => self.daily_logs.supersede(),
        }
    }
}
