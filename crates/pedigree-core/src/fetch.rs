//! Deduplicating fetches in front of the remote source.
//!
//! The [`Fetcher`] answers from the [`GraphStore`] when it can and goes to
//! the [`RecordSource`] otherwise. The store lock is taken for the lookup
//! and again for the insert, never across the network call. The insert
//! re-checks existence under the lock, so two racing fetches of one id both
//! return the record that was stored first.
//!
//! Missing ids, source failures and malformed records all come back as
//! `None`: the caller prunes that branch and the traversal carries on.

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::record::{Family, FamilyId, Person, PersonId, RecordKind};
use crate::source::RecordSource;
use crate::store::{GraphStore, Insert};

/// Per-run fetch counters.
///
/// Relaxed ordering throughout: the counters are reporting only and do not
/// synchronize anything.
#[derive(Debug, Default)]
pub struct FetchStats {
    network_calls: AtomicU64,
    store_hits: AtomicU64,
    not_found: AtomicU64,
    failures: AtomicU64,
    discarded: AtomicU64,
}

impl FetchStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn record_network_call(&self) {
        self.network_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_store_hit(&self) {
        self.store_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> FetchSnapshot {
        FetchSnapshot {
            network_calls: self.network_calls.load(Ordering::Relaxed),
            store_hits: self.store_hits.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of [`FetchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSnapshot {
    /// Calls issued to the source.
    pub network_calls: u64,
    /// Requests answered from the store without a call.
    pub store_hits: u64,
    /// Calls for which the source had no record.
    pub not_found: u64,
    /// Calls that failed or returned a malformed record.
    pub failures: u64,
    /// Fetched records dropped because a racing fetch stored the id first.
    pub discarded: u64,
}

/// The fetch deduplicator shared by all threads of one traversal run.
pub struct Fetcher<'a> {
    store: &'a GraphStore,
    source: &'a dyn RecordSource,
    stats: FetchStats,
}

impl<'a> Fetcher<'a> {
    /// Creates a fetcher writing into `store`.
    #[must_use]
    pub fn new(store: &'a GraphStore, source: &'a dyn RecordSource) -> Self {
        Self {
            store,
            source,
            stats: FetchStats::new(),
        }
    }

    /// Returns the destination store.
    #[must_use]
    pub fn store(&self) -> &'a GraphStore {
        self.store
    }

    /// Returns the counters so far.
    #[must_use]
    pub fn stats(&self) -> FetchSnapshot {
        self.stats.snapshot()
    }

    /// Fetches a family, or `None` if it is absent or unusable.
    pub fn fetch_family(&self, id: Option<FamilyId>) -> Option<Arc<Family>> {
        let id = id?;
        self.fetch_with(
            RecordKind::Family,
            id,
            id.get(),
            GraphStore::family,
            Family::from_value,
            GraphStore::insert_family,
        )
    }

    /// Fetches a person, or `None` if they are absent or unusable.
    pub fn fetch_person(&self, id: Option<PersonId>) -> Option<Arc<Person>> {
        let id = id?;
        self.fetch_with(
            RecordKind::Person,
            id,
            id.get(),
            GraphStore::person,
            Person::from_value,
            GraphStore::insert_person,
        )
    }

    fn fetch_with<T, I>(
        &self,
        kind: RecordKind,
        id: I,
        raw: u64,
        lookup: impl FnOnce(&GraphStore, I) -> Option<Arc<T>>,
        decode: impl FnOnce(I, Value) -> Result<T>,
        insert: impl FnOnce(&GraphStore, T) -> Insert<T>,
    ) -> Option<Arc<T>>
    where
        I: Copy + Display,
    {
        // Fast path; the insert below re-checks under the lock.
        if let Some(record) = lookup(self.store, id) {
            self.stats.record_store_hit();
            return Some(record);
        }

        self.stats.record_network_call();
        debug!(kind = %kind, id = %id, "fetching record");
        let value = match self.source.get(kind, raw) {
            Ok(Some(value)) => value,
            Ok(None) => {
                self.stats.record_not_found();
                debug!(kind = %kind, id = %id, "record not found");
                return None;
            }
            Err(err) => {
                self.stats.record_failure();
                warn!(kind = %kind, id = %id, error = %err, "fetch failed, pruning branch");
                return None;
            }
        };

        let record = match decode(id, value) {
            Ok(record) => record,
            Err(err) => {
                self.stats.record_failure();
                warn!(kind = %kind, id = %id, error = %err, "malformed record, pruning branch");
                return None;
            }
        };

        match insert(self.store, record) {
            Insert::Inserted(record) => Some(record),
            Insert::Existing(record) => {
                self.stats.record_discarded();
                debug!(kind = %kind, id = %id, "racing fetch stored the record first");
                Some(record)
            }
        }
    }
}
