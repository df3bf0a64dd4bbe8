//! In-process stand-in for the remote family API.
//!
//! Serves pre-loaded JSON records after a fixed artificial latency and keeps
//! the statistics the real server reports at the end of a run: calls made,
//! calls per id, and the peak number of calls in flight at once.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use super::RecordSource;
use crate::error::{Error, Result};
use crate::record::{Family, Person, RecordKind};

/// Server-side view of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Total calls received, including misses and failures.
    pub api_calls: u64,
    /// Family records available.
    pub families: usize,
    /// Person records available.
    pub persons: usize,
    /// Highest number of calls served concurrently.
    pub peak_concurrency: usize,
}

/// Thread-safe simulated source with a fixed per-call latency.
///
/// Records are loaded through `&mut self` before the source is shared;
/// [`RecordSource::get`] only reads them.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pedigree_core::{Family, FamilyId, InMemorySource, RecordKind, RecordSource};
///
/// let mut source = InMemorySource::new(Duration::ZERO);
/// source.insert_family(&Family::new(FamilyId::new(1).unwrap(), None, None));
///
/// assert!(source.get(RecordKind::Family, 1).unwrap().is_some());
/// assert!(source.get(RecordKind::Family, 2).unwrap().is_none());
/// assert_eq!(source.stats().api_calls, 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemorySource {
    families: FxHashMap<u64, Value>,
    persons: FxHashMap<u64, Value>,
    failing: FxHashSet<(RecordKind, u64)>,
    latency: Duration,
    calls: DashMap<(RecordKind, u64), u64>,
    api_calls: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl InMemorySource {
    /// Creates an empty source answering after `latency`.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Returns the per-call latency.
    #[must_use]
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Serves `family` under its id.
    pub fn insert_family(&mut self, family: &Family) {
        self.families.insert(family.id().get(), family.to_value());
    }

    /// Serves `person` under its id.
    pub fn insert_person(&mut self, person: &Person) {
        self.persons.insert(person.id().get(), person.to_value());
    }

    /// Serves an arbitrary value, e.g. a record that does not decode.
    pub fn insert_raw(&mut self, kind: RecordKind, id: u64, value: Value) {
        self.records_mut(kind).insert(id, value);
    }

    /// Removes a record so that it is reported as not found.
    pub fn remove(&mut self, kind: RecordKind, id: u64) -> Option<Value> {
        self.records_mut(kind).remove(&id)
    }

    /// Makes every call for this record fail with [`Error::Source`].
    pub fn fail(&mut self, kind: RecordKind, id: u64) {
        self.failing.insert((kind, id));
    }

    /// Number of calls received for one record.
    #[must_use]
    pub fn calls_for(&self, kind: RecordKind, id: u64) -> u64 {
        self.calls.get(&(kind, id)).map_or(0, |count| *count)
    }

    /// Highest call count received by any single record.
    #[must_use]
    pub fn max_calls_per_id(&self) -> u64 {
        self.calls.iter().map(|entry| *entry.value()).max().unwrap_or(0)
    }

    /// Snapshot of the server-side statistics.
    #[must_use]
    pub fn stats(&self) -> SourceStats {
        SourceStats {
            api_calls: self.api_calls.load(Ordering::Relaxed),
            families: self.families.len(),
            persons: self.persons.len(),
            peak_concurrency: self.peak_in_flight.load(Ordering::Relaxed),
        }
    }

    /// Zeroes the call statistics, keeping the records.
    pub fn reset_stats(&self) {
        self.calls.clear();
        self.api_calls.store(0, Ordering::Relaxed);
        self.peak_in_flight.store(0, Ordering::Relaxed);
    }

    fn records(&self, kind: RecordKind) -> &FxHashMap<u64, Value> {
        match kind {
            RecordKind::Family => &self.families,
            RecordKind::Person => &self.persons,
        }
    }

    fn records_mut(&mut self, kind: RecordKind) -> &mut FxHashMap<u64, Value> {
        match kind {
            RecordKind::Family => &mut self.families,
            RecordKind::Person => &mut self.persons,
        }
    }

    fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight {
            counter: &self.in_flight,
        }
    }
}

impl RecordSource for InMemorySource {
    fn get(&self, kind: RecordKind, id: u64) -> Result<Option<Value>> {
        let _call = self.enter();
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        *self.calls.entry((kind, id)).or_insert(0) += 1;

        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        if self.failing.contains(&(kind, id)) {
            return Err(Error::source_failed(kind, id, "simulated transport failure"));
        }
        Ok(self.records(kind).get(&id).cloned())
    }
}

/// Decrements the in-flight counter when a call returns.
struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
