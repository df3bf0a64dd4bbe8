//! Ancestor traversal strategies.
//!
//! Both strategies start from one family, fetch its people, follow the
//! husband's and wife's parent-family links, and stop when every chain ends
//! at an absent link, a missing record, or an already visited family. A
//! family id is marked visited before it is fetched, so each reachable family
//! is processed exactly once per run.
//!
//! - [`Strategy::DepthFirst`]: recursive. A family's people are fetched by
//!   one scoped thread each and joined before descending, husband's line
//!   first.
//! - [`Strategy::BreadthFirst`]: `workers` threads pull family ids from a
//!   shared channel. The run ends when the count of outstanding families
//!   reaches zero; the shutdown channel is then closed and every worker is
//!   joined.
//!
//! All run state (visited set, queue, counters) lives in values created per
//! call, so several traversals may run side by side.

mod breadth_first;
mod depth_first;
mod visited;


use visited::VisitedFamilies;

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::fetch::{FetchSnapshot, Fetcher};
use crate::record::{Family, FamilyId};
use crate::source::RecordSource;
use crate::store::GraphStore;

/// Worker count of the unrestricted breadth-first run.
pub const DEFAULT_BFS_WORKERS: usize = 20;

/// Worker count of the breadth-first run limited to 5 concurrent calls.
pub const LIMITED_BFS_WORKERS: usize = 5;

/// How a traversal walks the ancestor graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Recursive walk with a per-family fan-out of person fetches.
    DepthFirst,
    /// Shared queue drained by a fixed pool of workers.
    BreadthFirst {
        /// Number of worker threads (at least 1).
        workers: usize,
    },
}

impl Strategy {
    /// Breadth-first with `workers` threads, clamped to at least 1.
    #[must_use]
    pub fn breadth_first(workers: usize) -> Self {
        Strategy::BreadthFirst {
            workers: workers.max(1),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::breadth_first(DEFAULT_BFS_WORKERS)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::DepthFirst => f.write_str("Depth First Search"),
            Strategy::BreadthFirst { workers } => {
                write!(f, "Breadth First Search ({workers} workers)")
            }
        }
    }
}

/// Outcome of one traversal run.
#[derive(Debug, Clone)]
pub struct TraversalReport {
    /// Strategy used.
    pub strategy: Strategy,
    /// Start family, if any.
    pub start: Option<FamilyId>,
    /// Families in the store at the end of the run.
    pub families: usize,
    /// Persons in the store at the end of the run.
    pub persons: usize,
    /// Families whose people and parents were expanded.
    pub families_processed: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Fetch counters of the run.
    pub fetch: FetchSnapshot,
}

impl TraversalReport {
    /// Families plus persons retrieved per second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Reason: record counts stay far below 2^52
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        (self.families + self.persons) as f64 / secs
    }
}

/// Entry point for pedigree traversals over one source.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pedigree_core::{GraphStore, PedigreeGenerator, PedigreeTraverser};
///
/// let pedigree = PedigreeGenerator::new(1).generations(3).generate();
/// let source = pedigree.to_source(Duration::ZERO);
/// let store = GraphStore::new();
///
/// let report = PedigreeTraverser::new(&source).depth_first(Some(pedigree.start), &store);
/// assert_eq!(report.families, 7);
/// assert_eq!(store.family_ids(), pedigree.family_ids());
/// ```
#[derive(Clone, Copy)]
pub struct PedigreeTraverser<'a> {
    source: &'a dyn RecordSource,
}

impl<'a> PedigreeTraverser<'a> {
    /// Creates a traverser reading from `source`.
    #[must_use]
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self { source }
    }

    /// Depth-first retrieval of every ancestor family of `start` into `store`.
    pub fn depth_first(&self, start: Option<FamilyId>, store: &GraphStore) -> TraversalReport {
        self.run(start, store, Strategy::DepthFirst)
    }

    /// Breadth-first retrieval with `workers` threads (at least 1).
    pub fn breadth_first(
        &self,
        start: Option<FamilyId>,
        store: &GraphStore,
        workers: usize,
    ) -> TraversalReport {
        self.run(start, store, Strategy::breadth_first(workers))
    }

    /// Runs `strategy` from `start`, replacing the contents of `store`.
    ///
    /// Returns once every reachable family and person is stored.
    pub fn run(
        &self,
        start: Option<FamilyId>,
        store: &GraphStore,
        strategy: Strategy,
    ) -> TraversalReport {
        if !store.is_empty() {
            debug!("discarding records of a previous run");
            store.clear();
        }

        info!(strategy = %strategy, start = ?start.map(FamilyId::get), "traversal started");
        let started = Instant::now();
        let fetcher = Fetcher::new(store, self.source);

        let families_processed = match strategy {
            Strategy::DepthFirst => depth_first::run(start, &fetcher),
            Strategy::BreadthFirst { workers } => {
                breadth_first::run(start, &fetcher, workers.max(1))
            }
        };

        let report = TraversalReport {
            strategy,
            start,
            families: store.family_count(),
            persons: store.person_count(),
            families_processed,
            elapsed: started.elapsed(),
            fetch: fetcher.stats(),
        };
        info!(
            strategy = %strategy,
            families = report.families,
            persons = report.persons,
            network_calls = report.fetch.network_calls,
            elapsed = ?report.elapsed,
            "traversal finished"
        );
        report
    }
}

/// Distinct parent families of the husband then the wife, as stored.
fn parent_families(store: &GraphStore, family: &Family) -> Vec<FamilyId> {
    let mut parents = Vec::with_capacity(2);
    for spouse in family.spouses() {
        if let Some(parent) = store.person(spouse).and_then(|person| person.parent()) {
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
    }
    parents
}
