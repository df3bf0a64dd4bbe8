//! Recursive depth-first retrieval.
//!
//! Per family: claim the id, fetch the family, fan out one scoped thread per
//! person and join them all, then recurse into the husband's parent family
//! and afterwards the wife's. Concurrency is bounded by the size of one
//! family, not by a pool.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use tracing::{debug, warn};

use super::{parent_families, VisitedFamilies};
use crate::fetch::Fetcher;
use crate::record::{Family, FamilyId};

/// Walks the ancestors of `start`; returns the number of families expanded.
pub(super) fn run(start: Option<FamilyId>, fetcher: &Fetcher<'_>) -> usize {
    let mut walk = DepthFirst {
        fetcher,
        visited: VisitedFamilies::new(),
        processed: 0,
    };
    walk.visit(start);
    walk.processed
}

struct DepthFirst<'f, 'a> {
    fetcher: &'f Fetcher<'a>,
    visited: VisitedFamilies,
    processed: usize,
}

impl DepthFirst<'_, '_> {
    fn visit(&mut self, id: Option<FamilyId>) {
        let Some(id) = id else {
            return;
        };
        if !self.visited.mark(id) {
            debug!(family_id = %id, "family already visited");
            return;
        }

        let fetcher = self.fetcher;
        let parents = match panic::catch_unwind(AssertUnwindSafe(|| expand(fetcher, id))) {
            Ok(Some(parents)) => parents,
            Ok(None) => {
                debug!(family_id = %id, "family not available, branch pruned");
                return;
            }
            Err(_) => {
                warn!(family_id = %id, "processing panicked, branch pruned");
                return;
            }
        };
        self.processed += 1;

        // Sequential recursion: the husband's line is exhausted before the wife's.
        for parent in parents {
            self.visit(Some(parent));
        }
    }
}

/// Fetches the family and its people; returns its parent families, or
/// `None` if the family is not available.
fn expand(fetcher: &Fetcher<'_>, id: FamilyId) -> Option<Vec<FamilyId>> {
    let family = fetcher.fetch_family(Some(id))?;
    fetch_people(fetcher, &family);
    Some(parent_families(fetcher.store(), &family))
}

/// Fetches every person of `family` on its own scoped thread and waits for
/// all of them.
fn fetch_people(fetcher: &Fetcher<'_>, family: &Family) {
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(family.children().len() + 2);
        for person_id in family.person_ids() {
            let spawned = thread::Builder::new()
                .spawn_scoped(s, move || fetcher.fetch_person(Some(person_id)));
            match spawned {
                Ok(handle) => handles.push((person_id, handle)),
                Err(err) => {
                    warn!(
                        person_id = %person_id,
                        error = %err,
                        "could not spawn fetch thread, fetching inline"
                    );
                    fetcher.fetch_person(Some(person_id));
                }
            }
        }

        for (person_id, handle) in handles {
            if handle.join().is_err() {
                warn!(
                    family_id = %family.id(),
                    person_id = %person_id,
                    "person fetch thread panicked"
                );
            }
        }
    });
}
