//! Per-run set of family ids already claimed for processing.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::record::FamilyId;

/// Family ids that have been discovered in the current run.
///
/// [`VisitedFamilies::mark`] is the only way in: check and insert happen
/// under one lock acquisition, so among concurrent discoverers of an id
/// exactly one is told to process it.
#[derive(Debug, Default)]
pub(crate) struct VisitedFamilies {
    ids: Mutex<FxHashSet<FamilyId>>,
}

impl VisitedFamilies {
    /// Creates an empty set.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks `id` visited. Returns `true` only for the first caller.
    pub(crate) fn mark(&self, id: FamilyId) -> bool {
        self.ids.lock().insert(id)
    }

    /// Returns `true` if `id` was marked.
    #[cfg(test)]
    pub(crate) fn contains(&self, id: FamilyId) -> bool {
        self.ids.lock().contains(&id)
    }

    /// Number of marked ids.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.ids.lock().len()
    }
}
