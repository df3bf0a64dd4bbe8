//! Shared destination of a traversal: every family and person found so far.
//!
//! Both maps sit behind one `parking_lot::Mutex`. Callers hold it only for a
//! lookup or an insert, never across a network call. Records are write-once:
//! inserting an id that is already present keeps the first record.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::record::{Family, FamilyId, Person, PersonId};

/// Outcome of an idempotent insert.
#[derive(Debug, Clone)]
pub enum Insert<T> {
    /// The record was stored by this call.
    Inserted(Arc<T>),
    /// Another caller stored this id first; holds the record that won.
    Existing(Arc<T>),
}

impl<T> Insert<T> {
    /// Returns `true` if this call stored the record.
    #[must_use]
    pub fn is_inserted(&self) -> bool {
        matches!(self, Insert::Inserted(_))
    }

    /// Returns the stored record, whoever inserted it.
    #[must_use]
    pub fn into_inner(self) -> Arc<T> {
        match self {
            Insert::Inserted(record) | Insert::Existing(record) => record,
        }
    }
}

#[derive(Debug, Default)]
struct Maps {
    families: FxHashMap<FamilyId, Arc<Family>>,
    persons: FxHashMap<PersonId, Arc<Person>>,
}

/// Thread-safe store of the retrieved pedigree.
///
/// # Example
///
/// ```rust
/// use pedigree_core::{Family, FamilyId, GraphStore};
///
/// let store = GraphStore::new();
/// let id = FamilyId::new(1).unwrap();
///
/// assert!(store.insert_family(Family::new(id, None, None)).is_inserted());
/// assert!(!store.insert_family(Family::new(id, None, None)).is_inserted());
/// assert_eq!(store.family_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct GraphStore {
    maps: Mutex<Maps>,
}

impl GraphStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the family is present.
    #[must_use]
    pub fn contains_family(&self, id: FamilyId) -> bool {
        self.maps.lock().families.contains_key(&id)
    }

    /// Returns `true` if the person is present.
    #[must_use]
    pub fn contains_person(&self, id: PersonId) -> bool {
        self.maps.lock().persons.contains_key(&id)
    }

    /// Returns the family, if present.
    #[must_use]
    pub fn family(&self, id: FamilyId) -> Option<Arc<Family>> {
        self.maps.lock().families.get(&id).cloned()
    }

    /// Returns the person, if present.
    #[must_use]
    pub fn person(&self, id: PersonId) -> Option<Arc<Person>> {
        self.maps.lock().persons.get(&id).cloned()
    }

    /// Stores the family unless its id is already present.
    pub fn insert_family(&self, family: Family) -> Insert<Family> {
        let mut maps = self.maps.lock();
        if let Some(existing) = maps.families.get(&family.id()) {
            return Insert::Existing(Arc::clone(existing));
        }
        let family = Arc::new(family);
        maps.families.insert(family.id(), Arc::clone(&family));
        Insert::Inserted(family)
    }

    /// Stores the person unless its id is already present.
    pub fn insert_person(&self, person: Person) -> Insert<Person> {
        let mut maps = self.maps.lock();
        if let Some(existing) = maps.persons.get(&person.id()) {
            return Insert::Existing(Arc::clone(existing));
        }
        let person = Arc::new(person);
        maps.persons.insert(person.id(), Arc::clone(&person));
        Insert::Inserted(person)
    }

    /// Number of families stored.
    #[must_use]
    pub fn family_count(&self) -> usize {
        self.maps.lock().families.len()
    }

    /// Number of persons stored.
    #[must_use]
    pub fn person_count(&self) -> usize {
        self.maps.lock().persons.len()
    }

    /// Sorted ids of all stored families.
    #[must_use]
    pub fn family_ids(&self) -> Vec<FamilyId> {
        let mut ids: Vec<FamilyId> = self.maps.lock().families.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of all stored persons.
    #[must_use]
    pub fn person_ids(&self) -> Vec<PersonId> {
        let mut ids: Vec<PersonId> = self.maps.lock().persons.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let maps = self.maps.lock();
        maps.families.is_empty() && maps.persons.is_empty()
    }

    /// Drops every record. Called at the start of each traversal run.
    pub fn clear(&self) {
        let mut maps = self.maps.lock();
        maps.families.clear();
        maps.persons.clear();
    }
}

// Compile-time check: GraphStore is shared by reference across worker threads
#[allow(dead_code)]
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphStore>();
};
