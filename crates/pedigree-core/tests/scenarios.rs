//! End-to-end retrieval scenarios against the simulated source.

use std::time::Duration;

use pedigree_core::{
    Family, FamilyId, GraphStore, InMemorySource, PedigreeGenerator, PedigreeTraverser, Person,
    PersonId, RecordKind, Strategy,
};

const LATENCY: Duration = Duration::from_millis(10);

fn fid(raw: u64) -> FamilyId {
    FamilyId::new(raw).unwrap()
}

fn pid(raw: u64) -> PersonId {
    PersonId::new(raw).unwrap()
}

fn strategies() -> [Strategy; 3] {
    [
        Strategy::DepthFirst,
        Strategy::breadth_first(20),
        Strategy::breadth_first(5),
    ]
}

#[test]
fn two_grandparent_families_without_spouses() {
    // F0 = H0 + W0 with one child; H0 comes from F1, W0 from F2.
    let mut source = InMemorySource::new(LATENCY);
    source.insert_family(
        &Family::new(fid(1000), Some(pid(1)), Some(pid(2))).with_children(vec![pid(3)]),
    );
    source.insert_family(&Family::new(fid(1001), None, None).with_children(vec![pid(1)]));
    source.insert_family(&Family::new(fid(1002), None, None).with_children(vec![pid(2)]));
    source.insert_person(&Person::new(pid(1), "H0", "1-4-1960").with_parent(Some(fid(1001))));
    source.insert_person(&Person::new(pid(2), "W0", "9-8-1962").with_parent(Some(fid(1002))));
    source.insert_person(&Person::new(pid(3), "C0", "2-2-1990").with_parent(Some(fid(1000))));

    for strategy in strategies() {
        source.reset_stats();
        let store = GraphStore::new();

        PedigreeTraverser::new(&source).run(Some(fid(1000)), &store, strategy);

        assert_eq!(store.family_ids(), vec![fid(1000), fid(1001), fid(1002)]);
        assert_eq!(store.person_ids(), vec![pid(1), pid(2), pid(3)]);
        assert_eq!(source.max_calls_per_id(), 1, "{strategy}");
        // Three families and three persons, nothing refetched
        assert_eq!(source.stats().api_calls, 6, "{strategy}");
    }
}

#[test]
fn couple_sharing_parent_family() {
    let mut source = InMemorySource::new(LATENCY);
    source.insert_family(&Family::new(fid(2000), Some(pid(1)), Some(pid(2))));
    source.insert_family(&Family::new(fid(2003), None, None).with_children(vec![pid(1), pid(2)]));
    source.insert_person(&Person::new(pid(1), "Peder", "3-3-1900").with_parent(Some(fid(2003))));
    source.insert_person(&Person::new(pid(2), "Ingrid", "4-4-1901").with_parent(Some(fid(2003))));

    for strategy in strategies() {
        source.reset_stats();
        let store = GraphStore::new();

        let report = PedigreeTraverser::new(&source).run(Some(fid(2000)), &store, strategy);

        assert_eq!(source.calls_for(RecordKind::Family, 2003), 1, "{strategy}");
        assert_eq!(store.family_count(), 2);
        assert_eq!(report.families_processed, 2);
    }
}

#[test]
fn not_found_link_prunes_branch_only() {
    let pedigree = PedigreeGenerator::new(5).generations(4).generate();
    let mut source = pedigree.to_source(Duration::ZERO);

    // Remove the husband's parent family; everything above it becomes unreachable.
    let start = pedigree.families[0].clone();
    let husband = pedigree
        .persons
        .iter()
        .find(|person| Some(person.id()) == start.husband())
        .unwrap();
    let lost = husband.parent().unwrap();
    source.remove(RecordKind::Family, lost.get());

    for strategy in strategies() {
        let store = GraphStore::new();
        let report = PedigreeTraverser::new(&source).run(Some(pedigree.start), &store, strategy);

        assert!(!store.contains_family(lost));
        assert!(store.contains_family(pedigree.start));
        // The lost family heads a 7-family subtree of the 15.
        assert_eq!(report.families, 8, "{strategy}");
        assert_eq!(report.fetch.not_found, 1);
    }
}

#[test]
fn latency_is_overlapped_by_both_strategies() {
    let pedigree = PedigreeGenerator::new(21).generations(4).generate();
    let source = pedigree.to_source(Duration::from_millis(30));
    let records = pedigree.families.len() + pedigree.persons.len();
    let serial = Duration::from_millis(30) * u32::try_from(records).unwrap();

    for strategy in [Strategy::DepthFirst, Strategy::breadth_first(8)] {
        let store = GraphStore::new();
        let report = PedigreeTraverser::new(&source).run(Some(pedigree.start), &store, strategy);
        assert!(
            report.elapsed < serial,
            "{strategy} took {:?}, serial would be {serial:?}",
            report.elapsed
        );
    }
}
