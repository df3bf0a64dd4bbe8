//! Tests for the simulated source.

use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;

use super::memory::InMemorySource;
use super::RecordSource;
use crate::error::Error;
use crate::record::{Family, FamilyId, Person, PersonId, RecordKind};

fn sample_source(latency: Duration) -> InMemorySource {
    let mut source = InMemorySource::new(latency);
    source.insert_family(
        &Family::new(FamilyId::new(1).unwrap(), PersonId::new(10), PersonId::new(11))
            .with_children(vec![PersonId::new(12).unwrap()]),
    );
    source.insert_person(&Person::new(PersonId::new(10).unwrap(), "Jonas", "3-3-1960"));
    source
}

#[test]
fn test_get_hit_and_miss() {
    let source = sample_source(Duration::ZERO);

    let family = source.get(RecordKind::Family, 1).unwrap().unwrap();
    assert_eq!(family["husband_id"], 10);
    assert_eq!(family["children"], json!([12]));

    assert!(source.get(RecordKind::Person, 11).unwrap().is_none());
    // Kinds are separate namespaces
    assert!(source.get(RecordKind::Person, 1).unwrap().is_none());
}

#[test]
fn test_call_counting() {
    let source = sample_source(Duration::ZERO);
    source.get(RecordKind::Family, 1).unwrap();
    source.get(RecordKind::Family, 1).unwrap();
    source.get(RecordKind::Person, 99).unwrap();

    assert_eq!(source.calls_for(RecordKind::Family, 1), 2);
    assert_eq!(source.calls_for(RecordKind::Person, 99), 1);
    assert_eq!(source.calls_for(RecordKind::Person, 10), 0);
    assert_eq!(source.max_calls_per_id(), 2);
    assert_eq!(source.stats().api_calls, 3);

    source.reset_stats();
    assert_eq!(source.stats().api_calls, 0);
    assert_eq!(source.max_calls_per_id(), 0);
    assert_eq!(source.stats().families, 1);
}

#[test]
fn test_injected_failure() {
    let mut source = sample_source(Duration::ZERO);
    source.fail(RecordKind::Family, 1);

    let err = source.get(RecordKind::Family, 1).unwrap_err();
    assert!(matches!(
        err,
        Error::Source {
            kind: RecordKind::Family,
            id: 1,
            ..
        }
    ));
    // Failed calls still count as calls
    assert_eq!(source.stats().api_calls, 1);
}

#[test]
fn test_raw_and_removed_records() {
    let mut source = sample_source(Duration::ZERO);
    source.insert_raw(RecordKind::Person, 50, json!({ "unexpected": true }));
    assert_eq!(
        source.get(RecordKind::Person, 50).unwrap(),
        Some(json!({ "unexpected": true }))
    );

    assert!(source.remove(RecordKind::Family, 1).is_some());
    assert!(source.get(RecordKind::Family, 1).unwrap().is_none());
}

#[test]
fn test_latency_applies() {
    let source = sample_source(Duration::from_millis(30));
    let started = Instant::now();
    source.get(RecordKind::Family, 1).unwrap();
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn test_peak_concurrency_tracked() {
    let source = sample_source(Duration::from_millis(50));
    let barrier = Barrier::new(4);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                barrier.wait();
                source.get(RecordKind::Family, 1).unwrap();
            });
        }
    });

    let stats = source.stats();
    assert_eq!(stats.api_calls, 4);
    assert!(stats.peak_concurrency >= 2, "peak was {}", stats.peak_concurrency);
    assert!(stats.peak_concurrency <= 4);
}
