//! Tests for record decoding and id handling.

use serde_json::json;

use crate::error::Error;
use crate::record::{Family, FamilyId, Person, PersonId, RecordKind};

fn fid(raw: u64) -> FamilyId {
    FamilyId::new(raw).unwrap()
}

fn pid(raw: u64) -> PersonId {
    PersonId::new(raw).unwrap()
}

#[test]
fn test_zero_id_is_absent() {
    assert_eq!(FamilyId::new(0), None);
    assert_eq!(PersonId::new(0), None);
    assert_eq!(FamilyId::new(17).map(FamilyId::get), Some(17));
}

#[test]
fn test_record_kind_display() {
    assert_eq!(RecordKind::Family.to_string(), "family");
    assert_eq!(RecordKind::Person.to_string(), "person");
}

#[test]
fn test_family_decodes_wire_shape() {
    let family = Family::from_value(
        fid(6_128_784_944),
        json!({
            "id": 6_128_784_944u64,
            "husband_id": 2_367_673_859u64,
            "wife_id": 2_373_686_152u64,
            "children": [2_380_738_417u64, 2_185_423_094u64, 2_192_483_455u64]
        }),
    )
    .unwrap();

    assert_eq!(family.id(), fid(6_128_784_944));
    assert_eq!(family.husband(), Some(pid(2_367_673_859)));
    assert_eq!(family.wife(), Some(pid(2_373_686_152)));
    assert_eq!(
        family.children(),
        &[
            pid(2_380_738_417),
            pid(2_185_423_094),
            pid(2_192_483_455)
        ]
    );
}

#[test]
fn test_family_absent_links() {
    let family = Family::from_value(
        fid(5),
        json!({ "id": 5, "husband_id": 0, "wife_id": null, "children": [0, 9, null, 8] }),
    )
    .unwrap();

    assert_eq!(family.husband(), None);
    assert_eq!(family.wife(), None);
    assert_eq!(family.children(), &[pid(9), pid(8)]);
    assert_eq!(family.spouses().count(), 0);
}

#[test]
fn test_family_missing_children_key() {
    let family = Family::from_value(fid(5), json!({ "id": 5, "husband_id": 1 })).unwrap();
    assert!(family.children().is_empty());
    assert_eq!(family.person_ids().collect::<Vec<_>>(), vec![pid(1)]);
}

#[test]
fn test_person_ids_order() {
    let family = Family::new(fid(1), Some(pid(10)), Some(pid(11)))
        .with_children(vec![pid(12), pid(13)]);
    let ids: Vec<u64> = family.person_ids().map(PersonId::get).collect();
    assert_eq!(ids, vec![10, 11, 12, 13]);
}

#[test]
fn test_person_decodes_wire_shape() {
    let person = Person::from_value(
        pid(2_373_686_152),
        json!({
            "id": 2_373_686_152u64,
            "name": "Stella",
            "birth": "9-3-1846",
            "parent_id": 5_428_641_880u64,
            "family_id": 6_128_784_944u64
        }),
    )
    .unwrap();

    assert_eq!(person.name(), "Stella");
    assert_eq!(person.birth(), "9-3-1846");
    assert_eq!(person.parent(), Some(fid(5_428_641_880)));
    assert_eq!(person.family(), Some(fid(6_128_784_944)));
}

#[test]
fn test_person_missing_name_is_malformed() {
    let err = Person::from_value(pid(3), json!({ "id": 3, "birth": "1-1-1900" })).unwrap_err();
    match err {
        Error::Malformed { kind, id, reason } => {
            assert_eq!(kind, RecordKind::Person);
            assert_eq!(id, 3);
            assert!(reason.contains("name"), "unexpected reason: {reason}");
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn test_mismatched_id_is_malformed() {
    let err = Family::from_value(fid(3), json!({ "id": 4 })).unwrap_err();
    assert!(matches!(err, Error::Malformed { id: 3, .. }));

    let err = Family::from_value(fid(3), json!({ "id": 0 })).unwrap_err();
    assert!(matches!(err, Error::Malformed { id: 3, .. }));
}

#[test]
fn test_non_object_is_malformed() {
    let err = Family::from_value(fid(3), json!("not a family")).unwrap_err();
    assert!(matches!(
        err,
        Error::Malformed {
            kind: RecordKind::Family,
            ..
        }
    ));
}

#[test]
fn test_to_value_decodes_back() {
    let person = Person::new(pid(7), "Ada", "10-12-1815")
        .with_parent(FamilyId::new(70))
        .with_family(None);
    let value = person.to_value();
    assert_eq!(value["family_id"], 0);
    assert_eq!(Person::from_value(pid(7), value).unwrap(), person);
}
