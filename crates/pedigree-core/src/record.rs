//! Family and person records as served by the remote API.
//!
//! Records are immutable once decoded. Ids on the wire are plain integers
//! where `0` (or `null`, or a missing key) means "no such record"; the typed
//! model turns those into `None` so an absent link can never be fetched.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Kind of record exposed by the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A family: husband, wife and children.
    Family,
    /// A single person.
    Person,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Family => f.write_str("family"),
            RecordKind::Person => f.write_str("person"),
        }
    }
}

trait RawId: Sized {
    fn from_raw(raw: u64) -> Option<Self>;
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw id, returning `None` for the "absent" id `0`.
            #[must_use]
            pub fn new(raw: u64) -> Option<Self> {
                (raw != 0).then_some(Self(raw))
            }

            /// Returns the raw numeric id.
            #[must_use]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl RawId for $name {
            fn from_raw(raw: u64) -> Option<Self> {
                Self::new(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id! {
    /// Identifier of a [`Family`] record.
    FamilyId
}

record_id! {
    /// Identifier of a [`Person`] record.
    PersonId
}

/// Accepts a missing key, `null` or `0` as an absent id.
fn optional_id<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: RawId,
{
    let raw = Option::<u64>::deserialize(deserializer)?;
    Ok(raw.and_then(T::from_raw))
}

/// Drops `0`/`null` entries, keeping the order of the rest.
fn child_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<PersonId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<u64>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(PersonId::new)
        .collect())
}

fn check_id(kind: RecordKind, requested: u64, found: u64) -> Result<()> {
    if found == 0 {
        return Err(Error::malformed(kind, requested, "record id is zero"));
    }
    if found != requested {
        return Err(Error::malformed(
            kind,
            requested,
            format!("record id {found} does not match the requested id"),
        ));
    }
    Ok(())
}

/// A family: the couple and their children.
///
/// # Example
///
/// ```rust
/// use pedigree_core::{Family, FamilyId, PersonId};
/// use serde_json::json;
///
/// let id = FamilyId::new(6128784944).unwrap();
/// let family = Family::from_value(id, json!({
///     "id": 6128784944u64,
///     "husband_id": 2367673859u64,
///     "wife_id": 0,
///     "children": [2380738417u64, 0, 2185423094u64]
/// })).unwrap();
///
/// assert_eq!(family.husband(), PersonId::new(2367673859));
/// assert_eq!(family.wife(), None);
/// assert_eq!(family.children().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    id: FamilyId,
    #[serde(rename = "husband_id", default, deserialize_with = "optional_id")]
    husband: Option<PersonId>,
    #[serde(rename = "wife_id", default, deserialize_with = "optional_id")]
    wife: Option<PersonId>,
    #[serde(default, deserialize_with = "child_ids")]
    children: Vec<PersonId>,
}

impl Family {
    /// Creates a family without children.
    #[must_use]
    pub fn new(id: FamilyId, husband: Option<PersonId>, wife: Option<PersonId>) -> Self {
        Self {
            id,
            husband,
            wife,
            children: Vec::new(),
        }
    }

    /// Sets the ordered children (builder pattern).
    #[must_use]
    pub fn with_children(mut self, children: Vec<PersonId>) -> Self {
        self.children = children;
        self
    }

    /// Decodes the raw record served for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] when the value does not decode or carries
    /// an id other than `id`.
    pub fn from_value(id: FamilyId, value: Value) -> Result<Self> {
        let family: Family = serde_json::from_value(value)
            .map_err(|e| Error::malformed(RecordKind::Family, id.get(), e.to_string()))?;
        check_id(RecordKind::Family, id.get(), family.id.get())?;
        Ok(family)
    }

    /// Encodes the record the way the remote source serves it.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "id": self.id.get(),
            "husband_id": self.husband.map_or(0, PersonId::get),
            "wife_id": self.wife.map_or(0, PersonId::get),
            "children": self.children.iter().map(|c| c.get()).collect::<Vec<_>>(),
        })
    }

    /// Returns the family id.
    #[must_use]
    pub fn id(&self) -> FamilyId {
        self.id
    }

    /// Returns the husband, if any.
    #[must_use]
    pub fn husband(&self) -> Option<PersonId> {
        self.husband
    }

    /// Returns the wife, if any.
    #[must_use]
    pub fn wife(&self) -> Option<PersonId> {
        self.wife
    }

    /// Returns the children in record order.
    #[must_use]
    pub fn children(&self) -> &[PersonId] {
        &self.children
    }

    /// Husband then wife, skipping absent spouses.
    pub fn spouses(&self) -> impl Iterator<Item = PersonId> {
        self.husband.into_iter().chain(self.wife)
    }

    /// Every person of the family: husband, wife, then children.
    pub fn person_ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.spouses().chain(self.children.iter().copied())
    }
}

/// A person and the two families they link to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,
    name: String,
    birth: String,
    /// Family in which this person is a child.
    #[serde(rename = "parent_id", default, deserialize_with = "optional_id")]
    parent: Option<FamilyId>,
    /// Family in which this person is a spouse.
    #[serde(rename = "family_id", default, deserialize_with = "optional_id")]
    family: Option<FamilyId>,
}

impl Person {
    /// Creates a person with no family links.
    #[must_use]
    pub fn new(id: PersonId, name: &str, birth: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            birth: birth.to_string(),
            parent: None,
            family: None,
        }
    }

    /// Sets the family this person was born into (builder pattern).
    #[must_use]
    pub fn with_parent(mut self, parent: Option<FamilyId>) -> Self {
        self.parent = parent;
        self
    }

    /// Sets the family this person is a spouse in (builder pattern).
    #[must_use]
    pub fn with_family(mut self, family: Option<FamilyId>) -> Self {
        self.family = family;
        self
    }

    /// Decodes the raw record served for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] when the value does not decode or carries
    /// an id other than `id`.
    pub fn from_value(id: PersonId, value: Value) -> Result<Self> {
        let person: Person = serde_json::from_value(value)
            .map_err(|e| Error::malformed(RecordKind::Person, id.get(), e.to_string()))?;
        check_id(RecordKind::Person, id.get(), person.id.get())?;
        Ok(person)
    }

    /// Encodes the record the way the remote source serves it.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "id": self.id.get(),
            "name": self.name,
            "birth": self.birth,
            "parent_id": self.parent.map_or(0, FamilyId::get),
            "family_id": self.family.map_or(0, FamilyId::get),
        })
    }

    /// Returns the person id.
    #[must_use]
    pub fn id(&self) -> PersonId {
        self.id
    }

    /// Returns the given name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the birth date as served (`d-m-yyyy`).
    #[must_use]
    pub fn birth(&self) -> &str {
        &self.birth
    }

    /// Returns the family this person is a child in: the link one
    /// generation further back.
    #[must_use]
    pub fn parent(&self) -> Option<FamilyId> {
        self.parent
    }

    /// Returns the family this person is a spouse in.
    #[must_use]
    pub fn family(&self) -> Option<FamilyId> {
        self.family
    }
}
