//! Seeded generator of ancestor trees.
//!
//! Produces the data set a run is served from: a start family plus every
//! ancestor family up to a number of generations. Generation 0 is the start
//! family; the spouses of the oldest generation have no parent family.

use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use super::InMemorySource;
use crate::config::SourceSettings;
use crate::record::{Family, FamilyId, Person, PersonId};

const HUSBAND_NAMES: &[&str] = &[
    "Albert", "Arthur", "Edmund", "Frederick", "George", "Henry", "Jacob", "Jonas", "Matthias",
    "Nils", "Oskar", "Peder", "Samuel", "Thomas", "Walter",
];

const WIFE_NAMES: &[&str] = &[
    "Agnes", "Clara", "Dorothea", "Elise", "Frida", "Hanna", "Ingrid", "Johanna", "Karen",
    "Louise", "Margrethe", "Olivia", "Rosa", "Stella", "Wilhelmine",
];

/// Years between a generation and the next older one.
const GENERATION_SPAN: i32 = 25;
/// Birth year around which the start couple is born.
const BASE_YEAR: i32 = 1990;

/// A generated data set.
#[derive(Debug, Clone)]
pub struct Pedigree {
    /// The start family (generation 0).
    pub start: FamilyId,
    /// Number of generations generated.
    pub generations: u32,
    /// Every family, start family first.
    pub families: Vec<Family>,
    /// Every person: spouses and children of all families.
    pub persons: Vec<Person>,
}

impl Pedigree {
    /// Loads the pedigree into a fresh simulated source.
    #[must_use]
    pub fn to_source(&self, latency: Duration) -> InMemorySource {
        let mut source = InMemorySource::new(latency);
        for family in &self.families {
            source.insert_family(family);
        }
        for person in &self.persons {
            source.insert_person(person);
        }
        source
    }

    /// Sorted ids of all families.
    #[must_use]
    pub fn family_ids(&self) -> Vec<FamilyId> {
        let mut ids: Vec<FamilyId> = self.families.iter().map(Family::id).collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of all persons.
    #[must_use]
    pub fn person_ids(&self) -> Vec<PersonId> {
        let mut ids: Vec<PersonId> = self.persons.iter().map(Person::id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Builder for generated pedigrees.
///
/// The same seed and settings always produce the same pedigree.
#[derive(Debug, Clone)]
pub struct PedigreeGenerator {
    seed: u64,
    generations: u32,
    max_children: usize,
    shared_ancestry: f64,
}

impl PedigreeGenerator {
    /// Creates a generator of 6 generations, up to 5 children per family,
    /// and no shared ancestry.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            generations: 6,
            max_children: 5,
            shared_ancestry: 0.0,
        }
    }

    /// Creates a generator from the configured source settings.
    #[must_use]
    pub fn from_settings(settings: &SourceSettings) -> Self {
        Self::new(settings.seed)
            .max_children(settings.max_children)
            .shared_ancestry(settings.shared_ancestry)
    }

    /// Sets the number of generations (at least 1).
    #[must_use]
    pub fn generations(mut self, generations: u32) -> Self {
        self.generations = generations.max(1);
        self
    }

    /// Sets the upper bound of children per family (at least 1).
    #[must_use]
    pub fn max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children.max(1);
        self
    }

    /// Sets the probability that a couple shares one parent family,
    /// clamped to `[0, 1]`. NaN counts as 0.
    #[must_use]
    pub fn shared_ancestry(mut self, probability: f64) -> Self {
        self.shared_ancestry = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    /// Generates the pedigree.
    #[must_use]
    pub fn generate(&self) -> Pedigree {
        let mut ctx = Context {
            rng: StdRng::seed_from_u64(self.seed),
            used_ids: FxHashSet::default(),
        };
        let start = ctx.family_id();

        let mut families = Vec::new();
        let mut persons = Vec::new();
        let mut pending = VecDeque::from([Pending {
            id: start,
            generation: 0,
            known_children: Vec::new(),
        }]);

        while let Some(current) = pending.pop_front() {
            let has_parents = current.generation + 1 < self.generations;
            let husband_parent = has_parents.then(|| ctx.family_id());
            let wife_parent = match husband_parent {
                Some(shared) if ctx.rng.gen_bool(self.shared_ancestry) => Some(shared),
                Some(_) => Some(ctx.family_id()),
                None => None,
            };

            let depth = i32::try_from(current.generation).unwrap_or(i32::MAX);
            let year = BASE_YEAR.saturating_sub(GENERATION_SPAN.saturating_mul(depth));
            let husband_id = ctx.person_id();
            let wife_id = ctx.person_id();
            let husband = Person::new(husband_id, ctx.pick(HUSBAND_NAMES), &ctx.birth(year))
                .with_parent(husband_parent)
                .with_family(Some(current.id));
            let wife = Person::new(wife_id, ctx.pick(WIFE_NAMES), &ctx.birth(year))
                .with_parent(wife_parent)
                .with_family(Some(current.id));
            persons.push(husband);
            persons.push(wife);

            match (husband_parent, wife_parent) {
                (Some(h), Some(w)) if h == w => pending.push_back(Pending {
                    id: h,
                    generation: current.generation + 1,
                    known_children: vec![husband_id, wife_id],
                }),
                (Some(h), Some(w)) => {
                    pending.push_back(Pending {
                        id: h,
                        generation: current.generation + 1,
                        known_children: vec![husband_id],
                    });
                    pending.push_back(Pending {
                        id: w,
                        generation: current.generation + 1,
                        known_children: vec![wife_id],
                    });
                }
                _ => {}
            }

            let mut children = current.known_children;
            let extra = if children.is_empty() {
                ctx.rng.gen_range(1..=self.max_children)
            } else {
                let room = self.max_children.saturating_sub(children.len());
                ctx.rng.gen_range(0..=room)
            };
            for _ in 0..extra {
                let id = ctx.person_id();
                let names = if ctx.rng.gen_bool(0.5) {
                    HUSBAND_NAMES
                } else {
                    WIFE_NAMES
                };
                let birth_year = year + GENERATION_SPAN + ctx.rng.gen_range(0..=10);
                let child = Person::new(id, ctx.pick(names), &ctx.birth(birth_year))
                    .with_parent(Some(current.id));
                persons.push(child);
                children.push(id);
            }
            children.shuffle(&mut ctx.rng);

            families.push(
                Family::new(current.id, Some(husband_id), Some(wife_id)).with_children(children),
            );
        }

        Pedigree {
            start,
            generations: self.generations,
            families,
            persons,
        }
    }
}

/// A family whose id is allocated but whose record is not built yet.
struct Pending {
    id: FamilyId,
    generation: u32,
    /// Spouses of the younger generation already created as its children.
    known_children: Vec<PersonId>,
}

struct Context {
    rng: StdRng,
    used_ids: FxHashSet<u64>,
}

impl Context {
    /// Unique random 10-digit id, never zero.
    fn raw_id(&mut self) -> u64 {
        loop {
            let raw = self.rng.gen_range(1_000_000_000..10_000_000_000u64);
            if self.used_ids.insert(raw) {
                return raw;
            }
        }
    }

    fn family_id(&mut self) -> FamilyId {
        let raw = self.raw_id();
        FamilyId::new(raw).unwrap_or_else(|| unreachable!("generated ids are non-zero"))
    }

    fn person_id(&mut self) -> PersonId {
        let raw = self.raw_id();
        PersonId::new(raw).unwrap_or_else(|| unreachable!("generated ids are non-zero"))
    }

    fn pick(&mut self, names: &[&'static str]) -> &'static str {
        names.choose(&mut self.rng).copied().unwrap_or("Unknown")
    }

    fn birth(&mut self, year: i32) -> String {
        let day = self.rng.gen_range(1..=28);
        let month = self.rng.gen_range(1..=12);
        let year = year + self.rng.gen_range(-3..=3);
        format!("{day}-{month}-{year}")
    }
}
