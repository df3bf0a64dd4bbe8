//! # Pedigree Core
//!
//! Concurrent retrieval of a family pedigree from a slow, per-record API.
//!
//! Starting from one family, the engine walks the ancestor graph
//! (family → husband/wife → their parent families → ...) and materializes
//! every reachable family and person into a shared [`GraphStore`]. Each
//! remote call carries a fixed latency, so both strategies overlap calls
//! across threads:
//!
//! - **Depth-first**: recursive; the people of one family are fetched by a
//!   scoped fan-out of threads that is joined before descending.
//! - **Breadth-first**: a pool of `W` long-lived workers pulling family ids
//!   from a shared channel until the graph is drained.
//!
//! Every id is fetched through the [`Fetcher`], which serves repeats from
//! the store and merges results idempotently.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use pedigree_core::{GraphStore, PedigreeGenerator, PedigreeTraverser, Strategy};
//!
//! let pedigree = PedigreeGenerator::new(7).generations(4).generate();
//! let source = pedigree.to_source(Duration::ZERO);
//!
//! let store = GraphStore::new();
//! let report = PedigreeTraverser::new(&source).run(
//!     Some(pedigree.start),
//!     &store,
//!     Strategy::breadth_first(5),
//! );
//!
//! assert_eq!(report.families, pedigree.families.len());
//! assert_eq!(report.persons, pedigree.persons.len());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fetch;
pub mod record;
#[cfg(test)]
mod record_tests;
pub mod source;
pub mod store;
pub mod traversal;

pub use config::{LoggingSettings, PedigreeConfig, SourceSettings, TraversalSettings};
pub use error::{Error, Result};
pub use fetch::{FetchSnapshot, FetchStats, Fetcher};
pub use record::{Family, FamilyId, Person, PersonId, RecordKind};
pub use source::{InMemorySource, Pedigree, PedigreeGenerator, RecordSource, SourceStats};
pub use store::{GraphStore, Insert};
pub use traversal::{PedigreeTraverser, Strategy, TraversalReport};
