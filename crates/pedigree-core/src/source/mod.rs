//! Remote record sources.
//!
//! [`RecordSource`] is the seam to the per-record API. The engine treats it
//! as a blocking call with a fixed latency that may be invoked from many
//! threads at once.
//!
//! [`InMemorySource`] simulates that API in-process, and
//! [`PedigreeGenerator`] builds the data it serves.

mod generator;
mod memory;

#[cfg(test)]
mod memory_tests;

pub use generator::{Pedigree, PedigreeGenerator};
pub use memory::{InMemorySource, SourceStats};

use serde_json::Value;

use crate::error::Result;
use crate::record::RecordKind;

/// A per-record API fronting the family graph.
///
/// Returns `Ok(None)` when the id has no record. An `Err` is a failure to
/// answer (transport, server error); callers do not retry it.
pub trait RecordSource: Send + Sync {
    /// Fetches one raw record.
    fn get(&self, kind: RecordKind, id: u64) -> Result<Option<Value>>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn get(&self, kind: RecordKind, id: u64) -> Result<Option<Value>> {
        (**self).get(kind, id)
    }
}

impl<S: RecordSource + ?Sized> RecordSource for std::sync::Arc<S> {
    fn get(&self, kind: RecordKind, id: u64) -> Result<Option<Value>> {
        (**self).get(kind, id)
    }
}
