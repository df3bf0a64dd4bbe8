//! Error types for pedigree retrieval.
//!
//! A missing record is not an error: sources and fetchers report it as
//! `Ok(None)`. The variants below cover everything else, and inside a
//! traversal they only prune the id they belong to.

use thiserror::Error;

use crate::record::RecordKind;

/// Pedigree error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote source failed while serving one record.
    #[error("Source error fetching {kind} {id}: {reason}")]
    Source {
        /// Kind of record requested.
        kind: RecordKind,
        /// Raw id requested.
        id: u64,
        /// Failure reported by the source.
        reason: String,
    },

    /// The source answered with a record that cannot be used.
    #[error("Malformed {kind} record {id}: {reason}")]
    Malformed {
        /// Kind of record requested.
        kind: RecordKind,
        /// Raw id requested.
        id: u64,
        /// Why the record was rejected.
        reason: String,
    },
}

impl Error {
    /// Builds a [`Error::Source`] for the given record.
    pub fn source_failed(kind: RecordKind, id: u64, reason: impl Into<String>) -> Self {
        Self::Source {
            kind,
            id,
            reason: reason.into(),
        }
    }

    /// Builds a [`Error::Malformed`] for the given record.
    pub fn malformed(kind: RecordKind, id: u64, reason: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            id,
            reason: reason.into(),
        }
    }
}

/// Result type alias for pedigree operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("bfs_workers must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: bfs_workers must be at least 1"
        );

        let err = Error::malformed(RecordKind::Person, 42, "missing field `name`");
        assert_eq!(
            err.to_string(),
            "Malformed person record 42: missing field `name`"
        );
    }

    #[test]
    fn test_source_failed_display() {
        let err = Error::source_failed(RecordKind::Family, 6_128_784_944, "connection reset");
        assert!(matches!(
            err,
            Error::Source {
                kind: RecordKind::Family,
                id: 6_128_784_944,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Source error fetching family 6128784944: connection reset"
        );
    }
}
