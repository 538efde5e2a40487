//! Error types for subquery construction.
//!
//! Every variant is a local, synchronous, deterministic construction error:
//! nothing here is transient or retryable, and nothing is partially built
//! when one is returned. Presentation is left to the caller.

use crate::relationship::RelationshipKind;
use std::fmt;

/// The error type for relationship-subquery construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The named relationship is not registered for the owning model.
    UnknownRelationship {
        /// Table of the owning model the lookup ran against.
        owner_table: &'static str,
        /// The relationship name that failed to resolve.
        relationship: String,
    },

    /// The relationship exists but is not one-to-many.
    UnsupportedCardinality {
        /// The relationship name.
        relationship: String,
        /// The cardinality actually declared.
        found: RelationshipKind,
    },

    /// The relationship declares unequal foreign/owner key counts.
    ///
    /// This indicates malformed metadata rather than a caller mistake; the
    /// builder refuses to proceed rather than silently dropping key pairs.
    KeyArityMismatch {
        /// The relationship name.
        relationship: String,
        /// Number of foreign key columns on the related table.
        foreign: usize,
        /// Number of owner-side key columns.
        owner: usize,
    },
}

impl Error {
    /// Is this a mistake in the caller's arguments (as opposed to a bug in
    /// the metadata registry)?
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownRelationship { .. } | Error::UnsupportedCardinality { .. }
        )
    }

    /// Is this a malformed-metadata error?
    #[must_use]
    pub const fn is_metadata_error(&self) -> bool {
        matches!(self, Error::KeyArityMismatch { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownRelationship {
                owner_table,
                relationship,
            } => write!(
                f,
                "unknown relationship '{relationship}' on table '{owner_table}'"
            ),
            Error::UnsupportedCardinality {
                relationship,
                found,
            } => write!(
                f,
                "relationship '{relationship}' is {found}, only one-to-many is supported"
            ),
            Error::KeyArityMismatch {
                relationship,
                foreign,
                owner,
            } => write!(
                f,
                "relationship '{relationship}' pairs {foreign} foreign key column(s) with {owner} owner key column(s)"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for construction operations.
pub type Result<T> = std::result::Result<T, Error>;
