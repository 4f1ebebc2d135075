//! Catalog error types.

use thiserror::Error;

/// Errors raised while building bundle descriptors or the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The bundle identifier is empty or contains unsupported characters.
    #[error("invalid bundle id '{id}': {reason}")]
    InvalidId {
        /// The rejected identifier.
        id: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A bundle does not declare an entry resource.
    #[error("bundle '{id}' has no entry path")]
    MissingEntry {
        /// The offending bundle.
        id: String,
    },

    /// Two bundles share the same identifier.
    #[error("duplicate bundle id '{id}'")]
    DuplicateId {
        /// The identifier declared twice.
        id: String,
    },

    /// A category tag outside the fixed set.
    #[error("unknown category '{0}'; expected one of: game, productivity, creative")]
    UnknownCategory(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
