//! Loader error types.

use thiserror::Error;

use funzone_core::BundleId;

/// A resource could not be retrieved or checked.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The path cannot be turned into a resource location.
    #[error("invalid resource path '{path}': {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request never produced a response.
    #[error("request for '{path}' failed: {message}")]
    Transport {
        /// Requested path.
        path: String,
        /// Transport error message.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("'{path}' returned HTTP {status}")]
    Status {
        /// Requested path.
        path: String,
        /// HTTP status code.
        status: u16,
    },

    /// The resource exists but its body is empty.
    #[error("'{path}' has an empty body")]
    EmptyBody {
        /// Requested path.
        path: String,
    },

    /// Reading a local resource failed.
    #[error("cannot read '{path}': {message}")]
    Io {
        /// Requested path.
        path: String,
        /// I/O error message.
        message: String,
    },
}

/// Result type for resource operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// The rendering surface refused an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// Content could not be committed.
    #[error("surface rejected content: {0}")]
    Rejected(String),

    /// An attached executable failed to load or run.
    #[error("executable '{path}' failed: {reason}")]
    ExecutableFailed {
        /// Script path.
        path: String,
        /// Failure reported by the host.
        reason: String,
    },
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// A script failed through both the primary and the fallback mechanism.
///
/// Never fatal to a load; it is logged and reported per script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("script '{path}' could not be attached ({primary}); fallback failed: {fallback}")]
pub struct ScriptAttachError {
    /// Script path.
    pub path: String,
    /// Why the primary attachment failed.
    pub primary: String,
    /// Why the inline fallback failed.
    pub fallback: String,
}

/// Errors that end a load in the `Failed` state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The requested id is not in the catalog.
    #[error("unknown bundle '{id}'")]
    UnknownBundle {
        /// The requested id.
        id: String,
    },

    /// The entry resource could not be fetched.
    #[error("failed to load bundle '{bundle}': {source}")]
    Fetch {
        /// Bundle being loaded.
        bundle: BundleId,
        /// Underlying fetch failure.
        #[source]
        source: FetchError,
    },

    /// The surface refused the prepared markup.
    #[error("failed to render bundle '{bundle}': {source}")]
    Surface {
        /// Bundle being loaded.
        bundle: BundleId,
        /// Underlying surface failure.
        #[source]
        source: SurfaceError,
    },
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;
