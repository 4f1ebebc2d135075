//! Funzone Storage - durable client preferences.
//!
//! Two layers:
//!
//! - [`KvStore`]: namespaced string `get`/`set`/`delete`, with an in-memory
//!   implementation for tests and a JSON-file implementation that survives
//!   process restarts.
//! - [`LastOpenedStore`]: the one preference the loader persists, the id of
//!   the last bundle whose load was initiated.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod kv;
pub mod last_opened;

pub use error::{StorageError, StorageResult};
pub use kv::{JsonFileKvStore, KvStore, MemoryKvStore};
pub use last_opened::LastOpenedStore;
