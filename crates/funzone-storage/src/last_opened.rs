//! Persistence of the last bundle whose load was initiated.

use std::sync::Arc;

use tracing::{debug, warn};

use funzone_core::BundleId;

use crate::error::StorageResult;
use crate::kv::KvStore;

/// Namespace holding loader preferences.
pub const NAMESPACE: &str = "funzone";

/// Key of the last-opened bundle id (the `funzone_last_app` preference).
pub const LAST_APP_KEY: &str = "last_app";

/// Reads and writes the last-opened bundle id.
#[derive(Clone)]
pub struct LastOpenedStore {
    kv: Arc<dyn KvStore>,
}

impl LastOpenedStore {
    /// Wrap a key-value store.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Remember `id` as the last-opened bundle.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the value cannot be written.
    pub async fn save(&self, id: &BundleId) -> StorageResult<()> {
        self.kv
            .set(NAMESPACE, LAST_APP_KEY, id.as_str().to_owned())
            .await?;
        debug!(bundle_id = %id, "Saved last-opened bundle");
        Ok(())
    }

    /// The last-opened bundle id, if one was saved.
    ///
    /// A stored value that is no longer a valid bundle id is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the value cannot be read.
    pub async fn load(&self) -> StorageResult<Option<BundleId>> {
        let Some(raw) = self.kv.get(NAMESPACE, LAST_APP_KEY).await? else {
            return Ok(None);
        };
        match BundleId::new(raw) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed last-opened bundle id");
                Ok(None)
            },
        }
    }

    /// Forget the last-opened bundle.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the value cannot be removed.
    pub async fn clear(&self) -> StorageResult<bool> {
        self.kv.delete(NAMESPACE, LAST_APP_KEY).await
    }
}

impl std::fmt::Debug for LastOpenedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LastOpenedStore").finish_non_exhaustive()
    }
}
