//! Entry markup retrieval.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::client::ResourceClient;
use crate::error::FetchResult;

/// Retrieves the full text of an entry resource.
#[derive(Clone)]
pub struct ContentFetcher {
    client: Arc<dyn ResourceClient>,
}

impl ContentFetcher {
    /// Create a fetcher over `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }

    /// Fetch `path`, bypassing caches.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`](crate::FetchError) on transport failure, a
    /// non-success status or an empty body.
    pub async fn fetch(&self, path: &str) -> FetchResult<String> {
        match self.client.get_text(path).await {
            Ok(body) => {
                debug!(path, bytes = body.len(), "Fetched entry markup");
                Ok(body)
            },
            Err(e) => {
                error!(path, error = %e, "Failed to fetch entry markup");
                Err(e)
            },
        }
    }
}

impl fmt::Debug for ContentFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentFetcher").finish_non_exhaustive()
    }
}
