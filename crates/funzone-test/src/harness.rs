//! A controller wired to mocks.

use std::sync::Arc;

use funzone_core::BundleCatalog;
use funzone_loader::{LoadController, LoaderSettings};
use funzone_storage::LastOpenedStore;

use crate::fixtures::{memory_last_opened, serving_client};
use crate::mocks::{MockResourceClient, RecordingSurface};

/// A [`LoadController`] with handles to its collaborators.
#[derive(Debug, Clone)]
pub struct LoaderHarness {
    /// The controller under test.
    pub controller: LoadController,
    /// Its resource client.
    pub client: MockResourceClient,
    /// Its surface.
    pub surface: RecordingSurface,
    /// Its last-opened store.
    pub last_opened: LastOpenedStore,
}

impl LoaderHarness {
    /// A harness serving every resource in `catalog`, with no delays.
    #[must_use]
    pub fn new(catalog: BundleCatalog) -> Self {
        let client = serving_client(&catalog);
        Self::with_parts(catalog, client, RecordingSurface::new(), memory_last_opened())
    }

    /// A harness from explicit parts, with no delays.
    #[must_use]
    pub fn with_parts(
        catalog: BundleCatalog,
        client: MockResourceClient,
        surface: RecordingSurface,
        last_opened: LastOpenedStore,
    ) -> Self {
        let controller = LoadController::new(
            Arc::new(catalog),
            Arc::new(client.clone()),
            Arc::new(surface.clone()),
            last_opened.clone(),
            LoaderSettings::immediate(),
        );
        Self {
            controller,
            client,
            surface,
            last_opened,
        }
    }
}

/// Install a test-writer subscriber honoring `RUST_LOG`. Safe to call more
/// than once.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
