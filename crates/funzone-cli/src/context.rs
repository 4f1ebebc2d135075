//! Wiring a controller from the resolved configuration.

use std::sync::Arc;

use anyhow::{Context, Result};

use funzone_config::Config;
use funzone_loader::LoadController;
use funzone_storage::{JsonFileKvStore, LastOpenedStore};

use crate::config_bridge;
use crate::surface::ExportSurface;

/// A controller plus the pieces commands inspect directly.
pub(crate) struct LoaderContext {
    pub(crate) controller: LoadController,
    pub(crate) surface: Arc<ExportSurface>,
    pub(crate) last_opened: LastOpenedStore,
}

impl LoaderContext {
    pub(crate) async fn build(cfg: &Config) -> Result<Self> {
        let catalog = config_bridge::to_catalog(cfg)?;
        let client = config_bridge::to_client(cfg)?;

        let prefs = cfg.storage.resolve_path()?;
        let kv = JsonFileKvStore::open(&prefs)
            .await
            .with_context(|| format!("failed to open preferences at {}", prefs.display()))?;
        let last_opened = LastOpenedStore::new(Arc::new(kv));

        let surface = Arc::new(ExportSurface::new());
        let controller = LoadController::new(
            Arc::new(catalog),
            client,
            Arc::clone(&surface) as Arc<dyn funzone_loader::RenderSurface>,
            last_opened.clone(),
            config_bridge::to_settings(cfg),
        );

        Ok(Self {
            controller,
            surface,
            last_opened,
        })
    }
}
