//! The load controller.
//!
//! [`LoadController`] owns the loader state and runs the pipeline for each
//! load request:
//!
//! 1. Probe the entry, first stylesheet and first script.
//! 2. Fetch the entry markup, bypassing caches.
//! 3. Rewrite it and commit it to the surface in one step.
//! 4. After a short delay, remove old executables and attach the scripts.
//!
//! Every accepted request bumps the state generation. Each commit re-checks
//! the generation under a single lock, so a superseded load can never
//! overwrite the content or flags of the load that replaced it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

use funzone_core::{BundleCatalog, BundleDescriptor, BundleId};
use funzone_storage::LastOpenedStore;

use crate::client::ResourceClient;
use crate::diagnostic::DiagnosticDocument;
use crate::doctor::{DoctorReport, check_catalog};
use crate::error::{LoadError, LoadResult, SurfaceResult};
use crate::fetch::ContentFetcher;
use crate::probe::AvailabilityProbe;
use crate::rewrite::MarkupRewriter;
use crate::scripts::{ScriptBatch, ScriptInjector};
use crate::state::{LoadPhase, LoadState, LoadTicket, RenderedContent};
use crate::surface::RenderSurface;

/// Pipeline timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderSettings {
    /// Pause between committing markup and attaching scripts.
    pub script_attach_delay: Duration,
    /// Pause before auto-resuming the last-opened bundle.
    pub resume_delay: Duration,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            script_attach_delay: Duration::from_millis(300),
            resume_delay: Duration::from_millis(100),
        }
    }
}

impl LoaderSettings {
    /// Settings with no delays.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            script_attach_delay: Duration::ZERO,
            resume_delay: Duration::ZERO,
        }
    }
}

/// How a load request ended, when it did not fail.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Content is committed and scripts are attaching.
    Ready {
        /// The loaded bundle.
        bundle_id: BundleId,
        /// The scripts being attached.
        scripts: ScriptBatch,
    },
    /// A newer load started first; nothing from this one was kept.
    Superseded {
        /// The bundle this request was for.
        bundle_id: BundleId,
    },
}

impl LoadOutcome {
    /// Whether the load reached `Ready`.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// The bundle the request was for.
    #[must_use]
    pub fn bundle_id(&self) -> &BundleId {
        match self {
            Self::Ready { bundle_id, .. } | Self::Superseded { bundle_id } => bundle_id,
        }
    }
}

/// Loads bundles onto a [`RenderSurface`] and publishes [`LoadState`].
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct LoadController {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<BundleCatalog>,
    client: Arc<dyn ResourceClient>,
    surface: Arc<dyn RenderSurface>,
    last_opened: LastOpenedStore,
    probe: AvailabilityProbe,
    fetcher: ContentFetcher,
    rewriter: MarkupRewriter,
    injector: ScriptInjector,
    settings: LoaderSettings,
    state: watch::Sender<LoadState>,
    /// Serializes generation bumps with surface and state commits.
    commit_lock: Mutex<()>,
}

impl LoadController {
    /// Create a controller in the `Idle` state.
    #[must_use]
    pub fn new(
        catalog: Arc<BundleCatalog>,
        client: Arc<dyn ResourceClient>,
        surface: Arc<dyn RenderSurface>,
        last_opened: LastOpenedStore,
        settings: LoaderSettings,
    ) -> Self {
        let (state, _) = watch::channel(LoadState::default());
        Self {
            inner: Arc::new(Inner {
                probe: AvailabilityProbe::new(Arc::clone(&client)),
                fetcher: ContentFetcher::new(Arc::clone(&client)),
                rewriter: MarkupRewriter::mounted_at(client.mount_path()),
                injector: ScriptInjector::new(Arc::clone(&client), Arc::clone(&surface)),
                catalog,
                client,
                surface,
                last_opened,
                settings,
                state,
                commit_lock: Mutex::new(()),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Load the bundle `id`.
    ///
    /// Returns once the content is committed and script attachment has
    /// started. A newer call supersedes this one at its next step.
    ///
    /// # Errors
    ///
    /// - [`LoadError::UnknownBundle`] if `id` is not in the catalog. State is
    ///   left untouched and nothing is persisted.
    /// - [`LoadError::Fetch`] or [`LoadError::Surface`] after a diagnostic
    ///   document has been committed in place of the bundle.
    pub async fn load_app(&self, id: &str) -> LoadResult<LoadOutcome> {
        let Some(descriptor) = self.inner.catalog.find(id).cloned() else {
            warn!(bundle_id = id, "Requested bundle is not in the catalog");
            return Err(LoadError::UnknownBundle { id: id.to_owned() });
        };

        let ticket = self.begin(&descriptor).await;
        let span = info_span!(
            "load_app",
            bundle_id = %descriptor.id(),
            generation = ticket.generation()
        );
        self.run(descriptor, ticket).instrument(span).await
    }

    /// Reload the current bundle, if any.
    pub async fn refresh(&self) -> Option<LoadResult<LoadOutcome>> {
        let id = self.inner.state.borrow().current_bundle_id.clone()?;
        info!(bundle_id = %id, "Refreshing bundle");
        Some(self.load_app(id.as_str()).await)
    }

    /// Load the persisted last-opened bundle after the resume delay.
    ///
    /// Does nothing when no id is stored, the store cannot be read, or the
    /// id is no longer in the catalog.
    pub async fn resume_last(&self) -> Option<LoadResult<LoadOutcome>> {
        let id = match self.inner.last_opened.load().await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("No last-opened bundle to resume");
                return None;
            },
            Err(e) => {
                warn!(error = %e, "Failed to read last-opened bundle");
                return None;
            },
        };
        if !self.inner.catalog.contains(id.as_str()) {
            info!(bundle_id = %id, "Last-opened bundle is no longer in the catalog");
            return None;
        }

        tokio::time::sleep(self.inner.settings.resume_delay).await;
        info!(bundle_id = %id, "Resuming last-opened bundle");
        Some(self.load_app(id.as_str()).await)
    }

    async fn begin(&self, descriptor: &BundleDescriptor) -> LoadTicket {
        let _guard = self.inner.commit_lock.lock().await;

        let mut generation = 0;
        self.inner.state.send_modify(|s| {
            s.generation = s.generation.wrapping_add(1);
            s.phase = LoadPhase::Probing;
            s.current_bundle_id = Some(descriptor.id().clone());
            s.is_loading = true;
            s.resource_status = None;
            s.is_grid_visible = false;
            generation = s.generation;
        });

        if let Err(e) = self.inner.last_opened.save(descriptor.id()).await {
            warn!(bundle_id = %descriptor.id(), error = %e, "Failed to persist last-opened bundle");
        }

        LoadTicket::new(generation, self.inner.state.subscribe())
    }

    async fn run(&self, descriptor: BundleDescriptor, ticket: LoadTicket) -> LoadResult<LoadOutcome> {
        let bundle_id = descriptor.id().clone();
        info!(entry = descriptor.entry_path(), "Loading bundle");

        let status = self.inner.probe.probe(&descriptor).await;
        let advanced = self
            .commit(&ticket, |s| {
                s.resource_status = Some(status);
                s.phase = LoadPhase::Fetching;
            })
            .await;
        if !advanced {
            return Ok(superseded(bundle_id));
        }

        let raw = match self.inner.fetcher.fetch(descriptor.entry_path()).await {
            Ok(raw) => raw,
            Err(source) => {
                let err = LoadError::Fetch {
                    bundle: bundle_id,
                    source,
                };
                return self.fail(&descriptor, &ticket, err).await;
            },
        };
        if !self.commit(&ticket, |s| s.phase = LoadPhase::Rendering).await {
            return Ok(superseded(bundle_id));
        }

        let prepared = self.inner.rewriter.rewrite(&raw, &descriptor);
        match self.commit_content(&ticket, prepared).await {
            Ok(true) => {},
            Ok(false) => return Ok(superseded(bundle_id)),
            Err(source) => {
                let err = LoadError::Surface {
                    bundle: bundle_id,
                    source,
                };
                return self.fail(&descriptor, &ticket, err).await;
            },
        }
        debug!("Content committed");

        tokio::time::sleep(self.inner.settings.script_attach_delay).await;
        let Some(scripts) = self.start_scripts(&descriptor, &ticket).await else {
            return Ok(superseded(bundle_id));
        };

        let finished = self
            .commit(&ticket, |s| {
                s.phase = LoadPhase::Ready;
                s.is_loading = false;
            })
            .await;
        if !finished {
            return Ok(superseded(bundle_id));
        }

        info!(scripts = scripts.len(), "Bundle ready");
        Ok(LoadOutcome::Ready { bundle_id, scripts })
    }

    /// Apply `apply` to the state if `ticket` is still current.
    async fn commit(&self, ticket: &LoadTicket, apply: impl FnOnce(&mut LoadState) + Send) -> bool {
        let _guard = self.inner.commit_lock.lock().await;
        let generation = ticket.generation();
        self.inner.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            apply(s);
            true
        })
    }

    /// Write `markup` to the surface and record it, as one step.
    async fn commit_content(&self, ticket: &LoadTicket, markup: String) -> SurfaceResult<bool> {
        let _guard = self.inner.commit_lock.lock().await;
        if !ticket.is_current() {
            return Ok(false);
        }
        self.inner.surface.set_content(&markup).await?;
        self.inner
            .state
            .send_modify(|s| s.rendered_content = RenderedContent::Bundle(markup));
        Ok(true)
    }

    /// Clear old executables and start attaching new ones, unless superseded.
    async fn start_scripts(&self, descriptor: &BundleDescriptor, ticket: &LoadTicket) -> Option<ScriptBatch> {
        let _guard = self.inner.commit_lock.lock().await;
        if !ticket.is_current() {
            return None;
        }
        self.inner
            .state
            .send_modify(|s| s.phase = LoadPhase::ScriptAttaching);
        self.inner.injector.clear().await;
        Some(self.inner.injector.spawn(descriptor, ticket))
    }

    /// Commit a diagnostic document for `err` and return it.
    async fn fail(
        &self,
        descriptor: &BundleDescriptor,
        ticket: &LoadTicket,
        err: LoadError,
    ) -> LoadResult<LoadOutcome> {
        let location = self
            .inner
            .client
            .locate(descriptor.entry_path())
            .unwrap_or_else(|_| descriptor.entry_path().to_owned());

        let _guard = self.inner.commit_lock.lock().await;
        if !ticket.is_current() {
            debug!(error = %err, "Discarding failure of a superseded load");
            return Ok(superseded(descriptor.id().clone()));
        }
        error!(error = %err, "Bundle failed to load");

        let status = self.inner.state.borrow().resource_status;
        let message = err.to_string();
        let markup = DiagnosticDocument {
            descriptor,
            message: &message,
            status,
            entry_location: &location,
        }
        .render();

        if let Err(e) = self.inner.surface.set_content(&markup).await {
            error!(error = %e, "Surface rejected the diagnostic document");
        }
        self.inner.state.send_modify(|s| {
            s.rendered_content = RenderedContent::Diagnostic(markup);
            s.phase = LoadPhase::Failed;
            s.is_loading = false;
        });
        Err(err)
    }

    // -----------------------------------------------------------------------
    // Presentation
    // -----------------------------------------------------------------------

    /// Flip fullscreen and return the new value.
    pub fn toggle_fullscreen(&self) -> bool {
        let mut now = false;
        self.inner.state.send_modify(|s| {
            s.is_fullscreen = !s.is_fullscreen;
            now = s.is_fullscreen;
        });
        now
    }

    /// Show the bundle grid.
    pub fn show_grid(&self) {
        self.inner.state.send_modify(|s| s.is_grid_visible = true);
    }

    /// Hide the bundle grid.
    pub fn hide_grid(&self) {
        self.inner.state.send_modify(|s| s.is_grid_visible = false);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.inner.state.borrow().clone()
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.inner.state.subscribe()
    }

    /// The catalog this controller loads from.
    #[must_use]
    pub fn catalog(&self) -> &BundleCatalog {
        &self.inner.catalog
    }

    /// Descriptor of the current bundle.
    #[must_use]
    pub fn current_bundle(&self) -> Option<BundleDescriptor> {
        let state = self.inner.state.borrow();
        let id = state.current_bundle_id.as_ref()?;
        self.inner.catalog.find(id.as_str()).cloned()
    }

    /// Where bundle `id`'s entry can be opened outside the host.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownBundle`] for ids outside the catalog and
    /// [`LoadError::Fetch`] if the entry path cannot be located.
    pub fn entry_location(&self, id: &str) -> LoadResult<String> {
        let descriptor = self
            .inner
            .catalog
            .find(id)
            .ok_or_else(|| LoadError::UnknownBundle { id: id.to_owned() })?;
        self.inner
            .client
            .locate(descriptor.entry_path())
            .map_err(|source| LoadError::Fetch {
                bundle: descriptor.id().clone(),
                source,
            })
    }

    /// Check every resource in the catalog and report loader flags.
    pub async fn doctor(&self) -> DoctorReport {
        info!("Running diagnostics");
        let state = self.state();
        let last_opened = match self.inner.last_opened.load().await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to read last-opened bundle");
                None
            },
        };
        let bundles = check_catalog(self.inner.client.as_ref(), &self.inner.catalog).await;

        DoctorReport {
            current_bundle_id: state.current_bundle_id,
            bundle_count: self.inner.catalog.len(),
            is_loading: state.is_loading,
            is_grid_visible: state.is_grid_visible,
            is_fullscreen: state.is_fullscreen,
            last_opened,
            bundles,
        }
    }
}

fn superseded(bundle_id: BundleId) -> LoadOutcome {
    debug!(bundle_id = %bundle_id, "Load superseded");
    LoadOutcome::Superseded { bundle_id }
}

impl fmt::Debug for LoadController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadController")
            .field("bundles", &self.inner.catalog.len())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}
