//! Script attachment with an inline fallback.
//!
//! Every declared script is attached by reference first. If the host reports
//! a failure the loader fetches the code itself and attaches it inline. A
//! script that fails both ways is logged and skipped; it never fails the
//! load.
//!
//! Scripts are attached concurrently, so completion order across scripts is
//! not guaranteed. Bundles whose scripts depend on one another must not rely
//! on declaration order.
//!
//! Each job checks its [`LoadTicket`] before the reference attach and again
//! before the inline attach. The attach itself runs outside the controller's
//! commit lock, so a job that passes its check just as a newer load clears
//! the surface can still leave one superseded script behind. The newer
//! load's own scripts are unaffected.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use funzone_core::{BundleDescriptor, BundleId};

use crate::client::ResourceClient;
use crate::error::ScriptAttachError;
use crate::rewrite::mounted_href;
use crate::state::LoadTicket;
use crate::surface::{ExecutableRef, RenderSurface};

/// How a single script ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// Attached by reference.
    Attached,
    /// Attached inline after the reference failed.
    RecoveredInline,
    /// Both mechanisms failed.
    Failed(ScriptAttachError),
    /// A newer load started before the script was attached.
    Skipped,
}

/// Result for one declared script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    /// Declared script path.
    pub path: String,
    /// What happened.
    pub outcome: ScriptOutcome,
}

/// Scripts being attached in the background.
///
/// Dropping the batch does not cancel attachment.
#[derive(Debug)]
pub struct ScriptBatch {
    paths: Vec<String>,
    tasks: Vec<JoinHandle<ScriptOutcome>>,
}

impl ScriptBatch {
    /// Number of scripts in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the bundle declared no scripts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every script and report, in declaration order.
    pub async fn settle(self) -> Vec<ScriptReport> {
        let results = join_all(self.tasks).await;
        self.paths
            .into_iter()
            .zip(results)
            .map(|(path, joined)| {
                let outcome = joined.unwrap_or_else(|e| {
                    warn!(path = %path, error = %e, "Script task panicked");
                    ScriptOutcome::Failed(ScriptAttachError {
                        path: path.clone(),
                        primary: "attachment task aborted".to_owned(),
                        fallback: e.to_string(),
                    })
                });
                ScriptReport { path, outcome }
            })
            .collect()
    }
}

/// Attaches a bundle's scripts to the surface.
#[derive(Clone)]
pub struct ScriptInjector {
    client: Arc<dyn ResourceClient>,
    surface: Arc<dyn RenderSurface>,
    mount: String,
}

impl ScriptInjector {
    /// Create an injector. Script references are built under the client's
    /// mount path.
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient>, surface: Arc<dyn RenderSurface>) -> Self {
        let mount = client.mount_path();
        Self {
            client,
            surface,
            mount,
        }
    }

    /// Remove previously attached executables, then attach every script of
    /// `descriptor` in the background.
    pub async fn inject(&self, descriptor: &BundleDescriptor, ticket: &LoadTicket) -> ScriptBatch {
        self.clear().await;
        self.spawn(descriptor, ticket)
    }

    /// Remove every executable either mechanism attached.
    pub async fn clear(&self) {
        match self.surface.remove_executables().await {
            Ok(0) => {},
            Ok(removed) => debug!(removed, "Removed previous executables"),
            Err(e) => warn!(error = %e, "Failed to remove previous executables"),
        }
    }

    /// Start one attachment task per declared script.
    #[must_use]
    pub fn spawn(&self, descriptor: &BundleDescriptor, ticket: &LoadTicket) -> ScriptBatch {
        let paths = descriptor.script_paths().to_vec();
        let tasks = paths
            .iter()
            .map(|path| {
                let job = AttachJob {
                    bundle_id: descriptor.id().clone(),
                    path: path.clone(),
                    src: mounted_href(&self.mount, path),
                    client: Arc::clone(&self.client),
                    surface: Arc::clone(&self.surface),
                    ticket: ticket.clone(),
                };
                tokio::spawn(job.run())
            })
            .collect();

        ScriptBatch { paths, tasks }
    }
}

impl fmt::Debug for ScriptInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptInjector")
            .field("mount", &self.mount)
            .finish_non_exhaustive()
    }
}

struct AttachJob {
    bundle_id: BundleId,
    path: String,
    src: String,
    client: Arc<dyn ResourceClient>,
    surface: Arc<dyn RenderSurface>,
    ticket: LoadTicket,
}

impl AttachJob {
    async fn run(self) -> ScriptOutcome {
        if !self.ticket.is_current() {
            return ScriptOutcome::Skipped;
        }

        let primary =
            ExecutableRef::external(self.bundle_id.clone(), self.path.clone(), self.src.clone());
        let primary_err = match self.surface.attach_executable(primary).await {
            Ok(()) => {
                debug!(path = %self.path, "Script attached");
                return ScriptOutcome::Attached;
            },
            Err(e) => e,
        };
        warn!(path = %self.path, error = %primary_err, "Script failed to load, trying inline fallback");

        let text = match self.client.get_text(&self.path).await {
            Ok(text) => text,
            Err(e) => return self.give_up(&primary_err, &e),
        };

        if !self.ticket.is_current() {
            return ScriptOutcome::Skipped;
        }

        let fallback = ExecutableRef::inline(self.bundle_id.clone(), self.path.clone(), text);
        match self.surface.attach_executable(fallback).await {
            Ok(()) => {
                info!(path = %self.path, "Script attached inline");
                ScriptOutcome::RecoveredInline
            },
            Err(e) => self.give_up(&primary_err, &e),
        }
    }

    fn give_up(&self, primary: &dyn fmt::Display, fallback: &dyn fmt::Display) -> ScriptOutcome {
        let err = ScriptAttachError {
            path: self.path.clone(),
            primary: primary.to_string(),
            fallback: fallback.to_string(),
        };
        warn!(error = %err, "Script skipped");
        ScriptOutcome::Failed(err)
    }
}
