//! Observable loader state.

use std::fmt;

use tokio::sync::watch;

use funzone_core::BundleId;

use crate::probe::ResourceStatus;

/// Where a load currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing has been loaded yet.
    #[default]
    Idle,
    /// Checking resource availability.
    Probing,
    /// Retrieving the entry markup.
    Fetching,
    /// Preparing and committing the markup.
    Rendering,
    /// Content is shown; scripts are being attached.
    ScriptAttaching,
    /// The load finished.
    Ready,
    /// The load ended with a diagnostic document.
    Failed,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Probing => "probing",
            Self::Fetching => "fetching",
            Self::Rendering => "rendering",
            Self::ScriptAttaching => "script-attaching",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the surface is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenderedContent {
    /// Nothing rendered yet.
    #[default]
    Empty,
    /// Prepared bundle markup.
    Bundle(String),
    /// A diagnostic document for a failed load.
    Diagnostic(String),
}

impl RenderedContent {
    /// The rendered markup, if any.
    #[must_use]
    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Bundle(m) | Self::Diagnostic(m) => Some(m),
        }
    }

    /// Whether this is a diagnostic document.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Diagnostic(_))
    }
}

/// Snapshot of the loader published to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState {
    /// Incremented on every accepted load request.
    pub generation: u64,
    /// Current phase.
    pub phase: LoadPhase,
    /// Bundle of the most recent load request.
    pub current_bundle_id: Option<BundleId>,
    /// True from the start of a load until it is ready or has failed.
    pub is_loading: bool,
    /// Surface content.
    pub rendered_content: RenderedContent,
    /// Probe result of the current load, once known.
    pub resource_status: Option<ResourceStatus>,
    /// Presentation flag.
    pub is_fullscreen: bool,
    /// Presentation flag. Hidden on every load.
    pub is_grid_visible: bool,
}

/// Identifies one load request.
///
/// Work for a load checks its ticket before every visible effect; once a
/// newer load begins the ticket is stale and the work is dropped.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    state: Option<watch::Receiver<LoadState>>,
}

impl LoadTicket {
    pub(crate) fn new(generation: u64, state: watch::Receiver<LoadState>) -> Self {
        Self {
            generation,
            state: Some(state),
        }
    }

    /// A ticket that never goes stale, for driving components outside a
    /// controller.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            generation: 0,
            state: None,
        }
    }

    /// The generation this ticket was issued for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this is still the most recent load.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.state
            .as_ref()
            .is_none_or(|rx| rx.borrow().generation == self.generation)
    }
}
