//! Resource availability probing.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use funzone_core::BundleDescriptor;

use crate::client::ResourceClient;

/// Availability of a bundle's sampled resources.
///
/// The entry, the first stylesheet and the first script are checked. A
/// bundle with no stylesheets (or no scripts) counts as available for that
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStatus {
    /// The entry markup answered the existence check.
    pub entry_ok: bool,
    /// The first stylesheet answered, or there are none.
    pub style_ok: bool,
    /// The first script answered, or there are none.
    pub script_ok: bool,
}

impl ResourceStatus {
    /// Whether every sampled resource is available.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.entry_ok && self.style_ok && self.script_ok
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |ok: bool| if ok { "ok" } else { "missing" };
        write!(
            f,
            "entry={} style={} script={}",
            mark(self.entry_ok),
            mark(self.style_ok),
            mark(self.script_ok)
        )
    }
}

/// Runs lightweight existence checks against a [`ResourceClient`].
#[derive(Clone)]
pub struct AvailabilityProbe {
    client: Arc<dyn ResourceClient>,
}

impl AvailabilityProbe {
    /// Create a probe over `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self { client }
    }

    /// Check the entry, first stylesheet and first script concurrently.
    ///
    /// Never fails: an unreachable resource is reported as `false`.
    pub async fn probe(&self, descriptor: &BundleDescriptor) -> ResourceStatus {
        let (entry_ok, style_ok, script_ok) = tokio::join!(
            self.check(Some(descriptor.entry_path())),
            self.check(descriptor.style_paths().first().map(String::as_str)),
            self.check(descriptor.script_paths().first().map(String::as_str)),
        );
        let status = ResourceStatus {
            entry_ok,
            style_ok,
            script_ok,
        };
        debug!(bundle_id = %descriptor.id(), %status, "Probed resources");
        status
    }

    /// Check a single path. `None` is vacuously available.
    pub async fn check(&self, path: Option<&str>) -> bool {
        let Some(path) = path else {
            return true;
        };
        match self.client.head(path).await {
            Ok(()) => true,
            Err(e) => {
                warn!(path, error = %e, "Resource check failed");
                false
            },
        }
    }
}

impl fmt::Debug for AvailabilityProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvailabilityProbe").finish_non_exhaustive()
    }
}
