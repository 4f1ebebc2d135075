//! Full resource checks across the catalog.

use std::fmt;

use tracing::{info, warn};

use funzone_core::{BundleCatalog, BundleDescriptor, BundleId};

use crate::client::ResourceClient;

/// Kind of resource checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Entry markup.
    Entry,
    /// Stylesheet.
    Style,
    /// Script.
    Script,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Entry => "entry",
            Self::Style => "style",
            Self::Script => "script",
        })
    }
}

/// Result of one existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCheck {
    /// Kind of resource.
    pub kind: ResourceKind,
    /// Declared path.
    pub path: String,
    /// Failure message, `None` when available.
    pub error: Option<String>,
}

impl ResourceCheck {
    /// Whether the resource answered.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Checks for every resource of one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    /// Bundle id.
    pub bundle_id: BundleId,
    /// Display title.
    pub title: String,
    /// One entry per declared resource, entry first.
    pub checks: Vec<ResourceCheck>,
}

impl BundleReport {
    /// Whether every resource answered.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(ResourceCheck::is_ok)
    }
}

/// Loader health snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Bundle of the most recent load request.
    pub current_bundle_id: Option<BundleId>,
    /// Catalog size.
    pub bundle_count: usize,
    /// Loading flag at the time of the report.
    pub is_loading: bool,
    /// Grid flag at the time of the report.
    pub is_grid_visible: bool,
    /// Fullscreen flag at the time of the report.
    pub is_fullscreen: bool,
    /// Persisted last-opened id.
    pub last_opened: Option<BundleId>,
    /// Per-bundle checks, in catalog order.
    pub bundles: Vec<BundleReport>,
}

/// Check every declared resource of `descriptor`.
pub async fn check_bundle(client: &dyn ResourceClient, descriptor: &BundleDescriptor) -> BundleReport {
    let declared = std::iter::once((ResourceKind::Entry, descriptor.entry_path()))
        .chain(descriptor.style_paths().iter().map(|p| (ResourceKind::Style, p.as_str())))
        .chain(descriptor.script_paths().iter().map(|p| (ResourceKind::Script, p.as_str())));

    let mut checks = Vec::new();
    for (kind, path) in declared {
        let error = match client.head(path).await {
            Ok(()) => {
                info!(bundle_id = %descriptor.id(), %kind, path, "Resource available");
                None
            },
            Err(e) => {
                warn!(bundle_id = %descriptor.id(), %kind, path, error = %e, "Resource unavailable");
                Some(e.to_string())
            },
        };
        checks.push(ResourceCheck {
            kind,
            path: path.to_owned(),
            error,
        });
    }

    BundleReport {
        bundle_id: descriptor.id().clone(),
        title: descriptor.title().to_owned(),
        checks,
    }
}

/// Check every bundle in the catalog, one after another.
pub async fn check_catalog(client: &dyn ResourceClient, catalog: &BundleCatalog) -> Vec<BundleReport> {
    let mut reports = Vec::with_capacity(catalog.len());
    for descriptor in catalog.all() {
        reports.push(check_bundle(client, descriptor).await);
    }
    reports
}
