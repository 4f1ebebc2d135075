//! The static bundle catalog.
//!
//! Built once at startup and shared read-only (usually behind an `Arc`).

use std::collections::HashMap;

use crate::bundle::{BundleDescriptor, BundleId};
use crate::error::{CatalogError, CatalogResult};

/// Immutable registry of bundle descriptors, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct BundleCatalog {
    bundles: Vec<BundleDescriptor>,
    index: HashMap<BundleId, usize>,
}

impl BundleCatalog {
    /// Build a catalog from descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two descriptors share an id.
    pub fn new(bundles: Vec<BundleDescriptor>) -> CatalogResult<Self> {
        let mut index = HashMap::with_capacity(bundles.len());
        for (position, bundle) in bundles.iter().enumerate() {
            if index.insert(bundle.id().clone(), position).is_some() {
                return Err(CatalogError::DuplicateId {
                    id: bundle.id().to_string(),
                });
            }
        }
        Ok(Self { bundles, index })
    }

    /// Every descriptor, in declaration order.
    #[must_use]
    pub fn all(&self) -> &[BundleDescriptor] {
        &self.bundles
    }

    /// Look up a descriptor by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&BundleDescriptor> {
        // Unknown ids that are not even valid identifiers are simply absent.
        let id = BundleId::new(id).ok()?;
        self.index.get(&id).map(|&position| &self.bundles[position])
    }

    /// Whether a bundle with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Number of bundles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
