//! Funzone Core - bundle descriptors and the bundle catalog.
//!
//! A *bundle* is a self-contained mini-application described by one entry
//! markup resource plus optional stylesheet and script resources. Bundles
//! are declared up front (compiled in or read from configuration) and never
//! change while the process runs.
//!
//! # Example
//!
//! ```rust
//! use funzone_core::{BundleCatalog, BundleDescriptor, Category};
//!
//! # fn main() -> Result<(), funzone_core::CatalogError> {
//! let bingo = BundleDescriptor::new("bingo", "Bingo Challenge", "assets/funzone/Bingo/bingo.html")?
//!     .with_style("assets/funzone/Bingo/style.css")
//!     .with_category(Category::Game);
//!
//! let catalog = BundleCatalog::new(vec![bingo])?;
//! assert!(catalog.find("bingo").is_some());
//! assert!(catalog.find("chess").is_none());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod bundle;
pub mod catalog;
pub mod error;

pub use bundle::{BundleDescriptor, BundleId, Category};
pub use catalog::BundleCatalog;
pub use error::{CatalogError, CatalogResult};
