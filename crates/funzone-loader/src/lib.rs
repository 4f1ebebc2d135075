//! Funzone Loader - runtime loading of web bundles into a host surface.
//!
//! A load request for a catalog bundle runs through a fixed pipeline:
//!
//! - [`AvailabilityProbe`] checks that the entry, first stylesheet and first
//!   script exist.
//! - [`ContentFetcher`] retrieves the entry markup, bypassing caches.
//! - [`MarkupRewriter`] adds a `<base>` for the bundle directory and links
//!   the declared stylesheets.
//! - The prepared markup is committed to a [`RenderSurface`].
//! - [`ScriptInjector`] attaches scripts by reference, falling back to
//!   inline code when the host reports a failure.
//!
//! [`LoadController`] drives the pipeline, publishes [`LoadState`] to
//! observers and discards the work of loads that a newer request replaced.
//! Failed loads commit a diagnostic document instead of the bundle.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use funzone_core::{BundleCatalog, BundleDescriptor};
//! use funzone_loader::{HttpResourceClient, LoadController, LoaderSettings, RenderSurface};
//! use funzone_storage::{LastOpenedStore, MemoryKvStore};
//!
//! # async fn example(surface: Arc<dyn RenderSurface>) -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = BundleCatalog::new(vec![
//!     BundleDescriptor::new("bingo", "Bingo", "assets/funzone/Bingo/bingo.html")?
//!         .with_style("assets/funzone/Bingo/style.css"),
//! ])?;
//! let client = HttpResourceClient::new("http://localhost:4200/".parse()?, None)?;
//!
//! let controller = LoadController::new(
//!     Arc::new(catalog),
//!     Arc::new(client),
//!     surface,
//!     LastOpenedStore::new(Arc::new(MemoryKvStore::new())),
//!     LoaderSettings::default(),
//! );
//! controller.load_app("bingo").await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod client;
pub mod controller;
pub mod diagnostic;
pub mod doctor;
pub mod error;
pub mod fetch;
pub mod probe;
pub mod rewrite;
pub mod scripts;
pub mod state;
pub mod surface;

pub use client::{HttpResourceClient, LocalResourceClient, ResourceClient};
pub use controller::{LoadController, LoadOutcome, LoaderSettings};
pub use diagnostic::{DiagnosticDocument, html_escape};
pub use doctor::{BundleReport, DoctorReport, ResourceCheck, ResourceKind};
pub use error::{
    FetchError, FetchResult, LoadError, LoadResult, ScriptAttachError, SurfaceError,
    SurfaceResult,
};
pub use fetch::ContentFetcher;
pub use probe::{AvailabilityProbe, ResourceStatus};
pub use rewrite::MarkupRewriter;
pub use scripts::{ScriptBatch, ScriptInjector, ScriptOutcome, ScriptReport};
pub use state::{LoadPhase, LoadState, LoadTicket, RenderedContent};
pub use surface::{ExecutableRef, Provenance, RenderSurface, ScriptSource};
