//! Funzone Test - shared test utilities for the Funzone loader.
//!
//! Provides a scripted [`MockResourceClient`], a [`RecordingSurface`] that
//! keeps everything committed to it, catalog fixtures and a
//! [`LoaderHarness`] wiring them into a `LoadController`.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! funzone-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use funzone_test::{LoaderHarness, test_catalog};
//!
//! #[tokio::test]
//! async fn test_bingo_loads() {
//!     let harness = LoaderHarness::new(test_catalog());
//!     let outcome = harness.controller.load_app("bingo").await.unwrap();
//!     assert!(outcome.is_ready());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
