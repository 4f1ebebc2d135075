#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Configuration for the Funzone bundle loader.
//!
//! # Usage
//!
//! ```rust,no_run
//! use funzone_config::Config;
//!
//! let resolved = Config::load(Some(std::path::Path::new("."))).unwrap();
//! println!("Serving bundles from {}", resolved.config.source.base_url);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Workspace** (`{workspace}/.funzone/config.toml`)
//! 2. **User** (`~/.funzone/config.toml`, or `$FUNZONE_HOME/config.toml`)
//! 3. **Environment variables** (`FUNZONE_*`) - fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other internal funzone crates. Bundle
//! sections are converted into catalog descriptors at the CLI boundary.

/// Configuration error types.
pub mod error;
/// Configuration file discovery and layered loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(workspace_root: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, None)
    }

    /// The embedded defaults, including the built-in bundle catalog.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the embedded defaults are malformed.
    pub fn embedded() -> ConfigResult<Self> {
        loader::defaults()
    }

    /// Load configuration from a single file layered over the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
