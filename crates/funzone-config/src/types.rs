//! Configuration types for the Funzone loader.
//!
//! Every struct implements [`Default`] so that a bare `[section]` header in
//! TOML produces a working configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where bundle resources are fetched from.
    pub source: SourceSection,
    /// Load pipeline timing.
    pub loader: LoaderSection,
    /// Preference storage.
    pub storage: StorageSection,
    /// Logging level, format and per-crate directives.
    pub logging: LoggingSection,
    /// The bundle catalog.
    #[serde(rename = "bundle")]
    pub bundles: Vec<BundleSection>,
}

// ---------------------------------------------------------------------------
// SourceSection
// ---------------------------------------------------------------------------

/// Which resource client serves bundle paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Resolve paths against `base_url` and fetch over HTTP(S).
    #[default]
    Http,
    /// Read paths from `asset_root` on the local filesystem.
    Local,
}

/// Resource origin settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Client kind.
    pub kind: SourceKind,
    /// Origin that bundle paths are relative to. Must end in `/` to act as
    /// a directory; a missing trailing slash is added on use.
    pub base_url: String,
    /// Directory that bundle paths are relative to when `kind = "local"`.
    pub asset_root: Option<PathBuf>,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            kind: SourceKind::Http,
            base_url: "http://localhost:4200/".to_owned(),
            asset_root: None,
        }
    }
}

impl SourceSection {
    /// `base_url` parsed as a directory URL (always ending in `/`).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the URL does not parse.
    pub fn base_url(&self) -> ConfigResult<url::Url> {
        let mut raw = self.base_url.trim().to_owned();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        url::Url::parse(&raw).map_err(|e| ConfigError::ValidationError {
            field: "source.base_url".to_owned(),
            message: format!("'{}' is not a valid URL: {e}", self.base_url),
        })
    }
}

// ---------------------------------------------------------------------------
// LoaderSection
// ---------------------------------------------------------------------------

/// Load pipeline timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSection {
    /// Pause between committing markup and attaching scripts, giving the
    /// host a chance to parse the new content.
    pub script_attach_delay_ms: u64,
    /// Pause before auto-resuming the last-opened bundle at startup.
    pub resume_delay_ms: u64,
    /// Per-request timeout for probes and fetches. `0` disables it.
    pub fetch_timeout_secs: u64,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            script_attach_delay_ms: 300,
            resume_delay_ms: 100,
            fetch_timeout_secs: 30,
        }
    }
}

impl LoaderSection {
    /// Script attach delay as a [`Duration`].
    #[must_use]
    pub fn script_attach_delay(&self) -> Duration {
        Duration::from_millis(self.script_attach_delay_ms)
    }

    /// Resume delay as a [`Duration`].
    #[must_use]
    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    /// Request timeout, or `None` when disabled.
    #[must_use]
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Preference storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Preference file. Defaults to `<data dir>/funzone/preferences.json`.
    pub path: Option<PathBuf>,
}

impl StorageSection {
    /// The preference file to use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if no path is configured and the
    /// platform data directory cannot be determined.
    pub fn resolve_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        directories::ProjectDirs::from("", "", "funzone")
            .map(|dirs| dirs.data_dir().join("preferences.json"))
            .ok_or(ConfigError::NoHomeDir)
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Base level: trace, debug, info, warn or error.
    pub level: String,
    /// Output format: pretty, compact, json or full.
    pub format: String,
    /// Extra `target=level` directives.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// BundleSection
// ---------------------------------------------------------------------------

/// One `[[bundle]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleSection {
    /// Unique bundle id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Icon name.
    pub icon: String,
    /// Entry markup path.
    pub entry: String,
    /// Stylesheet paths, in order.
    pub styles: Vec<String>,
    /// Script paths, in order.
    pub scripts: Vec<String>,
    /// Category tag: game, productivity or creative.
    pub category: String,
}
