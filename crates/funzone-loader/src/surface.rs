//! The host rendering surface.
//!
//! The loader never touches a document directly. It commits prepared markup
//! to a [`RenderSurface`] and asks it to attach executable references, each
//! tagged with a [`Provenance`] so the loader can find and remove them on
//! the next load.

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use funzone_core::BundleId;

use crate::error::SurfaceResult;

/// Attribute marking executables attached by the primary mechanism.
pub const PRIMARY_MARKER: &str = "data-funzone";

/// Attribute marking executables attached by the inline fallback.
pub const FALLBACK_MARKER: &str = "data-funzone-fallback";

static SCRIPT_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(script)").expect("valid script close regex"));

/// How an executable was attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Referenced by location and loaded asynchronously.
    Primary,
    /// Fetched by the loader and attached inline.
    Fallback,
}

impl Provenance {
    /// The marker attribute for this provenance.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Primary => PRIMARY_MARKER,
            Self::Fallback => FALLBACK_MARKER,
        }
    }
}

/// Where an executable's code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// Loaded by the host from a location.
    External(String),
    /// Code text supplied directly.
    Inline(String),
}

/// An executable to attach to the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableRef {
    /// Bundle the executable belongs to.
    pub bundle_id: BundleId,
    /// Declared script path.
    pub path: String,
    /// Code location or text.
    pub source: ScriptSource,
    /// Attachment mechanism.
    pub provenance: Provenance,
}

impl ExecutableRef {
    /// A primary reference loading `src` asynchronously.
    #[must_use]
    pub fn external(bundle_id: BundleId, path: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            bundle_id,
            path: path.into(),
            source: ScriptSource::External(src.into()),
            provenance: Provenance::Primary,
        }
    }

    /// A fallback reference carrying the fetched code.
    #[must_use]
    pub fn inline(bundle_id: BundleId, path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            bundle_id,
            path: path.into(),
            source: ScriptSource::Inline(text.into()),
            provenance: Provenance::Fallback,
        }
    }

    /// Render as a `<script>` element carrying its provenance marker.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let marker = self.provenance.marker();
        match &self.source {
            ScriptSource::External(src) => format!(
                "<script src=\"{}\" async {marker}=\"{}\"></script>",
                src.replace('"', "&quot;"),
                self.bundle_id
            ),
            // Only `</script`, in any case, can terminate an inline block early.
            ScriptSource::Inline(text) => format!(
                "<script {marker}=\"{}\">\n{}\n</script>",
                self.bundle_id,
                SCRIPT_CLOSE.replace_all(text, "<\\/$1")
            ),
        }
    }
}

impl fmt::Display for ExecutableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.provenance.marker())
    }
}

/// Host-side rendering target.
///
/// Implementations must make `set_content` atomic: observers see either the
/// previous content or the new content, never a mix.
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Replace the surface content with `fragment`.
    async fn set_content(&self, fragment: &str) -> SurfaceResult<()>;

    /// Attach an executable and report whether it loaded.
    async fn attach_executable(&self, executable: ExecutableRef) -> SurfaceResult<()>;

    /// Remove every executable carrying either provenance marker.
    ///
    /// Returns how many were removed.
    async fn remove_executables(&self) -> SurfaceResult<usize>;
}
