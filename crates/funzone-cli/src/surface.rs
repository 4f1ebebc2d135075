//! A render surface that assembles a standalone HTML document.
//!
//! The CLI has no host page, so the committed markup and every attached
//! script are collected and written out as one file that can be opened in a
//! browser.

use std::sync::Mutex;

use async_trait::async_trait;

use funzone_loader::{ExecutableRef, RenderSurface, SurfaceError, SurfaceResult};

/// Collects content and executables in memory.
#[derive(Debug, Default)]
pub(crate) struct ExportSurface {
    inner: Mutex<Exported>,
}

#[derive(Debug, Default)]
struct Exported {
    content: Option<String>,
    executables: Vec<ExecutableRef>,
}

impl ExportSurface {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The committed content followed by attached scripts, or `None` if
    /// nothing was committed.
    pub(crate) fn document(&self) -> Option<String> {
        let guard = self.inner.lock().ok()?;
        let content = guard.content.as_ref()?;
        let scripts = guard
            .executables
            .iter()
            .map(ExecutableRef::to_markup)
            .collect::<Vec<_>>();
        if scripts.is_empty() {
            return Some(content.clone());
        }
        Some(format!("{content}\n{}\n", scripts.join("\n")))
    }
}

fn poisoned() -> SurfaceError {
    SurfaceError::Rejected("export surface lock poisoned".to_owned())
}

#[async_trait]
impl RenderSurface for ExportSurface {
    async fn set_content(&self, fragment: &str) -> SurfaceResult<()> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        guard.content = Some(fragment.to_owned());
        Ok(())
    }

    async fn attach_executable(&self, executable: ExecutableRef) -> SurfaceResult<()> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        guard.executables.push(executable);
        Ok(())
    }

    async fn remove_executables(&self) -> SurfaceResult<usize> {
        let mut guard = self.inner.lock().map_err(|_| poisoned())?;
        Ok(guard.executables.drain(..).count())
    }
}
