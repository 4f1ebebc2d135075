//! Mock implementations for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use funzone_loader::{
    ExecutableRef, FetchError, FetchResult, Provenance, RenderSurface, ResourceClient,
    ScriptSource, SurfaceError, SurfaceResult,
};

// ---------------------------------------------------------------------------
// MockResourceClient
// ---------------------------------------------------------------------------

/// A scripted response for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// 200 with this body.
    Text(String),
    /// A non-success status.
    Status(u16),
    /// No response at all.
    Transport(String),
}

/// Request kind recorded by [`MockResourceClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMethod {
    /// Existence check.
    Head,
    /// Full retrieval.
    Get,
}

/// A recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// Request kind.
    pub method: MockMethod,
    /// Requested path.
    pub path: String,
}

/// Resource client answering from a table of scripted responses.
///
/// Unknown paths answer 404. A path can be gated so that `get_text` blocks
/// until the test releases it.
#[derive(Debug, Clone, Default)]
pub struct MockResourceClient {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    gates: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
    mount: Option<String>,
}

impl MockResourceClient {
    /// Create a client with no resources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `path`.
    #[must_use]
    pub fn with_text(self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.respond(path, MockResponse::Text(body.into()));
        self
    }

    /// Answer `path` with `status`.
    #[must_use]
    pub fn with_status(self, path: impl Into<String>, status: u16) -> Self {
        self.respond(path, MockResponse::Status(status));
        self
    }

    /// Fail `path` with a transport error.
    #[must_use]
    pub fn with_transport_error(self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.respond(path, MockResponse::Transport(message.into()));
        self
    }

    /// Report `mount` as the path bundles are served under.
    #[must_use]
    pub fn mounted_at(mut self, mount: impl Into<String>) -> Self {
        self.mount = Some(mount.into());
        self
    }

    /// Set or replace the response for `path`.
    pub fn respond(&self, path: impl Into<String>, response: MockResponse) {
        if let Ok(mut guard) = self.responses.lock() {
            guard.insert(path.into(), response);
        }
    }

    /// Hold `get_text(path)` until the returned handle is notified.
    #[must_use]
    pub fn gate(&self, path: impl Into<String>) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        if let Ok(mut guard) = self.gates.lock() {
            guard.insert(path.into(), Arc::clone(&notify));
        }
        notify
    }

    /// Every request made so far.
    #[must_use]
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// How many times `path` was requested with `method`.
    #[must_use]
    pub fn count(&self, method: MockMethod, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn record(&self, method: MockMethod, path: &str) {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(MockRequest {
                method,
                path: path.to_owned(),
            });
        }
    }

    fn lookup(&self, path: &str) -> MockResponse {
        self.responses
            .lock()
            .ok()
            .and_then(|g| g.get(path).cloned())
            .unwrap_or(MockResponse::Status(404))
    }

    fn gate_for(&self, path: &str) -> Option<Arc<Notify>> {
        self.gates.lock().ok().and_then(|g| g.get(path).cloned())
    }
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    async fn head(&self, path: &str) -> FetchResult<()> {
        self.record(MockMethod::Head, path);
        match self.lookup(path) {
            MockResponse::Text(_) => Ok(()),
            MockResponse::Status(status) => Err(FetchError::Status {
                path: path.to_owned(),
                status,
            }),
            MockResponse::Transport(message) => Err(FetchError::Transport {
                path: path.to_owned(),
                message,
            }),
        }
    }

    async fn get_text(&self, path: &str) -> FetchResult<String> {
        self.record(MockMethod::Get, path);
        if let Some(gate) = self.gate_for(path) {
            gate.notified().await;
        }
        match self.lookup(path) {
            MockResponse::Text(body) if body.is_empty() => Err(FetchError::EmptyBody {
                path: path.to_owned(),
            }),
            MockResponse::Text(body) => Ok(body),
            MockResponse::Status(status) => Err(FetchError::Status {
                path: path.to_owned(),
                status,
            }),
            MockResponse::Transport(message) => Err(FetchError::Transport {
                path: path.to_owned(),
                message,
            }),
        }
    }

    fn locate(&self, path: &str) -> FetchResult<String> {
        let mount = self.mount_path();
        Ok(format!(
            "http://funzone.test{mount}{}",
            path.trim_start_matches('/')
        ))
    }

    fn mount_path(&self) -> String {
        self.mount.clone().unwrap_or_else(|| "/".to_owned())
    }
}

// ---------------------------------------------------------------------------
// RecordingSurface
// ---------------------------------------------------------------------------

/// Render surface that records every operation.
///
/// Attaching a primary reference to a path registered with
/// [`fail_primary`](Self::fail_primary) fails, as does an inline attach for
/// a path registered with [`fail_inline`](Self::fail_inline).
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    contents: Arc<Mutex<Vec<String>>>,
    attached: Arc<Mutex<Vec<ExecutableRef>>>,
    attempts: Arc<Mutex<Vec<ExecutableRef>>>,
    failing_primary: Arc<Mutex<HashSet<String>>>,
    failing_inline: Arc<Mutex<HashSet<String>>>,
    reject_content: Arc<AtomicBool>,
}

impl RecordingSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make primary attachment of `path` fail.
    #[must_use]
    pub fn fail_primary(self, path: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.failing_primary.lock() {
            guard.insert(path.into());
        }
        self
    }

    /// Make inline attachment of `path` fail.
    #[must_use]
    pub fn fail_inline(self, path: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.failing_inline.lock() {
            guard.insert(path.into());
        }
        self
    }

    /// Reject every `set_content` call.
    #[must_use]
    pub fn rejecting_content(self) -> Self {
        self.reject_content.store(true, Ordering::SeqCst);
        self
    }

    /// The last committed content.
    #[must_use]
    pub fn current_content(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|g| g.last().cloned())
    }

    /// Every committed content, oldest first.
    #[must_use]
    pub fn content_history(&self) -> Vec<String> {
        self.contents.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Executables currently attached.
    #[must_use]
    pub fn attached(&self) -> Vec<ExecutableRef> {
        self.attached.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Every attach attempt, successful or not.
    #[must_use]
    pub fn attempts(&self) -> Vec<ExecutableRef> {
        self.attempts.lock().map(|g| g.clone()).unwrap_or_default()
    }

    fn should_fail(&self, executable: &ExecutableRef) -> bool {
        let set = match executable.provenance {
            Provenance::Primary => &self.failing_primary,
            Provenance::Fallback => &self.failing_inline,
        };
        set.lock()
            .map(|g| g.contains(&executable.path))
            .unwrap_or(false)
    }
}

#[async_trait]
impl RenderSurface for RecordingSurface {
    async fn set_content(&self, fragment: &str) -> SurfaceResult<()> {
        if self.reject_content.load(Ordering::SeqCst) {
            return Err(SurfaceError::Rejected("surface is read-only".to_owned()));
        }
        if let Ok(mut guard) = self.contents.lock() {
            guard.push(fragment.to_owned());
        }
        Ok(())
    }

    async fn attach_executable(&self, executable: ExecutableRef) -> SurfaceResult<()> {
        if let Ok(mut guard) = self.attempts.lock() {
            guard.push(executable.clone());
        }
        if self.should_fail(&executable) {
            let reason = match &executable.source {
                ScriptSource::External(src) => format!("{src} failed to load"),
                ScriptSource::Inline(_) => "inline code threw".to_owned(),
            };
            return Err(SurfaceError::ExecutableFailed {
                path: executable.path,
                reason,
            });
        }
        if let Ok(mut guard) = self.attached.lock() {
            guard.push(executable);
        }
        Ok(())
    }

    async fn remove_executables(&self) -> SurfaceResult<usize> {
        let removed = self
            .attached
            .lock()
            .map(|mut g| g.drain(..).count())
            .unwrap_or(0);
        Ok(removed)
    }
}
