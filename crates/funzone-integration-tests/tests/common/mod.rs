//! Shared harness: a static file server over a temporary asset root.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use funzone_core::BundleCatalog;
use funzone_loader::{HttpResourceClient, LoadController, LoaderSettings};
use funzone_storage::{JsonFileKvStore, LastOpenedStore};
use funzone_test::RecordingSurface;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use url::Url;

/// Serves a temporary directory over HTTP on a random local port.
///
/// The server task is aborted and the directory removed on drop.
#[allow(dead_code)]
pub struct StaticServer {
    /// Base URL of the server, ending in `/`.
    pub base: Url,
    /// The served directory.
    pub root: TempDir,
    handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl StaticServer {
    /// Write `files` (path, contents) into a fresh directory and serve it
    /// from the server root.
    pub async fn start(files: &[(&str, &str)]) -> Self {
        Self::start_under("/", files).await
    }

    /// Like [`start`](Self::start), but serve the directory under `mount`
    /// (for example `/app/`) and root `base` there.
    pub async fn start_under(mount: &str, files: &[(&str, &str)]) -> Self {
        let root = TempDir::new().expect("failed to create asset root");
        for (path, contents) in files {
            let file = root.path().join(path);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).expect("failed to create asset dir");
            }
            std::fs::write(&file, contents).expect("failed to write asset");
        }

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind listener");
        let addr = listener.local_addr().expect("listener has no address");
        let prefix = mount.trim_end_matches('/');
        let router = if prefix.is_empty() {
            Router::new().fallback_service(ServeDir::new(root.path()))
        } else {
            Router::new().nest_service(prefix, ServeDir::new(root.path()))
        };
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router.into_make_service()).await;
        });

        Self {
            base: Url::parse(&format!("http://{addr}{prefix}/")).expect("valid base url"),
            root,
            handle,
        }
    }

    /// An HTTP client rooted at this server.
    pub fn client(&self) -> HttpResourceClient {
        HttpResourceClient::new(self.base.clone(), Some(Duration::from_secs(5)))
            .expect("failed to build client")
    }
}

impl Drop for StaticServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A controller loading from `server`, persisting to `prefs`.
#[allow(dead_code)]
pub async fn http_controller(
    server: &StaticServer,
    catalog: BundleCatalog,
    surface: &RecordingSurface,
    prefs: &Path,
) -> LoadController {
    let kv = JsonFileKvStore::open(prefs)
        .await
        .expect("failed to open preference file");
    LoadController::new(
        Arc::new(catalog),
        Arc::new(server.client()),
        Arc::new(surface.clone()),
        LastOpenedStore::new(Arc::new(kv)),
        LoaderSettings::immediate(),
    )
}
