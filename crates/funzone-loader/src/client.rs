//! Resource clients.
//!
//! A [`ResourceClient`] answers two questions about a bundle path: does it
//! exist, and what is its text. [`HttpResourceClient`] resolves paths
//! against a base URL; [`LocalResourceClient`] reads them from a directory.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};

/// Read-only access to bundle resources.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Check that `path` exists without retrieving its body.
    async fn head(&self, path: &str) -> FetchResult<()>;

    /// Retrieve the full text of `path`, bypassing any cache.
    async fn get_text(&self, path: &str) -> FetchResult<String>;

    /// Absolute location of `path`, suitable for opening outside the host.
    fn locate(&self, path: &str) -> FetchResult<String>;

    /// Host path that bundle paths are served under, ending in `/`.
    ///
    /// Hrefs handed to the host are built from this prefix so they point at
    /// the same resources the client fetches.
    fn mount_path(&self) -> String {
        "/".to_owned()
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Fetches resources over HTTP(S) relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    client: reqwest::Client,
    base: Url,
}

impl HttpResourceClient {
    /// Create a client rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(base: Url, timeout: Option<Duration>) -> FetchResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent("funzone-loader");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| FetchError::Transport {
            path: base.to_string(),
            message: format!("failed to create HTTP client: {e}"),
        })?;
        Ok(Self { client, base })
    }

    /// The base URL paths are resolved against.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve a bundle path to a full URL.
    ///
    /// Absolute `http`/`https` URLs pass through. Everything else is taken
    /// relative to the base URL, with any leading `/` ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidPath`] if the path cannot be joined.
    pub fn resolve(&self, path: &str) -> FetchResult<Url> {
        if let Ok(url) = Url::parse(path)
            && matches!(url.scheme(), "http" | "https")
        {
            return Ok(url);
        }
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidPath {
                path: path.to_owned(),
                reason: e.to_string(),
            })
    }

    fn transport(path: &str, e: &reqwest::Error) -> FetchError {
        FetchError::Transport {
            path: path.to_owned(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn head(&self, path: &str) -> FetchResult<()> {
        let url = self.resolve(path)?;
        let response = self
            .client
            .head(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| Self::transport(path, &e))?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "HEAD");
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_owned(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn get_text(&self, path: &str) -> FetchResult<String> {
        let url = self.resolve(path)?;
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| Self::transport(path, &e))?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "GET");
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::transport(path, &e))?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                path: path.to_owned(),
            });
        }
        Ok(body)
    }

    fn locate(&self, path: &str) -> FetchResult<String> {
        self.resolve(path).map(String::from)
    }

    fn mount_path(&self) -> String {
        let path = self.base.path();
        path.rfind('/')
            .and_then(|end| path.get(..=end))
            .unwrap_or("/")
            .to_owned()
    }
}

// ---------------------------------------------------------------------------
// Local directory
// ---------------------------------------------------------------------------

/// Reads resources from a directory on disk.
#[derive(Debug, Clone)]
pub struct LocalResourceClient {
    root: PathBuf,
}

impl LocalResourceClient {
    /// Create a client rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a bundle path onto the root directory.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidPath`] for empty paths and paths that
    /// would escape the root.
    pub fn resolve(&self, path: &str) -> FetchResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.trim().is_empty() || escapes {
            return Err(FetchError::InvalidPath {
                path: path.to_owned(),
                reason: "path must stay inside the asset root".to_owned(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ResourceClient for LocalResourceClient {
    async fn head(&self, path: &str) -> FetchResult<()> {
        let file = self.resolve(path)?;
        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(FetchError::Io {
                path: path.to_owned(),
                message: "not a file".to_owned(),
            }),
            Err(e) => Err(FetchError::Io {
                path: path.to_owned(),
                message: e.to_string(),
            }),
        }
    }

    async fn get_text(&self, path: &str) -> FetchResult<String> {
        let file = self.resolve(path)?;
        let body = tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| FetchError::Io {
                path: path.to_owned(),
                message: e.to_string(),
            })?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                path: path.to_owned(),
            });
        }
        Ok(body)
    }

    fn locate(&self, path: &str) -> FetchResult<String> {
        let file = self.resolve(path)?;
        let absolute = std::path::absolute(&file).map_err(|e| FetchError::Io {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        Url::from_file_path(&absolute)
            .map(String::from)
            .map_err(|()| FetchError::InvalidPath {
                path: path.to_owned(),
                reason: "cannot express as a file URL".to_owned(),
            })
    }
}
