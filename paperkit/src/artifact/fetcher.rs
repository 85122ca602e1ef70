//! Single-artifact download with probe, validation and atomic placement.
//!
//! A fetch never leaves a partial file at the destination: the body is
//! streamed into a hidden sibling temp file, optionally checked for a plugin
//! manifest, and only then persisted under the final name. Persisting is
//! no-clobber, so when two workers race for the same destination the loser
//! reports [`SkipReason::AlreadyPresent`] instead of overwriting.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::inspect::contains_plugin_manifest;
use super::transport::{HttpTransport, TransportError};

/// Default number of attempts per URL for transient failures.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Content check applied before an artifact is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Accept any body (used for the server runtime).
    None,
    /// Require `plugin.yml` or `paper-plugin.yml` inside the archive.
    PluginManifest,
}

/// Why a fetch completed without writing a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The repository does not serve this URL.
    NotHosted,
    /// The archive has no plugin manifest.
    NotAPlugin,
    /// A file already exists at the destination.
    AlreadyPresent,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotHosted => write!(f, "not hosted"),
            SkipReason::NotAPlugin => write!(f, "not a plugin"),
            SkipReason::AlreadyPresent => write!(f, "already present"),
        }
    }
}

/// Result of a successful fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The artifact was written to the destination.
    Fetched { bytes: u64 },
    /// Nothing was written.
    Skipped(SkipReason),
}

/// Errors that abort a single fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid download URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read archive from {url}: {source}")]
    Archive {
        url: String,
        #[source]
        source: zip::result::ZipError,
    },
}

impl FetchError {
    fn io(path: &Path, source: io::Error) -> Self {
        FetchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the failure is transient and the request may be repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_retryable())
    }
}

/// Parse a download URL, mapping failures to [`FetchError::InvalidUrl`].
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Downloads one URL to one destination.
pub struct ArtifactFetcher<T> {
    transport: Arc<T>,
    max_attempts: u32,
}

impl<T> Clone for ArtifactFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            max_attempts: self.max_attempts,
        }
    }
}

impl<T: HttpTransport> ArtifactFetcher<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the number of attempts for transient failures (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Fetch `url` into `destination`.
    ///
    /// Returns `Skipped` when the destination already exists, the probe
    /// reports the URL as not hosted, or validation rejects the archive.
    pub async fn fetch(
        &self,
        url: &Url,
        destination: &Path,
        validation: Validation,
    ) -> Result<FetchOutcome, FetchError> {
        if destination.exists() {
            trace!(destination = %destination.display(), "Destination exists, not fetching");
            return Ok(FetchOutcome::Skipped(SkipReason::AlreadyPresent));
        }

        let hosted = self
            .with_retry(url, move || async move {
                self.transport.probe(url).await.map_err(FetchError::from)
            })
            .await?;
        if !hosted {
            debug!(url = %url, "Artifact not hosted here");
            return Ok(FetchOutcome::Skipped(SkipReason::NotHosted));
        }

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FetchError::io(parent, e))?;

        let (temp, bytes) = self
            .with_retry(url, move || self.download_to_temp(url, parent))
            .await?;

        if validation == Validation::PluginManifest && !self.is_plugin(url, &temp).await? {
            info!(url = %url, "Archive has no plugin manifest, skipping");
            return Ok(FetchOutcome::Skipped(SkipReason::NotAPlugin));
        }

        match temp.persist_noclobber(destination) {
            Ok(_) => {
                info!(
                    url = %url,
                    destination = %destination.display(),
                    bytes,
                    "Artifact installed"
                );
                Ok(FetchOutcome::Fetched { bytes })
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(destination = %destination.display(), "Lost race for destination");
                Ok(FetchOutcome::Skipped(SkipReason::AlreadyPresent))
            }
            Err(e) => Err(FetchError::io(destination, e.error)),
        }
    }

    /// Stream the body into a fresh temp file next to the destination.
    async fn download_to_temp(
        &self,
        url: &Url,
        dir: &Path,
    ) -> Result<(NamedTempFile, u64), FetchError> {
        let temp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| FetchError::io(dir, e))?;

        let std_file = temp
            .as_file()
            .try_clone()
            .map_err(|e| FetchError::io(temp.path(), e))?;
        let mut file = tokio::fs::File::from_std(std_file);
        let bytes = self.transport.download_to(url, &mut file).await?;
        drop(file);

        Ok((temp, bytes))
    }

    async fn is_plugin(&self, url: &Url, temp: &NamedTempFile) -> Result<bool, FetchError> {
        let path = temp.path().to_path_buf();
        let check_path = path.clone();
        tokio::task::spawn_blocking(move || contains_plugin_manifest(&check_path))
            .await
            .map_err(|e| FetchError::io(&path, io::Error::other(e)))?
            .map_err(|source| FetchError::Archive {
                url: url.to_string(),
                source,
            })
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Backoff between attempts is `100ms * 2^attempt`.
    async fn with_retry<F, Fut, R>(&self, url: &Url, mut op: F) -> Result<R, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, FetchError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    let backoff = Duration::from_millis(100 * (1 << attempt));
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Transient download failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
