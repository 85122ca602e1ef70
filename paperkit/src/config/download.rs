//! Download pipeline configuration.

use std::time::Duration;

use super::defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_INSTALL_DEPENDENCIES,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_PAPER_API, DEFAULT_WORKERS,
};

/// Configuration for artifact downloads.
///
/// # Example
///
/// ```
/// use paperkit::config::DownloadConfig;
///
/// let config = DownloadConfig::new()
///     .with_timeout_secs(60)
///     .with_workers(5);
/// assert_eq!(config.timeout().as_secs(), 60);
/// assert_eq!(config.workers(), 5);
/// assert_eq!(config.max_attempts(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    timeout_secs: u64,
    connect_timeout_secs: u64,
    max_attempts: u32,
    workers: usize,
    dependencies: bool,
    paper_api: String,
}

impl DownloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-request timeout, covering the whole body transfer.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Attempts per candidate URL for transient failures.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Number of concurrent download workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Whether `install` fetches plugin dependencies at all.
    pub fn with_dependencies(mut self, enabled: bool) -> Self {
        self.dependencies = enabled;
        self
    }

    pub fn with_paper_api(mut self, url: impl Into<String>) -> Self {
        self.paper_api = url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn dependencies(&self) -> bool {
        self.dependencies
    }

    pub fn paper_api(&self) -> &str {
        &self.paper_api
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            workers: DEFAULT_WORKERS,
            dependencies: DEFAULT_INSTALL_DEPENDENCIES,
            paper_api: DEFAULT_PAPER_API.to_string(),
        }
    }
}
