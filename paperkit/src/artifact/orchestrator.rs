//! Concurrent download of planned dependencies.
//!
//! Every (dependency, repository) pair becomes an independent unit of work.
//! Units run on a [`JoinSet`] bounded by a semaphore, so at most `workers`
//! fetches are in flight. Units sharing a destination are serialised by a
//! per-path mutex: whichever acquires it first installs the file and the rest
//! observe it and skip. Which repository wins when several host the same
//! artifact is not defined.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::coordinates::Dependency;
use super::fetcher::{ArtifactFetcher, FetchError, FetchOutcome, Validation};
use super::resolver::{DownloadTarget, RepositoryResolver};
use super::transport::HttpTransport;

/// Default number of concurrent download workers.
pub const DEFAULT_WORKERS: usize = 3;

/// A unit that ended in an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    pub url: String,
    pub destination: PathBuf,
    pub reason: String,
}

/// Aggregate result of an orchestrator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Units that wrote a file.
    pub installed: usize,
    /// Units that completed without writing (not hosted, not a plugin, present).
    pub skipped: usize,
    /// Units that failed.
    pub failed: usize,
    pub failures: Vec<FailedDownload>,
}

impl DownloadReport {
    pub fn total(&self) -> usize {
        self.installed + self.skipped + self.failed
    }

    fn record(&mut self, target: &DownloadTarget, result: Result<FetchOutcome, FetchError>) {
        match result {
            Ok(FetchOutcome::Fetched { .. }) => self.installed += 1,
            Ok(FetchOutcome::Skipped(reason)) => {
                debug!(url = %target.url, %reason, "Candidate skipped");
                self.skipped += 1;
            }
            Err(e) => {
                warn!(
                    url = %target.url,
                    destination = %target.destination.display(),
                    error = %e,
                    "Artifact download failed"
                );
                self.failed += 1;
                self.failures.push(FailedDownload {
                    url: target.url.to_string(),
                    destination: target.destination.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Fans planned dependencies out across repositories with bounded concurrency.
pub struct DownloadOrchestrator<T> {
    fetcher: ArtifactFetcher<T>,
    resolver: RepositoryResolver,
    workers: usize,
    validation: Validation,
    guards: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl<T: HttpTransport> DownloadOrchestrator<T> {
    pub fn new(fetcher: ArtifactFetcher<T>, resolver: RepositoryResolver) -> Self {
        Self {
            fetcher,
            resolver,
            workers: DEFAULT_WORKERS,
            validation: Validation::PluginManifest,
            guards: Arc::new(DashMap::new()),
        }
    }

    /// Set the worker count (minimum 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Download every planned dependency from every repository that hosts it.
    ///
    /// Waits for all units. Individual failures are logged and collected in
    /// the report; they never abort sibling units.
    pub async fn run(&self, planned: &[Dependency], repositories: &[String]) -> DownloadReport {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut units = JoinSet::new();

        for dependency in planned {
            for target in self.resolver.resolve(dependency, repositories) {
                let fetcher = self.fetcher.clone();
                let semaphore = Arc::clone(&semaphore);
                let guard = self.guard_for(&target.destination);
                let validation = self.validation;

                units.spawn(async move {
                    let _exclusive = guard.lock().await;
                    // The semaphore is never closed, so acquire cannot fail.
                    let _permit = semaphore.acquire().await.ok();
                    let result = fetcher
                        .fetch(&target.url, &target.destination, validation)
                        .await;
                    (target, result)
                });
            }
        }

        let mut report = DownloadReport::default();
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((target, result)) => report.record(&target, result),
                Err(e) => {
                    warn!(error = %e, "Download task panicked");
                    report.failed += 1;
                }
            }
        }

        info!(
            installed = report.installed,
            skipped = report.skipped,
            failed = report.failed,
            "Dependency downloads finished"
        );
        report
    }

    fn guard_for(&self, destination: &Path) -> Arc<Mutex<()>> {
        Arc::clone(
            self.guards
                .entry(destination.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}
