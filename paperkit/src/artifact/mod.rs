//! Plugin dependency resolution and download.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`DependencyPlanner`] filters declared dependencies to those that must
//!    be installed and are not yet present
//! 2. [`RepositoryResolver`] turns each one into a candidate URL per repository
//! 3. [`ArtifactFetcher`] probes, downloads, validates and atomically places
//!    a single candidate
//! 4. [`DownloadOrchestrator`] runs every candidate on a bounded worker pool

mod coordinates;
mod fetcher;
mod inspect;
mod orchestrator;
mod planner;
mod resolver;
mod transport;

pub use coordinates::{Coordinates, Dependency, Scope};
pub use fetcher::{
    parse_url, ArtifactFetcher, FetchError, FetchOutcome, SkipReason, Validation,
    DEFAULT_MAX_ATTEMPTS,
};
pub use inspect::{contains_plugin_manifest, PLUGIN_MANIFESTS};
pub use orchestrator::{DownloadOrchestrator, DownloadReport, FailedDownload, DEFAULT_WORKERS};
pub use planner::{DependencyPlanner, PlanPolicy, DEFAULT_EXCLUDED_ARTIFACT};
pub use resolver::{DownloadTarget, RepositoryResolver};
pub use transport::{HttpTransport, ReqwestTransport, TransportError};
