//! Candidate download URLs for a dependency across repositories.
//!
//! Resolution is pure: the resolver only builds URLs. Whether a repository
//! actually hosts the artifact is decided later by the fetcher's probe.

use std::path::{Path, PathBuf};

use reqwest::Url;
use tracing::debug;

use super::coordinates::Dependency;

/// A concrete (source URL, destination path) pair for one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: Url,
    pub destination: PathBuf,
}

/// Builds Maven-layout candidate URLs for dependencies.
#[derive(Debug, Clone)]
pub struct RepositoryResolver {
    plugin_dir: PathBuf,
}

impl RepositoryResolver {
    /// Create a resolver that targets `plugin_dir` for destinations.
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }

    /// Directory destinations are placed in.
    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Destination path for a dependency: `plugins/{name}-{version}.jar`.
    pub fn destination(&self, dependency: &Dependency) -> PathBuf {
        self.plugin_dir.join(dependency.coordinates.file_name())
    }

    /// Lazily produce one candidate per repository, in repository order.
    ///
    /// Repositories whose base URL cannot be parsed, or is not http(s), are
    /// dropped from the sequence.
    pub fn resolve<'a>(
        &'a self,
        dependency: &'a Dependency,
        repositories: &'a [String],
    ) -> impl Iterator<Item = DownloadTarget> + 'a {
        let destination = self.destination(dependency);
        repositories.iter().filter_map(move |base| {
            candidate_url(base, dependency).map(|url| DownloadTarget {
                url,
                destination: destination.clone(),
            })
        })
    }
}

/// Build `base/group/path/name/version/name-version.jar`, or `None` if the
/// base is malformed.
fn candidate_url(base: &str, dependency: &Dependency) -> Option<Url> {
    let base = base.trim();
    let normalized = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    let raw = format!("{}{}", normalized, dependency.coordinates.repository_path());

    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            debug!(
                repository = base,
                scheme = url.scheme(),
                "Dropping repository with unsupported scheme"
            );
            None
        }
        Err(e) => {
            debug!(repository = base, error = %e, "Dropping malformed repository URL");
            None
        }
    }
}
