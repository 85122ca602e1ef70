//! Resolution and download of the Paper server runtime.
//!
//! The distribution API lists the published builds of each game version;
//! the last entry is the newest. That build is downloaded as `paper.jar`
//! into the server root unless a runtime is already there.

use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::artifact::{
    parse_url, ArtifactFetcher, FetchError, FetchOutcome, HttpTransport, SkipReason,
    TransportError, Validation,
};
use crate::server::ServerLayout;

#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("distribution API returned HTTP {status} for version {version}")]
    Status { version: String, status: u16 },

    #[error("no builds published for version {version}")]
    NoBuilds { version: String },

    #[error("runtime download {url} is not available")]
    Unavailable { url: String },

    #[error("failed to query distribution API: {0}")]
    Transport(#[source] TransportError),

    #[error("unexpected distribution API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Response of `GET {api}/versions/{version}`.
#[derive(Debug, Deserialize)]
struct VersionInfo {
    builds: Vec<u32>,
}

/// Downloads Paper runtime builds.
pub struct PaperDistribution<T> {
    fetcher: ArtifactFetcher<T>,
    api_base: String,
}

impl<T: HttpTransport> PaperDistribution<T> {
    pub fn new(fetcher: ArtifactFetcher<T>, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { fetcher, api_base }
    }

    fn transport(&self) -> &Arc<T> {
        self.fetcher.transport()
    }

    /// Newest published build number for `version`.
    pub async fn latest_build(&self, version: &str) -> Result<u32, DistributionError> {
        let url = parse_url(&format!("{}/versions/{}", self.api_base, version))?;
        info!(version, "Looking up latest Paper build");

        let body = self
            .transport()
            .get_bytes(&url)
            .await
            .map_err(|e| match e {
                TransportError::Status { status, .. } => DistributionError::Status {
                    version: version.to_string(),
                    status,
                },
                other => DistributionError::Transport(other),
            })?;

        let info: VersionInfo = serde_json::from_slice(&body)?;
        info.builds
            .last()
            .copied()
            .ok_or_else(|| DistributionError::NoBuilds {
                version: version.to_string(),
            })
    }

    /// Download URL of a specific build.
    pub fn download_url(&self, version: &str, build: u32) -> Result<Url, DistributionError> {
        Ok(parse_url(&format!(
            "{base}/versions/{v}/builds/{b}/downloads/paper-{v}-{b}.jar",
            base = self.api_base,
            v = version,
            b = build
        ))?)
    }

    /// Install the newest build of `version` as `paper.jar` if none is present.
    pub async fn install(
        &self,
        layout: &ServerLayout,
        version: &str,
    ) -> Result<FetchOutcome, DistributionError> {
        let destination = layout.runtime_jar();
        if destination.exists() {
            info!(path = %destination.display(), "Server runtime already present");
            return Ok(FetchOutcome::Skipped(SkipReason::AlreadyPresent));
        }

        let build = self.latest_build(version).await?;
        let url = self.download_url(version, build)?;
        info!(version, build, "Downloading Paper");

        match self
            .fetcher
            .fetch(&url, &destination, Validation::None)
            .await?
        {
            FetchOutcome::Skipped(SkipReason::NotHosted) => Err(DistributionError::Unavailable {
                url: url.to_string(),
            }),
            outcome => Ok(outcome),
        }
    }
}
