//! Copying the locally built plugin into the server.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("plugin directory {path} does not exist, run install first")]
    MissingPluginDirectory { path: PathBuf },

    #[error("plugin artifact {path} does not exist, build the plugin first")]
    MissingArtifact { path: PathBuf },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copy `artifact` into `plugins_dir`, replacing an earlier copy.
///
/// Returns the path of the deployed file.
pub fn deploy(artifact: &Path, plugins_dir: &Path) -> Result<PathBuf, DeployError> {
    if !plugins_dir.is_dir() {
        return Err(DeployError::MissingPluginDirectory {
            path: plugins_dir.to_path_buf(),
        });
    }
    let file_name = match artifact.file_name() {
        Some(name) if artifact.is_file() => name,
        _ => {
            return Err(DeployError::MissingArtifact {
                path: artifact.to_path_buf(),
            })
        }
    };

    let target = plugins_dir.join(file_name);
    fs::copy(artifact, &target).map_err(|source| DeployError::Copy {
        from: artifact.to_path_buf(),
        to: target.clone(),
        source,
    })?;

    info!(artifact = %artifact.display(), target = %target.display(), "Plugin deployed");
    Ok(target)
}
