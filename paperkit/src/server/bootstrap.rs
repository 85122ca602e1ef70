//! Creation of the managed directory tree and the license agreement marker.
//!
//! Everything here is safe to run on every invocation: directories are
//! created only when absent and existing paths are type-checked.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::layout::ServerLayout;

/// Content written to the agreement marker.
pub const AGREEMENT_ACCEPTED: &str = "eula=true\n";

/// Fatal errors while preparing the server directory.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{path} exists but is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ensure the server root and its `plugins/` directory exist.
pub fn ensure_directories(layout: &ServerLayout) -> Result<(), SetupError> {
    ensure_directory(layout.root())?;
    ensure_directory(&layout.plugins_dir())
}

/// Write the license agreement marker, replacing any prior content.
pub fn ensure_agreement_accepted(layout: &ServerLayout) -> Result<(), SetupError> {
    let path = layout.eula_file();
    fs::write(&path, AGREEMENT_ACCEPTED).map_err(|source| SetupError::Io {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "Agreement accepted");
    Ok(())
}

fn ensure_directory(path: &Path) -> Result<(), SetupError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(SetupError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    fs::create_dir_all(path).map_err(|source| SetupError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // A concurrent writer may have put a file there between the checks.
    if !path.is_dir() {
        return Err(SetupError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    info!(path = %path.display(), "Created directory");
    Ok(())
}
