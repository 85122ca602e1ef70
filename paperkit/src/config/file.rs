//! Loading of the project configuration file.

use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption};
use thiserror::Error;
use tracing::debug;

use super::settings::ProjectConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ProjectConfig {
    /// Load configuration from a specific path.
    ///
    /// A missing file is not an error: defaults are returned, which is
    /// enough for `clean` and for running an already installed server.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            debug!(path = %path.display(), "No project config file, using defaults");
            return Ok(Self::default());
        }

        // Backslashes are literal so Windows paths survive.
        let options = ParseOption {
            enabled_escape: false,
            ..Default::default()
        };
        let ini = Ini::load_from_file_opt(path, options).map_err(|source| {
            ConfigFileError::ReadError {
                path: path.to_path_buf(),
                source,
            }
        })?;
        super::parser::parse_ini(&ini)
    }
}
