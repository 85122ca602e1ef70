//! File layout of the managed server directory.

use std::path::{Path, PathBuf};

/// Plugin directory name under the server root.
pub const PLUGIN_DIR: &str = "plugins";
/// License agreement marker file.
pub const EULA_FILE: &str = "eula.txt";
/// Server key/value configuration file.
pub const PROPERTIES_FILE: &str = "server.properties";
/// Server runtime artifact.
pub const RUNTIME_JAR: &str = "paper.jar";

/// Paths inside a managed server root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLayout {
    root: PathBuf,
}

impl ServerLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join(PLUGIN_DIR)
    }

    pub fn eula_file(&self) -> PathBuf {
        self.root.join(EULA_FILE)
    }

    pub fn properties_file(&self) -> PathBuf {
        self.root.join(PROPERTIES_FILE)
    }

    pub fn runtime_jar(&self) -> PathBuf {
        self.root.join(RUNTIME_JAR)
    }
}
