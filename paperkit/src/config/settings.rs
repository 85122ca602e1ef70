//! Settings structs for the project configuration file.
//!
//! Pure data: parsing lives in [`super::parser`], defaults in
//! [`super::defaults`].

use std::path::PathBuf;

use super::download::DownloadConfig;
use crate::artifact::Dependency;

/// Complete project configuration loaded from `paperkit.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    /// `[server]`
    pub server: ServerSettings,
    /// `[download]`
    pub download: DownloadConfig,
    /// `[repositories]` base URLs, in priority order
    pub repositories: Vec<String>,
    /// `[dependency.*]` sections, in file order
    pub dependencies: Vec<Dependency>,
}

/// How the managed server is laid out and launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Paper version to install; required by `install` and `run`
    pub paper_version: Option<String>,
    /// Managed root directory
    pub directory: PathBuf,
    /// JVM memory flag passed verbatim, e.g. `-Xmx1024M`
    pub memory: String,
    /// Java executable
    pub java: String,
    /// Launch with the server GUI instead of `nogui`
    pub gui: bool,
    /// Locally built plugin copied into `plugins/` before launch or reload
    pub plugin_artifact: Option<PathBuf>,
}
