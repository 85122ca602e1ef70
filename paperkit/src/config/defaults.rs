//! Default values for every project configuration setting.

use std::path::PathBuf;

use super::download::DownloadConfig;
use super::settings::{ProjectConfig, ServerSettings};

/// Project configuration file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "paperkit.ini";

// [server]
pub const DEFAULT_SERVER_DIRECTORY: &str = "server";
pub const DEFAULT_MEMORY: &str = "-Xmx1024M";
pub const DEFAULT_JAVA: &str = "java";
pub const DEFAULT_GUI: bool = false;

// [download]
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_WORKERS: usize = 3;
pub const DEFAULT_INSTALL_DEPENDENCIES: bool = true;
pub const DEFAULT_PAPER_API: &str = "https://api.papermc.io/v2/projects/paper";

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            paper_version: None,
            directory: PathBuf::from(DEFAULT_SERVER_DIRECTORY),
            memory: DEFAULT_MEMORY.to_string(),
            java: DEFAULT_JAVA.to_string(),
            gui: DEFAULT_GUI,
            plugin_artifact: None,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            download: DownloadConfig::default(),
            repositories: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}
