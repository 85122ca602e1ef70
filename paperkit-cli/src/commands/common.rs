//! Options shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use paperkit::config::ProjectConfig;

/// Options that apply to every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: PathBuf,
    pub debug: bool,
}

/// Command-line overrides for the `[server]` section.
#[derive(Debug, Clone, Default, Args)]
pub struct ServerOverrides {
    /// Server directory (default: from config, else "server")
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// JVM memory flag, e.g. -Xmx2G
    #[arg(long, allow_hyphen_values = true)]
    pub memory: Option<String>,

    /// Launch with the server GUI
    #[arg(long)]
    pub gui: bool,

    /// Paper version to install
    #[arg(long)]
    pub paper_version: Option<String>,
}

impl ServerOverrides {
    /// Overlay the flags that were given onto the loaded configuration.
    pub fn apply(&self, config: &mut ProjectConfig) {
        if let Some(ref path) = self.path {
            config.server.directory = path.clone();
        }
        if let Some(ref memory) = self.memory {
            config.server.memory = memory.clone();
        }
        if self.gui {
            config.server.gui = true;
        }
        if let Some(ref version) = self.paper_version {
            config.server.paper_version = Some(version.clone());
        }
    }
}
