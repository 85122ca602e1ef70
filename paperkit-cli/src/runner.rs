//! CLI runner for common setup.
//!
//! Loads the project configuration, initializes logging and builds the
//! provisioner so each command handler stays small.

use std::path::{Path, PathBuf};

use paperkit::artifact::ReqwestTransport;
use paperkit::config::ProjectConfig;
use paperkit::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use paperkit::provision::Provisioner;
use paperkit::server::{RconChannel, ShutdownHooks};
use tracing::{debug, info};

use crate::commands::common::GlobalOptions;
use crate::error::CliError;

/// Provisioner type used by the CLI.
pub type CliProvisioner = Provisioner<ReqwestTransport, RconChannel>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ProjectConfig,
    config_path: PathBuf,
    hooks: ShutdownHooks,
}

impl CliRunner {
    /// Load the project configuration and initialize logging.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let config = ProjectConfig::load_from(&options.config)?;

        let logging_guard = init_logging(
            Path::new(default_log_dir()),
            default_log_file(),
            options.debug,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path: options.config.clone(),
            hooks: ShutdownHooks::new(),
        })
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ProjectConfig {
        &mut self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("paperkit v{}", paperkit::VERSION);
        info!("paperkit CLI: {} command", command);
        debug!(
            config = %self.config_path.display(),
            server = %self.config.server.directory.display(),
            "Project configuration"
        );
    }

    /// Stop a supervised server when the user presses Ctrl-C.
    pub fn handle_interrupts(&self) {
        self.hooks.listen_for_ctrl_c();
    }

    /// Build a provisioner from the (possibly overridden) configuration.
    pub fn provisioner(&self) -> Result<CliProvisioner, CliError> {
        Ok(Provisioner::from_config(
            self.config.clone(),
            self.hooks.clone(),
        )?)
    }
}
