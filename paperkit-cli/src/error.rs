//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit code 1 for every failure.

use std::fmt;
use std::process;

use paperkit::config::ConfigFileError;
use paperkit::provision::ProvisionError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Project configuration could not be loaded
    Config(ConfigFileError),
    /// A workflow failed
    Provision(ProvisionError),
    /// The server process exited unsuccessfully
    ServerFailed(Option<i32>),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Provision(ProvisionError::Launch(_)) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Java not installed or not on PATH (set server.java in paperkit.ini)");
                eprintln!("  2. Server not installed yet: run 'paperkit install' first");
            }
            CliError::Provision(ProvisionError::ControlNotConfigured)
            | CliError::Provision(ProvisionError::Control(_)) => {
                eprintln!();
                eprintln!("Is the server running? Launch it with 'paperkit start'.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Provision(e) => write!(f, "{}", e),
            CliError::ServerFailed(Some(code)) => {
                write!(f, "Server exited with status {}", code)
            }
            CliError::ServerFailed(None) => write!(f, "Server was terminated by a signal"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Provision(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<ProvisionError> for CliError {
    fn from(e: ProvisionError) -> Self {
        CliError::Provision(e)
    }
}
