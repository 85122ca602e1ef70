//! Reload command - deploy the plugin and reload the running server.

use std::path::PathBuf;

use super::common::GlobalOptions;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the reload command.
pub async fn run(options: &GlobalOptions, path: Option<PathBuf>) -> Result<(), CliError> {
    let mut runner = CliRunner::new(options)?;
    runner.log_startup("reload");
    if let Some(path) = path {
        runner.config_mut().server.directory = path;
    }

    runner.provisioner()?.reload().await?;
    println!("Server reloaded");
    Ok(())
}
