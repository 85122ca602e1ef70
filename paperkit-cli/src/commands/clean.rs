//! Clean command - delete the managed server directory.

use std::path::PathBuf;

use super::common::GlobalOptions;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the clean command.
pub fn run(options: &GlobalOptions, path: Option<PathBuf>) -> Result<(), CliError> {
    let mut runner = CliRunner::new(options)?;
    runner.log_startup("clean");
    if let Some(path) = path {
        runner.config_mut().server.directory = path;
    }

    let provisioner = runner.provisioner()?;
    let root = provisioner.layout().root().display().to_string();
    if provisioner.clean()? {
        println!("Removed {}", root);
    } else {
        println!("Nothing to clean at {}", root);
    }
    Ok(())
}
