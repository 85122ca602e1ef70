//! Run command - install, deploy the plugin and run the server in the foreground.

use super::common::{GlobalOptions, ServerOverrides};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
pub struct RunArgs {
    pub server: ServerOverrides,
    pub no_dependencies: bool,
}

/// Run the run command.
pub async fn run(options: &GlobalOptions, args: RunArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(options)?;
    runner.log_startup("run");

    args.server.apply(runner.config_mut());
    if args.no_dependencies {
        let config = runner.config_mut();
        config.download = config.download.clone().with_dependencies(false);
    }

    let provisioner = runner.provisioner()?;
    runner.handle_interrupts();

    let status = provisioner.run().await?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::ServerFailed(status.code()))
    }
}
