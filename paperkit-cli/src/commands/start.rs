//! Start command - reload a running server or launch one with remote control.

use paperkit::provision::StartOutcome;

use super::common::{GlobalOptions, ServerOverrides};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the start command.
pub struct StartArgs {
    pub server: ServerOverrides,
    /// Always launch, even when a server answers on the control channel
    pub no_reload: bool,
}

/// Run the start command.
pub async fn run(options: &GlobalOptions, args: StartArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(options)?;
    runner.log_startup("start");
    args.server.apply(runner.config_mut());

    let provisioner = runner.provisioner()?;
    runner.handle_interrupts();

    match provisioner.start(!args.no_reload).await? {
        StartOutcome::Reloaded => {
            println!("Running server reloaded");
            Ok(())
        }
        StartOutcome::Exited(status) if status.success() => Ok(()),
        StartOutcome::Exited(status) => Err(CliError::ServerFailed(status.code())),
    }
}
