//! Install command - prepare the server directory, runtime and dependencies.

use super::common::{GlobalOptions, ServerOverrides};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the install command.
pub struct InstallArgs {
    pub server: ServerOverrides,
    pub no_dependencies: bool,
}

/// Run the install command.
pub async fn run(options: &GlobalOptions, args: InstallArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(options)?;
    runner.log_startup("install");

    args.server.apply(runner.config_mut());
    if args.no_dependencies {
        let config = runner.config_mut();
        config.download = config.download.clone().with_dependencies(false);
    }

    let provisioner = runner.provisioner()?;
    let report = provisioner.install().await?;

    println!(
        "Server installed in {}",
        provisioner.layout().root().display()
    );
    if let Some(deps) = report.dependencies {
        println!(
            "Dependencies: {} installed, {} skipped, {} failed",
            deps.installed, deps.skipped, deps.failed
        );
        for failure in &deps.failures {
            println!("  {} - {}", failure.url, failure.reason);
        }
    }
    Ok(())
}
