//! paperkit CLI - provision, run and control a Paper server.
//!
//! This binary provides a command-line interface to the paperkit library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use paperkit::config::DEFAULT_CONFIG_FILE;

use commands::common::{GlobalOptions, ServerOverrides};
use error::CliError;

#[derive(Parser)]
#[command(name = "paperkit")]
#[command(version = paperkit::VERSION)]
#[command(about = "Provision, run and control a Paper Minecraft server", long_about = None)]
struct Cli {
    /// Project configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the server directory, download Paper and plugin dependencies
    Install {
        #[command(flatten)]
        server: ServerOverrides,

        /// Do not download plugin dependencies
        #[arg(long)]
        no_dependencies: bool,
    },

    /// Install, deploy the plugin and run the server in the foreground
    Run {
        #[command(flatten)]
        server: ServerOverrides,

        /// Do not download plugin dependencies
        #[arg(long)]
        no_dependencies: bool,
    },

    /// Reload a running server, or launch one with remote control enabled
    Start {
        #[command(flatten)]
        server: ServerOverrides,

        /// Always launch a new server instead of reloading a running one
        #[arg(long)]
        no_reload: bool,
    },

    /// Deploy the plugin and reload the running server
    Reload {
        /// Server directory (default: from config)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Delete the server directory
    Clean {
        /// Server directory (default: from config)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let options = GlobalOptions {
        config: cli.config,
        debug: cli.debug,
    };

    let result: Result<(), CliError> = match cli.command {
        Commands::Install {
            server,
            no_dependencies,
        } => {
            commands::install::run(
                &options,
                commands::install::InstallArgs {
                    server,
                    no_dependencies,
                },
            )
            .await
        }
        Commands::Run {
            server,
            no_dependencies,
        } => {
            commands::run::run(
                &options,
                commands::run::RunArgs {
                    server,
                    no_dependencies,
                },
            )
            .await
        }
        Commands::Start { server, no_reload } => {
            commands::start::run(&options, commands::start::StartArgs { server, no_reload }).await
        }
        Commands::Reload { path } => commands::reload::run(&options, path).await,
        Commands::Clean { path } => commands::clean::run(&options, path),
    };

    if let Err(e) = result {
        e.exit();
    }
}
