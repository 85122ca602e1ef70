//! paperkit - provision, run and control a Paper Minecraft server.
//!
//! This library contains everything needed to take an empty directory to a
//! running, remotely controllable server:
//!
//! - [`artifact`] resolves plugin dependencies against Maven-style repositories
//!   and downloads them with a bounded worker pool
//! - [`distribution`] resolves and downloads the Paper runtime itself
//! - [`server`] bootstraps the working directory, supervises the server process
//!   and talks to it over RCON
//! - [`provision`] composes the pieces into the `install`, `run`, `start`,
//!   `reload` and `clean` workflows used by the CLI
//!
//! # Example
//!
//! ```ignore
//! use paperkit::config::ProjectConfig;
//! use paperkit::provision::Provisioner;
//! use paperkit::server::ShutdownHooks;
//!
//! let config = ProjectConfig::load_from("paperkit.ini".as_ref())?;
//! let provisioner = Provisioner::from_config(config, ShutdownHooks::new())?;
//! let report = provisioner.install().await?;
//! ```

pub mod artifact;
pub mod config;
pub mod distribution;
pub mod logging;
pub mod provision;
pub mod server;

/// Version of the paperkit library and CLI.
///
/// The version is defined in the workspace `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
