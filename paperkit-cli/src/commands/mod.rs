//! CLI command implementations.
//!
//! - [`install`] - Prepare directory, runtime, dependencies and configuration
//! - [`run`] - Install and run the server in the foreground
//! - [`start`] - Reload a running server or launch one with remote control
//! - [`reload`] - Deploy the plugin and reload the running server
//! - [`clean`] - Delete the server directory

pub mod clean;
pub mod common;
pub mod install;
pub mod reload;
pub mod run;
pub mod start;
