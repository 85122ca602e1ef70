//! The managed server: directory layout, configuration, process and control.
//!
//! - [`bootstrap`] and [`properties`] prepare the working directory and are
//!   safe to run repeatedly
//! - [`supervisor`] launches the server and stops it on shutdown
//! - [`control`] sends commands to the running server

pub mod bootstrap;
pub mod control;
pub mod deploy;
pub mod hooks;
pub mod layout;
pub mod properties;
pub mod supervisor;

pub use bootstrap::{ensure_agreement_accepted, ensure_directories, SetupError};
pub use control::{
    ControlChannel, ControlChannelError, ControlEndpoint, RconChannel, RELOAD_COMMAND,
    STOP_COMMAND,
};
pub use deploy::{deploy, DeployError};
pub use hooks::{HookId, ShutdownHooks};
pub use layout::ServerLayout;
pub use properties::{
    enable_control_channel, ensure_default_configuration, generate_secret, PropertiesError,
    ServerProperties,
};
pub use supervisor::{LaunchOptions, ProcessLaunchError, ProcessState, ProcessSupervisor};
