//! Project configuration loaded from `paperkit.ini`.
//!
//! Settings structs live in [`settings`], constants in [`defaults`], parsing
//! in `parser`. Values not present in the file fall back to the defaults,
//! and the CLI may override individual values afterwards.
//!
//! # Example
//!
//! ```
//! use paperkit::config::{ProjectConfig, DEFAULT_MEMORY};
//!
//! let config = ProjectConfig::default();
//! assert_eq!(config.server.memory, DEFAULT_MEMORY);
//! assert_eq!(config.download.workers(), 3);
//! ```

pub mod defaults;
mod download;
mod file;
mod parser;
pub mod settings;

pub use defaults::*;
pub use download::DownloadConfig;
pub use file::ConfigFileError;
pub use settings::{ProjectConfig, ServerSettings};
