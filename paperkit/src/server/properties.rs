//! The server's `server.properties` key/value file.
//!
//! Creation never overwrites an existing file. Enabling the control channel
//! rewrites only the three control keys; every other key keeps its value.
//! Comment lines are not preserved across a rewrite, a fixed header is
//! written instead.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use rand::distributions::Alphanumeric;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use super::control::{ControlEndpoint, DEFAULT_CONTROL_PORT};
use super::layout::ServerLayout;

pub const KEY_ENABLE_CONTROL: &str = "enable-rcon";
pub const KEY_CONTROL_PORT: &str = "rcon.port";
pub const KEY_CONTROL_SECRET: &str = "rcon.password";

/// Prefix of every generated control secret.
pub const SECRET_PREFIX: &str = "gen";
/// Total length of a generated control secret.
pub const SECRET_LEN: usize = 16;

const HEADER: &str = "#Minecraft server properties\n#Managed by paperkit\n";

#[derive(Debug, Error)]
pub enum PropertiesError {
    #[error("server configuration {path} does not exist, run install first")]
    ConfigurationMissing { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

impl PropertiesError {
    fn io(path: &Path, source: io::Error) -> Self {
        PropertiesError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A loaded `server.properties` file.
#[derive(Debug, Clone)]
pub struct ServerProperties {
    path: PathBuf,
    ini: Ini,
}

impl ServerProperties {
    /// Load the file at `path`; [`PropertiesError::ConfigurationMissing`] if absent.
    pub fn load(path: &Path) -> Result<Self, PropertiesError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PropertiesError::ConfigurationMissing {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(PropertiesError::io(path, e)),
        };

        // Values such as MOTDs may contain quotes and backslashes verbatim.
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..Default::default()
        };
        let ini = Ini::load_from_str_opt(&content, options).map_err(|e| PropertiesError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            ini,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.ini.general_section().get(key)
    }

    /// Insert or replace a key.
    pub fn set(&mut self, key: &str, value: &str) {
        self.ini.with_section(None::<String>).set(key, value);
    }

    /// Write the properties back to their file.
    pub fn save(&self) -> Result<(), PropertiesError> {
        let content = render(&self.ini).map_err(|e| PropertiesError::io(&self.path, e))?;
        std::fs::write(&self.path, content).map_err(|e| PropertiesError::io(&self.path, e))
    }

    /// The configured control endpoint, if the channel is enabled and has a secret.
    pub fn control_endpoint(&self) -> Option<ControlEndpoint> {
        if self.get(KEY_ENABLE_CONTROL)? != "true" {
            return None;
        }
        let secret = self.get(KEY_CONTROL_SECRET).filter(|s| !s.is_empty())?;
        let port = match self.get(KEY_CONTROL_PORT) {
            Some(p) => p.parse().ok()?,
            None => DEFAULT_CONTROL_PORT,
        };
        Some(ControlEndpoint::local(port, secret))
    }
}

/// Create `server.properties` with the control channel disabled, if absent.
///
/// Returns `true` when the file was created. An existing file is never
/// touched.
pub fn ensure_default_configuration(layout: &ServerLayout) -> Result<bool, PropertiesError> {
    let path = layout.properties_file();
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Server configuration present, leaving as is");
            return Ok(false);
        }
        Err(e) => return Err(PropertiesError::io(&path, e)),
    };

    let mut ini = Ini::new();
    ini.with_section(None::<String>)
        .set(KEY_ENABLE_CONTROL, "false")
        .set(KEY_CONTROL_PORT, DEFAULT_CONTROL_PORT.to_string())
        .set(KEY_CONTROL_SECRET, "");

    let content = render(&ini).map_err(|e| PropertiesError::io(&path, e))?;
    file.write_all(&content)
        .map_err(|e| PropertiesError::io(&path, e))?;

    info!(path = %path.display(), "Created default server configuration");
    Ok(true)
}

/// Turn the control channel on with a fresh secret.
///
/// Fails with [`PropertiesError::ConfigurationMissing`] if the file does not
/// exist yet.
pub fn enable_control_channel(layout: &ServerLayout) -> Result<ControlEndpoint, PropertiesError> {
    let mut properties = ServerProperties::load(&layout.properties_file())?;
    let secret = generate_secret();

    properties.set(KEY_ENABLE_CONTROL, "true");
    properties.set(KEY_CONTROL_PORT, &DEFAULT_CONTROL_PORT.to_string());
    properties.set(KEY_CONTROL_SECRET, &secret);
    properties.save()?;

    info!(port = DEFAULT_CONTROL_PORT, "Control channel enabled");
    Ok(ControlEndpoint::local(DEFAULT_CONTROL_PORT, secret))
}

/// Generate a control secret: `gen` followed by 13 alphanumeric characters.
pub fn generate_secret() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LEN - SECRET_PREFIX.len())
        .map(char::from)
        .collect();
    format!("{}{}", SECRET_PREFIX, suffix)
}

fn render(ini: &Ini) -> io::Result<Vec<u8>> {
    let mut out = HEADER.as_bytes().to_vec();
    let options = WriteOption {
        escape_policy: EscapePolicy::Nothing,
        ..Default::default()
    };
    ini.write_to_opt(&mut out, options)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layout() -> (TempDir, ServerLayout) {
        let temp = TempDir::new().unwrap();
        let layout = ServerLayout::new(temp.path());
        (temp, layout)
    }

    #[test]
    fn test_default_configuration_is_created_once() {
        let (_temp, layout) = layout();

        assert!(ensure_default_configuration(&layout).unwrap());
        let first = fs::read_to_string(layout.properties_file()).unwrap();
        assert!(!ensure_default_configuration(&layout).unwrap());
        let second = fs::read_to_string(layout.properties_file()).unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with('#'));
        assert!(first.contains("enable-rcon=false"));
        assert!(first.contains("rcon.port=25575"));
        assert!(first.contains("rcon.password="));
    }

    #[test]
    fn test_default_configuration_has_no_endpoint() {
        let (_temp, layout) = layout();
        ensure_default_configuration(&layout).unwrap();

        let properties = ServerProperties::load(&layout.properties_file()).unwrap();

        assert_eq!(properties.get(KEY_ENABLE_CONTROL), Some("false"));
        assert_eq!(properties.control_endpoint(), None);
    }

    #[test]
    fn test_enable_requires_existing_file() {
        let (_temp, layout) = layout();

        let err = enable_control_channel(&layout).unwrap_err();

        assert!(matches!(err, PropertiesError::ConfigurationMissing { .. }));
        assert!(!layout.properties_file().exists());
    }

    #[test]
    fn test_enable_preserves_other_keys() {
        let (_temp, layout) = layout();
        fs::write(
            layout.properties_file(),
            "#comment\nmotd=A \"quoted\" \\u00A7 server\nmax-players=5\nenable-rcon=false\n",
        )
        .unwrap();

        let endpoint = enable_control_channel(&layout).unwrap();
        let properties = ServerProperties::load(&layout.properties_file()).unwrap();

        assert_eq!(properties.get("motd"), Some("A \"quoted\" \\u00A7 server"));
        assert_eq!(properties.get("max-players"), Some("5"));
        assert_eq!(properties.get(KEY_ENABLE_CONTROL), Some("true"));
        assert_eq!(properties.get(KEY_CONTROL_PORT), Some("25575"));
        assert_eq!(properties.get(KEY_CONTROL_SECRET), Some(endpoint.secret.as_str()));
        assert_eq!(properties.control_endpoint(), Some(endpoint));
    }

    #[test]
    fn test_enable_rotates_secret() {
        let (_temp, layout) = layout();
        ensure_default_configuration(&layout).unwrap();

        let first = enable_control_channel(&layout).unwrap();
        let second = enable_control_channel(&layout).unwrap();

        assert_ne!(first.secret, second.secret);
    }

    #[test]
    fn test_secret_shape() {
        let secret = generate_secret();
        assert_eq!(secret.len(), SECRET_LEN);
        assert!(secret.starts_with(SECRET_PREFIX));
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_endpoint_with_custom_port() {
        let (_temp, layout) = layout();
        fs::write(
            layout.properties_file(),
            "enable-rcon=true\nrcon.port=25580\nrcon.password=hunter2\n",
        )
        .unwrap();

        let properties = ServerProperties::load(&layout.properties_file()).unwrap();

        assert_eq!(
            properties.control_endpoint(),
            Some(ControlEndpoint::local(25580, "hunter2"))
        );
    }

    #[test]
    fn test_endpoint_requires_secret() {
        let (_temp, layout) = layout();
        fs::write(layout.properties_file(), "enable-rcon=true\nrcon.password=\n").unwrap();

        let properties = ServerProperties::load(&layout.properties_file()).unwrap();

        assert_eq!(properties.control_endpoint(), None);
    }
}
