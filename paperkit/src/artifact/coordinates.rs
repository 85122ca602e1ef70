//! Dependency coordinates and scope tags.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Maven-style coordinates identifying a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinates {
    /// Group identifier, dot separated (e.g. `com.sk89q.worldedit`)
    pub group: String,
    /// Artifact name (e.g. `worldedit-bukkit`)
    pub name: String,
    /// Artifact version (e.g. `7.3.0`)
    pub version: String,
}

impl Coordinates {
    /// Create coordinates from their parts.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// File name of the jar, `{name}-{version}.jar`.
    ///
    /// This is both the last segment of the repository path and the name the
    /// artifact is installed under in `plugins/`.
    pub fn file_name(&self) -> String {
        format!("{}-{}.jar", self.name, self.version)
    }

    /// Path of the jar relative to a repository root.
    ///
    /// `group/with/dots/as/slashes/name/version/name-version.jar`
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.name,
            self.version,
            self.file_name()
        )
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

/// Dependency scope as declared in the build description.
///
/// Only [`Scope::Provided`] dependencies are installed into the server; the
/// server supplies them at runtime, so the build only compiles against them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Provided,
    Compile,
    Runtime,
    Test,
    System,
    /// Any tag we do not recognise; never installed.
    Other(String),
}

impl FromStr for Scope {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "provided" => Scope::Provided,
            "compile" => Scope::Compile,
            "runtime" => Scope::Runtime,
            "test" => Scope::Test,
            "system" => Scope::System,
            other => Scope::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Provided => write!(f, "provided"),
            Scope::Compile => write!(f, "compile"),
            Scope::Runtime => write!(f, "runtime"),
            Scope::Test => write!(f, "test"),
            Scope::System => write!(f, "system"),
            Scope::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// A declared dependency of the plugin under development.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub coordinates: Coordinates,
    pub scope: Scope,
}

impl Dependency {
    pub fn new(coordinates: Coordinates, scope: Scope) -> Self {
        Self { coordinates, scope }
    }

    /// Shorthand for a `provided` dependency.
    pub fn provided(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(Coordinates::new(group, name, version), Scope::Provided)
    }
}
