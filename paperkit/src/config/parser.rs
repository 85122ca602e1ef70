//! INI parsing: `Ini` → [`ProjectConfig`].
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ProjectConfig;
use crate::artifact::{Coordinates, Dependency, Scope};

/// Prefix of per-dependency section names, e.g. `[dependency.worldedit]`.
const DEPENDENCY_SECTION_PREFIX: &str = "dependency.";

/// Parse an `Ini` into a [`ProjectConfig`].
///
/// Starts from the defaults and overlays any values found in the file.
pub(super) fn parse_ini(ini: &Ini) -> Result<ProjectConfig, ConfigFileError> {
    let mut config = ProjectConfig::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = non_empty(section, "paper_version") {
            config.server.paper_version = Some(v.to_string());
        }
        if let Some(v) = non_empty(section, "directory") {
            config.server.directory = PathBuf::from(v);
        }
        if let Some(v) = non_empty(section, "memory") {
            if !v.starts_with("-X") {
                return Err(invalid(
                    "server",
                    "memory",
                    v,
                    "expected a JVM flag like '-Xmx1024M'",
                ));
            }
            config.server.memory = v.to_string();
        }
        if let Some(v) = non_empty(section, "java") {
            config.server.java = v.to_string();
        }
        if let Some(v) = section.get("gui") {
            config.server.gui = parse_bool(v);
        }
        if let Some(v) = non_empty(section, "plugin_artifact") {
            config.server.plugin_artifact = Some(PathBuf::from(v));
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        let mut download = config.download.clone();
        if let Some(v) = section.get("timeout") {
            download = download.with_timeout_secs(parse_positive(
                "download",
                "timeout",
                v,
                "must be a positive integer (seconds)",
            )?);
        }
        if let Some(v) = section.get("connect_timeout") {
            download = download.with_connect_timeout_secs(parse_positive(
                "download",
                "connect_timeout",
                v,
                "must be a positive integer (seconds)",
            )?);
        }
        if let Some(v) = section.get("max_attempts") {
            download = download.with_max_attempts(parse_positive(
                "download",
                "max_attempts",
                v,
                "must be a positive integer",
            )?);
        }
        if let Some(v) = section.get("workers") {
            download = download.with_workers(parse_positive(
                "download",
                "workers",
                v,
                "must be a positive integer",
            )?);
        }
        if let Some(v) = section.get("dependencies") {
            download = download.with_dependencies(parse_bool(v));
        }
        if let Some(v) = non_empty(section, "paper_api") {
            if reqwest::Url::parse(v).is_err() {
                return Err(invalid("download", "paper_api", v, "must be an absolute URL"));
            }
            download = download.with_paper_api(v.trim_end_matches('/'));
        }
        config.download = download;
    }

    // [repositories] section: repeated `url = ...` keys, order preserved
    if let Some(section) = ini.section(Some("repositories")) {
        config.repositories = section
            .get_all("url")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
    }

    // [dependency.*] sections
    for (name, section) in ini.iter() {
        let Some(id) = name.and_then(|n| n.strip_prefix(DEPENDENCY_SECTION_PREFIX)) else {
            continue;
        };
        config.dependencies.push(parse_dependency(id, section)?);
    }

    Ok(config)
}

fn parse_dependency(id: &str, section: &Properties) -> Result<Dependency, ConfigFileError> {
    let section_name = format!("{}{}", DEPENDENCY_SECTION_PREFIX, id);
    let required = |key: &str| {
        non_empty(section, key)
            .map(str::to_string)
            .ok_or_else(|| invalid(&section_name, key, "", "required"))
    };

    let coordinates = Coordinates::new(required("group")?, required("name")?, required("version")?);
    // Absent scope follows Maven's default.
    let scope = match non_empty(section, "scope") {
        Some(v) => Scope::from_str(v).unwrap_or(Scope::Compile),
        None => Scope::Compile,
    };

    Ok(Dependency::new(coordinates, scope))
}

/// Parse a boolean config value.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

fn parse_positive<N>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<N, ConfigFileError>
where
    N: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<N>() {
        Ok(n) if n > N::default() => Ok(n),
        _ => Err(invalid(section, key, value, reason)),
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(content: &str) -> Result<ProjectConfig, ConfigFileError> {
        parse_ini(&Ini::load_from_str(content).unwrap())
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_server_section() {
        let config = parse(
            "[server]\n\
             paper_version = 1.21.1\n\
             directory = run\n\
             memory = -Xmx4G\n\
             java = /opt/jdk/bin/java\n\
             gui = yes\n\
             plugin_artifact = target/demo-1.0.jar\n",
        )
        .unwrap();

        assert_eq!(config.server.paper_version.as_deref(), Some("1.21.1"));
        assert_eq!(config.server.directory, PathBuf::from("run"));
        assert_eq!(config.server.memory, "-Xmx4G");
        assert_eq!(config.server.java, "/opt/jdk/bin/java");
        assert!(config.server.gui);
        assert_eq!(
            config.server.plugin_artifact,
            Some(PathBuf::from("target/demo-1.0.jar"))
        );
    }

    #[test]
    fn test_download_section() {
        let config = parse(
            "[download]\n\
             timeout = 90\n\
             connect_timeout = 3\n\
             max_attempts = 5\n\
             workers = 6\n\
             dependencies = false\n\
             paper_api = https://mirror.example.org/paper/\n",
        )
        .unwrap();

        assert_eq!(config.download.timeout(), Duration::from_secs(90));
        assert_eq!(config.download.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.download.max_attempts(), 5);
        assert_eq!(config.download.workers(), 6);
        assert!(!config.download.dependencies());
        assert_eq!(config.download.paper_api(), "https://mirror.example.org/paper");
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let err = parse("[download]\nworkers = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "workers"
        ));
    }

    #[test]
    fn test_non_numeric_timeout_is_rejected() {
        let err = parse("[download]\ntimeout = soon\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: download.timeout = 'soon' - must be a positive integer (seconds)"
        );
    }

    #[test]
    fn test_bad_memory_flag_is_rejected() {
        assert!(parse("[server]\nmemory = 1024M\n").is_err());
    }

    #[test]
    fn test_repositories_keep_order() {
        let config = parse(
            "[repositories]\n\
             url = https://repo.papermc.io/repository/maven-public/\n\
             url = https://repo1.maven.org/maven2/\n",
        )
        .unwrap();

        assert_eq!(
            config.repositories,
            vec![
                "https://repo.papermc.io/repository/maven-public/",
                "https://repo1.maven.org/maven2/"
            ]
        );
    }

    #[test]
    fn test_dependency_sections() {
        let config = parse(
            "[dependency.worldedit]\n\
             group = com.sk89q.worldedit\n\
             name = worldedit-bukkit\n\
             version = 7.3.0\n\
             scope = provided\n\
             \n\
             [dependency.gson]\n\
             group = com.google.code.gson\n\
             name = gson\n\
             version = 2.11.0\n",
        )
        .unwrap();

        assert_eq!(
            config.dependencies,
            vec![
                Dependency::provided("com.sk89q.worldedit", "worldedit-bukkit", "7.3.0"),
                Dependency::new(
                    Coordinates::new("com.google.code.gson", "gson", "2.11.0"),
                    Scope::Compile
                ),
            ]
        );
    }

    #[test]
    fn test_dependency_missing_version_is_rejected() {
        let err = parse("[dependency.x]\ngroup = a\nname = b\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref section, ref key, .. }
                if section == "dependency.x" && key == "version"
        ));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" ON "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));
    }
}
