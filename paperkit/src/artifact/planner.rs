//! Selection of the dependencies that still have to be downloaded.

use std::path::{Path, PathBuf};

use super::coordinates::{Dependency, Scope};

/// Default artifact name excluded from installation: the server's own API.
pub const DEFAULT_EXCLUDED_ARTIFACT: &str = "paper-api";

/// Inclusion and exclusion rules applied by the [`DependencyPlanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanPolicy {
    /// Artifact names that are never installed.
    pub excluded_artifacts: Vec<String>,
    /// Only dependencies with this scope are installed.
    pub required_scope: Scope,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            excluded_artifacts: vec![DEFAULT_EXCLUDED_ARTIFACT.to_string()],
            required_scope: Scope::Provided,
        }
    }
}

impl PlanPolicy {
    fn is_excluded(&self, dependency: &Dependency) -> bool {
        self.excluded_artifacts
            .iter()
            .any(|name| *name == dependency.coordinates.name)
    }
}

/// Filters the declared dependencies down to the ones that must be fetched.
///
/// A dependency is planned when it is not excluded, carries the required
/// scope, and has no file at `plugins/{name}-{version}.jar` yet. An existing
/// file is trusted as-is: there is no version or checksum verification, so a
/// corrupted jar left by an earlier run stays until it is deleted by hand.
#[derive(Debug, Clone)]
pub struct DependencyPlanner {
    plugin_dir: PathBuf,
    policy: PlanPolicy,
}

impl DependencyPlanner {
    pub fn new(plugin_dir: impl Into<PathBuf>, policy: PlanPolicy) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            policy,
        }
    }

    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Return the dependencies that still need downloading, in input order.
    pub fn plan<'a, I>(&self, dependencies: I) -> Vec<Dependency>
    where
        I: IntoIterator<Item = &'a Dependency>,
    {
        dependencies
            .into_iter()
            .filter(|dep| !self.policy.is_excluded(dep))
            .filter(|dep| dep.scope == self.policy.required_scope)
            .filter(|dep| !self.is_installed(dep))
            .cloned()
            .collect()
    }

    fn is_installed(&self, dependency: &Dependency) -> bool {
        self.plugin_dir
            .join(dependency.coordinates.file_name())
            .exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::coordinates::Coordinates;
    use std::fs;
    use tempfile::TempDir;

    fn dep(name: &str, scope: Scope) -> Dependency {
        Dependency::new(Coordinates::new("org.example", name, "1.0"), scope)
    }

    fn names(planned: &[Dependency]) -> Vec<&str> {
        planned
            .iter()
            .map(|d| d.coordinates.name.as_str())
            .collect()
    }

    #[test]
    fn test_excludes_server_api() {
        let temp = TempDir::new().unwrap();
        let planner = DependencyPlanner::new(temp.path(), PlanPolicy::default());
        let deps = vec![dep("paper-api", Scope::Provided), dep("vault", Scope::Provided)];

        assert_eq!(names(&planner.plan(&deps)), vec!["vault"]);
    }

    #[test]
    fn test_only_provided_scope_is_planned() {
        let temp = TempDir::new().unwrap();
        let planner = DependencyPlanner::new(temp.path(), PlanPolicy::default());
        let deps = vec![
            dep("a", Scope::Compile),
            dep("b", Scope::Provided),
            dep("c", Scope::Test),
            dep("d", Scope::Other("import".to_string())),
        ];

        assert_eq!(names(&planner.plan(&deps)), vec!["b"]);
    }

    #[test]
    fn test_installed_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("present-1.0.jar"), b"jar").unwrap();
        let planner = DependencyPlanner::new(temp.path(), PlanPolicy::default());
        let deps = vec![dep("present", Scope::Provided), dep("missing", Scope::Provided)];

        assert_eq!(names(&planner.plan(&deps)), vec!["missing"]);
    }

    #[test]
    fn test_filters_do_not_depend_on_order() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("present-1.0.jar"), b"jar").unwrap();
        let planner = DependencyPlanner::new(temp.path(), PlanPolicy::default());
        let mut deps = vec![
            dep("present", Scope::Provided),
            dep("paper-api", Scope::Provided),
            dep("x", Scope::Provided),
            dep("y", Scope::Compile),
            dep("z", Scope::Provided),
        ];

        let forward = planner.plan(&deps);
        deps.reverse();
        let mut backward = planner.plan(&deps);
        backward.reverse();

        assert_eq!(forward, backward);
        assert_eq!(names(&forward), vec!["x", "z"]);
    }

    #[test]
    fn test_custom_policy() {
        let temp = TempDir::new().unwrap();
        let policy = PlanPolicy {
            excluded_artifacts: vec!["vault".to_string()],
            required_scope: Scope::Runtime,
        };
        let planner = DependencyPlanner::new(temp.path(), policy);
        let deps = vec![
            dep("paper-api", Scope::Runtime),
            dep("vault", Scope::Runtime),
            dep("essentials", Scope::Provided),
        ];

        assert_eq!(names(&planner.plan(&deps)), vec!["paper-api"]);
    }
}
