//! Integration tests for the dependency download pipeline.
//!
//! Planner, resolver, fetcher and orchestrator run together against an
//! in-memory remote.

mod common;

use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{artifact_url, library_jar, plugin_jar, FakeRemote};
use paperkit::artifact::{
    ArtifactFetcher, Dependency, DependencyPlanner, DownloadOrchestrator, FetchOutcome,
    PlanPolicy, RepositoryResolver, SkipReason, Validation,
};
use reqwest::Url;
use tempfile::TempDir;

const FIRST: &str = "https://first.example.org/maven/";
const SECOND: &str = "https://second.example.org/maven/";

fn jar_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn dependencies(count: usize) -> Vec<Dependency> {
    (0..count)
        .map(|i| Dependency::provided("org.example", format!("plugin{:02}", i), "1.0"))
        .collect()
}

fn orchestrator(
    remote: &Arc<FakeRemote>,
    plugin_dir: &Path,
) -> DownloadOrchestrator<FakeRemote> {
    DownloadOrchestrator::new(
        ArtifactFetcher::new(Arc::clone(remote)),
        RepositoryResolver::new(plugin_dir),
    )
}

#[tokio::test]
async fn test_ten_dependencies_hosted_by_second_repository() {
    let temp = TempDir::new().unwrap();
    let remote = Arc::new(FakeRemote::new());
    let deps = dependencies(10);
    for dep in &deps {
        remote.serve(&artifact_url(SECOND, &dep.coordinates.name), plugin_jar());
    }
    let repos = vec![FIRST.to_string(), SECOND.to_string()];

    let planned = DependencyPlanner::new(temp.path(), PlanPolicy::default()).plan(&deps);
    let report = orchestrator(&remote, temp.path()).run(&planned, &repos).await;

    assert_eq!(report.installed, 10);
    assert_eq!(report.failed, 0);
    let names = jar_names(temp.path());
    assert_eq!(names.len(), 10);
    assert!(names.iter().all(|n| n.ends_with("-1.0.jar")));
}

#[tokio::test]
async fn test_second_run_plans_nothing() {
    let temp = TempDir::new().unwrap();
    let remote = Arc::new(FakeRemote::new());
    let deps = dependencies(3);
    for dep in &deps {
        remote.serve(&artifact_url(FIRST, &dep.coordinates.name), plugin_jar());
    }
    let repos = vec![FIRST.to_string()];
    let planner = DependencyPlanner::new(temp.path(), PlanPolicy::default());

    orchestrator(&remote, temp.path())
        .run(&planner.plan(&deps), &repos)
        .await;
    let downloads_after_first = remote.downloads.load(Ordering::SeqCst);

    assert!(planner.plan(&deps).is_empty());
    assert_eq!(downloads_after_first, 3);
}

#[tokio::test]
async fn test_library_jar_is_never_installed() {
    let temp = TempDir::new().unwrap();
    let remote = Arc::new(FakeRemote::new());
    let url = artifact_url(FIRST, "gson");
    remote.serve(&url, library_jar());
    let fetcher = ArtifactFetcher::new(Arc::clone(&remote));
    let dest = temp.path().join("gson-1.0.jar");

    let outcome = fetcher
        .fetch(&Url::parse(&url).unwrap(), &dest, Validation::PluginManifest)
        .await
        .unwrap();

    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::NotAPlugin));
    assert!(!dest.exists());
    assert!(jar_names(temp.path()).is_empty());
}

#[tokio::test]
async fn test_mixed_plan_only_installs_plugins() {
    let temp = TempDir::new().unwrap();
    let remote = Arc::new(FakeRemote::new());
    remote.serve(&artifact_url(FIRST, "good"), plugin_jar());
    remote.serve(&artifact_url(FIRST, "library"), library_jar());
    let deps = vec![
        Dependency::provided("org.example", "good", "1.0"),
        Dependency::provided("org.example", "library", "1.0"),
        Dependency::provided("org.example", "absent", "1.0"),
        Dependency::provided("io.papermc.paper", "paper-api", "1.0"),
    ];
    let repos = vec![FIRST.to_string(), SECOND.to_string()];

    let planned = DependencyPlanner::new(temp.path(), PlanPolicy::default()).plan(&deps);
    let report = orchestrator(&remote, temp.path()).run(&planned, &repos).await;

    assert_eq!(planned.len(), 3);
    assert_eq!(report.installed, 1);
    assert_eq!(report.skipped, 5);
    assert_eq!(jar_names(temp.path()), vec!["good-1.0.jar"]);
}
