//! End-to-end workflows: install, run, start, reload and clean.
//!
//! A [`Provisioner`] owns the project configuration and the two external
//! capabilities (HTTP transport and control channel) and composes the
//! artifact, distribution and server modules. Only setup, launch,
//! distribution lookup and deploy failures abort a workflow; download
//! failures of individual dependencies end up in the [`InstallReport`].

use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::artifact::{
    ArtifactFetcher, DependencyPlanner, DownloadOrchestrator, DownloadReport, FetchOutcome,
    HttpTransport, PlanPolicy, ReqwestTransport, RepositoryResolver, TransportError,
};
use crate::config::ProjectConfig;
use crate::distribution::{DistributionError, PaperDistribution};
use crate::server::{
    deploy, enable_control_channel, ensure_agreement_accepted, ensure_default_configuration,
    ensure_directories, ControlChannel, ControlChannelError, ControlEndpoint, DeployError,
    LaunchOptions, ProcessLaunchError, ProcessSupervisor, PropertiesError, RconChannel,
    ServerLayout, ServerProperties, SetupError, ShutdownHooks, RELOAD_COMMAND,
};

/// Errors that abort a workflow.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("no Paper version configured, set server.paper_version or pass --paper-version")]
    MissingPaperVersion,

    #[error("the control channel is not enabled in server.properties, launch with start first")]
    ControlNotConfigured,

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Properties(#[from] PropertiesError),

    #[error(transparent)]
    Launch(#[from] ProcessLaunchError),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Control(#[from] ControlChannelError),

    #[error("failed to create HTTP client: {0}")]
    Client(#[from] TransportError),

    #[error("failed to remove {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What `install` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Outcome of the runtime download.
    pub runtime: FetchOutcome,
    /// Dependency downloads; `None` when dependency installation is disabled.
    pub dependencies: Option<DownloadReport>,
}

/// What `start` did.
#[derive(Debug)]
pub enum StartOutcome {
    /// A running server was told to reload.
    Reloaded,
    /// A new server was launched and has exited.
    Exited(ExitStatus),
}

/// Runs the provisioning workflows for one project.
pub struct Provisioner<T, C> {
    config: ProjectConfig,
    layout: ServerLayout,
    transport: Arc<T>,
    control: Arc<C>,
    hooks: ShutdownHooks,
    forward_console: bool,
}

impl Provisioner<ReqwestTransport, RconChannel> {
    /// Provisioner backed by a real HTTP client and RCON.
    pub fn from_config(config: ProjectConfig, hooks: ShutdownHooks) -> Result<Self, ProvisionError> {
        let transport = ReqwestTransport::new(
            config.download.timeout(),
            config.download.connect_timeout(),
        )?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            Arc::new(RconChannel::default()),
            hooks,
        ))
    }
}

impl<T: HttpTransport, C: ControlChannel> Provisioner<T, C> {
    pub fn new(
        config: ProjectConfig,
        transport: Arc<T>,
        control: Arc<C>,
        hooks: ShutdownHooks,
    ) -> Self {
        let layout = ServerLayout::new(&config.server.directory);
        Self {
            config,
            layout,
            transport,
            control,
            hooks,
            forward_console: true,
        }
    }

    /// Whether a launched server receives this process's console input.
    pub fn with_console_forwarding(mut self, enabled: bool) -> Self {
        self.forward_console = enabled;
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn layout(&self) -> &ServerLayout {
        &self.layout
    }

    /// Prepare the server directory, runtime, dependencies and configuration.
    pub async fn install(&self) -> Result<InstallReport, ProvisionError> {
        let report = self.prepare().await?;
        ensure_default_configuration(&self.layout)?;
        Ok(report)
    }

    /// Install, deploy the plugin and run the server until it exits.
    pub async fn run(&self) -> Result<ExitStatus, ProvisionError> {
        self.prepare().await?;
        self.deploy_plugin()?;
        self.launch_and_wait().await
    }

    /// Reload a running server, or launch one with the control channel on.
    ///
    /// With `allow_reload` false a new server is always launched.
    pub async fn start(&self, allow_reload: bool) -> Result<StartOutcome, ProvisionError> {
        self.deploy_plugin()?;

        if allow_reload {
            if let Some(endpoint) = self.configured_endpoint() {
                if self.control.is_reachable(&endpoint).await {
                    info!(address = %endpoint.address(), "Server is running, reloading");
                    self.send_reload(&endpoint).await?;
                    return Ok(StartOutcome::Reloaded);
                }
                debug!(address = %endpoint.address(), "Control channel not reachable");
            }
        }

        enable_control_channel(&self.layout)?;
        let status = self.launch_and_wait().await?;
        Ok(StartOutcome::Exited(status))
    }

    /// Deploy the plugin and tell the running server to reload.
    pub async fn reload(&self) -> Result<(), ProvisionError> {
        self.deploy_plugin()?;
        let endpoint = self
            .configured_endpoint()
            .ok_or(ProvisionError::ControlNotConfigured)?;
        self.send_reload(&endpoint).await
    }

    /// Remove the managed server directory. Returns `false` if it did not exist.
    pub fn clean(&self) -> Result<bool, ProvisionError> {
        let root = self.layout.root();
        match std::fs::remove_dir_all(root) {
            Ok(()) => {
                info!(path = %root.display(), "Removed server directory");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %root.display(), "Server directory already absent");
                Ok(false)
            }
            Err(source) => Err(ProvisionError::Clean {
                path: root.to_path_buf(),
                source,
            }),
        }
    }

    async fn prepare(&self) -> Result<InstallReport, ProvisionError> {
        ensure_directories(&self.layout)?;
        ensure_agreement_accepted(&self.layout)?;

        let version = self
            .config
            .server
            .paper_version
            .as_deref()
            .ok_or(ProvisionError::MissingPaperVersion)?;

        let distribution =
            PaperDistribution::new(self.fetcher(), self.config.download.paper_api());
        let (runtime, dependencies) = tokio::join!(
            distribution.install(&self.layout, version),
            self.install_dependencies()
        );

        Ok(InstallReport {
            runtime: runtime?,
            dependencies,
        })
    }

    async fn install_dependencies(&self) -> Option<DownloadReport> {
        if !self.config.download.dependencies() {
            info!("Dependency installation disabled");
            return None;
        }

        let plugins_dir = self.layout.plugins_dir();
        let planner = DependencyPlanner::new(&plugins_dir, PlanPolicy::default());
        let planned = planner.plan(&self.config.dependencies);
        if planned.is_empty() {
            info!("All dependencies present");
            return Some(DownloadReport::default());
        }
        info!(
            count = planned.len(),
            repositories = self.config.repositories.len(),
            "Installing dependencies"
        );

        let orchestrator =
            DownloadOrchestrator::new(self.fetcher(), RepositoryResolver::new(plugins_dir))
                .with_workers(self.config.download.workers());
        let report = orchestrator.run(&planned, &self.config.repositories).await;

        for failure in &report.failures {
            warn!(url = %failure.url, reason = %failure.reason, "Dependency not installed");
        }
        Some(report)
    }

    fn fetcher(&self) -> ArtifactFetcher<T> {
        ArtifactFetcher::new(Arc::clone(&self.transport))
            .with_max_attempts(self.config.download.max_attempts())
    }

    fn deploy_plugin(&self) -> Result<Option<PathBuf>, ProvisionError> {
        match &self.config.server.plugin_artifact {
            Some(artifact) => Ok(Some(deploy(artifact, &self.layout.plugins_dir())?)),
            None => {
                debug!("No plugin artifact configured, nothing to deploy");
                Ok(None)
            }
        }
    }

    fn configured_endpoint(&self) -> Option<ControlEndpoint> {
        ServerProperties::load(&self.layout.properties_file())
            .ok()?
            .control_endpoint()
    }

    async fn send_reload(&self, endpoint: &ControlEndpoint) -> Result<(), ProvisionError> {
        match self.control.send_command(endpoint, RELOAD_COMMAND).await {
            Ok(reply) => {
                info!(reply = %reply.trim(), "Reload requested");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Reload failed");
                Err(e.into())
            }
        }
    }

    async fn launch_and_wait(&self) -> Result<ExitStatus, ProvisionError> {
        let options = LaunchOptions {
            forward_console: self.forward_console,
            ..LaunchOptions::from(&self.config.server)
        };
        let supervisor = ProcessSupervisor::new(
            self.layout.clone(),
            options,
            Arc::clone(&self.control),
            self.hooks.clone(),
        );

        supervisor.start().await?;
        Ok(supervisor.wait_for_exit().await?)
    }
}
