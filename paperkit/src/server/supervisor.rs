//! Launch and lifecycle of the server process.
//!
//! A [`ProcessSupervisor`] owns at most one child process and moves through
//! `NotStarted → Running → Stopped`. There is no restart on crash.
//!
//! While the child runs, a shutdown hook is registered that asks it to stop:
//! over the control channel when `server.properties` configures one, else by
//! writing `stop` to the child's stdin. The child's stdin is piped so this
//! fallback always has a stream to write to, and the supervisor's own
//! console input is forwarded to it line by line.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::control::{ControlChannel, STOP_COMMAND};
use super::hooks::{HookId, ShutdownHooks};
use super::layout::ServerLayout;
use super::properties::ServerProperties;
use crate::config::{ServerSettings, DEFAULT_JAVA, DEFAULT_MEMORY};

/// Argument that disables the server GUI.
const NO_GUI_ARG: &str = "nogui";

#[derive(Debug, Error)]
pub enum ProcessLaunchError {
    #[error("server directory {path} does not exist or is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("server runtime {path} is missing, run install first")]
    MissingRuntime { path: PathBuf },

    #[error("server process was already started")]
    AlreadyStarted,

    #[error("server process is not running")]
    NotRunning,

    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for the server process: {0}")]
    Wait(#[source] io::Error),
}

/// Lifecycle state of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    NotStarted,
    Running,
    Stopped,
}

/// How the server is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub java: String,
    pub memory: String,
    pub gui: bool,
    /// Forward this process's stdin to the server console.
    pub forward_console: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            java: DEFAULT_JAVA.to_string(),
            memory: DEFAULT_MEMORY.to_string(),
            gui: false,
            forward_console: true,
        }
    }
}

impl From<&ServerSettings> for LaunchOptions {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            java: settings.java.clone(),
            memory: settings.memory.clone(),
            gui: settings.gui,
            forward_console: true,
        }
    }
}

struct Inner<C> {
    layout: ServerLayout,
    options: LaunchOptions,
    control: Arc<C>,
    hooks: ShutdownHooks,
    state: StdMutex<ProcessState>,
    stop_requested: AtomicBool,
    hook: StdMutex<Option<HookId>>,
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
}

/// Supervises one server process. Clones share the same process.
pub struct ProcessSupervisor<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for ProcessSupervisor<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: ControlChannel> ProcessSupervisor<C> {
    pub fn new(
        layout: ServerLayout,
        options: LaunchOptions,
        control: Arc<C>,
        hooks: ShutdownHooks,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                layout,
                options,
                control,
                hooks,
                state: StdMutex::new(ProcessState::NotStarted),
                stop_requested: AtomicBool::new(false),
                hook: StdMutex::new(None),
                child: Mutex::new(None),
                stdin: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> ProcessState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Arguments passed to the java executable.
    pub fn arguments(&self) -> Result<Vec<String>, ProcessLaunchError> {
        let jar = self.inner.layout.runtime_jar();
        let jar = std::path::absolute(&jar)
            .map_err(|_| ProcessLaunchError::MissingRuntime { path: jar.clone() })?;

        let mut args = vec![
            self.inner.options.memory.clone(),
            "-jar".to_string(),
            jar.display().to_string(),
        ];
        if !self.inner.options.gui {
            args.push(NO_GUI_ARG.to_string());
        }
        Ok(args)
    }

    /// Launch the server and register its shutdown hook.
    pub async fn start(&self) -> Result<(), ProcessLaunchError> {
        if self.state() != ProcessState::NotStarted {
            return Err(ProcessLaunchError::AlreadyStarted);
        }

        let root = self.inner.layout.root();
        if !root.is_dir() {
            return Err(ProcessLaunchError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        let jar = self.inner.layout.runtime_jar();
        if !jar.is_file() {
            return Err(ProcessLaunchError::MissingRuntime { path: jar });
        }

        let args = self.arguments()?;
        let program = self.inner.options.java.clone();
        info!(program = %program, args = ?args, root = %root.display(), "Launching server");

        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ProcessLaunchError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let Some(pid) = child.id() {
            debug!(pid, "Server process started");
        }
        *self.inner.stdin.lock().await = child.stdin.take();
        *self.inner.child.lock().await = Some(child);
        self.set_state(ProcessState::Running);

        let supervisor = self.clone();
        let id = self
            .inner
            .hooks
            .register(move || async move { supervisor.stop().await });
        *self
            .inner
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(id);

        if self.inner.options.forward_console {
            self.forward_console();
        }
        Ok(())
    }

    /// Wait for the process to exit and withdraw its shutdown hook.
    pub async fn wait_for_exit(&self) -> Result<ExitStatus, ProcessLaunchError> {
        let mut child = self.inner.child.lock().await;
        let Some(process) = child.as_mut() else {
            return Err(ProcessLaunchError::NotRunning);
        };

        let status = process.wait().await.map_err(ProcessLaunchError::Wait)?;
        *child = None;
        drop(child);

        self.set_state(ProcessState::Stopped);
        self.inner.stdin.lock().await.take();
        self.withdraw_hook();

        info!(%status, "Server process exited");
        Ok(status)
    }

    /// Ask the running server to stop.
    ///
    /// Does nothing unless the process is running, and only the first call
    /// has any effect. Failures are logged, never returned.
    pub async fn stop(&self) {
        if self.state() != ProcessState::Running {
            debug!("Stop requested but no server is running");
            return;
        }
        if self.inner.stop_requested.swap(true, Ordering::SeqCst) {
            return;
        }

        let endpoint = ServerProperties::load(&self.inner.layout.properties_file())
            .ok()
            .and_then(|p| p.control_endpoint());

        let mut stopped = false;
        if let Some(endpoint) = endpoint {
            match self
                .inner
                .control
                .send_command(&endpoint, STOP_COMMAND)
                .await
            {
                Ok(_) => {
                    info!("Stop command sent over control channel");
                    stopped = true;
                }
                Err(e) => warn!(error = %e, "Control channel stop failed, using console"),
            }
        }

        if !stopped {
            match self.write_console(&format!("{}\n", STOP_COMMAND)).await {
                Ok(()) => info!("Stop command written to server console"),
                Err(e) => warn!(error = %e, "Could not deliver stop command"),
            }
        }

        self.withdraw_hook();
    }

    async fn write_console(&self, line: &str) -> io::Result<()> {
        let mut stdin = self.inner.stdin.lock().await;
        let Some(stdin) = stdin.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "server console is closed",
            ));
        };
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await
    }

    /// Copy our stdin lines into the server console.
    ///
    /// Reading stdin blocks, so it happens on a plain thread that ends at
    /// EOF or once the server side has gone away.
    fn forward_console(&self) {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let reader = std::thread::Builder::new()
            .name("console-forwarder".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = reader {
            warn!(error = %e, "Console forwarding unavailable");
            return;
        }

        let supervisor = self.clone();
        tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                if supervisor.write_console(&format!("{}\n", line)).await.is_err() {
                    break;
                }
            }
        });
    }

    fn set_state(&self, state: ProcessState) {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn withdraw_hook(&self) {
        let id = self
            .inner
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(id) = id {
            self.inner.hooks.deregister(id);
        }
    }
}
