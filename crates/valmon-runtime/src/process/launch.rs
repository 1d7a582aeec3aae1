//! Spawning the game-server child and owning its handle.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info};
use valmon_core::{LaunchError, ServerConfig};

/// Everything needed to start the child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub executable: PathBuf,
    pub working_dir: PathBuf,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn new(
        executable: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        args: Vec<String>,
    ) -> Self {
        Self {
            executable: executable.into(),
            working_dir: working_dir.into(),
            args,
        }
    }

    /// Launch the dedicated server described by `config`.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.executable_path(),
            config.server_dir.clone(),
            config.launch_args(),
        )
    }
}

/// Handle to the running game server.
///
/// Dropping the handle kills the child so a crashed supervisor never
/// leaves an unmanaged server behind.
#[derive(Debug)]
pub struct GameProcess {
    child: Child,
    pid: u32,
}

impl GameProcess {
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Hand the output pipes to the ingestion pipeline. `None` once taken.
    pub fn take_output(&mut self) -> Option<(ChildStdout, ChildStderr)> {
        match (self.child.stdout.take(), self.child.stderr.take()) {
            (Some(stdout), Some(stderr)) => Some((stdout, stderr)),
            (stdout, stderr) => {
                self.child.stdout = stdout;
                self.child.stderr = stderr;
                None
            }
        }
    }

    /// Block until the child terminates.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Exit status if the child has already terminated.
    pub fn try_status(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Forcefully kill the child and reap it. The escalation after a failed stop.
    pub async fn force_kill(&mut self) -> io::Result<()> {
        info!(pid = self.pid, "Force killing game server");
        self.child.kill().await
    }

    /// Drop every pipe end the supervisor still holds. Returns how many were closed.
    pub(crate) fn close_pipes(&mut self) -> usize {
        let stdin = self.child.stdin.take().is_some();
        let stdout = self.child.stdout.take().is_some();
        let stderr = self.child.stderr.take().is_some();
        [stdin, stdout, stderr].into_iter().filter(|closed| *closed).count()
    }

    pub(crate) const fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }
}

/// Start the child with stdin/stdout/stderr piped.
///
/// On Unix the child leads its own process group, so the stop interrupt can
/// target the whole server and an operator Ctrl+C in the terminal reaches
/// only the supervisor.
pub fn launch(spec: &LaunchSpec) -> Result<GameProcess, LaunchError> {
    if !spec.executable.is_file() {
        return Err(LaunchError::NotFound {
            path: spec.executable.clone(),
        });
    }
    if !spec.working_dir.is_dir() {
        return Err(LaunchError::WorkingDirNotFound {
            path: spec.working_dir.clone(),
        });
    }
    // A relative program path would be resolved after the chdir into `working_dir`.
    let executable = std::path::absolute(&spec.executable).map_err(|_| LaunchError::NotFound {
        path: spec.executable.clone(),
    })?;

    let mut cmd = Command::new(&executable);
    cmd.args(&spec.args)
        .current_dir(&spec.working_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        path: spec.executable.clone(),
        source,
    })?;
    let pid = child.id().ok_or_else(|| LaunchError::Spawn {
        path: spec.executable.clone(),
        source: io::Error::other("child exited before its pid was read"),
    })?;

    debug!(pid, executable = %executable.display(), "Spawned game server");
    Ok(GameProcess { child, pid })
}
