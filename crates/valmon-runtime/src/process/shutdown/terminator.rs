//! Per-platform delivery of the "stop" interrupt to the game server.

use tokio::process::Child;
use valmon_core::SignalDeliveryError;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Capability to ask a child to shut down the way an interactive Ctrl+C would.
pub trait GracefulTerminator: Send + Sync {
    fn deliver_interrupt(&self, child: &mut Child) -> Result<(), SignalDeliveryError>;
}

fn reaped() -> SignalDeliveryError {
    SignalDeliveryError {
        pid: 0,
        os_error: None,
        message: "child has already been reaped".to_string(),
    }
}

/// Sends `SIGINT` to the child's process group.
///
/// The child is launched as its own group leader, so the group id is its pid
/// and the signal reaches the server and anything it spawned.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessGroupInterrupt;

#[cfg(unix)]
impl GracefulTerminator for ProcessGroupInterrupt {
    fn deliver_interrupt(&self, child: &mut Child) -> Result<(), SignalDeliveryError> {
        let pid = child.id().ok_or_else(reaped)?;
        let raw = i32::try_from(pid).map_err(|_| SignalDeliveryError {
            pid,
            os_error: None,
            message: "pid out of range".to_string(),
        })?;

        signal::killpg(Pid::from_raw(raw), Signal::SIGINT).map_err(|errno| SignalDeliveryError {
            pid,
            os_error: Some(errno as i32),
            message: errno.desc().to_string(),
        })
    }
}

/// No console-interrupt equivalent is reachable without owning the child's
/// console, so the closest native request is a terminate.
#[cfg(not(unix))]
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminateProcess;

#[cfg(not(unix))]
impl GracefulTerminator for TerminateProcess {
    fn deliver_interrupt(&self, child: &mut Child) -> Result<(), SignalDeliveryError> {
        let pid = child.id().ok_or_else(reaped)?;
        child.start_kill().map_err(|e| SignalDeliveryError {
            pid,
            os_error: e.raw_os_error(),
            message: e.to_string(),
        })
    }
}

/// Terminator for the current target platform.
#[cfg(unix)]
pub type PlatformTerminator = ProcessGroupInterrupt;
#[cfg(not(unix))]
pub type PlatformTerminator = TerminateProcess;
