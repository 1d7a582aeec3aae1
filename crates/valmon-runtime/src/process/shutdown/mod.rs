//! Graceful stop protocol for the game server.
//!
//! 1. Close the supervisor's remaining pipe ends to the child (best-effort).
//! 2. Deliver the interrupt through a [`GracefulTerminator`].
//! 3. Hold an [`InterruptShield`] across steps 2-4.
//! 4. Wait up to the grace period for the child to exit.
//! 5. Drop the shield, restoring normal interrupt handling on every path.
//! 6. Report the outcome. Failures are warnings; escalation is the caller's call.

mod gate;
mod terminator;

use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};
use valmon_core::SignalDeliveryError;

use super::launch::GameProcess;

pub use gate::{InterruptGate, InterruptShield};
#[cfg(unix)]
pub use terminator::ProcessGroupInterrupt;
#[cfg(not(unix))]
pub use terminator::TerminateProcess;
pub use terminator::{GracefulTerminator, PlatformTerminator};

/// Grace period used when none is configured.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Result of one run of the stop protocol.
///
/// OS error codes appear only where a call actually failed.
#[derive(Debug)]
pub enum StopOutcome {
    /// The child exited within the grace period (or had already exited).
    Exited(ExitStatus),
    /// The child was still running when the grace period elapsed.
    TimedOut { grace: Duration },
    /// Waiting on the child failed.
    WaitFailed { last_os_error: Option<i32> },
    /// The interrupt could not be delivered; no wait was attempted.
    SignalFailed(SignalDeliveryError),
}

impl StopOutcome {
    pub const fn is_exited(&self) -> bool {
        matches!(self, Self::Exited(_))
    }
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(status) => write!(f, "game server exited ({status})"),
            Self::TimedOut { grace } => write!(
                f,
                "game server still running after {}ms",
                grace.as_millis()
            ),
            Self::WaitFailed { last_os_error } => {
                write!(f, "waiting for game server failed (os error {last_os_error:?})")
            }
            Self::SignalFailed(err) => write!(f, "{err}"),
        }
    }
}

/// Run the stop protocol against `process`.
pub async fn graceful_stop<T>(
    process: &mut GameProcess,
    terminator: &T,
    gate: &InterruptGate,
    grace: Duration,
) -> StopOutcome
where
    T: GracefulTerminator + ?Sized,
{
    let pid = process.pid();

    match process.try_status() {
        Ok(Some(status)) => {
            debug!(pid, %status, "Game server already exited before stop");
            return StopOutcome::Exited(status);
        }
        Ok(None) => {}
        Err(e) => debug!(pid, error = %e, "Could not poll game server status"),
    }

    let closed = process.close_pipes();
    debug!(pid, closed, "Closed supervisor pipe ends");

    let shield = gate.shield();

    info!(pid, "Sending interrupt to game server");
    if let Err(err) = terminator.deliver_interrupt(process.child_mut()) {
        drop(shield);
        warn!(pid, os_error = ?err.os_error, error = %err, "Failed to deliver stop interrupt");
        return StopOutcome::SignalFailed(err);
    }

    debug!(pid, grace_ms = grace.as_millis(), "Waiting for game server exit");
    let waited = timeout(grace, process.wait()).await;

    drop(shield);

    match waited {
        Ok(Ok(status)) => {
            info!(pid, %status, "Game server exited");
            StopOutcome::Exited(status)
        }
        Ok(Err(e)) => {
            warn!(pid, error = %e, "Waiting for game server failed");
            StopOutcome::WaitFailed {
                last_os_error: e.raw_os_error(),
            }
        }
        Err(_) => {
            warn!(
                pid,
                grace_ms = grace.as_millis(),
                "Game server failed to close within the grace period"
            );
            StopOutcome::TimedOut { grace }
        }
    }
}
