//! Game-server process supervision.
//!
//! # Structure
//!
//! - `launch` - spawning the child and owning its handle
//! - `shutdown` - the graceful stop protocol and interrupt policy
//! - [`Supervisor`] - ties a platform terminator to an interrupt gate

mod launch;
pub mod shutdown;

use std::time::Duration;

use valmon_core::LaunchError;

pub use launch::{GameProcess, LaunchSpec, launch};
pub use shutdown::{
    DEFAULT_GRACE_PERIOD, GracefulTerminator, InterruptGate, InterruptShield, PlatformTerminator,
    StopOutcome, graceful_stop,
};

/// Owns the child lifecycle policy: how to start it and how to stop it.
#[derive(Debug, Clone, Default)]
pub struct Supervisor<T = PlatformTerminator> {
    terminator: T,
    gate: InterruptGate,
}

impl Supervisor<PlatformTerminator> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: GracefulTerminator> Supervisor<T> {
    /// Supervisor with a custom interrupt delivery strategy.
    pub fn with_terminator(terminator: T) -> Self {
        Self {
            terminator,
            gate: InterruptGate::new(),
        }
    }

    /// The interrupt policy shared with the operator console.
    pub const fn gate(&self) -> &InterruptGate {
        &self.gate
    }

    pub fn launch(&self, spec: &LaunchSpec) -> Result<GameProcess, LaunchError> {
        launch(spec)
    }

    pub async fn request_graceful_stop(
        &self,
        process: &mut GameProcess,
        grace: Duration,
    ) -> StopOutcome {
        graceful_stop(process, &self.terminator, &self.gate, grace).await
    }
}

#[cfg(test)]
mod tests {
    use valmon_core::ServerConfig;

    use super::*;

    #[test]
    fn config_default_matches_grace_period() {
        assert_eq!(ServerConfig::default().grace_period(), DEFAULT_GRACE_PERIOD);
    }

    #[test]
    fn fresh_supervisor_gate_is_open() {
        let supervisor = Supervisor::new();
        assert!(!supervisor.gate().is_shielded());
        assert!(supervisor.gate().admit());
    }
}
