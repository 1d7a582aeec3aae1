//! CLI-specific error types and exit codes.

use thiserror::Error;
use valmon_core::{ConfigError, LaunchError};

/// Failures that end the supervisor.
#[derive(Debug, Error)]
pub enum CliError {
    /// The config file could not be read or created.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The game server could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// IO error (binding the status endpoint, log files, ...).
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit codes follow sysexits.h:
    /// - 71: OS error (process could not be launched)
    /// - 74: IO error
    /// - 78: configuration error
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Launch(_) => 71, // EX_OSERR
            Self::Io(_) => 74,     // EX_IOERR
            Self::Config(_) => 78, // EX_CONFIG
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::Io(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn exit_codes() {
        let launch = CliError::from(LaunchError::NotFound {
            path: PathBuf::from("valheim_server.x86_64"),
        });
        assert_eq!(launch.exit_code(), 71);
        assert!(launch.to_string().contains("valheim_server.x86_64"));

        let io = CliError::from(std::io::Error::other("address in use"));
        assert_eq!(io.exit_code(), 74);
    }
}
