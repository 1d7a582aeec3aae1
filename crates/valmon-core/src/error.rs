//! Error taxonomy shared by every valmon adapter.
//!
//! Each variant family maps to one failure class of the supervisor:
//! launching the game server, delivering the shutdown interrupt, parsing
//! its output, and loading configuration. End-of-input on an output stream
//! is a normal worker exit, not an error.

use std::path::PathBuf;

use thiserror::Error;

/// The game-server process could not be started. Fatal at startup.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The configured executable does not exist.
    #[error("Executable not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The working directory does not exist or is not a directory.
    #[error("Working directory not found: {}", path.display())]
    WorkingDirNotFound { path: PathBuf },

    /// The OS refused to create the process.
    #[error("Failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The shutdown interrupt could not be delivered to the child.
///
/// Non-fatal: the stop protocol reports it and proceeds best-effort.
#[derive(Debug, Clone, Error)]
#[error("Failed to deliver interrupt to process {pid}: {message} (os error {})", os_error_label(.os_error))]
pub struct SignalDeliveryError {
    /// Target process id.
    pub pid: u32,
    /// Raw OS error code, when the platform reported one.
    pub os_error: Option<i32>,
    /// Human readable description of the failure.
    pub message: String,
}

#[allow(clippy::ref_option)]
fn os_error_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

/// A matched rule could not extract its value.
///
/// The patterns guarantee a decimal capture, so this signals a contract
/// violation between the rule table and the game's output format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A numeric capture did not fit a non-negative 32-bit counter.
    #[error("Rule '{rule}' captured non-numeric value '{value}'")]
    Numeric { rule: &'static str, value: String },
}

/// Configuration document could not be read or written.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error reading or creating the config file.
    #[error("Config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid config document.
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_error_includes_os_code() {
        let err = SignalDeliveryError {
            pid: 42,
            os_error: Some(3),
            message: "No such process".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("42"));
        assert!(text.contains("os error 3"));
    }

    #[test]
    fn signal_error_without_code() {
        let err = SignalDeliveryError {
            pid: 7,
            os_error: None,
            message: "unsupported".to_string(),
        };
        assert!(err.to_string().contains("os error unknown"));
    }

    #[test]
    fn launch_not_found_names_path() {
        let err = LaunchError::NotFound {
            path: PathBuf::from("/opt/valheim/valheim_server.x86_64"),
        };
        assert!(err.to_string().contains("valheim_server.x86_64"));
    }
}
