//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use valmon_core::ServerConfig;
use valmon_core::config::DEFAULT_CONFIG_FILE;

/// Supervise a Valheim dedicated server and serve its live status over HTTP.
///
/// Type `stop` (or `q`) to shut the server down gracefully; any other line
/// prints the current status document to the log.
#[derive(Parser, Debug)]
#[command(name = "valmon", author, version, about, long_about = None)]
pub struct Cli {
    /// JSON server configuration; created with defaults when missing
    #[arg(short, long, env = "VALMON_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory receiving log.txt (the previous run is kept as log.old.txt)
    #[arg(long, env = "VALMON_LOG_DIR", default_value = ".")]
    pub log_dir: PathBuf,

    /// Override the dedicated server install directory
    #[arg(long)]
    pub server_dir: Option<PathBuf>,

    /// Override the status endpoint port
    #[arg(long)]
    pub status_port: Option<u16>,

    /// Override the stop grace period, in seconds
    #[arg(long)]
    pub grace_period: Option<u64>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(dir) = &self.server_dir {
            config.server_dir.clone_from(dir);
        }
        if let Some(port) = self.status_port {
            config.status_port = port;
        }
        if let Some(secs) = self.grace_period {
            config.grace_period_secs = secs;
        }
    }
}
