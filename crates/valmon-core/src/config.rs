//! Server configuration document.
//!
//! Stored as JSON next to the supervisor (`server-config.json` by default).
//! A missing file is created with defaults on first run; missing keys in an
//! existing file fall back to the same defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "server-config.json";

pub const DEFAULT_NAME: &str = "Valheim dedicated server";
pub const DEFAULT_PORT: u16 = 2456;
pub const DEFAULT_WORLD: &str = "MyWorld";
pub const DEFAULT_STATUS_PORT: u16 = 8080;
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 2;

#[cfg(windows)]
pub const DEFAULT_EXECUTABLE: &str = "valheim_server.exe";
#[cfg(not(windows))]
pub const DEFAULT_EXECUTABLE: &str = "valheim_server.x86_64";

/// Settings for launching and monitoring one dedicated server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Display name announced to the server browser.
    pub name: String,
    /// Game port.
    pub port: u16,
    /// World save name.
    pub world: String,
    /// Join password; empty means no password.
    pub password: String,
    /// `1` lists the server publicly, anything else keeps it private.
    pub public: u8,
    /// Directory containing the dedicated server install. Also the child's working directory.
    pub server_dir: PathBuf,
    /// Executable file name (or path) relative to `server_dir`.
    pub executable: PathBuf,
    /// Port of the HTTP status endpoint.
    pub status_port: u16,
    /// Bind address of the HTTP status endpoint.
    pub status_bind: String,
    /// Seconds to wait for the server to exit after the stop interrupt.
    pub grace_period_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            port: DEFAULT_PORT,
            world: DEFAULT_WORLD.to_string(),
            password: String::new(),
            public: 1,
            server_dir: PathBuf::from("."),
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            status_port: DEFAULT_STATUS_PORT,
            status_bind: "0.0.0.0".to_string(),
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
        }
    }
}

impl ServerConfig {
    /// Load the config at `path`, creating it with defaults when absent.
    ///
    /// Parsing is strict JSON. A trailing comma (`"public": 1,}`), common in
    /// older hand-written configs, is rejected with [`ConfigError::Parse`] and
    /// the file is left untouched for the operator to fix.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!(path = %path.display(), "Created default server config");
            return Ok(config);
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded server config");
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json + "\n").map_err(io_err)
    }

    pub const fn is_public(&self) -> bool {
        self.public == 1
    }

    pub fn is_passworded(&self) -> bool {
        !self.password.is_empty()
    }

    /// Absolute or relative path of the server executable.
    pub fn executable_path(&self) -> PathBuf {
        self.server_dir.join(&self.executable)
    }

    pub const fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// Arguments passed to the dedicated server, one element per argv entry.
    pub fn launch_args(&self) -> Vec<String> {
        vec![
            "-nographics".to_string(),
            "-batchmode".to_string(),
            "-name".to_string(),
            self.name.clone(),
            "-port".to_string(),
            self.port.to_string(),
            "-world".to_string(),
            self.world.clone(),
            "-password".to_string(),
            self.password.clone(),
            "-public".to_string(),
            u8::from(self.is_public()).to_string(),
        ]
    }

    /// The launch arguments rendered as a single command-line string.
    ///
    /// The password is masked; this string is only ever logged.
    pub fn command_line(&self) -> String {
        let password = if self.is_passworded() { "****" } else { "" };
        format!(
            "-nographics -batchmode -name \"{}\" -port {} -world \"{}\" -password \"{}\" -public {}",
            self.name,
            self.port,
            self.world,
            password,
            u8::from(self.is_public())
        )
    }
}
