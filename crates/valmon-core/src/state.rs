//! Server state snapshot derived from game-server output.
//!
//! `ServerState` is the aggregate the status endpoint serializes. Field
//! names on the wire are fixed by the monitoring contract, hence the
//! explicit renames where camelCase conversion would not produce them.
//!
//! `StateStore` is the single shared instance. Each parsed line is applied
//! under the write lock, so readers always see whole-line updates.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;

/// Lifecycle of the game server as observed from its output.
///
/// Transitions once, `Starting` to `Running`, and never regresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerStatus {
    #[default]
    Starting,
    Running,
}

/// One connected client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    /// Platform account id; the key used for removal.
    #[serde(rename = "steamID")]
    pub steam_id: String,
    /// Client version from the version handshake.
    #[serde(rename = "gameVersion")]
    pub game_version: Option<String>,
    /// In-world character identifier, e.g. `229722225:1`.
    #[serde(rename = "characterZDOID")]
    pub character_zdoid: Option<String>,
    /// Character display name.
    pub name: Option<String>,
}

impl PlayerSession {
    pub fn new(steam_id: impl Into<String>) -> Self {
        Self {
            steam_id: steam_id.into(),
            ..Self::default()
        }
    }
}

/// Latest known state of the game server, its world and its players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerState {
    pub name: String,
    pub port: u16,
    pub is_public: bool,
    pub is_passworded: bool,
    pub players: Vec<PlayerSession>,
    pub server_status: ServerStatus,
    pub engine_version: Option<String>,
    pub world_seed: Option<String>,
    pub world_gen_version: Option<String>,
    pub render_threading_mode: Option<String>,
    pub world: String,
    pub server_id: Option<String>,
    pub is_steam_game_server_initialized: bool,
    #[serde(rename = "zonesystem")]
    pub zone_system: u32,
    #[serde(rename = "dungeonDB")]
    pub dungeon_db: u32,
    pub mountain_distance: u32,
    pub mountain_points: u32,
    pub remaining_mountains: u32,
    pub lake_points: u32,
    pub remaining_lakes: u32,
    pub rivers: u32,
    pub river_buckets: u32,
    pub streams_placed: u32,
    pub locations_loaded: u32,
    pub is_game_server_connected: bool,
    pub last_game_save: Option<DateTime<Utc>>,
    pub day: u32,
}

impl ServerState {
    /// Fresh state carrying the identity fields from configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            name: config.name.clone(),
            port: config.port,
            world: config.world.clone(),
            is_passworded: config.is_passworded(),
            is_public: config.is_public(),
            ..Self::default()
        }
    }

    /// Record the first successful game-server connection.
    pub fn mark_connected(&mut self) {
        self.is_game_server_connected = true;
        self.server_status = ServerStatus::Running;
    }

    /// Append a session for a newly connected account.
    pub fn add_player(&mut self, steam_id: &str) {
        self.players.push(PlayerSession::new(steam_id));
    }

    /// The most recently created session still connected.
    ///
    /// Version and character lines carry no account id, so they attach here.
    /// Correct only while the game logs each connect sequence without
    /// interleaving another client's.
    pub fn latest_player_mut(&mut self) -> Option<&mut PlayerSession> {
        self.players.last_mut()
    }

    /// Remove every session for `steam_id`, returning how many were removed.
    pub fn remove_players(&mut self, steam_id: &str) -> usize {
        let before = self.players.len();
        self.players.retain(|p| p.steam_id != steam_id);
        before - self.players.len()
    }

    /// Pretty JSON rendering of the status document.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Shared handle to the one `ServerState` of the process.
///
/// Cloning the store clones the handle. Writers hold the lock for a whole
/// line; readers take a cloned snapshot and serialize outside the lock.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    inner: Arc<RwLock<ServerState>>,
}

impl StateStore {
    pub fn new(initial: ServerState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> ServerState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate the state under the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut ServerState) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
