//! Core domain for valmon, the Valheim dedicated-server monitor.
//!
//! Pure types and logic with no process or network dependencies:
//!
//! - [`state`] - the `ServerState` snapshot and its shared `StateStore`
//! - [`parser`] - ordered rule chain turning output lines into state
//! - [`line`] - raw output lines and the forwarding filter
//! - [`config`] - the JSON server configuration document
//! - [`ports`] - traits implemented by runtime adapters
//! - [`error`] - error taxonomy shared by every adapter

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod line;
pub mod parser;
pub mod ports;
pub mod state;

pub use config::ServerConfig;
pub use error::{ConfigError, LaunchError, ParseError, SignalDeliveryError};
pub use line::{LogLine, StreamKind, should_forward};
pub use parser::{LineParser, ParseRule, Predicate};
pub use ports::{LineSink, NoopLineSink};
pub use state::{PlayerSession, ServerState, ServerStatus, StateStore};
