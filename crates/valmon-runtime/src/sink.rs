//! `LineSink` that mirrors game output into the tracing log.

use tracing::info;
use valmon_core::{LineSink, LogLine};

/// Target under which game-server lines are logged; filter with `RUST_LOG=valheim=...`.
pub const GAME_LOG_TARGET: &str = "valheim";

/// Emits each forwarded line as an `info` event with a `stream` field.
///
/// Whatever subscriber is installed decides where it lands (console, file).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLineSink;

impl LineSink for TracingLineSink {
    fn append(&self, line: &LogLine) {
        info!(target: GAME_LOG_TARGET, stream = %line.stream, "{}", line.text);
    }
}
