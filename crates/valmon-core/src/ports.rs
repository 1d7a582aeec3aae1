//! Ports implemented by runtime adapters.

use crate::line::LogLine;

/// Port for appending game-server output lines to the operator log.
///
/// Implementations should be thread-safe and non-blocking where possible;
/// both stream workers call it concurrently.
pub trait LineSink: Send + Sync {
    /// Append a forwarded line (already trimmed, never decorative).
    fn append(&self, line: &LogLine);
}

/// Sink that discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLineSink;

impl LineSink for NoopLineSink {
    fn append(&self, _line: &LogLine) {}
}
