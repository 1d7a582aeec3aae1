//! Raw output lines captured from the game-server process.

use std::fmt;

/// Which output stream of the child a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Standard output (primary stream).
    Stdout,
    /// Standard error.
    Stderr,
}

impl StreamKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of game-server output. Transient: dropped after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub stream: StreamKind,
}

impl LogLine {
    pub fn new(text: impl Into<String>, stream: StreamKind) -> Self {
        Self {
            text: text.into(),
            stream,
        }
    }

    /// Build the line the parser and sink see from raw stream output.
    ///
    /// `None` when [`should_forward`] drops it.
    pub fn forwarded(raw: &str, stream: StreamKind) -> Option<Self> {
        should_forward(raw).map(|text| Self::new(text, stream))
    }
}

/// Normalize a raw line and decide whether it reaches the parser and log sink.
///
/// Returns the trimmed text, or `None` for blank lines and lines wrapped in
/// parentheses (Unity's decorative diagnostics such as
/// `(Filename: ./Runtime/Export/Debug/Debug.bindings.h Line: 35)`).
pub fn should_forward(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        return None;
    }
    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_lines() {
        assert_eq!(should_forward(""), None);
        assert_eq!(should_forward("   \t\r"), None);
    }

    #[test]
    fn drops_parenthesized_lines() {
        assert_eq!(
            should_forward("(Filename: ./Runtime/Export/Debug/Debug.bindings.h Line: 35)"),
            None
        );
        assert_eq!(should_forward("  (x)  "), None);
    }

    #[test]
    fn keeps_lines_with_inner_parentheses() {
        assert_eq!(
            should_forward("World saved ( 597,4449ms )\r\n"),
            Some("World saved ( 597,4449ms )")
        );
        assert_eq!(should_forward("(unterminated"), Some("(unterminated"));
    }

    #[test]
    fn stream_kind_display() {
        assert_eq!(StreamKind::Stdout.to_string(), "stdout");
        assert_eq!(StreamKind::Stderr.to_string(), "stderr");
    }

    #[test]
    fn forwarded_line_keeps_stream_and_trimmed_text() {
        let line = LogLine::forwarded("  Game server connected\r\n", StreamKind::Stderr).unwrap();
        assert_eq!(line, LogLine::new("Game server connected", StreamKind::Stderr));
        assert!(LogLine::forwarded("(Filename: x Line: 1)", StreamKind::Stdout).is_none());
        assert!(LogLine::forwarded("   ", StreamKind::Stdout).is_none());
    }
}
