//! Per-stream line reader (non-UTF8-safe).
//!
//! Unity builds can emit non-UTF8 bytes on stdout/stderr, and
//! `BufReader::lines()` would end the reader on the first one. Lines are read
//! as bytes and decoded lossily so ingestion survives odd output.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};
use valmon_core::{LineParser, LineSink, LogLine, StateStore, StreamKind};

use super::{IngestError, WorkerExit, WorkerReport};

/// What a worker needs besides its stream.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub store: StateStore,
    pub parser: LineParser,
    pub sink: Arc<dyn LineSink>,
}

pub(crate) async fn read_stream<R>(
    stream: R,
    kind: StreamKind,
    ctx: WorkerContext,
    cancel: CancellationToken,
) -> WorkerReport
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let mut report = WorkerReport::new(kind);

    report.exit = loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            () = cancel.cancelled() => break WorkerExit::Cancelled,
            read = reader.read_until(b'\n', &mut buf) => read,
        };

        match read {
            Ok(0) => break WorkerExit::StreamClosed,
            Ok(_) => {
                let raw = String::from_utf8_lossy(&buf);
                handle_line(&raw, kind, &ctx, &mut report);
            }
            Err(source) => {
                warn!(stream = %kind, error = %source, "Log stream reader exiting due to read error");
                break WorkerExit::Failed(IngestError::Read { stream: kind, source });
            }
        }
    };

    debug!(
        stream = %kind,
        exit = ?report.exit,
        forwarded = report.lines_forwarded,
        dropped = report.lines_dropped,
        "Log stream reader task exiting"
    );
    report
}

fn handle_line(raw: &str, kind: StreamKind, ctx: &WorkerContext, report: &mut WorkerReport) {
    let Some(line) = LogLine::forwarded(raw, kind) else {
        report.lines_dropped += 1;
        return;
    };
    report.lines_forwarded += 1;

    match ctx.parser.ingest(&ctx.store, &line.text) {
        Ok(Some(rule)) => trace!(stream = %kind, rule, "Applied log line"),
        Ok(None) => {}
        Err(e) => {
            report.parse_errors += 1;
            error!(stream = %kind, error = %e, line = %line.text, "Failed to apply log line");
        }
    }

    ctx.sink.append(&line);
}
