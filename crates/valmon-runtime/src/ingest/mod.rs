//! Log ingestion pipeline.
//!
//! One tokio task per output stream of the game server. Each task reads
//! lines in emission order, drops blank and parenthesized lines, applies the
//! rest to the shared [`StateStore`] and mirrors them to the [`LineSink`].
//! There is no ordering between the two streams.
//!
//! Workers end on end-of-input, on a read error, or when the pipeline is
//! cancelled (normally once the child has exited).

mod stream;

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use valmon_core::{LineParser, LineSink, StateStore, StreamKind};

use stream::{WorkerContext, read_stream};

/// Failure that ended a stream worker early.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Reading {stream} failed: {source}")]
    Read {
        stream: StreamKind,
        #[source]
        source: io::Error,
    },

    #[error("Ingestion worker for {stream} did not complete: {message}")]
    Worker { stream: StreamKind, message: String },
}

/// Why a stream worker stopped.
#[derive(Debug)]
pub enum WorkerExit {
    /// The child closed the stream. The normal ending.
    StreamClosed,
    /// The pipeline was cancelled.
    Cancelled,
    Failed(IngestError),
}

/// Counters reported by a finished stream worker.
#[derive(Debug)]
pub struct WorkerReport {
    pub stream: StreamKind,
    pub lines_forwarded: u64,
    pub lines_dropped: u64,
    pub parse_errors: u64,
    pub exit: WorkerExit,
}

impl WorkerReport {
    const fn new(stream: StreamKind) -> Self {
        Self {
            stream,
            lines_forwarded: 0,
            lines_dropped: 0,
            parse_errors: 0,
            exit: WorkerExit::StreamClosed,
        }
    }
}

/// Running set of stream workers sharing one cancellation token.
pub struct IngestPipeline {
    ctx: WorkerContext,
    cancel: CancellationToken,
    workers: Vec<(StreamKind, JoinHandle<WorkerReport>)>,
}

impl IngestPipeline {
    /// Pipeline with no workers yet.
    pub fn new(store: StateStore, parser: LineParser, sink: Arc<dyn LineSink>) -> Self {
        Self {
            ctx: WorkerContext {
                store,
                parser,
                sink,
            },
            cancel: CancellationToken::new(),
            workers: Vec::new(),
        }
    }

    /// Start workers for both output streams of the child.
    pub fn start<O, E>(
        stdout: O,
        stderr: E,
        store: StateStore,
        parser: LineParser,
        sink: Arc<dyn LineSink>,
    ) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        let mut pipeline = Self::new(store, parser, sink);
        pipeline.spawn_worker(stdout, StreamKind::Stdout);
        pipeline.spawn_worker(stderr, StreamKind::Stderr);
        pipeline
    }

    /// Start a worker for one stream.
    pub fn spawn_worker<R>(&mut self, stream: R, kind: StreamKind)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let ctx = self.ctx.clone();
        let cancel = self.cancel.child_token();
        let handle = tokio::spawn(read_stream(stream, kind, ctx, cancel));
        debug!(stream = %kind, "Started log stream reader");
        self.workers.push((kind, handle));
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for every worker to finish on its own.
    pub async fn join(self) -> Vec<WorkerReport> {
        let mut reports = Vec::with_capacity(self.workers.len());
        for (stream, handle) in self.workers {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(stream = %stream, error = %e, "Log stream reader task failed");
                    let mut report = WorkerReport::new(stream);
                    report.exit = WorkerExit::Failed(IngestError::Worker {
                        stream,
                        message: e.to_string(),
                    });
                    reports.push(report);
                }
            }
        }
        reports
    }

    /// Cancel every worker and wait for them.
    pub async fn shutdown(self) -> Vec<WorkerReport> {
        self.cancel();
        self.join().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use valmon_core::LogLine;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<LogLine>>,
    }

    impl LineSink for RecordingSink {
        fn append(&self, line: &LogLine) {
            self.lines.lock().unwrap().push(line.clone());
        }
    }

    #[tokio::test]
    async fn workers_end_on_eof_and_apply_lines() {
        let store = StateStore::default();
        let sink = Arc::new(RecordingSink::default());

        let stdout: &'static [u8] =
            b"Zonesystem Awake 374\n\n(Filename: Debug.bindings.h Line: 35)\nPlaced 1883 streams\r\n";
        let stderr: &'static [u8] = b"Game server connected";

        let pipeline = IngestPipeline::start(
            stdout,
            stderr,
            store.clone(),
            LineParser::new(),
            sink.clone(),
        );
        let reports = pipeline.join().await;

        assert_eq!(reports.len(), 2);
        assert!(
            reports
                .iter()
                .all(|r| matches!(r.exit, WorkerExit::StreamClosed))
        );
        let out = &reports[0];
        assert_eq!(out.stream, StreamKind::Stdout);
        assert_eq!(out.lines_forwarded, 2);
        assert_eq!(out.lines_dropped, 2);

        let state = store.snapshot();
        assert_eq!(state.zone_system, 374);
        assert_eq!(state.streams_placed, 1883);
        assert!(state.is_game_server_connected);

        let lines = sink.lines.lock().unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| !l.text.starts_with('(')));
        assert!(lines.contains(&LogLine::new("Game server connected", StreamKind::Stderr)));
    }

    #[tokio::test]
    async fn cancellation_stops_blocked_worker() {
        let (_writer, reader) = tokio::io::duplex(64);
        let mut pipeline = IngestPipeline::new(
            StateStore::default(),
            LineParser::new(),
            Arc::new(valmon_core::NoopLineSink),
        );
        pipeline.spawn_worker(reader, StreamKind::Stdout);

        let reports = pipeline.shutdown().await;
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].exit, WorkerExit::Cancelled));
    }

    #[tokio::test]
    async fn parse_errors_are_counted_not_fatal() {
        let store = StateStore::default();
        let stdout: &'static [u8] = b"Zonesystem Awake 99999999999\nDungeonDB Awake 4\n";
        let mut pipeline =
            IngestPipeline::new(store.clone(), LineParser::new(), Arc::new(valmon_core::NoopLineSink));
        pipeline.spawn_worker(stdout, StreamKind::Stdout);

        let reports = pipeline.join().await;
        assert_eq!(reports[0].parse_errors, 1);
        assert_eq!(store.snapshot().dungeon_db, 4);
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_end_worker() {
        let store = StateStore::default();
        let stdout: &'static [u8] = b"\xff\xfe garbage\nRivers:136\n";
        let mut pipeline =
            IngestPipeline::new(store.clone(), LineParser::new(), Arc::new(valmon_core::NoopLineSink));
        pipeline.spawn_worker(stdout, StreamKind::Stdout);

        pipeline.join().await;
        assert_eq!(store.snapshot().rivers, 136);
    }
}
