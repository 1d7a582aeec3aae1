//! Process runtime and OS-level concerns for valmon.
//!
//! - [`process`] - launching the game server and the graceful stop protocol
//! - [`ingest`] - per-stream readers feeding the parser and the log sink
//! - [`sink`] - tracing-backed implementation of the `LineSink` port

#![deny(unsafe_code)]

pub mod ingest;
pub mod process;
pub mod sink;

pub use ingest::{IngestError, IngestPipeline, WorkerExit, WorkerReport};
pub use process::{
    DEFAULT_GRACE_PERIOD, GameProcess, GracefulTerminator, InterruptGate, LaunchSpec,
    PlatformTerminator, StopOutcome, Supervisor,
};
pub use sink::TracingLineSink;
