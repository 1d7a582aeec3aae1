//! Wires configuration, supervisor, ingestion and the status endpoint.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use valmon_axum::{AxumContext, StatusServerConfig};
use valmon_core::{LineParser, ServerConfig, ServerState, StateStore};
use valmon_runtime::{IngestPipeline, LaunchSpec, Supervisor, TracingLineSink, WorkerExit};

use crate::console::{run_console, spawn_stdin_reader};
use crate::error::CliError;
use crate::parser::Cli;

/// Run one supervised server session to completion.
pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let mut config = ServerConfig::load_or_create(&cli.config)?;
    cli.apply_overrides(&mut config);
    info!(config = %cli.config.display(), "Loaded server configuration");

    let store = StateStore::new(ServerState::from_config(&config));

    // Bind before launching so a port clash fails fast.
    let listener = valmon_axum::bind(&StatusServerConfig::from_server_config(&config)).await?;
    let server_shutdown = CancellationToken::new();
    let server = tokio::spawn(valmon_axum::serve(
        listener,
        AxumContext {
            store: store.clone(),
        },
        server_shutdown.clone(),
    ));

    let supervisor = Supervisor::new();
    let spec = LaunchSpec::from_config(&config);
    info!("Starting {} {}", spec.executable.display(), config.command_line());
    let mut process = match supervisor.launch(&spec) {
        Ok(process) => process,
        Err(e) => {
            server_shutdown.cancel();
            return Err(e.into());
        }
    };

    let pipeline = process.take_output().map(|(stdout, stderr)| {
        IngestPipeline::start(
            stdout,
            stderr,
            store.clone(),
            LineParser::new(),
            Arc::new(TracingLineSink),
        )
    });

    info!("Type 'stop' or 'q' to shut the server down; any other input shows the status");
    let interrupts = supervisor.gate().listen();
    let exit = run_console(
        &supervisor,
        &mut process,
        &store,
        config.grace_period(),
        spawn_stdin_reader(),
        interrupts,
    )
    .await;

    match exit {
        Ok(status) => info!(%status, "Game server exited"),
        Err(e) => error!(error = %e, "Lost track of the game server"),
    }

    if let Some(pipeline) = pipeline {
        for report in pipeline.shutdown().await {
            if let WorkerExit::Failed(e) = &report.exit {
                warn!(error = %e, "Log stream reader failed");
            }
            info!(
                stream = %report.stream,
                forwarded = report.lines_forwarded,
                dropped = report.lines_dropped,
                parse_errors = report.parse_errors,
                "Log stream closed"
            );
        }
    }

    server_shutdown.cancel();
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Status endpoint failed"),
        Err(e) => warn!(error = %e, "Status endpoint task panicked"),
    }

    if supervisor.gate().suppressed_count() > 0 {
        info!(
            suppressed = supervisor.gate().suppressed_count(),
            "Interrupts ignored while stopping"
        );
    }
    info!("Server shut down");
    Ok(())
}
