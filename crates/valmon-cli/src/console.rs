//! Operator console: reads commands from stdin while the server runs.

use std::io::{self, BufRead};
use std::process::ExitStatus;
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use valmon_core::StateStore;
use valmon_runtime::{GameProcess, GracefulTerminator, Supervisor};

/// What an operator line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// `stop` or `q`, any case.
    Stop,
    /// Anything else.
    ShowStatus,
}

impl OperatorCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case("stop") || input.eq_ignore_ascii_case("q") {
            Self::Stop
        } else {
            Self::ShowStatus
        }
    }
}

/// Forward stdin lines from a dedicated thread.
///
/// A blocking reader keeps the async runtime free to shut down while the
/// terminal is idle. The channel closes at end of input.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = thread::Builder::new()
        .name("operator-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Stopped reading operator input");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Operator input unavailable; use Ctrl+C to stop");
    }
    rx
}

pub fn log_status(store: &StateStore) {
    match store.snapshot().to_json_pretty() {
        Ok(json) => info!("Server status:\n{json}"),
        Err(e) => error!(error = %e, "Failed to render server status"),
    }
}

/// Serve operator commands until the game server exits.
///
/// `interrupts` carries admitted Ctrl+C events and is treated like `stop`.
/// A stop that times out arms escalation: the next stop kills the server.
pub async fn run_console<T: GracefulTerminator>(
    supervisor: &Supervisor<T>,
    process: &mut GameProcess,
    store: &StateStore,
    grace: Duration,
    mut input: mpsc::UnboundedReceiver<String>,
    mut interrupts: mpsc::UnboundedReceiver<()>,
) -> io::Result<ExitStatus> {
    let mut input_open = true;
    let mut interrupts_open = true;
    let mut escalate = false;

    loop {
        let command = tokio::select! {
            status = process.wait() => return status,
            line = input.recv(), if input_open => match line {
                Some(line) => OperatorCommand::parse(&line),
                None => {
                    debug!("Operator input closed");
                    input_open = false;
                    continue;
                }
            },
            signal = interrupts.recv(), if interrupts_open => match signal {
                Some(()) => {
                    info!("Interrupt received");
                    OperatorCommand::Stop
                }
                None => {
                    interrupts_open = false;
                    continue;
                }
            },
        };

        match command {
            OperatorCommand::ShowStatus => log_status(store),
            OperatorCommand::Stop if escalate => {
                warn!(pid = process.pid(), "Killing game server");
                if let Err(e) = process.force_kill().await {
                    error!(error = %e, "Failed to kill game server");
                }
            }
            OperatorCommand::Stop => {
                info!(pid = process.pid(), "Stopping game server");
                let outcome = supervisor.request_graceful_stop(process, grace).await;
                if outcome.is_exited() {
                    info!("{outcome}");
                } else {
                    warn!("{outcome}; enter stop again to kill it");
                    escalate = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_are_case_insensitive() {
        for word in ["stop", "STOP", " Stop ", "q", "Q"] {
            assert_eq!(OperatorCommand::parse(word), OperatorCommand::Stop, "{word}");
        }
    }

    #[test]
    fn anything_else_shows_status() {
        for word in ["", "status", "quit", "stopp", "qq"] {
            assert_eq!(
                OperatorCommand::parse(word),
                OperatorCommand::ShowStatus,
                "{word}"
            );
        }
    }

    #[cfg(unix)]
    mod unix {
        use tokio::io::{AsyncBufReadExt, BufReader};
        use valmon_runtime::LaunchSpec;

        use super::super::*;

        async fn launch_ready(supervisor: &Supervisor, script: &str) -> GameProcess {
            let spec = LaunchSpec::new("/bin/sh", ".", vec!["-c".to_string(), script.to_string()]);
            let mut process = supervisor.launch(&spec).unwrap();
            let (stdout, _stderr) = process.take_output().unwrap();
            let mut lines = BufReader::new(stdout).lines();
            assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("ready"));
            process
        }

        #[tokio::test]
        async fn stop_command_ends_console() {
            let supervisor = Supervisor::new();
            let mut process = launch_ready(&supervisor, "echo ready; exec sleep 30").await;
            let (input_tx, input) = mpsc::unbounded_channel();
            let (_interrupt_tx, interrupts) = mpsc::unbounded_channel();

            input_tx.send("status".to_string()).unwrap();
            input_tx.send("stop".to_string()).unwrap();

            let status = tokio::time::timeout(
                Duration::from_secs(10),
                run_console(
                    &supervisor,
                    &mut process,
                    &StateStore::default(),
                    Duration::from_secs(5),
                    input,
                    interrupts,
                ),
            )
            .await
            .unwrap()
            .unwrap();
            assert!(!status.success());
        }

        #[tokio::test]
        async fn second_stop_kills_stubborn_server() {
            let supervisor = Supervisor::new();
            let mut process =
                launch_ready(&supervisor, "trap '' INT; echo ready; while :; do sleep 1; done")
                    .await;
            let (input_tx, input) = mpsc::unbounded_channel();
            let (interrupt_tx, interrupts) = mpsc::unbounded_channel();

            interrupt_tx.send(()).unwrap();
            input_tx.send("q".to_string()).unwrap();

            let status = tokio::time::timeout(
                Duration::from_secs(10),
                run_console(
                    &supervisor,
                    &mut process,
                    &StateStore::default(),
                    Duration::from_millis(200),
                    input,
                    interrupts,
                ),
            )
            .await
            .unwrap()
            .unwrap();
            assert!(!status.success());
        }
    }
}
