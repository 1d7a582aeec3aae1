//! CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use valmon_cli::{Cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let _guard = match logging::init_tracing(&cli.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging to file disabled: {e:#}");
            let _ = tracing_subscriber::fmt().compact().try_init();
            None
        }
    };

    match valmon_cli::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
