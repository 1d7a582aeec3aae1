//! valmon command-line supervisor.
//!
//! `main.rs` is the composition root; [`app::run`] drives one session.

#![deny(unsafe_code)]

pub mod app;
pub mod console;
pub mod error;
pub mod logging;
pub mod parser;

pub use app::run;
pub use console::OperatorCommand;
pub use error::CliError;
pub use parser::Cli;
