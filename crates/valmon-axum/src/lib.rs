//! Axum adapter serving the live server snapshot over HTTP.
//!
//! `GET /valheim/status` returns the status document as JSON;
//! `GET /health` answers `OK`.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod handlers;
pub mod routes;
pub mod state;

pub use bootstrap::{StatusServerConfig, bind, serve};
pub use routes::{STATUS_PATH, create_router};
pub use state::{AppState, AxumContext};
