// Library root
// -----------
// This crate exposes the pieces the `sonarr` binary is built from, so each
// can be tested on its own.
//
// Module responsibilities:
// - `endpoint`: joins the saved base URL with API paths.
// - `store`: the locked on-disk key/value store for secrets.
// - `credentials`: the Sonarr URL and API key kept in that store.
// - `api`: blocking HTTP client for the Sonarr REST API.
// - `ui`: terminal prompts and progress spinner.
// - `commands`: the user-facing actions built from the above.
// - `cli` / `config`: argument parsing and the resulting configuration.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod store;
pub mod ui;

pub use error::{Error, Result};
