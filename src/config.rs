// Runtime configuration, built once from the command line in `main` and
// handed to the command layer.

use std::path::PathBuf;
use std::time::Duration;

use crate::api::ClientOptions;
use crate::error::{Error, Result};

/// Directory under the user's home that holds the data store.
pub const STORE_DIR_NAME: &str = ".sonarr-cli";

/// Per-request timeout applied to every HTTP verb.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_dir: PathBuf,
    pub timeout: Duration,
    pub verbose: bool,
}

impl Config {
    pub fn new(store_dir: Option<PathBuf>, timeout_secs: u64, verbose: bool) -> Result<Self> {
        if timeout_secs == 0 {
            return Err(Error::validation("timeout must be at least one second"));
        }
        let store_dir = match store_dir {
            Some(dir) => dir,
            None => default_store_dir()?,
        };
        Ok(Self {
            store_dir,
            timeout: Duration::from_secs(timeout_secs),
            verbose,
        })
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.timeout,
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "sonarr_cli=debug"
        } else {
            "sonarr_cli=warn"
        }
    }
}

/// `~/.sonarr-cli`
pub fn default_store_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(STORE_DIR_NAME))
        .ok_or_else(|| {
            Error::io(
                "failed to locate home directory",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory"),
            )
        })
}
