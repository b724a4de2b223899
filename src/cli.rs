// Command line definitions: global flags with environment fallbacks and one
// subcommand per user action, converted into a `Config` for the command layer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::error::Result;

/// Use Sonarr from the terminal.
#[derive(Parser, Debug)]
#[command(name = "sonarr", version, about, long_about = None)]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the saved credentials (defaults to ~/.sonarr-cli).
    #[arg(long, global = true, env = "SONARR_CLI_HOME")]
    pub store_dir: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "SONARR_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Prompt for the url and api key of your Sonarr instance and save them.
    Save,

    /// Print your saved Sonarr credentials.
    Credentials,

    /// Search for a series by title.
    Search {
        /// Title to look for; multiple words are joined with spaces.
        title: Vec<String>,
    },

    /// Display series info.
    Show {
        /// TVDB id of the series.
        tvdb_id: String,
    },

    /// Add a series to Sonarr.
    Add {
        /// TVDB id of the series.
        tvdb_id: String,
    },

    /// Remove the lock file left behind if a previous run crashed.
    Unlock,
}

impl Cli {
    pub fn config(&self) -> Result<Config> {
        Config::new(self.store_dir.clone(), self.timeout, self.verbose)
    }
}
