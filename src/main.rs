// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, run one command.
// - Every failure ends up here and is reported once, with an exit code
//   chosen by the error kind.

use std::io;
use std::process;

use clap::Parser;
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use sonarr_cli::cli::Cli;
use sonarr_cli::commands;
use sonarr_cli::config::Config;
use sonarr_cli::ui::TerminalPrompter;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{} {err}", "error:".red().bold());
        process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> sonarr_cli::Result<()> {
    let config = cli.config()?;
    init_logging(&config);

    let mut prompter = TerminalPrompter;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::execute(cli.command, &config, &mut prompter, &mut out)
}

// RUST_LOG takes precedence over --verbose.
fn init_logging(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
