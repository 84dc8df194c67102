//! Conduit CLI - send one HTTP request through the adapter stage
//!
//! This is the main entry point for the Conduit CLI application. It parses
//! arguments, loads configuration, sets up logging and dispatches to the
//! command handlers.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::LoggingConfig;
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    let result = Config::load_with_file(cli.config.as_deref()).and_then(|config| {
        if let Err(e) = init_logging(&cli, &config) {
            eprintln!("Failed to initialize logging: {}", e);
        }
        run(cli, config)
    });

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: Config) -> Result<()> {
    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::debug!(verbosity = cli.verbosity_level(), "Executing command");

    match cli.command {
        Commands::Request(args) => handlers::handle_request(args, &config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, &config, cli.config.as_deref(), &mut output),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    logging_config.merge_with_settings(&config.logging, verbosity)?;
    logging_config.merge_with_env()?;

    if cli.quiet {
        logging_config.level = "error".to_string();
    }
    logging_config.ansi = !cli.no_color;

    logging::init_logging(logging_config)
}
