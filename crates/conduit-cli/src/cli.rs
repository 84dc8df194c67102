//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use url::Url;

/// Conduit CLI - send one HTTP request through the adapter stage
///
/// Performs a single exchange, prints the response and maps transport
/// failures to typed errors with distinct exit codes.
#[derive(Parser, Debug)]
#[command(
    name = "conduit",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CONDUIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one HTTP request and print the response
    Request(RequestArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the request command
#[derive(Parser, Debug)]
pub struct RequestArgs {
    /// Target URL
    #[arg(value_name = "URL")]
    pub url: Url,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(short, long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// Read the request body from a file ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Timeout in seconds applied to connect, read and write
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Connect timeout in seconds; only honoured together with --timeout
    #[arg(long, value_name = "SECS")]
    pub open_timeout: Option<f64>,

    /// Proxy URI
    #[arg(long, value_name = "URI")]
    pub proxy: Option<Url>,

    /// Proxy user
    #[arg(long, requires = "proxy")]
    pub proxy_user: Option<String>,

    /// Proxy password
    #[arg(long, requires = "proxy_user", env = "CONDUIT_PROXY_PASSWORD", hide_env_values = true)]
    pub proxy_password: Option<String>,

    /// Skip peer certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// File of trusted CA certificates
    #[arg(long, value_name = "PATH")]
    pub cacert: Option<PathBuf>,

    /// Directory of trusted CA certificates
    #[arg(long, value_name = "DIR")]
    pub capath: Option<PathBuf>,

    /// Client certificate file (PEM)
    #[arg(long, value_name = "PATH", requires = "key")]
    pub cert: Option<PathBuf>,

    /// Client private key file (PEM)
    #[arg(long, value_name = "PATH", requires = "cert")]
    pub key: Option<PathBuf>,

    /// Exact TLS version (1.0, 1.1, 1.2, 1.3)
    #[arg(long, value_name = "VERSION")]
    pub tls_version: Option<String>,

    /// Lowest TLS version to accept
    #[arg(long, value_name = "VERSION")]
    pub tls_min: Option<String>,

    /// Highest TLS version to offer
    #[arg(long, value_name = "VERSION")]
    pub tls_max: Option<String>,

    /// Write the body to stdout through the download callback
    #[arg(long)]
    pub stream: bool,

    /// Include response headers in human output
    #[arg(short, long)]
    pub include: bool,

    /// Treat 4xx/5xx responses as errors
    #[arg(short, long)]
    pub fail: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// List the locations searched for a configuration file
    Paths,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
