//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod config;
mod request;

pub use config::handle_config;
pub use request::handle_request;
