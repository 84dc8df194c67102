//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::Path;

/// Handle the config command
pub fn handle_config(
    args: ConfigArgs,
    config: &Config,
    explicit_path: Option<&Path>,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Paths => handle_config_paths(explicit_path, output),
    }
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = render(config, args.format)?;
    output.write(&content)?;
    if !content.ends_with('\n') {
        output.writeln("")?;
    }
    Ok(())
}

/// Handle config paths subcommand
fn handle_config_paths(explicit_path: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    if let Some(path) = explicit_path {
        output.writeln(&format!("{} (explicit)", path.display()))?;
        return Ok(());
    }

    let mut found = false;
    for path in Config::default_config_paths() {
        let marker = if !found && path.exists() {
            found = true;
            " (active)"
        } else {
            ""
        };
        output.writeln(&format!("{}{}", path.display(), marker))?;
    }
    if !found {
        output.info("No configuration file found; using defaults")?;
    }
    Ok(())
}

fn render(config: &Config, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e))),
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as JSON: {}", e))),
        ConfigFormat::Yaml => serde_yaml::to_string(config)
            .map_err(|e| Error::config(format!("Failed to serialize as YAML: {}", e))),
    }
}
