//! Configuration view and validation commands: `taskboard config`.

use anyhow::Result;
use std::path::Path;

use taskboard::config::{BoardConfig, CONFIG_FILE};

use super::super::ConfigCommands;

fn mask(secret: Option<&String>) -> &'static str {
    if secret.is_some() { "\"********\"" } else { "(unset)" }
}

pub fn cmd_config(project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    let data_dir = super::data_dir(project_dir);
    let config_path = data_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found at {}; using defaults.", CONFIG_FILE, config_path.display());
            }
            println!();

            // Effective values include .env and environment overrides.
            let config = BoardConfig::resolve(&data_dir)?;
            println!("[server]");
            println!("  host = \"{}\"", config.server.host);
            println!("  port = {}", config.server.port);
            println!("  db_path = \"{}\"", config.server.db_path.display());
            println!();
            println!("[github]");
            println!("  api_base = \"{}\"", config.github.api_base);
            match &config.github.client_id {
                Some(id) => println!("  client_id = \"{}\"", id),
                None => println!("  client_id = (unset)"),
            }
            println!("  client_secret = {}", mask(config.github.client_secret.as_ref()));
            println!("  user_agent = \"{}\"", config.github.user_agent);
            println!("  timeout_secs = {}", config.github.timeout_secs);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            let config = BoardConfig::resolve(&data_dir)?;
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
        }
    }

    Ok(())
}
