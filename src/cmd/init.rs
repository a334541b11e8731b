//! Data directory initialization: `taskboard init`.

use anyhow::{Context, Result};
use std::path::Path;

use taskboard::board::db::BoardDb;
use taskboard::config::{BoardConfig, CONFIG_FILE};

pub fn cmd_init(project_dir: &Path, db_path: Option<&Path>) -> Result<()> {
    let data_dir = super::data_dir(project_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    let config_path = data_dir.join(CONFIG_FILE);
    let config = if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        BoardConfig::load(&config_path)?
    } else {
        let config = BoardConfig::default();
        config.save(&config_path)?;
        println!("Created {}", config_path.display());
        config
    };

    let db_path = super::resolve_db_path(project_dir, db_path, &config);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    BoardDb::new(&db_path)?;
    println!("Task board database initialized at {}", db_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Run `taskboard project add --key KEY --name NAME` to create a project");
    println!("  2. Run `taskboard serve` to start the server");

    Ok(())
}
