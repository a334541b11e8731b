//! HTTP server command: `taskboard serve`.

use anyhow::Result;
use std::path::{Path, PathBuf};

use taskboard::board::server::{ServerConfig, start_server};
use taskboard::config::BoardConfig;

pub struct ServeArgs {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub db_path: Option<PathBuf>,
    pub dev: bool,
    pub open: bool,
}

pub async fn cmd_serve(project_dir: &Path, args: ServeArgs) -> Result<()> {
    let config = BoardConfig::resolve(&super::data_dir(project_dir))?;
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    let db_path = super::resolve_db_path(project_dir, args.db_path.as_deref(), &config);
    start_server(ServerConfig {
        host: args.host.unwrap_or(config.server.host),
        port: args.port.unwrap_or(config.server.port),
        db_path,
        // No browser inside dev containers.
        open_browser: args.open && !args.dev,
        dev_mode: args.dev,
        github: config.github,
    })
    .await
}
