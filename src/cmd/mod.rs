//! CLI command implementations.
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `serve`   | `Serve`          |
//! | `init`    | `Init`           |
//! | `project` | `Project`        |
//! | `config`  | `Config`         |

pub mod config;
pub mod init;
pub mod project;
pub mod serve;

use std::path::{Path, PathBuf};

use taskboard::config::{BoardConfig, DATA_DIR};

pub use config::cmd_config;
pub use init::cmd_init;
pub use project::cmd_project;
pub use serve::{ServeArgs, cmd_serve};

pub fn data_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(DATA_DIR)
}

/// CLI flag wins over the config file. Relative paths are under `project_dir`.
pub fn resolve_db_path(project_dir: &Path, flag: Option<&Path>, config: &BoardConfig) -> PathBuf {
    let path = flag.unwrap_or(config.server.db_path.as_path());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}
