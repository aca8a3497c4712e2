//! Data directory layout for Regen.

use std::path::{Path, PathBuf};

/// File name of the JSON key-value backend.
pub const KV_FILE_NAME: &str = "used_images.json";

/// File name of the SQLite database.
pub const DATABASE_FILE_NAME: &str = "regen.db";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `REGEN_DATA_DIR` environment variable
/// 2. `~/.regen`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REGEN_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".regen");
    }

    // Last resort: current directory
    PathBuf::from(".regen")
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

pub fn kv_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(KV_FILE_NAME)
}

/// SQLite URL for the database inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}", data_dir.join(DATABASE_FILE_NAME).display())
}
