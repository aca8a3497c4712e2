//! Configuration loader for Regen.
//!
//! Reads `config.toml` from the data directory (`~/.regen/` in production)
//! and deserializes it into [`RegenConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed, then applies environment overrides.

use std::path::Path;

use regen_types::config::RegenConfig;

use crate::filesystem::config_path;

/// Environment switch for image generation. Only `"false"` disables it.
pub const ENABLE_GENERATION_ENV: &str = "ENABLE_AI_IMAGE_GENERATION";

/// Load configuration from `{data_dir}/config.toml` plus the environment.
///
/// - If the file does not exist, starts from [`RegenConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and uses the default.
/// - Environment overrides are applied last.
pub async fn load_config(data_dir: &Path) -> RegenConfig {
    let mut config = load_file_config(data_dir).await;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config
}

async fn load_file_config(data_dir: &Path) -> RegenConfig {
    let config_path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return RegenConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return RegenConfig::default();
        }
    };

    match toml::from_str::<RegenConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            RegenConfig::default()
        }
    }
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut RegenConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENABLE_GENERATION_ENV) {
        config.image.enable_generation = !value.trim().eq_ignore_ascii_case("false");
        tracing::debug!(
            enable_generation = config.image.enable_generation,
            "Applied {ENABLE_GENERATION_ENV}"
        );
    }
}
