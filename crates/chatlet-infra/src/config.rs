//! Configuration loader for Chatlet.
//!
//! Reads `config.toml` from the data directory (`~/.chatlet/` in production)
//! and deserializes it into [`DemoConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use chatlet_types::config::DemoConfig;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`DemoConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and
///   returns the default.
/// - If the file exists and parses successfully, returns the parsed config
///   (missing fields fall back to their per-field defaults).
pub async fn load_config(data_dir: &Path) -> DemoConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return DemoConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return DemoConfig::default();
        }
    };

    match toml::from_str::<DemoConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            DemoConfig::default()
        }
    }
}
