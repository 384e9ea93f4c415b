pub mod init;
mod schema;
mod validation;

pub use schema::{expand_url, Config, SourceUrls, WeekRange, YearRange};
pub use validation::{request_delay, validate_config};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/cfb-buoyancy/)
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("cfb-buoyancy"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.config/cfb-buoyancy",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Get the default config file path (~/.config/cfb-buoyancy/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path and
///   falls back to built-in defaults when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}
