use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coolride_core::CoolRideConfig;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "coolride.toml";

/// Reads the TOML configuration, or the built-in defaults when no file is
/// named and the default file does not exist.
pub fn load_config(path: Option<&Path>) -> Result<CoolRideConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                tracing::debug!("No {DEFAULT_CONFIG_FILE}, using defaults");
                return Ok(CoolRideConfig::default());
            }
            default
        }
    };

    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: CoolRideConfig = toml::from_str(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    tracing::info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
