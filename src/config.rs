// src/config.rs

//! Configuration loading.
//!
//! Settings come from an optional TOML file, then the process environment
//! overlays it. The result is validated before anything uses it.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load configuration from `path` (if given and present), overlay the
/// environment and validate.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`] but with an explicit variable lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) if path.exists() => {
            log::info!("Loading config from {}", path.display());
            Config::load(path)?
        }
        Some(path) => {
            log::warn!("Config file {} not found, using defaults", path.display());
            Config::default()
        }
        None => Config::default(),
    };

    config.apply_overrides(lookup);
    config.validate()?;
    Ok(config)
}
