mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./anisearch.toml",
        "~/.config/anisearch/config.toml",
        "/etc/anisearch/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let base_url = config.catalog.base_url.trim();
    if base_url.is_empty() {
        anyhow::bail!("catalog.base_url cannot be empty");
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        anyhow::bail!("catalog.base_url must be an http(s) URL: {}", base_url);
    }

    if config.catalog.request_timeout_secs == 0 {
        anyhow::bail!("catalog.request_timeout_secs cannot be 0");
    }

    if config.cache.dir.as_os_str().is_empty() {
        anyhow::bail!("cache.dir cannot be empty");
    }

    Ok(())
}
