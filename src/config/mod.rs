pub mod persist;
mod types;

pub use types::*;

use alkaline_cloudconvert::CloudConvertClient;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `api.api_key`.
pub const API_TOKEN_ENV: &str = "CLOUDCONVERT_API_TOKEN";

/// Locations searched, in order, when no config path is given.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["./alkaline.toml", "~/.config/alkaline/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    if let Some(path) = find_config() {
        return load_config(&path);
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

/// First existing file among [`DEFAULT_CONFIG_PATHS`].
pub fn find_config() -> Option<PathBuf> {
    DEFAULT_CONFIG_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

/// Path `set-key` writes to when no config path is given: the first existing
/// default location, or the per-user config file.
pub fn writable_config_path(custom_path: Option<&Path>) -> PathBuf {
    custom_path
        .map(Path::to_path_buf)
        .or_else(find_config)
        .unwrap_or_else(persist::user_config_path)
}

/// Build a CloudConvert client from the configuration.
pub fn build_client(config: &Config) -> Result<CloudConvertClient> {
    CloudConvertClient::with_options(config.credential(), config.client_options())
        .context("Failed to create CloudConvert client")
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(token) = std::env::var(API_TOKEN_ENV) {
        if !token.trim().is_empty() {
            tracing::debug!("Using API key from {}", API_TOKEN_ENV);
            config.api.api_key = token.trim().to_string();
        }
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    reqwest::Url::parse(&config.api.base_url)
        .with_context(|| format!("Invalid api.base_url: {}", config.api.base_url))?;

    if config.api.request_timeout_secs == 0 {
        anyhow::bail!("api.request_timeout_secs cannot be 0");
    }

    if config.polling.interval_ms == 0 {
        anyhow::bail!("polling.interval_ms cannot be 0");
    }
    if config.polling.max_attempts == 0 {
        anyhow::bail!("polling.max_attempts cannot be 0");
    }
    if config.polling.timeout_secs == 0 {
        anyhow::bail!("polling.timeout_secs cannot be 0");
    }

    if let Some(ref dir) = config.output.directory {
        if !dir.exists() {
            tracing::warn!("Output directory does not exist and will be created: {:?}", dir);
        }
    }

    Ok(())
}
