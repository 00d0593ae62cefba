//! Configuration persistence using toml_edit to preserve formatting and comments.

use alkaline_cloudconvert::Credential;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

/// Per-user config file (`~/.config/alkaline/config.toml`).
pub fn user_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.config/alkaline/config.toml").as_ref())
}

/// Store the API key in `api.api_key`, leaving the rest of the file untouched.
///
/// The file and its parent directory are created when missing.
pub fn save_api_key(path: &Path, api_key: &str) -> Result<()> {
    let credential = Credential::new(api_key)?;

    let content = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if !doc.contains_key("api") {
        doc["api"] = toml_edit::table();
    }
    let api = doc["api"]
        .as_table_like_mut()
        .with_context(|| format!("`api` in {:?} is not a table", path))?;
    api.insert("api_key", toml_edit::value(credential.expose()));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
