//! Config loading, environment overrides and key persistence.

mod common;

use alkaline::config::{self, persist, API_TOKEN_ENV};
use serial_test::serial;

#[test]
#[serial]
fn env_token_overrides_file_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config(dir.path(), "http://127.0.0.1:9/v2", "file-key");

    std::env::set_var(API_TOKEN_ENV, "  env-key ");
    let config = config::load_config(&path);
    std::env::remove_var(API_TOKEN_ENV);

    let config = config.unwrap();
    assert_eq!(config.api.api_key, "env-key");
    assert_eq!(config.credential().unwrap().expose(), "env-key");
}

#[test]
#[serial]
fn blank_env_token_keeps_file_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config(dir.path(), "http://127.0.0.1:9/v2", "file-key");

    std::env::set_var(API_TOKEN_ENV, "   ");
    let config = config::load_config(&path);
    std::env::remove_var(API_TOKEN_ENV);

    assert_eq!(config.unwrap().api.api_key, "file-key");
}

#[test]
#[serial]
fn missing_key_yields_client_without_credential() {
    std::env::remove_var(API_TOKEN_ENV);
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config(dir.path(), "http://127.0.0.1:9/v2", "");

    let config = config::load_config(&path).unwrap();
    assert!(config.credential().is_none());

    let client = config::build_client(&config).unwrap();
    assert!(!client.has_credential());
}

#[test]
#[serial]
fn saved_key_is_picked_up_on_next_load() {
    std::env::remove_var(API_TOKEN_ENV);
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config(dir.path(), "http://127.0.0.1:9/v2", "");

    persist::save_api_key(&path, "fresh-key").unwrap();

    let config = config::load_config(&path).unwrap();
    assert_eq!(config.api.api_key, "fresh-key");
    assert_eq!(config.api.base_url, "http://127.0.0.1:9/v2");
    assert_eq!(config.polling.interval_ms, 10);
}

#[test]
fn explicit_path_wins_for_writes() {
    let path = std::path::Path::new("/tmp/custom/alkaline.toml");
    assert_eq!(config::writable_config_path(Some(path)), path);
}
