// crates/campaign-hub-config/tests/config_validation.rs
// ============================================================================
// Module: Configuration Tests
// Description: Loading, parsing, and validation tests for campaign config.
// Purpose: Keep config loading fail-closed under malformed input.
// Dependencies: campaign-hub-config, tempfile
// ============================================================================

//! ## Overview
//! Loading, parsing, and validation tests for campaign configuration,
//! ensuring config loading stays fail-closed under malformed input.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]

use std::fs;
use std::path::PathBuf;

use campaign_hub_config::CampaignConfig;
use campaign_hub_config::ConfigError;
use campaign_hub_config::JournalMode;
use tempfile::TempDir;

/// Writes a config file into a temp directory and returns its path.
fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("campaign-hub.toml");
    fs::write(&path, contents).expect("write config");
    (dir, path)
}

#[test]
fn defaults_are_valid_and_local_only() {
    let config = CampaignConfig::default();
    config.validate().expect("defaults validate");
    assert_eq!(config.server.bind, "127.0.0.1:5000");
    assert!(!config.mail.enabled);
    assert!(!config.mpesa.enabled);
    assert!(config.content.seed_articles);
}

#[test]
fn explicit_missing_path_fails_closed() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("nope.toml");
    let result = CampaignConfig::load(Some(&missing));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn file_values_override_defaults() {
    let (_dir, path) = write_config(
        r#"
        [server]
        bind = "127.0.0.1:8080"
        cors_origins = ["https://campaign.example"]

        [database]
        path = "data/site.db"
        journal_mode = "wal"

        [content]
        seed_articles = false
        "#,
    );
    let config = CampaignConfig::load(Some(&path)).expect("load");
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.server.cors_origins, vec!["https://campaign.example".to_string()]);
    assert_eq!(config.database.path, PathBuf::from("data/site.db"));
    assert_eq!(config.database.journal_mode, JournalMode::Wal);
    assert!(!config.content.seed_articles);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let (_dir, path) = write_config("[server\nbind = ");
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
}

#[test]
fn invalid_bind_address_is_rejected() {
    let (_dir, path) = write_config(
        r#"
        [server]
        bind = "not-an-address"
        "#,
    );
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn cors_origins_must_carry_a_scheme() {
    let (_dir, path) = write_config(
        r#"
        [server]
        cors_origins = ["campaign.example"]
        "#,
    );
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn zero_body_limit_is_rejected() {
    let (_dir, path) = write_config(
        r#"
        [server]
        max_body_bytes = 0
        "#,
    );
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn enabled_mail_requires_delivery_fields() {
    let (_dir, path) = write_config(
        r#"
        [mail]
        enabled = true
        smtp_host = "smtp.example.com"
        "#,
    );
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn enabled_mpesa_requires_https_urls() {
    let (_dir, path) = write_config(
        r#"
        [mpesa]
        enabled = true
        consumer_key = "key"
        consumer_secret = "secret"
        short_code = "174379"
        passkey = "passkey"
        callback_url = "http://insecure.example/callback"
        "#,
    );
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn enabled_mpesa_with_full_settings_loads() {
    let (_dir, path) = write_config(
        r#"
        [mpesa]
        enabled = true
        consumer_key = "key"
        consumer_secret = "secret"
        short_code = "174379"
        passkey = "passkey"
        callback_url = "https://campaign.example/api/mpesa/callback"
        "#,
    );
    let config = CampaignConfig::load(Some(&path)).expect("load");
    assert!(config.mpesa.enabled);
    assert_eq!(config.mpesa.base_url, "https://sandbox.safaricom.co.ke");
}

#[test]
fn unknown_config_keys_are_rejected() {
    let (_dir, path) = write_config(
        r#"
        [mail]
        enabled = false
        pasword = "oops"
        "#,
    );
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
    let (_dir, path) = write_config(
        r#"
        [sever]
        bind = "127.0.0.1:8080"
        "#,
    );
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
}

#[test]
fn oversized_config_files_are_rejected() {
    let padding = format!("# {}\n", "x".repeat(512)).repeat(600);
    let (_dir, path) = write_config(&padding);
    assert!(matches!(CampaignConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}
