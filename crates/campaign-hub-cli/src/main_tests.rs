// crates/campaign-hub-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Tests
// Description: Argument parsing and operator command tests.
// Purpose: Keep the dispatcher and admin provisioning flow honest.
// Dependencies: campaign-hub-config, campaign-hub-store-sqlite, clap, tempfile
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]

use campaign_hub_config::CampaignConfig;
use campaign_hub_core::password;
use campaign_hub_store_sqlite::CampaignDb;
use clap::Parser;
use tempfile::TempDir;

use crate::Cli;
use crate::CliError;
use crate::Commands;
use crate::command_create_admin;
use crate::command_init_db;

/// Configuration pointing at a fresh temporary database.
fn temp_config() -> (TempDir, CampaignConfig) {
    let dir = TempDir::new().expect("tempdir");
    let mut config = CampaignConfig::default();
    config.database.path = dir.path().join("campaign.db");
    (dir, config)
}

#[test]
fn parses_serve_with_explicit_config_path() {
    let cli = Cli::try_parse_from(["campaign-hub", "serve", "--config", "custom.toml"])
        .expect("parse serve");
    assert!(matches!(cli.command, Commands::Serve));
    assert_eq!(cli.config.as_deref().map(|p| p.display().to_string()), Some("custom.toml".to_string()));
}

#[test]
fn parses_create_admin_with_default_role() {
    let cli = Cli::try_parse_from([
        "campaign-hub",
        "create-admin",
        "--username",
        "chair",
        "--email",
        "chair@example.com",
        "--password",
        "long-enough-secret",
    ])
    .expect("parse create-admin");
    match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            role,
            ..
        } => {
            assert_eq!(username, "chair");
            assert_eq!(email, "chair@example.com");
            assert_eq!(role, "admin");
        }
        Commands::Serve | Commands::InitDb => panic!("wrong command parsed"),
    }
}

#[test]
fn rejects_missing_subcommand() {
    assert!(Cli::try_parse_from(["campaign-hub"]).is_err());
}

#[test]
fn init_db_creates_the_database_file() {
    let (_dir, config) = temp_config();
    command_init_db(&config).expect("init db");
    assert!(config.database.path.exists());
}

#[test]
fn create_admin_stores_a_verifiable_credential() {
    let (_dir, config) = temp_config();
    command_create_admin(&config, "chair", "Chair@Example.com", "long-enough-secret", "admin")
        .expect("create admin");

    let db = CampaignDb::open(&config.database).expect("open store");
    let admin = db.find_admin("chair").expect("query").expect("admin exists");
    assert_eq!(admin.email, "chair@example.com");
    assert!(password::verify_password("long-enough-secret", &admin.salt, &admin.password_hash));
}

#[test]
fn create_admin_rejects_bad_input() {
    let (_dir, config) = temp_config();
    assert!(matches!(
        command_create_admin(&config, "  ", "chair@example.com", "long-enough-secret", "admin"),
        Err(CliError::Input(_))
    ));
    assert!(matches!(
        command_create_admin(&config, "chair", "not-an-email", "long-enough-secret", "admin"),
        Err(CliError::Input(_))
    ));
    assert!(matches!(
        command_create_admin(&config, "chair", "chair@example.com", "short", "admin"),
        Err(CliError::Input(_))
    ));
}
