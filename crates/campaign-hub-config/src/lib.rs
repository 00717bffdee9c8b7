// crates/campaign-hub-config/src/lib.rs
// ============================================================================
// Module: Campaign Hub Configuration
// Description: Strict TOML configuration loading and validation.
// Purpose: Provide fail-closed config parsing for every deployable binary.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits and
//! fail-closed validation. Secrets (mail password, payment gateway
//! credentials) may be supplied through environment variables so they stay
//! out of the config file on shared hosts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::CONFIG_ENV_VAR;
pub use config::CampaignConfig;
pub use config::ConfigError;
pub use config::ContentConfig;
pub use config::DatabaseConfig;
pub use config::JournalMode;
pub use config::MailConfig;
pub use config::MpesaConfig;
pub use config::ServerConfig;
pub use config::SyncMode;
