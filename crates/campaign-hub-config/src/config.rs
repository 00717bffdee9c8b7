// crates/campaign-hub-config/src/config.rs
// ============================================================================
// Module: Campaign Configuration
// Description: Configuration loading and validation for the campaign backend.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits. Missing
//! or invalid configuration fails closed. Secrets can be overridden from the
//! environment after parsing so credential values never need to live in the
//! config file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "campaign-hub.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CAMPAIGN_HUB_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;
/// Maximum number of CORS origins.
const MAX_CORS_ORIGINS: usize = 16;
/// Maximum request body size the server will accept.
const MAX_BODY_BYTES_CEILING: usize = 1024 * 1024;
/// Default request body limit in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Default SQLite busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default SMTP submission port.
const DEFAULT_SMTP_PORT: u16 = 587;
/// Minimum payment client connect timeout in milliseconds.
const MIN_MPESA_CONNECT_TIMEOUT_MS: u64 = 100;
/// Maximum payment client connect timeout in milliseconds.
const MAX_MPESA_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Minimum payment client request timeout in milliseconds.
const MIN_MPESA_REQUEST_TIMEOUT_MS: u64 = 500;
/// Maximum payment client request timeout in milliseconds.
const MAX_MPESA_REQUEST_TIMEOUT_MS: u64 = 60_000;
/// Environment override for the SMTP username.
const MAIL_USERNAME_ENV: &str = "MAIL_USERNAME";
/// Environment override for the SMTP password.
const MAIL_PASSWORD_ENV: &str = "MAIL_PASSWORD";
/// Environment override for the payment consumer key.
const MPESA_KEY_ENV: &str = "MPESA_CONSUMER_KEY";
/// Environment override for the payment consumer secret.
const MPESA_SECRET_ENV: &str = "MPESA_CONSUMER_SECRET";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config content failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level campaign backend configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// SQLite database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Outbound mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Mobile-money payment gateway configuration.
    #[serde(default)]
    pub mpesa: MpesaConfig,
    /// Content seeding configuration.
    #[serde(default)]
    pub content: ContentConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address, e.g. `127.0.0.1:5000`.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allowed CORS origins for the public site.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: Vec::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// SQLite journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl JournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// SQLite sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// SQLite database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Journal mode.
    #[serde(default)]
    pub journal_mode: JournalMode,
    /// Sync mode.
    #[serde(default)]
    pub sync_mode: SyncMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
            sync_mode: SyncMode::default(),
        }
    }
}

/// Outbound mail configuration.
///
/// # Invariants
/// - When `enabled`, the SMTP host, username, password, sender, and admin
///   address must all be non-empty after env overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    /// True when real SMTP delivery is enabled; false logs sends instead.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP submission port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username (env override `MAIL_USERNAME`).
    #[serde(default)]
    pub username: String,
    /// SMTP password (env override `MAIL_PASSWORD`).
    #[serde(default)]
    pub password: String,
    /// Default sender address.
    #[serde(default)]
    pub sender: String,
    /// Address receiving admin notifications.
    #[serde(default)]
    pub admin_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            sender: String::new(),
            admin_address: String::new(),
        }
    }
}

/// Mobile-money payment gateway configuration.
///
/// # Invariants
/// - When `enabled`, credentials, short code, passkey, base URL, and callback
///   URL must all be non-empty after env overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MpesaConfig {
    /// True when payment initiation is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// OAuth consumer key (env override `MPESA_CONSUMER_KEY`).
    #[serde(default)]
    pub consumer_key: String,
    /// OAuth consumer secret (env override `MPESA_CONSUMER_SECRET`).
    #[serde(default)]
    pub consumer_secret: String,
    /// Business short code receiving payments.
    #[serde(default)]
    pub short_code: String,
    /// STK push passkey issued by the gateway.
    #[serde(default)]
    pub passkey: String,
    /// Gateway base URL (sandbox or production).
    #[serde(default = "default_mpesa_base_url")]
    pub base_url: String,
    /// Publicly reachable callback URL for payment results.
    #[serde(default)]
    pub callback_url: String,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_mpesa_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_mpesa_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for MpesaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            consumer_key: String::new(),
            consumer_secret: String::new(),
            short_code: String::new(),
            passkey: String::new(),
            base_url: default_mpesa_base_url(),
            callback_url: String::new(),
            connect_timeout_ms: default_mpesa_connect_timeout_ms(),
            request_timeout_ms: default_mpesa_request_timeout_ms(),
        }
    }
}

/// Content seeding configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// True when built-in articles are seeded into an empty database.
    #[serde(default = "default_seed_articles")]
    pub seed_articles: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            seed_articles: default_seed_articles(),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default bind address.
fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

/// Returns the default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default database path.
fn default_database_path() -> PathBuf {
    PathBuf::from("campaign-hub.db")
}

/// Returns the default SQLite busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default SMTP submission port.
const fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

/// Returns the default payment gateway base URL (sandbox).
fn default_mpesa_base_url() -> String {
    "https://sandbox.safaricom.co.ke".to_string()
}

/// Returns the default payment connect timeout.
const fn default_mpesa_connect_timeout_ms() -> u64 {
    1_000
}

/// Returns the default payment request timeout.
const fn default_mpesa_request_timeout_ms() -> u64 {
    30_000
}

/// Returns the default article seeding toggle.
const fn default_seed_articles() -> bool {
    true
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl CampaignConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then [`CONFIG_ENV_VAR`], then
    /// `campaign-hub.toml` in the working directory. A missing file at the
    /// default location yields the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let mut config = if resolved.exists() {
            let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
            if bytes.len() > MAX_CONFIG_FILE_SIZE {
                return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
            }
            let content = std::str::from_utf8(&bytes)
                .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
            toml::from_str::<Self>(content).map_err(|err| ConfigError::Parse(err.to_string()))?
        } else if path.is_some() || env::var(CONFIG_ENV_VAR).is_ok() {
            return Err(ConfigError::Io(format!("config file not found: {}", resolved.display())));
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides for secret values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var(MAIL_USERNAME_ENV) {
            self.mail.username = value;
        }
        if let Ok(value) = env::var(MAIL_PASSWORD_ENV) {
            self.mail.password = value;
        }
        if let Ok(value) = env::var(MPESA_KEY_ENV) {
            self.mpesa.consumer_key = value;
        }
        if let Ok(value) = env::var(MPESA_SECRET_ENV) {
            self.mpesa.consumer_secret = value;
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.mail.validate()?;
        self.mpesa.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))?;
        if self.cors_origins.len() > MAX_CORS_ORIGINS {
            return Err(ConfigError::Invalid(format!(
                "too many cors origins: {} (max {MAX_CORS_ORIGINS})",
                self.cors_origins.len()
            )));
        }
        for origin in &self.cors_origins {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::Invalid(format!("invalid cors origin: {origin}")));
            }
        }
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_CEILING {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes out of range: {} (max {MAX_BODY_BYTES_CEILING})",
                self.max_body_bytes
            )));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// Validates database settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database path must not be empty".to_string()));
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl MailConfig {
    /// Validates mail settings; delivery fields are only required when enabled.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        for (field, value) in [
            ("mail.smtp_host", &self.smtp_host),
            ("mail.username", &self.username),
            ("mail.password", &self.password),
            ("mail.sender", &self.sender),
            ("mail.admin_address", &self.admin_address),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{field} is required when mail is enabled"
                )));
            }
        }
        if self.smtp_port == 0 {
            return Err(ConfigError::Invalid("mail.smtp_port must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl MpesaConfig {
    /// Validates payment settings; gateway fields are only required when enabled.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        for (field, value) in [
            ("mpesa.consumer_key", &self.consumer_key),
            ("mpesa.consumer_secret", &self.consumer_secret),
            ("mpesa.short_code", &self.short_code),
            ("mpesa.passkey", &self.passkey),
            ("mpesa.callback_url", &self.callback_url),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{field} is required when mpesa is enabled"
                )));
            }
        }
        if !self.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid("mpesa.base_url must use https".to_string()));
        }
        if !self.callback_url.starts_with("https://") {
            return Err(ConfigError::Invalid("mpesa.callback_url must use https".to_string()));
        }
        if self.connect_timeout_ms < MIN_MPESA_CONNECT_TIMEOUT_MS
            || self.connect_timeout_ms > MAX_MPESA_CONNECT_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "mpesa.connect_timeout_ms out of range: {}",
                self.connect_timeout_ms
            )));
        }
        if self.request_timeout_ms < MIN_MPESA_REQUEST_TIMEOUT_MS
            || self.request_timeout_ms > MAX_MPESA_REQUEST_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "mpesa.request_timeout_ms out of range: {}",
                self.request_timeout_ms
            )));
        }
        Ok(())
    }
}

/// Resolves the effective config path from argument, env, or default.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(env_path);
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}
