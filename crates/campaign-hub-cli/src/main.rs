// crates/campaign-hub-cli/src/main.rs
// ============================================================================
// Module: Campaign Hub CLI Entry Point
// Description: Command dispatcher for serving the API and operator tasks.
// Purpose: Provide a single binary for serving, schema setup, and admin
//          account management.
// Dependencies: campaign-hub-config, campaign-hub-core, campaign-hub-server,
//               campaign-hub-store-sqlite, clap, thiserror, tokio
// ============================================================================

//! ## Overview
//! The `campaign-hub` binary dispatches three operator workflows: `serve`
//! runs the HTTP API, `init-db` creates or migrates the SQLite schema, and
//! `create-admin` provisions a console account with a salted credential hash.
//! Configuration resolves from `--config`, the environment, or the working
//! directory; secrets always come from the environment.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use campaign_hub_config::CampaignConfig;
use campaign_hub_core::password;
use campaign_hub_core::validation;
use campaign_hub_server::CampaignServer;
use campaign_hub_server::auth;
use campaign_hub_store_sqlite::CampaignDb;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Top-level CLI error.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration loading or validation failure.
    #[error("config error: {0}")]
    Config(String),
    /// Store open or write failure.
    #[error("store error: {0}")]
    Store(String),
    /// Server construction or serving failure.
    #[error("server error: {0}")]
    Server(String),
    /// Invalid operator input.
    #[error("invalid input: {0}")]
    Input(String),
    /// Output stream failure.
    #[error("output error: {0}")]
    Output(String),
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Command Definitions
// ============================================================================

/// Campaign backend operator commands.
#[derive(Parser, Debug)]
#[command(name = "campaign-hub", version, about = "Campaign website backend")]
struct Cli {
    /// Explicit configuration file path.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the HTTP API server.
    Serve,
    /// Creates or migrates the database schema and exits.
    InitDb,
    /// Provisions an admin console account.
    CreateAdmin {
        /// Login username.
        #[arg(long)]
        username: String,
        /// Contact email address.
        #[arg(long)]
        email: String,
        /// Plaintext password to hash; prefer a throwaway shell history.
        #[arg(long)]
        password: String,
        /// Role label stored on the account.
        #[arg(long, default_value = "admin")]
        role: String,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = CampaignConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::Config(err.to_string()))?;
    match cli.command {
        Commands::Serve => command_serve(config).await,
        Commands::InitDb => command_init_db(&config),
        Commands::CreateAdmin {
            username,
            email,
            password,
            role,
        } => command_create_admin(&config, &username, &email, &password, &role),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Builds the server from configuration and serves until shutdown.
async fn command_serve(config: CampaignConfig) -> CliResult<ExitCode> {
    let bind = config.server.bind.clone();
    let server =
        CampaignServer::from_config(config).map_err(|err| CliError::Server(err.to_string()))?;
    write_stdout_line(&format!("campaign-hub listening on {bind}"))?;
    server.serve().await.map_err(|err| CliError::Server(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Opens the database, creating or migrating the schema as needed.
fn command_init_db(config: &CampaignConfig) -> CliResult<ExitCode> {
    CampaignDb::open(&config.database).map_err(|err| CliError::Store(err.to_string()))?;
    write_stdout_line(&format!("database ready at {}", config.database.path.display()))?;
    Ok(ExitCode::SUCCESS)
}

/// Creates an admin account with a fresh salt and hashed credential.
fn command_create_admin(
    config: &CampaignConfig,
    username: &str,
    email: &str,
    password_input: &str,
    role: &str,
) -> CliResult<ExitCode> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CliError::Input("username is required".to_string()));
    }
    let email = email.trim().to_lowercase();
    if !validation::validate_email(&email) {
        return Err(CliError::Input(format!("invalid email address: {email}")));
    }
    if password_input.len() < MIN_PASSWORD_LENGTH {
        return Err(CliError::Input(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    let db = CampaignDb::open(&config.database).map_err(|err| CliError::Store(err.to_string()))?;
    let salt = auth::generate_salt();
    let hash = password::hash_password(password_input, &salt);
    let id = db
        .create_admin(username, &email, &hash, &salt, role)
        .map_err(|err| CliError::Store(err.to_string()))?;
    write_stdout_line(&format!("created admin '{username}' (id {id})"))?;
    Ok(ExitCode::SUCCESS)
}

/// Minimum accepted admin password length.
const MIN_PASSWORD_LENGTH: usize = 8;

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::Output(err.to_string()))
}

/// Writes the error to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}
