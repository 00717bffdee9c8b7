// crates/campaign-hub-server/src/auth.rs
// ============================================================================
// Module: Admin Authentication
// Description: Credential verification and bearer session management.
// Purpose: Gate the admin API with hashed credentials and expiring tokens.
// Dependencies: axum, campaign-hub-core, campaign-hub-store-sqlite, rand
// ============================================================================

//! ## Overview
//! Admin accounts store salted password hashes; login verifies in constant
//! time and issues a random bearer token with a 24 hour lifetime. Every admin
//! request resolves its `Authorization: Bearer` token against the session
//! table. Login failures are indistinguishable between unknown usernames and
//! wrong passwords.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::http::HeaderMap;
use campaign_hub_core::AdminUser;
use campaign_hub_core::password;
use campaign_hub_core::unix_millis;
use campaign_hub_store_sqlite::CampaignDb;
use rand::RngCore;

use crate::error::ApiError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Session token lifetime in milliseconds (24 hours).
pub const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;
/// Session token length in random bytes before hex encoding.
const TOKEN_BYTES: usize = 32;
/// Salt length in random bytes before hex encoding.
const SALT_BYTES: usize = 16;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A freshly issued admin session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Authenticated admin account.
    pub admin: AdminUser,
    /// Bearer token value.
    pub token: String,
    /// Expiry timestamp (milliseconds since epoch).
    pub expires_at_ms: i64,
}

// ============================================================================
// SECTION: Token Generation
// ============================================================================

/// Generates a random bearer token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    password::hex_encode(&bytes)
}

/// Generates a random per-account salt.
#[must_use]
pub fn generate_salt() -> String {
    let mut bytes = [0_u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    password::hex_encode(&bytes)
}

// ============================================================================
// SECTION: Login and Session Checks
// ============================================================================

/// Verifies credentials and issues a bearer session.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for unknown usernames or wrong
/// passwords, without distinguishing the two.
pub fn login(
    db: &CampaignDb,
    username: &str,
    password_input: &str,
) -> Result<IssuedSession, ApiError> {
    let admin = db
        .find_admin(username)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;
    if !password::verify_password(password_input, &admin.salt, &admin.password_hash) {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }
    let token = generate_token();
    let issued_at_ms = unix_millis();
    let expires_at_ms = issued_at_ms.saturating_add(SESSION_TTL_MS);
    db.insert_session(&token, admin.id, issued_at_ms, expires_at_ms)
        .map_err(ApiError::from)?;
    db.record_admin_login(admin.id).map_err(ApiError::from)?;
    Ok(IssuedSession {
        admin,
        token,
        expires_at_ms,
    })
}

/// Extracts the bearer token from request headers.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the request's bearer token to an admin account.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the token is missing, unknown, or
/// expired.
pub fn require_admin(db: &CampaignDb, headers: &HeaderMap) -> Result<AdminUser, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
    db.session_admin(token)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::Unauthorized("session expired or unknown".to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use axum::http::HeaderMap;
    use axum::http::HeaderValue;

    use super::bearer_token;
    use super::generate_salt;
    use super::generate_token;

    #[test]
    fn tokens_are_unique_and_hex_encoded() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(generate_salt().len(), 32);
    }

    #[test]
    fn bearer_parsing_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Token abc"),
        );
        assert!(bearer_token(&headers).is_none());
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc123"));
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer "),
        );
        assert!(bearer_token(&headers).is_none());
    }
}
