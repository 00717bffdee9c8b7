// crates/campaign-hub-core/src/password.rs
// ============================================================================
// Module: Credential Hashing
// Description: Salted SHA-256 password hashing with constant-time verify.
// Purpose: Back the admin credential store that replaces hardcoded logins.
// Dependencies: sha2, subtle
// ============================================================================

//! ## Overview
//! Admin passwords are stored as hex-encoded SHA-256 digests of
//! `salt || password` with a per-account random salt. Verification recomputes
//! the digest and compares in constant time.

use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Hex alphabet for digest encoding.
const HEX: &[u8; 16] = b"0123456789abcdef";

/// Encodes bytes as lower-case hex.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}

/// Hashes a password with the provided hex salt.
#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Verifies a password against a stored salted hash in constant time.
#[must_use]
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let computed = hash_password(password, salt);
    computed.as_bytes().ct_eq(expected_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::hash_password;
    use super::verify_password;

    #[test]
    fn hash_is_deterministic_and_salt_sensitive() {
        let a = hash_password("hunter2", "aabbcc");
        let b = hash_password("hunter2", "aabbcc");
        let c = hash_password("hunter2", "ddeeff");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn verify_accepts_correct_and_rejects_wrong_password() {
        let hash = hash_password("s3cret", "0011");
        assert!(verify_password("s3cret", "0011", &hash));
        assert!(!verify_password("s3cret!", "0011", &hash));
        assert!(!verify_password("s3cret", "0012", &hash));
    }
}
