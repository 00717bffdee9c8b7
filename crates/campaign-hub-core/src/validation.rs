// crates/campaign-hub-core/src/validation.rs
// ============================================================================
// Module: Input Validation Helpers
// Description: Pure validators and sanitizers for submission fields.
// Purpose: Reject malformed emails, phones, and oversized or spammy text.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Stateless helpers shared by every submission endpoint: email format
//! checking, Kenyan phone normalization, text sanitizing with length caps,
//! lightweight spam heuristics, and slug derivation. All helpers treat their
//! input as untrusted and never panic.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted length for a person or organisation name.
pub const MAX_NAME_LENGTH: usize = 120;
/// Maximum accepted length for an email address.
pub const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum accepted length for a subject line.
pub const MAX_SUBJECT_LENGTH: usize = 200;
/// Maximum accepted length for a free-text message body.
pub const MAX_MESSAGE_LENGTH: usize = 5_000;
/// Maximum accepted length for short descriptive fields.
pub const MAX_SHORT_TEXT_LENGTH: usize = 500;
/// Maximum accepted length for a URL slug.
pub const MAX_SLUG_LENGTH: usize = 160;
/// Maximum accepted length for article HTML content.
pub const MAX_CONTENT_LENGTH: usize = 100_000;
/// Link count at which a message body is classified as spam.
const SPAM_LINK_THRESHOLD: usize = 4;
/// Lower-cased keywords that classify a message body as spam.
const SPAM_KEYWORDS: &[&str] =
    &["viagra", "casino", "jackpot", "forex signals", "crypto giveaway"];

// ============================================================================
// SECTION: Email
// ============================================================================

/// Returns true when `email` matches the accepted `local@domain.tld` shape.
///
/// The check mirrors the submission-form contract: one `@`, a non-empty
/// local part of word characters and `._%+-`, dot-separated domain labels,
/// and a trailing alphabetic label of at least two characters.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if !local.chars().all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c)) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    for label in &labels {
        if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }
    let tld = labels[labels.len() - 1];
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

// ============================================================================
// SECTION: Phone
// ============================================================================

/// Normalizes a Kenyan phone number to canonical `254…` form.
///
/// Spaces, dashes, and parentheses are stripped before matching. Accepted
/// shapes are `+254`/`254`/`0`-prefixed and bare nine-digit numbers starting
/// with `7` or `1`. Returns `None` when the input matches none of them.
#[must_use]
pub fn normalize_kenyan_phone(phone: &str) -> Option<String> {
    let clean: String =
        phone.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')')).collect();
    let digits = clean.strip_prefix('+').unwrap_or(&clean);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let subscriber = if let Some(rest) = digits.strip_prefix("254") {
        rest
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest
    } else {
        digits
    };
    if subscriber.len() == 9 && (subscriber.starts_with('7') || subscriber.starts_with('1')) {
        return Some(format!("254{subscriber}"));
    }
    None
}

// ============================================================================
// SECTION: Text
// ============================================================================

/// Trims, strips control characters, and truncates text to `max_len` chars.
///
/// Newlines are preserved so multi-line message bodies survive sanitizing.
#[must_use]
pub fn sanitize_text(text: &str, max_len: usize) -> String {
    text.trim()
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .take(max_len)
        .collect()
}

/// Returns true when a message body trips the spam heuristics.
///
/// Heuristics: four or more embedded links, or any blocklisted keyword.
#[must_use]
pub fn looks_like_spam(body: &str) -> bool {
    let lower = body.to_lowercase();
    let links = lower.matches("http://").count() + lower.matches("https://").count();
    if links >= SPAM_LINK_THRESHOLD {
        return true;
    }
    SPAM_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Derives a URL slug from a title: lower-cased alphanumeric runs joined by
/// dashes, capped at [`MAX_SLUG_LENGTH`].
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_LENGTH {
            break;
        }
    }
    slug
}

/// Returns true when `value` parses as an RFC 3339 timestamp.
#[must_use]
pub fn validate_rfc3339(value: &str) -> bool {
    OffsetDateTime::parse(value, &Rfc3339).is_ok()
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

    use super::looks_like_spam;
    use super::normalize_kenyan_phone;
    use super::sanitize_text;
    use super::slugify;
    use super::validate_email;
    use super::validate_rfc3339;

    #[test]
    fn email_accepts_plain_addresses() {
        assert!(validate_email("a@b.com"));
        assert!(validate_email("first.last+tag@mail.example.org"));
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        assert!(!validate_email(""));
        assert!(!validate_email("no-at-sign"));
        assert!(!validate_email("@missing-local.com"));
        assert!(!validate_email("a@no-tld"));
        assert!(!validate_email("a@tld.1"));
        assert!(!validate_email("a b@c.com"));
        assert!(!validate_email("a@b@c.com"));
    }

    #[test]
    fn phone_normalizes_all_accepted_shapes() {
        assert_eq!(normalize_kenyan_phone("+254712345678").as_deref(), Some("254712345678"));
        assert_eq!(normalize_kenyan_phone("254712345678").as_deref(), Some("254712345678"));
        assert_eq!(normalize_kenyan_phone("0712345678").as_deref(), Some("254712345678"));
        assert_eq!(normalize_kenyan_phone("712345678").as_deref(), Some("254712345678"));
        assert_eq!(normalize_kenyan_phone("0112345678").as_deref(), Some("254112345678"));
        assert_eq!(normalize_kenyan_phone("0712 345-678").as_deref(), Some("254712345678"));
    }

    #[test]
    fn phone_rejects_foreign_and_short_numbers() {
        assert!(normalize_kenyan_phone("0812345678").is_none());
        assert!(normalize_kenyan_phone("07123").is_none());
        assert!(normalize_kenyan_phone("+14155550100").is_none());
        assert!(normalize_kenyan_phone("07x2345678").is_none());
    }

    #[test]
    fn sanitize_trims_strips_and_caps() {
        assert_eq!(sanitize_text("  hello \u{7}world  ", 50), "hello world");
        assert_eq!(sanitize_text("line one\nline two", 50), "line one\nline two");
        assert_eq!(sanitize_text("abcdef", 3), "abc");
    }

    #[test]
    fn spam_heuristics_flag_links_and_keywords() {
        let links = "https://a https://b https://c https://d";
        assert!(looks_like_spam(links));
        assert!(looks_like_spam("WIN the CASINO jackpot"));
        assert!(!looks_like_spam("I would like to volunteer at the rally"));
    }

    #[test]
    fn slugify_produces_url_safe_slugs() {
        assert_eq!(slugify("Ward Clean-Up Drive Launched"), "ward-clean-up-drive-launched");
        assert_eq!(slugify("Water for Nyadhi – Project Update"), "water-for-nyadhi-project-update");
        assert_eq!(slugify("  !!  "), "");
    }

    #[test]
    fn rfc3339_validation() {
        assert!(validate_rfc3339("2026-08-24T08:00:00Z"));
        assert!(!validate_rfc3339("next tuesday"));
    }
}
