// crates/campaign-hub-server/src/error.rs
// ============================================================================
// Module: API Error Mapping
// Description: Request error taxonomy with HTTP status mapping.
// Purpose: Return a uniform JSON failure envelope for every error class.
// Dependencies: axum, campaign-hub-store-sqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every handler returns [`ApiError`] on failure. The response body is always
//! `{"success": false, "message": ...}` so clients can branch on one field.
//! Internal error details are never echoed to clients; they surface only
//! through the audit log.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use campaign_hub_store_sqlite::RegistrationError;
use campaign_hub_store_sqlite::StoreError;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request-level API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed validation (HTTP 400).
    #[error("{0}")]
    Validation(String),
    /// Missing or invalid credentials (HTTP 401).
    #[error("{0}")]
    Unauthorized(String),
    /// Resource does not exist (HTTP 404).
    #[error("{0}")]
    NotFound(String),
    /// Write conflicts with existing state (HTTP 409).
    #[error("{0}")]
    Conflict(String),
    /// Payment gateway rejected or failed the request (HTTP 502).
    #[error("{0}")]
    Payment(String),
    /// Internal failure; details stay server-side (HTTP 500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status for this error class.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the client-facing message for this error.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(message) => Self::Conflict(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(error: RegistrationError) -> Self {
        match error {
            RegistrationError::EventNotFound => Self::NotFound("event not found".to_string()),
            RegistrationError::RegistrationClosed => {
                Self::Validation("registration is closed for this event".to_string())
            }
            RegistrationError::AlreadyRegistered => {
                Self::Conflict("this email is already registered for the event".to_string())
            }
            RegistrationError::CapacityExceeded => {
                Self::Conflict("the event is fully booked".to_string())
            }
            RegistrationError::Store(inner) => Self::from(inner),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "message": self.client_message(),
        });
        (self.status(), Json(body)).into_response()
    }
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

    use super::ApiError;
    use axum::http::StatusCode;
    use campaign_hub_store_sqlite::RegistrationError;
    use campaign_hub_store_sqlite::StoreError;

    #[test]
    fn statuses_follow_the_error_class() {
        assert_eq!(ApiError::Validation(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized(String::new()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict(String::new()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Payment(String::new()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::Internal(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_not_echoed_to_clients() {
        let error = ApiError::Internal("sqlite disk io failure".to_string());
        assert_eq!(error.client_message(), "internal server error");
    }

    #[test]
    fn registration_errors_map_to_conflict_and_not_found() {
        assert_eq!(
            ApiError::from(RegistrationError::EventNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RegistrationError::CapacityExceeded).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(RegistrationError::AlreadyRegistered).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Conflict("slug".to_string())).status(),
            StatusCode::CONFLICT
        );
    }
}
