// crates/campaign-hub-server/src/payments.rs
// ============================================================================
// Module: Payment Endpoints
// Description: Donation intake via M-Pesa STK push and its result callback.
// Purpose: Track every donation from pending through completed or failed.
// Dependencies: axum, campaign-hub-core, campaign-hub-store-sqlite, serde,
//               serde_json
// ============================================================================

//! ## Overview
//! `POST /api/donate` records a pending donation, pushes the payment prompt
//! to the donor's phone, and stores the gateway's checkout identifier. The
//! gateway later reports the outcome to `POST /api/mpesa/callback`, which
//! resolves the pending donation by that identifier. Callback responses are
//! always `200` with the acknowledgement shape the gateway expects, even for
//! unmatched identifiers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use campaign_hub_core::NewDonation;
use campaign_hub_core::validation;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::audit::ApiAuditEvent;
use crate::error::ApiError;
use crate::mpesa::CallbackEnvelope;
use crate::public::ClientMeta;
use crate::server::AppState;
use crate::server::run_blocking;

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// Donation payload.
#[derive(Debug, Deserialize)]
pub struct DonationRequest {
    /// Donor display name; defaults to "Anonymous".
    #[serde(default)]
    pub name: Option<String>,
    /// Optional donor email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Donor phone number that receives the payment prompt.
    pub phone: String,
    /// Donation amount in KES.
    pub amount: f64,
}

// ============================================================================
// SECTION: Donate Service
// ============================================================================

/// Records a donation and pushes the payment prompt to the donor's phone.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for malformed input and
/// [`ApiError::Payment`] when the gateway is unavailable or refuses the push.
pub fn submit_donation(
    state: &AppState,
    request: DonationRequest,
    meta: ClientMeta,
) -> Result<Value, ApiError> {
    if !request.amount.is_finite() || request.amount < 1.0 {
        return Err(ApiError::Validation("amount must be at least 1 KES".to_string()));
    }
    let phone = validation::normalize_kenyan_phone(&request.phone).ok_or_else(|| {
        ApiError::Validation("phone number is not a valid Kenyan number".to_string())
    })?;
    let donor_name = request
        .name
        .as_deref()
        .map(|name| validation::sanitize_text(name, validation::MAX_NAME_LENGTH))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Anonymous".to_string());
    let donor_email = match request.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        None => None,
        Some(email) => {
            let email = email.to_lowercase();
            if !validation::validate_email(&email) {
                return Err(ApiError::Validation("email address is invalid".to_string()));
            }
            Some(email)
        }
    };
    let Some(mpesa) = state.mpesa.as_ref() else {
        return Err(ApiError::Payment("payment gateway is not configured".to_string()));
    };
    let donation_id = state.db.insert_donation(&NewDonation {
        donor_name,
        donor_email,
        phone: Some(phone.clone()),
        amount_kes: request.amount,
        payment_method: "mpesa".to_string(),
        ip_address: meta.ip_address,
    })?;
    let push = match mpesa.stk_push(&phone, request.amount, "CampaignHub", "Campaign donation") {
        Ok(push) => push,
        Err(err) => {
            state
                .audit
                .record(&ApiAuditEvent::new("donation_push", "error").with_record(donation_id));
            return Err(ApiError::Payment(err.to_string()));
        }
    };
    state.db.set_donation_gateway_ref(donation_id, &push.checkout_request_id)?;
    state.audit.record(&ApiAuditEvent::new("donation_push", "ok").with_record(donation_id));
    Ok(json!({
        "success": true,
        "message": push
            .customer_message
            .unwrap_or_else(|| "Check your phone to complete the payment.".to_string()),
        "donation_id": donation_id,
        "checkout_request_id": push.checkout_request_id,
    }))
}

/// `POST /api/donate`
pub async fn donate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<DonationRequest>,
) -> Result<Json<Value>, ApiError> {
    let meta = ClientMeta::from_headers(&headers);
    let value = run_blocking(move || submit_donation(&state, request, meta)).await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Callback Service
// ============================================================================

/// Resolves a gateway payment result against the pending donation.
///
/// Unmatched checkout identifiers are audited and acknowledged; the gateway
/// retries on anything except a success acknowledgement.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] only on store failure.
pub fn resolve_callback(state: &AppState, envelope: &CallbackEnvelope) -> Result<Value, ApiError> {
    let callback = &envelope.body.stk_callback;
    let matched = if callback.result_code == 0 {
        let receipt = callback.receipt_number();
        state.db.complete_donation(&callback.checkout_request_id, receipt.as_deref())?
    } else {
        state.db.fail_donation(&callback.checkout_request_id)?
    };
    let outcome = if matched { "ok" } else { "unmatched" };
    state.audit.record(
        &ApiAuditEvent::new("donation_callback", outcome)
            .with_detail(&format!("result_code={}", callback.result_code)),
    );
    Ok(json!({
        "ResultCode": 0,
        "ResultDesc": "Accepted",
    }))
}

/// `POST /api/mpesa/callback`
pub async fn mpesa_callback(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<CallbackEnvelope>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || resolve_callback(&state, &envelope)).await?;
    Ok(Json(value))
}
