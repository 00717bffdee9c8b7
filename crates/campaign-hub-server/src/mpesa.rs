// crates/campaign-hub-server/src/mpesa.rs
// ============================================================================
// Module: M-Pesa STK Push Client
// Description: Daraja OAuth and STK push requests over blocking HTTPS.
// Purpose: Initiate mobile-money collection and decode gateway callbacks.
// Dependencies: base64, campaign-hub-config, campaign-hub-core, reqwest,
//               serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! The client speaks the Daraja sandbox/production API: it exchanges the
//! consumer key and secret for a bearer token, then issues a
//! `CustomerPayBillOnline` STK push with the base64 `shortcode+passkey+timestamp`
//! password. Calls use a blocking HTTP client with connect and request
//! timeouts; async handlers must run them on a blocking worker thread.
//! Gateway error bodies are treated as untrusted and never echoed to clients.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use campaign_hub_config::MpesaConfig;
use campaign_hub_core::validation::normalize_kenyan_phone;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// M-Pesa client errors.
#[derive(Debug, Error)]
pub enum MpesaError {
    /// HTTP client construction failed.
    #[error("mpesa client build failed: {0}")]
    Client(String),
    /// Request input was rejected before reaching the gateway.
    #[error("mpesa request invalid: {0}")]
    Invalid(String),
    /// The gateway refused or failed the request.
    #[error("mpesa gateway error: {0}")]
    Gateway(String),
    /// The gateway response could not be decoded.
    #[error("mpesa response decode failed: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// OAuth token response body.
#[derive(Debug, Deserialize)]
struct OauthResponse {
    /// Bearer token for subsequent gateway calls.
    access_token: String,
}

/// STK push request body.
#[derive(Debug, Serialize)]
struct StkPushRequest<'a> {
    /// Paybill or till number.
    #[serde(rename = "BusinessShortCode")]
    business_short_code: &'a str,
    /// Base64 shortcode+passkey+timestamp password.
    #[serde(rename = "Password")]
    password: String,
    /// Timestamp used to derive the password (yyyymmddhhmmss).
    #[serde(rename = "Timestamp")]
    timestamp: String,
    /// Always `CustomerPayBillOnline` for paybill collection.
    #[serde(rename = "TransactionType")]
    transaction_type: &'static str,
    /// Whole KES amount.
    #[serde(rename = "Amount")]
    amount: u64,
    /// Paying MSISDN in 254 form.
    #[serde(rename = "PartyA")]
    party_a: &'a str,
    /// Receiving shortcode.
    #[serde(rename = "PartyB")]
    party_b: &'a str,
    /// Paying MSISDN in 254 form (same as `PartyA`).
    #[serde(rename = "PhoneNumber")]
    phone_number: &'a str,
    /// Callback URL for the payment result.
    #[serde(rename = "CallBackURL")]
    callback_url: &'a str,
    /// Account reference shown on the statement.
    #[serde(rename = "AccountReference")]
    account_reference: &'a str,
    /// Human-readable transaction description.
    #[serde(rename = "TransactionDesc")]
    transaction_desc: &'a str,
}

/// STK push acceptance response.
#[derive(Debug, Clone, Deserialize)]
pub struct StkPushResponse {
    /// Merchant-side request identifier.
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    /// Checkout request identifier correlated by the callback.
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    /// Gateway response code; "0" means accepted for processing.
    #[serde(rename = "ResponseCode")]
    pub response_code: String,
    /// Message shown to the paying customer.
    #[serde(rename = "CustomerMessage", default)]
    pub customer_message: Option<String>,
}

/// Payment result callback envelope.
#[derive(Debug, Deserialize)]
pub struct CallbackEnvelope {
    /// Callback body wrapper.
    #[serde(rename = "Body")]
    pub body: CallbackBody,
}

/// Payment result callback body.
#[derive(Debug, Deserialize)]
pub struct CallbackBody {
    /// STK callback payload.
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

/// STK payment result.
#[derive(Debug, Deserialize)]
pub struct StkCallback {
    /// Checkout request identifier issued by the push response.
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    /// Result code; zero indicates a completed payment.
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    /// Result description.
    #[serde(rename = "ResultDesc", default)]
    pub result_desc: Option<String>,
    /// Metadata items present on successful payments.
    #[serde(rename = "CallbackMetadata", default)]
    pub metadata: Option<CallbackMetadata>,
}

/// Metadata item list attached to successful payments.
#[derive(Debug, Deserialize)]
pub struct CallbackMetadata {
    /// Name/value metadata items.
    #[serde(rename = "Item", default)]
    pub items: Vec<CallbackItem>,
}

/// Single metadata name/value pair.
#[derive(Debug, Deserialize)]
pub struct CallbackItem {
    /// Item name, such as `MpesaReceiptNumber`.
    #[serde(rename = "Name")]
    pub name: String,
    /// Item value; numbers and strings both occur.
    #[serde(rename = "Value", default)]
    pub value: Option<serde_json::Value>,
}

impl StkCallback {
    /// Extracts the M-Pesa receipt number from the metadata items.
    #[must_use]
    pub fn receipt_number(&self) -> Option<String> {
        let metadata = self.metadata.as_ref()?;
        metadata
            .items
            .iter()
            .find(|item| item.name == "MpesaReceiptNumber")
            .and_then(|item| item.value.as_ref())
            .and_then(|value| value.as_str().map(ToString::to_string))
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking Daraja client.
pub struct MpesaClient {
    /// Shared HTTP client with connect and request timeouts.
    client: Client,
    /// Gateway configuration.
    config: MpesaConfig,
}

impl MpesaClient {
    /// Builds an M-Pesa client from the gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MpesaError::Client`] when the HTTP client cannot be built.
    pub fn new(config: MpesaConfig) -> Result<Self, MpesaError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| MpesaError::Client(err.to_string()))?;
        Ok(Self {
            client,
            config,
        })
    }

    /// Exchanges the consumer key and secret for a bearer token.
    fn access_token(&self) -> Result<String, MpesaError> {
        let credentials = Base64.encode(format!(
            "{}:{}",
            self.config.consumer_key, self.config.consumer_secret
        ));
        let url = format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            self.config.base_url
        );
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Basic {credentials}"))
            .send()
            .map_err(|err| map_send_error(&err))?;
        if !response.status().is_success() {
            return Err(MpesaError::Gateway(format!(
                "oauth request returned status {}",
                response.status()
            )));
        }
        let body: OauthResponse = response
            .json()
            .map_err(|err| MpesaError::Decode(err.to_string()))?;
        Ok(body.access_token)
    }

    /// Initiates an STK push for the provided phone and whole-KES amount.
    ///
    /// The phone number is normalized to the 254 MSISDN form first.
    ///
    /// # Errors
    ///
    /// Returns [`MpesaError`] when the input is invalid, the gateway refuses
    /// the push, or the response cannot be decoded.
    pub fn stk_push(
        &self,
        phone: &str,
        amount_kes: f64,
        account_reference: &str,
        description: &str,
    ) -> Result<StkPushResponse, MpesaError> {
        let msisdn = normalize_kenyan_phone(phone)
            .ok_or_else(|| MpesaError::Invalid("phone number is not a Kenyan MSISDN".to_string()))?;
        let amount = whole_kes(amount_kes)
            .ok_or_else(|| MpesaError::Invalid("amount must be between 1 and 1e9 KES".to_string()))?;
        let token = self.access_token()?;
        let timestamp = password_timestamp(OffsetDateTime::now_utc());
        let password = Base64.encode(format!(
            "{}{}{timestamp}",
            self.config.short_code, self.config.passkey
        ));
        let request = StkPushRequest {
            business_short_code: &self.config.short_code,
            password,
            timestamp,
            transaction_type: "CustomerPayBillOnline",
            amount,
            party_a: &msisdn,
            party_b: &self.config.short_code,
            phone_number: &msisdn,
            callback_url: &self.config.callback_url,
            account_reference,
            transaction_desc: description,
        };
        let url = format!("{}/mpesa/stkpush/v1/processrequest", self.config.base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .map_err(|err| map_send_error(&err))?;
        if !response.status().is_success() {
            return Err(MpesaError::Gateway(format!(
                "stk push returned status {}",
                response.status()
            )));
        }
        let body: StkPushResponse = response
            .json()
            .map_err(|err| MpesaError::Decode(err.to_string()))?;
        if body.response_code != "0" {
            return Err(MpesaError::Gateway(format!(
                "stk push rejected with code {}",
                body.response_code
            )));
        }
        Ok(body)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Formats the password timestamp as yyyymmddhhmmss.
fn password_timestamp(now: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Converts a validated KES amount to the whole-shilling form Daraja expects.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The value is range-checked immediately before the cast."
)]
fn whole_kes(amount: f64) -> Option<u64> {
    let rounded = amount.round();
    if !rounded.is_finite() || rounded < 1.0 || rounded > 1_000_000_000.0 {
        return None;
    }
    Some(rounded as u64)
}

/// Maps reqwest send errors to stable gateway error messages.
fn map_send_error(error: &reqwest::Error) -> MpesaError {
    if error.is_timeout() {
        MpesaError::Gateway("gateway request timed out".to_string())
    } else if error.is_connect() {
        MpesaError::Gateway("gateway connection failed".to_string())
    } else {
        MpesaError::Gateway("gateway request failed".to_string())
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

    use time::Date;
    use time::Month;
    use time::Time;

    use super::CallbackEnvelope;
    use super::password_timestamp;
    use super::whole_kes;

    #[test]
    fn password_timestamp_is_fourteen_digits() {
        let date = Date::from_calendar_date(2026, Month::March, 7).expect("date");
        let time = Time::from_hms(9, 5, 3).expect("time");
        let stamp = password_timestamp(date.with_time(time).assume_utc());
        assert_eq!(stamp, "20260307090503");
    }

    #[test]
    fn whole_kes_rejects_out_of_range_amounts() {
        assert_eq!(whole_kes(500.4), Some(500));
        assert_eq!(whole_kes(0.2), None);
        assert_eq!(whole_kes(-10.0), None);
        assert_eq!(whole_kes(f64::NAN), None);
        assert_eq!(whole_kes(2_000_000_000.0), None);
    }

    #[test]
    fn callback_decodes_receipt_from_metadata() {
        let raw = r#"{
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            {"Name": "Amount", "Value": 500.0},
                            {"Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV"},
                            {"Name": "PhoneNumber", "Value": 254712345678}
                        ]
                    }
                }
            }
        }"#;
        let envelope: CallbackEnvelope = serde_json::from_str(raw).expect("decode");
        let callback = envelope.body.stk_callback;
        assert_eq!(callback.result_code, 0);
        assert_eq!(callback.receipt_number().as_deref(), Some("NLJ7RT61SV"));
    }

    #[test]
    fn failed_callback_has_no_receipt() {
        let raw = r#"{
            "Body": {
                "stkCallback": {
                    "CheckoutRequestID": "ws_CO_1",
                    "ResultCode": 1032,
                    "ResultDesc": "Request cancelled by user"
                }
            }
        }"#;
        let envelope: CallbackEnvelope = serde_json::from_str(raw).expect("decode");
        let callback = envelope.body.stk_callback;
        assert_ne!(callback.result_code, 0);
        assert!(callback.receipt_number().is_none());
    }
}
