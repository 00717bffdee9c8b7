// crates/campaign-hub-server/tests/api_services.rs
// ============================================================================
// Module: API Service Tests
// Description: Integration tests for the request-level service functions.
// Purpose: Exercise validation, store wiring, auth, and payment resolution
//          against a real temporary database.
// Dependencies: campaign-hub-config, campaign-hub-core, campaign-hub-server,
//               campaign-hub-store-sqlite, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Integration tests for the request-level service functions, exercising
//! validation, store wiring, auth, and payment resolution against a real
//! temporary database.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions are permitted."
)]

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::header;
use campaign_hub_config::DatabaseConfig;
use campaign_hub_core::DonationStatus;
use campaign_hub_core::EventDraft;
use campaign_hub_core::EventStatus;
use campaign_hub_core::NewDonation;
use campaign_hub_core::password;
use campaign_hub_server::ApiError;
use campaign_hub_server::AppState;
use campaign_hub_server::LogNotifier;
use campaign_hub_server::NoopAuditSink;
use campaign_hub_server::admin;
use campaign_hub_server::auth;
use campaign_hub_server::mpesa::CallbackEnvelope;
use campaign_hub_server::payments;
use campaign_hub_server::public;
use campaign_hub_server::seed;
use campaign_hub_store_sqlite::CampaignDb;
use serde_json::json;
use tempfile::TempDir;

/// Builds an application state over a fresh temporary database.
fn test_state() -> (TempDir, AppState) {
    let dir = TempDir::new().expect("tempdir");
    let config = DatabaseConfig {
        path: dir.path().join("campaign.db"),
        ..DatabaseConfig::default()
    };
    let db = CampaignDb::open(&config).expect("open store");
    let state = AppState {
        db,
        notifier: Arc::new(LogNotifier),
        audit: Arc::new(NoopAuditSink),
        mpesa: None,
    };
    (dir, state)
}

/// Client metadata with no forwarded headers.
fn anonymous() -> public::ClientMeta {
    public::ClientMeta {
        ip_address: None,
        user_agent: None,
    }
}

/// An upcoming event accepting up to two registrations.
fn small_event() -> EventDraft {
    EventDraft {
        title: "Town Hall".to_string(),
        slug: None,
        description: Some("Open forum".to_string()),
        location: Some("Community Hall".to_string()),
        starts_at: "2026-10-01T10:00:00Z".to_string(),
        ends_at: None,
        featured_image: None,
        status: EventStatus::Upcoming,
        max_attendees: Some(2),
        registration_required: true,
    }
}

#[test]
fn contact_submission_stores_record_and_rejects_spam() {
    let (_dir, state) = test_state();
    let value = public::submit_contact(
        &state,
        public::ContactRequest {
            name: "Jane Wanjiku".to_string(),
            email: "Jane@Example.com".to_string(),
            phone: Some("0712345678".to_string()),
            subject: None,
            message: "I would like to volunteer at the next forum.".to_string(),
        },
        anonymous(),
    )
    .expect("submit contact");
    assert_eq!(value["success"], json!(true));

    let contacts = state.db.list_contacts().expect("list contacts");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].email, "jane@example.com");
    assert_eq!(contacts[0].phone.as_deref(), Some("254712345678"));

    let spam = public::submit_contact(
        &state,
        public::ContactRequest {
            name: "Spammer".to_string(),
            email: "spam@example.com".to_string(),
            phone: None,
            subject: None,
            message: "visit http://a.example http://b.example http://c.example \
                      http://d.example now"
                .to_string(),
        },
        anonymous(),
    );
    assert!(matches!(spam, Err(ApiError::Validation(_))));
    assert_eq!(state.db.list_contacts().expect("list").len(), 1);
}

#[test]
fn newsletter_flow_subscribes_then_unsubscribes() {
    let (_dir, state) = test_state();
    let first = public::subscribe_newsletter(
        &state,
        public::SubscribeRequest {
            email: "reader@example.com".to_string(),
            name: Some("Reader".to_string()),
        },
        anonymous(),
    )
    .expect("subscribe");
    assert_eq!(first["success"], json!(true));

    let again = public::subscribe_newsletter(
        &state,
        public::SubscribeRequest {
            email: "READER@example.com".to_string(),
            name: None,
        },
        anonymous(),
    );
    assert!(matches!(again, Err(ApiError::Conflict(_))));
    assert_eq!(state.db.list_subscriptions().expect("list").len(), 1);

    let gone = public::unsubscribe_newsletter(
        &state,
        public::UnsubscribeRequest {
            email: "reader@example.com".to_string(),
        },
    )
    .expect("unsubscribe");
    assert_eq!(gone["success"], json!(true));

    let missing = public::unsubscribe_newsletter(
        &state,
        public::UnsubscribeRequest {
            email: "reader@example.com".to_string(),
        },
    );
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

#[test]
fn volunteer_signup_requires_a_kenyan_phone() {
    let (_dir, state) = test_state();
    let bad = public::submit_volunteer(
        &state,
        public::VolunteerRequest {
            name: "Otieno".to_string(),
            email: "otieno@example.com".to_string(),
            phone: "12345".to_string(),
            location: None,
            skills: None,
            availability: None,
            experience: None,
            motivation: None,
        },
        anonymous(),
    );
    assert!(matches!(bad, Err(ApiError::Validation(_))));

    let ok = public::submit_volunteer(
        &state,
        public::VolunteerRequest {
            name: "Otieno".to_string(),
            email: "otieno@example.com".to_string(),
            phone: "+254701234567".to_string(),
            location: Some("Kisumu Central".to_string()),
            skills: Some("logistics".to_string()),
            availability: Some("weekends".to_string()),
            experience: None,
            motivation: None,
        },
        anonymous(),
    )
    .expect("volunteer");
    assert_eq!(ok["success"], json!(true));
    assert_eq!(state.db.list_volunteers().expect("list").len(), 1);
}

#[test]
fn news_pages_cover_seeded_articles_and_count_views() {
    let (_dir, state) = test_state();
    let inserted = state.db.seed_articles(&seed::default_articles()).expect("seed");
    assert_eq!(inserted, 3);

    let page = public::fetch_news_page(
        &state,
        &public::NewsQuery {
            category: None,
            page: 1,
            per_page: 2,
        },
    )
    .expect("page one");
    assert_eq!(page["total"], json!(3));
    assert_eq!(page["pages"], json!(2));
    assert_eq!(page["articles"].as_array().expect("articles").len(), 2);

    let filtered = public::fetch_news_page(
        &state,
        &public::NewsQuery {
            category: Some("policy".to_string()),
            page: 1,
            per_page: 9,
        },
    )
    .expect("filtered");
    assert_eq!(filtered["total"], json!(1));

    let detail = public::fetch_article(&state, "clean-water-plan").expect("detail");
    assert_eq!(detail["article"]["views"], json!(1));
    let detail = public::fetch_article(&state, "clean-water-plan").expect("detail again");
    assert_eq!(detail["article"]["views"], json!(2));

    let missing = public::fetch_article(&state, "no-such-slug");
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

#[test]
fn comments_attach_to_published_articles_only() {
    let (_dir, state) = test_state();
    state.db.seed_articles(&seed::default_articles()).expect("seed");

    let posted = public::submit_comment(
        &state,
        "campaign-launch",
        public::CommentRequest {
            name: "Akinyi".to_string(),
            email: "akinyi@example.com".to_string(),
            comment: "Looking forward to the ward forums.".to_string(),
        },
    )
    .expect("comment");
    assert_eq!(posted["success"], json!(true));

    let orphan = public::submit_comment(
        &state,
        "no-such-article",
        public::CommentRequest {
            name: "Akinyi".to_string(),
            email: "akinyi@example.com".to_string(),
            comment: "Hello?".to_string(),
        },
    );
    assert!(matches!(orphan, Err(ApiError::NotFound(_))));

    // Comments await moderation before they appear publicly.
    let visible = state
        .db
        .list_approved_comments("campaign-launch")
        .expect("approved")
        .expect("article exists");
    assert!(visible.is_empty());
    assert_eq!(state.db.list_pending_comments().expect("pending").len(), 1);
}

#[test]
fn event_registration_enforces_capacity_and_duplicates() {
    let (_dir, state) = test_state();
    let event_id = state.db.create_event(&small_event()).expect("create event");

    let register = |email: &str| {
        public::register_for_event(
            &state,
            event_id,
            public::RegistrationRequest {
                name: "Attendee".to_string(),
                email: email.to_string(),
                phone: None,
                notes: None,
            },
        )
    };
    assert_eq!(register("a@example.com").expect("first")["success"], json!(true));
    assert!(matches!(register("A@example.com"), Err(ApiError::Conflict(_))));
    assert_eq!(register("b@example.com").expect("second")["success"], json!(true));
    assert!(matches!(register("c@example.com"), Err(ApiError::Conflict(_))));

    let detail = public::fetch_event(&state, event_id).expect("event detail");
    assert_eq!(detail["event"]["confirmed_attendees"], json!(2));
    assert_eq!(detail["event"]["spots_remaining"], json!(0));

    let missing = public::fetch_event(&state, event_id + 99);
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

#[test]
fn registration_response_names_the_event_and_rejects_started_events() {
    let (_dir, state) = test_state();
    let event_id = state.db.create_event(&small_event()).expect("create event");
    let register = |event_id: i64| {
        public::register_for_event(
            &state,
            event_id,
            public::RegistrationRequest {
                name: "Otieno".to_string(),
                email: "otieno@example.com".to_string(),
                phone: None,
                notes: None,
            },
        )
    };
    let value = register(event_id).expect("register");
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["event"], json!("Town Hall"));
    assert!(value["registration_id"].is_i64());

    let mut running = small_event();
    running.title = "Live Rally".to_string();
    running.status = EventStatus::Ongoing;
    let running_id = state.db.create_event(&running).expect("create running event");
    assert!(matches!(register(running_id), Err(ApiError::Validation(_))));
}

#[test]
fn admin_login_issues_a_usable_bearer_token() {
    let (_dir, state) = test_state();
    let salt = auth::generate_salt();
    let hash = password::hash_password("correct horse", &salt);
    state
        .db
        .create_admin("chair", "chair@example.com", &hash, &salt, "admin")
        .expect("create admin");

    let rejected = admin::login_admin(
        &state,
        &admin::LoginRequest {
            username: "chair".to_string(),
            password: "wrong".to_string(),
        },
    );
    assert!(matches!(rejected, Err(ApiError::Unauthorized(_))));

    let value = admin::login_admin(
        &state,
        &admin::LoginRequest {
            username: "chair".to_string(),
            password: "correct horse".to_string(),
        },
    )
    .expect("login");
    let token = value["token"].as_str().expect("token").to_string();
    assert_eq!(value["admin"]["username"], json!("chair"));

    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
    );
    let admin_user = auth::require_admin(&state.db, &headers).expect("session");
    assert_eq!(admin_user.username, "chair");

    let mut stale = HeaderMap::new();
    stale.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer deadbeef"));
    assert!(matches!(
        auth::require_admin(&state.db, &stale),
        Err(ApiError::Unauthorized(_))
    ));
}

#[test]
fn donations_fail_fast_when_no_gateway_is_configured() {
    let (_dir, state) = test_state();
    let result = payments::submit_donation(
        &state,
        payments::DonationRequest {
            name: Some("Donor".to_string()),
            email: None,
            phone: "0712345678".to_string(),
            amount: 500.0,
        },
        anonymous(),
    );
    assert!(matches!(result, Err(ApiError::Payment(_))));
    assert!(state.db.list_donations().expect("donations").is_empty());

    let tiny = payments::submit_donation(
        &state,
        payments::DonationRequest {
            name: None,
            email: None,
            phone: "0712345678".to_string(),
            amount: 0.5,
        },
        anonymous(),
    );
    assert!(matches!(tiny, Err(ApiError::Validation(_))));
}

#[test]
fn gateway_callback_settles_the_matching_donation() {
    let (_dir, state) = test_state();
    let donation_id = state
        .db
        .insert_donation(&NewDonation {
            donor_name: "Donor".to_string(),
            donor_email: None,
            phone: Some("254712345678".to_string()),
            amount_kes: 250.0,
            payment_method: "mpesa".to_string(),
            ip_address: None,
        })
        .expect("insert donation");
    state
        .db
        .set_donation_gateway_ref(donation_id, "ws_CO_123456")
        .expect("gateway ref");

    let envelope: CallbackEnvelope = serde_json::from_value(json!({
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "mr-1",
                "CheckoutRequestID": "ws_CO_123456",
                "ResultCode": 0,
                "ResultDesc": "The service request is processed successfully.",
                "CallbackMetadata": {
                    "Item": [
                        {"Name": "Amount", "Value": 250.0},
                        {"Name": "MpesaReceiptNumber", "Value": "QK12XYZ"},
                    ],
                },
            },
        },
    }))
    .expect("decode callback");
    let ack = payments::resolve_callback(&state, &envelope).expect("resolve");
    assert_eq!(ack["ResultCode"], json!(0));

    let donations = state.db.list_donations().expect("donations");
    assert_eq!(donations.len(), 1);
    assert_eq!(donations[0].status, DonationStatus::Completed);
    assert_eq!(donations[0].transaction_id.as_deref(), Some("QK12XYZ"));

    // Unmatched identifiers are still acknowledged.
    let stray: CallbackEnvelope = serde_json::from_value(json!({
        "Body": {
            "stkCallback": {
                "MerchantRequestID": "mr-2",
                "CheckoutRequestID": "ws_CO_999999",
                "ResultCode": 1032,
                "ResultDesc": "Request cancelled by user",
            },
        },
    }))
    .expect("decode stray");
    let ack = payments::resolve_callback(&state, &stray).expect("resolve stray");
    assert_eq!(ack["ResultCode"], json!(0));
}

#[test]
fn social_feed_lists_every_platform() {
    let feed = public::social_feed();
    assert_eq!(feed["success"], json!(true));
    let platforms: Vec<&str> = feed["feed"]
        .as_array()
        .expect("feed")
        .iter()
        .filter_map(|entry| entry["platform"].as_str())
        .collect();
    assert_eq!(platforms, vec!["facebook", "twitter", "instagram"]);
}
