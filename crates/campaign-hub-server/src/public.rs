// crates/campaign-hub-server/src/public.rs
// ============================================================================
// Module: Public Endpoints
// Description: Contact, newsletter, volunteer, news, events, and agenda.
// Purpose: Validate untrusted submissions and serve published content.
// Dependencies: axum, campaign-hub-core, campaign-hub-store-sqlite, serde,
//               serde_json
// ============================================================================

//! ## Overview
//! Each handler pairs with a synchronous service function that does the real
//! work against the store; handlers only extract request parts and move the
//! work onto a blocking thread. The service functions are public so tests can
//! drive them without an HTTP client. All inputs are sanitized and validated
//! before touching the store, and notification failures never fail the
//! request that triggered them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use campaign_hub_core::NewContact;
use campaign_hub_core::NewRegistration;
use campaign_hub_core::NewVolunteer;
use campaign_hub_core::validation;
use campaign_hub_store_sqlite::SubscribeOutcome;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::audit::ApiAuditEvent;
use crate::error::ApiError;
use crate::server::AppState;
use crate::server::run_blocking;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default news page size.
const DEFAULT_PAGE_SIZE: i64 = 9;
/// Maximum news page size.
const MAX_PAGE_SIZE: i64 = 50;
/// Subject recorded when a contact omits one.
const DEFAULT_SUBJECT: &str = "General Inquiry";

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// Contact form payload.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    /// Sender name.
    pub name: String,
    /// Sender email address.
    pub email: String,
    /// Optional sender phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Message body.
    pub message: String,
}

/// Newsletter subscribe payload.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    /// Subscriber email address.
    pub email: String,
    /// Optional subscriber name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Newsletter unsubscribe payload.
#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    /// Subscriber email address.
    pub email: String,
}

/// Volunteer signup payload.
#[derive(Debug, Deserialize)]
pub struct VolunteerRequest {
    /// Volunteer name.
    pub name: String,
    /// Volunteer email address.
    pub email: String,
    /// Volunteer phone number.
    pub phone: String,
    /// Optional home ward or town.
    #[serde(default)]
    pub location: Option<String>,
    /// Optional skills summary.
    #[serde(default)]
    pub skills: Option<String>,
    /// Optional availability summary.
    #[serde(default)]
    pub availability: Option<String>,
    /// Optional prior experience.
    #[serde(default)]
    pub experience: Option<String>,
    /// Optional motivation statement.
    #[serde(default)]
    pub motivation: Option<String>,
}

/// News listing query parameters.
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    /// Optional category filter.
    #[serde(default)]
    pub category: Option<String>,
    /// One-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Page size, capped at [`MAX_PAGE_SIZE`].
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

/// Returns the default page number.
const fn default_page() -> i64 {
    1
}

/// Returns the default page size.
const fn default_per_page() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Comment submission payload.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// Commenter name.
    pub name: String,
    /// Commenter email address.
    pub email: String,
    /// Comment body.
    pub comment: String,
}

/// Event registration payload.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    /// Attendee name.
    pub name: String,
    /// Attendee email address.
    pub email: String,
    /// Optional attendee phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional notes for the organizers.
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// SECTION: Request Metadata
// ============================================================================

/// Client metadata extracted from request headers.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    /// Forwarded client IP address when present.
    pub ip_address: Option<String>,
    /// User agent string when present.
    pub user_agent: Option<String>,
}

impl ClientMeta {
    /// Extracts client metadata from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());
        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|agent| validation::sanitize_text(agent, validation::MAX_SHORT_TEXT_LENGTH))
            .filter(|agent| !agent.is_empty());
        Self {
            ip_address,
            user_agent,
        }
    }
}

// ============================================================================
// SECTION: Field Validation
// ============================================================================

/// Sanitizes a required name field.
fn require_name(raw: &str) -> Result<String, ApiError> {
    let name = validation::sanitize_text(raw, validation::MAX_NAME_LENGTH);
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    Ok(name)
}

/// Validates and lower-cases a required email field.
fn require_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if !validation::validate_email(&email) {
        return Err(ApiError::Validation("a valid email address is required".to_string()));
    }
    Ok(email)
}

/// Normalizes an optional phone field, rejecting malformed values.
fn optional_phone(raw: Option<&str>) -> Result<Option<String>, ApiError> {
    match raw.map(str::trim).filter(|phone| !phone.is_empty()) {
        None => Ok(None),
        Some(phone) => validation::normalize_kenyan_phone(phone)
            .map(Some)
            .ok_or_else(|| {
                ApiError::Validation("phone number is not a valid Kenyan number".to_string())
            }),
    }
}

/// Sanitizes an optional short text field to `None` when blank.
fn optional_short_text(raw: Option<&str>) -> Option<String> {
    raw.map(|text| validation::sanitize_text(text, validation::MAX_SHORT_TEXT_LENGTH))
        .filter(|text| !text.is_empty())
}

// ============================================================================
// SECTION: Contact Service
// ============================================================================

/// Validates and stores a contact submission, then sends acknowledgements.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for malformed or spam input.
pub fn submit_contact(
    state: &AppState,
    request: ContactRequest,
    meta: ClientMeta,
) -> Result<Value, ApiError> {
    let name = require_name(&request.name)?;
    let email = require_email(&request.email)?;
    let phone = optional_phone(request.phone.as_deref())?;
    let subject = optional_short_text(request.subject.as_deref())
        .map(|s| validation::sanitize_text(&s, validation::MAX_SUBJECT_LENGTH))
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    let message = validation::sanitize_text(&request.message, validation::MAX_MESSAGE_LENGTH);
    if message.is_empty() {
        return Err(ApiError::Validation("message is required".to_string()));
    }
    if validation::looks_like_spam(&message) {
        state.audit.record(&ApiAuditEvent::new("contact_submit", "rejected").with_detail("spam"));
        return Err(ApiError::Validation("message was rejected".to_string()));
    }
    let id = state.db.insert_contact(&NewContact {
        name: name.clone(),
        email: email.clone(),
        phone,
        subject: subject.clone(),
        message,
        ip_address: meta.ip_address,
        user_agent: meta.user_agent,
    })?;
    if let Err(err) = state.notifier.contact_received(&name, &email, &subject) {
        state
            .audit
            .record(&ApiAuditEvent::new("contact_notify", "error").with_detail(&err.to_string()));
    }
    state.audit.record(&ApiAuditEvent::new("contact_submit", "ok").with_record(id));
    Ok(json!({
        "success": true,
        "message": "Thank you for your message. We will get back to you soon.",
        "id": id,
    }))
}

/// `POST /api/contact`
pub async fn contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ContactRequest>,
) -> Result<Json<Value>, ApiError> {
    let meta = ClientMeta::from_headers(&headers);
    let value = run_blocking(move || submit_contact(&state, request, meta)).await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Newsletter Service
// ============================================================================

/// Subscribes an email address; a live subscription yields a conflict.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for malformed addresses and
/// [`ApiError::Conflict`] when the address is already subscribed.
pub fn subscribe_newsletter(
    state: &AppState,
    request: SubscribeRequest,
    meta: ClientMeta,
) -> Result<Value, ApiError> {
    let email = require_email(&request.email)?;
    let name = optional_short_text(request.name.as_deref());
    let outcome =
        state
            .db
            .subscribe_newsletter(&email, name.as_deref(), meta.ip_address.as_deref())?;
    if outcome == SubscribeOutcome::AlreadySubscribed {
        state.audit.record(&ApiAuditEvent::new("newsletter_subscribe", "rejected"));
        return Err(ApiError::Conflict("You are already subscribed.".to_string()));
    }
    if let Err(err) = state.notifier.newsletter_welcome(&email, name.as_deref()) {
        state
            .audit
            .record(&ApiAuditEvent::new("newsletter_notify", "error").with_detail(&err.to_string()));
    }
    state.audit.record(&ApiAuditEvent::new("newsletter_subscribe", "ok"));
    Ok(json!({
        "success": true,
        "message": "You are subscribed to campaign updates.",
    }))
}

/// `POST /api/newsletter/subscribe`
pub async fn newsletter_subscribe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<Value>, ApiError> {
    let meta = ClientMeta::from_headers(&headers);
    let value = run_blocking(move || subscribe_newsletter(&state, request, meta)).await?;
    Ok(Json(value))
}

/// Unsubscribes an email address.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when no active subscription exists.
pub fn unsubscribe_newsletter(
    state: &AppState,
    request: UnsubscribeRequest,
) -> Result<Value, ApiError> {
    let email = require_email(&request.email)?;
    if !state.db.unsubscribe_newsletter(&email)? {
        return Err(ApiError::NotFound("no active subscription for this address".to_string()));
    }
    state.audit.record(&ApiAuditEvent::new("newsletter_unsubscribe", "ok"));
    Ok(json!({
        "success": true,
        "message": "You have been unsubscribed.",
    }))
}

/// `POST /api/newsletter/unsubscribe`
pub async fn newsletter_unsubscribe(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || unsubscribe_newsletter(&state, request)).await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Volunteer Service
// ============================================================================

/// Validates and stores a volunteer signup, then acknowledges it.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for malformed input.
pub fn submit_volunteer(
    state: &AppState,
    request: VolunteerRequest,
    meta: ClientMeta,
) -> Result<Value, ApiError> {
    let name = require_name(&request.name)?;
    let email = require_email(&request.email)?;
    let phone = validation::normalize_kenyan_phone(&request.phone).ok_or_else(|| {
        ApiError::Validation("phone number is not a valid Kenyan number".to_string())
    })?;
    let id = state.db.insert_volunteer(&NewVolunteer {
        name: name.clone(),
        email: email.clone(),
        phone,
        location: optional_short_text(request.location.as_deref()),
        skills: optional_short_text(request.skills.as_deref()),
        availability: optional_short_text(request.availability.as_deref()),
        experience: optional_short_text(request.experience.as_deref()),
        motivation: optional_short_text(request.motivation.as_deref()),
        ip_address: meta.ip_address,
    })?;
    if let Err(err) = state.notifier.volunteer_received(&name, &email) {
        state
            .audit
            .record(&ApiAuditEvent::new("volunteer_notify", "error").with_detail(&err.to_string()));
    }
    state.audit.record(&ApiAuditEvent::new("volunteer_signup", "ok").with_record(id));
    Ok(json!({
        "success": true,
        "message": "Thank you for volunteering. Our team will reach out soon.",
        "id": id,
    }))
}

/// `POST /api/volunteer`
pub async fn volunteer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<VolunteerRequest>,
) -> Result<Json<Value>, ApiError> {
    let meta = ClientMeta::from_headers(&headers);
    let value = run_blocking(move || submit_volunteer(&state, request, meta)).await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: News Service
// ============================================================================

/// Returns one page of published articles.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] on store failure.
pub fn fetch_news_page(state: &AppState, query: &NewsQuery) -> Result<Value, ApiError> {
    let per_page = query.per_page.clamp(1, MAX_PAGE_SIZE);
    let page = query.page.max(1);
    let offset = page.saturating_sub(1).saturating_mul(per_page);
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty());
    let (articles, total) = state.db.list_published_articles(category, per_page, offset)?;
    let pages = if total == 0 {
        0
    } else {
        (total.saturating_add(per_page).saturating_sub(1)) / per_page
    };
    Ok(json!({
        "success": true,
        "articles": articles,
        "page": page,
        "per_page": per_page,
        "total": total,
        "pages": pages,
    }))
}

/// `GET /api/news`
pub async fn news_index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || fetch_news_page(&state, &query)).await?;
    Ok(Json(value))
}

/// `GET /api/news/categories`
pub async fn news_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let categories = state.db.list_categories()?;
        Ok(json!({
            "success": true,
            "categories": categories,
        }))
    })
    .await?;
    Ok(Json(value))
}

/// Returns one published article by slug or id, counting the view.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the key does not resolve.
pub fn fetch_article(state: &AppState, key: &str) -> Result<Value, ApiError> {
    let article = state
        .db
        .read_published_article(key)?
        .ok_or_else(|| ApiError::NotFound("article not found".to_string()))?;
    Ok(json!({
        "success": true,
        "article": article,
    }))
}

/// `GET /api/news/{key}`
pub async fn news_detail(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || fetch_article(&state, &key)).await?;
    Ok(Json(value))
}

/// `POST /api/news/{key}/like`
pub async fn news_like(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let likes = state
            .db
            .like_article(&key)?
            .ok_or_else(|| ApiError::NotFound("article not found".to_string()))?;
        Ok(json!({
            "success": true,
            "likes": likes,
        }))
    })
    .await?;
    Ok(Json(value))
}

/// `POST /api/news/{key}/share`
pub async fn news_share(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let shares = state
            .db
            .share_article(&key)?
            .ok_or_else(|| ApiError::NotFound("article not found".to_string()))?;
        Ok(json!({
            "success": true,
            "shares": shares,
        }))
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/news/{key}/metrics`
pub async fn news_metrics(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let metrics = state
            .db
            .article_metrics(&key)?
            .ok_or_else(|| ApiError::NotFound("article not found".to_string()))?;
        Ok(json!({
            "success": true,
            "metrics": metrics,
        }))
    })
    .await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Comment Service
// ============================================================================

/// Stores a comment for moderation on a published article.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the article key does not resolve.
pub fn submit_comment(
    state: &AppState,
    key: &str,
    request: CommentRequest,
) -> Result<Value, ApiError> {
    let name = require_name(&request.name)?;
    let email = require_email(&request.email)?;
    let body = validation::sanitize_text(&request.comment, validation::MAX_MESSAGE_LENGTH);
    if body.is_empty() {
        return Err(ApiError::Validation("comment is required".to_string()));
    }
    if validation::looks_like_spam(&body) {
        state.audit.record(&ApiAuditEvent::new("comment_submit", "rejected").with_detail("spam"));
        return Err(ApiError::Validation("comment was rejected".to_string()));
    }
    let id = state
        .db
        .insert_comment(key, &name, &email, &body)?
        .ok_or_else(|| ApiError::NotFound("article not found".to_string()))?;
    state.audit.record(&ApiAuditEvent::new("comment_submit", "ok").with_record(id));
    Ok(json!({
        "success": true,
        "message": "Your comment was received and is awaiting moderation.",
        "id": id,
    }))
}

/// `POST /api/news/{key}/comments`
pub async fn comment_create(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || submit_comment(&state, &key, request)).await?;
    Ok(Json(value))
}

/// `GET /api/news/{key}/comments`
pub async fn comment_index(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let comments = state
            .db
            .list_approved_comments(&key)?
            .ok_or_else(|| ApiError::NotFound("article not found".to_string()))?;
        Ok(json!({
            "success": true,
            "comments": comments,
        }))
    })
    .await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Event Service
// ============================================================================

/// Serializes an event with its confirmed count and remaining capacity.
fn event_json(event: &campaign_hub_core::Event, confirmed: i64) -> Result<Value, ApiError> {
    let mut value =
        serde_json::to_value(event).map_err(|err| ApiError::Internal(err.to_string()))?;
    if let Some(object) = value.as_object_mut() {
        object.insert("confirmed_attendees".to_string(), json!(confirmed));
        let spots = event
            .max_attendees
            .map(|max| i64::from(max).saturating_sub(confirmed).max(0));
        object.insert("spots_remaining".to_string(), json!(spots));
    }
    Ok(value)
}

/// Returns upcoming and ongoing events with attendance counts.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] on store failure.
pub fn fetch_events(state: &AppState) -> Result<Value, ApiError> {
    let events = state
        .db
        .list_public_events()?
        .iter()
        .map(|(event, confirmed)| event_json(event, *confirmed))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "success": true,
        "events": events,
    }))
}

/// `GET /api/events`
pub async fn events_index(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || fetch_events(&state)).await?;
    Ok(Json(value))
}

/// Returns one event with attendance counts.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the event does not exist.
pub fn fetch_event(state: &AppState, event_id: i64) -> Result<Value, ApiError> {
    let (event, confirmed) = state
        .db
        .get_event(event_id)?
        .ok_or_else(|| ApiError::NotFound("event not found".to_string()))?;
    Ok(json!({
        "success": true,
        "event": event_json(&event, confirmed)?,
    }))
}

/// `GET /api/events/{id}`
pub async fn event_detail(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || fetch_event(&state, event_id)).await?;
    Ok(Json(value))
}

/// Registers an attendee for an event inside one transaction.
///
/// # Errors
///
/// Returns the mapped [`RegistrationError`](campaign_hub_store_sqlite::RegistrationError)
/// for duplicate, closed, missing, or full events.
pub fn register_for_event(
    state: &AppState,
    event_id: i64,
    request: RegistrationRequest,
) -> Result<Value, ApiError> {
    let name = require_name(&request.name)?;
    let email = require_email(&request.email)?;
    let phone = optional_phone(request.phone.as_deref())?;
    let registration = NewRegistration {
        name: name.clone(),
        email: email.clone(),
        phone,
        notes: optional_short_text(request.notes.as_deref()),
    };
    let (event, _) = state
        .db
        .get_event(event_id)?
        .ok_or_else(|| ApiError::NotFound("event not found".to_string()))?;
    let registration_id = match state.db.register_attendee(event_id, &registration) {
        Ok(id) => id,
        Err(err) => {
            state
                .audit
                .record(&ApiAuditEvent::new("event_register", "rejected").with_record(event_id));
            return Err(ApiError::from(err));
        }
    };
    if let Err(err) =
        state.notifier.registration_confirmed(&name, &email, &event.title, &event.starts_at)
    {
        state
            .audit
            .record(&ApiAuditEvent::new("event_notify", "error").with_detail(&err.to_string()));
    }
    state.audit.record(&ApiAuditEvent::new("event_register", "ok").with_record(registration_id));
    Ok(json!({
        "success": true,
        "message": "Your registration is confirmed.",
        "registration_id": registration_id,
        "event": event.title,
    }))
}

/// `POST /api/events/{id}/register`
pub async fn event_register(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Json(request): Json<RegistrationRequest>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || register_for_event(&state, event_id, request)).await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Agenda and Social
// ============================================================================

/// `GET /api/agenda`
pub async fn agenda_index(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let items = state.db.list_agenda_items()?;
        Ok(json!({
            "success": true,
            "agenda": items,
        }))
    })
    .await?;
    Ok(Json(value))
}

/// Returns the static social media feed links.
#[must_use]
pub fn social_feed() -> Value {
    json!({
        "success": true,
        "feed": [
            {"platform": "facebook", "handle": "campaignhub", "url": "https://facebook.com/campaignhub"},
            {"platform": "twitter", "handle": "@campaignhub", "url": "https://twitter.com/campaignhub"},
            {"platform": "instagram", "handle": "@campaignhub", "url": "https://instagram.com/campaignhub"},
        ],
    })
}

/// `GET /api/social/feed`
pub async fn social_index() -> Json<Value> {
    Json(social_feed())
}

/// `GET /`
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "service": "campaign-hub",
        "status": "ok",
        "timestamp_ms": campaign_hub_core::unix_millis(),
    }))
}
