// crates/campaign-hub-server/src/admin.rs
// ============================================================================
// Module: Admin Endpoints
// Description: Login plus bearer-gated content and submission management.
// Purpose: Manage articles, events, agenda, moderation, and inboxes.
// Dependencies: axum, campaign-hub-core, campaign-hub-store-sqlite, serde,
//               serde_json
// ============================================================================

//! ## Overview
//! Every endpoint except login resolves the request's bearer token to an
//! admin account before touching the store. Write payloads are converted to
//! the core draft types with full validation; status labels arrive as plain
//! strings and are parsed fail-closed. Mutations audit the acting username.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use campaign_hub_core::AgendaDraft;
use campaign_hub_core::AgendaPriority;
use campaign_hub_core::AgendaStatus;
use campaign_hub_core::ArticleDraft;
use campaign_hub_core::ArticleStatus;
use campaign_hub_core::EventDraft;
use campaign_hub_core::EventStatus;
use campaign_hub_core::validation;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::audit::ApiAuditEvent;
use crate::auth;
use crate::error::ApiError;
use crate::server::AppState;
use crate::server::run_blocking;

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// Admin login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin username.
    pub username: String,
    /// Admin password.
    pub password: String,
}

/// Article create/update payload.
#[derive(Debug, Deserialize)]
pub struct ArticlePayload {
    /// Article title.
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    #[serde(default)]
    pub slug: Option<String>,
    /// Optional teaser excerpt.
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Article body.
    pub content: String,
    /// Optional hero image URL.
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Optional author display name.
    #[serde(default)]
    pub author: Option<String>,
    /// Optional category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Status label; defaults to `draft`.
    #[serde(default)]
    pub status: Option<String>,
    /// Free-form tag list.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Event create/update payload.
#[derive(Debug, Deserialize)]
pub struct EventPayload {
    /// Event title.
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    #[serde(default)]
    pub slug: Option<String>,
    /// Optional event description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional venue.
    #[serde(default)]
    pub location: Option<String>,
    /// Start time as an RFC 3339 timestamp.
    pub starts_at: String,
    /// Optional end time as an RFC 3339 timestamp.
    #[serde(default)]
    pub ends_at: Option<String>,
    /// Optional hero image URL.
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Status label; defaults to `upcoming`.
    #[serde(default)]
    pub status: Option<String>,
    /// Optional attendee limit; must be positive when present.
    #[serde(default)]
    pub max_attendees: Option<u32>,
    /// Whether attendees must register; defaults to true.
    #[serde(default = "default_registration_required")]
    pub registration_required: bool,
}

/// Returns the default for `registration_required`.
const fn default_registration_required() -> bool {
    true
}

/// Agenda item create/update payload.
#[derive(Debug, Deserialize)]
pub struct AgendaPayload {
    /// Agenda item title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Priority label; defaults to `medium`.
    #[serde(default)]
    pub priority: Option<String>,
    /// Status label; defaults to `planned`.
    #[serde(default)]
    pub status: Option<String>,
    /// Optional target date as an RFC 3339 timestamp.
    #[serde(default)]
    pub target_date: Option<String>,
    /// Completion percentage, 0 to 100.
    #[serde(default)]
    pub progress_percent: u8,
}

// ============================================================================
// SECTION: Payload Conversion
// ============================================================================

/// Sanitizes a required title field.
fn require_title(raw: &str) -> Result<String, ApiError> {
    let title = validation::sanitize_text(raw, validation::MAX_SUBJECT_LENGTH);
    if title.is_empty() {
        return Err(ApiError::Validation("title is required".to_string()));
    }
    Ok(title)
}

/// Normalizes an optional explicit slug to its canonical form.
fn optional_slug(raw: Option<&str>) -> Result<Option<String>, ApiError> {
    match raw.map(str::trim).filter(|slug| !slug.is_empty()) {
        None => Ok(None),
        Some(slug) => {
            if slug.len() > validation::MAX_SLUG_LENGTH {
                return Err(ApiError::Validation("slug is too long".to_string()));
            }
            let canonical = validation::slugify(slug);
            if canonical.is_empty() {
                return Err(ApiError::Validation("slug has no usable characters".to_string()));
            }
            Ok(Some(canonical))
        }
    }
}

/// Sanitizes an optional short text field to `None` when blank.
fn optional_short_text(raw: Option<&str>) -> Option<String> {
    raw.map(|text| validation::sanitize_text(text, validation::MAX_SHORT_TEXT_LENGTH))
        .filter(|text| !text.is_empty())
}

/// Validates an optional RFC 3339 timestamp field.
fn optional_timestamp(raw: Option<&str>, field: &str) -> Result<Option<String>, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => {
            if !validation::validate_rfc3339(value) {
                return Err(ApiError::Validation(format!(
                    "{field} must be an RFC 3339 timestamp"
                )));
            }
            Ok(Some(value.to_string()))
        }
    }
}

/// Converts an article payload into a validated draft.
fn article_draft(payload: ArticlePayload) -> Result<ArticleDraft, ApiError> {
    let title = require_title(&payload.title)?;
    let content = payload.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::Validation("content is required".to_string()));
    }
    if content.len() > validation::MAX_CONTENT_LENGTH {
        return Err(ApiError::Validation("content is too long".to_string()));
    }
    let status = match payload.status.as_deref() {
        None => ArticleStatus::Draft,
        Some(label) => ArticleStatus::parse(label)
            .map_err(|err| ApiError::Validation(err.to_string()))?,
    };
    let tags = payload
        .tags
        .iter()
        .map(|tag| validation::sanitize_text(tag, validation::MAX_NAME_LENGTH))
        .filter(|tag| !tag.is_empty())
        .collect();
    Ok(ArticleDraft {
        title,
        slug: optional_slug(payload.slug.as_deref())?,
        excerpt: optional_short_text(payload.excerpt.as_deref()),
        content,
        featured_image: optional_short_text(payload.featured_image.as_deref()),
        author: optional_short_text(payload.author.as_deref()),
        category: optional_short_text(payload.category.as_deref()),
        status,
        tags,
    })
}

/// Converts an event payload into a validated draft.
fn event_draft(payload: EventPayload) -> Result<EventDraft, ApiError> {
    let title = require_title(&payload.title)?;
    let starts_at = optional_timestamp(Some(payload.starts_at.as_str()), "starts_at")?
        .ok_or_else(|| ApiError::Validation("starts_at is required".to_string()))?;
    let status = match payload.status.as_deref() {
        None => EventStatus::Upcoming,
        Some(label) => {
            EventStatus::parse(label).map_err(|err| ApiError::Validation(err.to_string()))?
        }
    };
    if payload.max_attendees == Some(0) {
        return Err(ApiError::Validation("max_attendees must be positive".to_string()));
    }
    Ok(EventDraft {
        title,
        slug: optional_slug(payload.slug.as_deref())?,
        description: optional_short_text(payload.description.as_deref()),
        location: optional_short_text(payload.location.as_deref()),
        starts_at,
        ends_at: optional_timestamp(payload.ends_at.as_deref(), "ends_at")?,
        featured_image: optional_short_text(payload.featured_image.as_deref()),
        status,
        max_attendees: payload.max_attendees,
        registration_required: payload.registration_required,
    })
}

/// Converts an agenda payload into a validated draft.
fn agenda_draft(payload: AgendaPayload) -> Result<AgendaDraft, ApiError> {
    let title = require_title(&payload.title)?;
    let priority = match payload.priority.as_deref() {
        None => AgendaPriority::Medium,
        Some(label) => {
            AgendaPriority::parse(label).map_err(|err| ApiError::Validation(err.to_string()))?
        }
    };
    let status = match payload.status.as_deref() {
        None => AgendaStatus::Planned,
        Some(label) => {
            AgendaStatus::parse(label).map_err(|err| ApiError::Validation(err.to_string()))?
        }
    };
    if payload.progress_percent > 100 {
        return Err(ApiError::Validation("progress_percent must be 0 to 100".to_string()));
    }
    Ok(AgendaDraft {
        title,
        description: optional_short_text(payload.description.as_deref()),
        category: optional_short_text(payload.category.as_deref()),
        priority,
        status,
        target_date: optional_timestamp(payload.target_date.as_deref(), "target_date")?,
        progress_percent: payload.progress_percent,
    })
}

// ============================================================================
// SECTION: Login
// ============================================================================

/// Verifies credentials and issues a bearer session.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for invalid credentials.
pub fn login_admin(state: &AppState, request: &LoginRequest) -> Result<Value, ApiError> {
    let session = match auth::login(&state.db, request.username.trim(), &request.password) {
        Ok(session) => session,
        Err(err) => {
            state.audit.record(&ApiAuditEvent::new("admin_login", "rejected"));
            return Err(err);
        }
    };
    state
        .audit
        .record(&ApiAuditEvent::new("admin_login", "ok").with_actor(&session.admin.username));
    Ok(json!({
        "success": true,
        "token": session.token,
        "expires_at_ms": session.expires_at_ms,
        "admin": {
            "username": session.admin.username,
            "email": session.admin.email,
            "role": session.admin.role,
        },
    }))
}

/// `POST /api/admin/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || login_admin(&state, &request)).await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Inboxes
// ============================================================================

/// `GET /api/admin/contacts`
pub async fn contacts_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        auth::require_admin(&state.db, &headers)?;
        let contacts = state.db.list_contacts()?;
        Ok(json!({ "success": true, "contacts": contacts }))
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/admin/subscriptions`
pub async fn subscriptions_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        auth::require_admin(&state.db, &headers)?;
        let subscriptions = state.db.list_subscriptions()?;
        Ok(json!({ "success": true, "subscriptions": subscriptions }))
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/admin/volunteers`
pub async fn volunteers_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        auth::require_admin(&state.db, &headers)?;
        let volunteers = state.db.list_volunteers()?;
        Ok(json!({ "success": true, "volunteers": volunteers }))
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/admin/donations`
pub async fn donations_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        auth::require_admin(&state.db, &headers)?;
        let donations = state.db.list_donations()?;
        Ok(json!({ "success": true, "donations": donations }))
    })
    .await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Articles
// ============================================================================

/// Creates an article from an admin payload.
///
/// # Errors
///
/// Returns [`ApiError::Conflict`] when the slug is already taken.
pub fn create_article(
    state: &AppState,
    actor: &str,
    payload: ArticlePayload,
) -> Result<Value, ApiError> {
    let draft = article_draft(payload)?;
    let id = state.db.create_article(&draft)?;
    state
        .audit
        .record(&ApiAuditEvent::new("article_create", "ok").with_record(id).with_actor(actor));
    Ok(json!({ "success": true, "id": id }))
}

/// `GET /api/admin/news`
pub async fn news_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        auth::require_admin(&state.db, &headers)?;
        let articles = state.db.list_all_articles()?;
        Ok(json!({ "success": true, "articles": articles }))
    })
    .await?;
    Ok(Json(value))
}

/// `POST /api/admin/news`
pub async fn news_create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ArticlePayload>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        create_article(&state, &admin.username, payload)
    })
    .await?;
    Ok(Json(value))
}

/// `PUT /api/admin/news/{id}`
pub async fn news_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(article_id): Path<i64>,
    Json(payload): Json<ArticlePayload>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        let draft = article_draft(payload)?;
        if !state.db.update_article(article_id, &draft)? {
            return Err(ApiError::NotFound("article not found".to_string()));
        }
        state.audit.record(
            &ApiAuditEvent::new("article_update", "ok")
                .with_record(article_id)
                .with_actor(&admin.username),
        );
        Ok(json!({ "success": true }))
    })
    .await?;
    Ok(Json(value))
}

/// `DELETE /api/admin/news/{id}`
pub async fn news_delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(article_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        if !state.db.delete_article(article_id)? {
            return Err(ApiError::NotFound("article not found".to_string()));
        }
        state.audit.record(
            &ApiAuditEvent::new("article_delete", "ok")
                .with_record(article_id)
                .with_actor(&admin.username),
        );
        Ok(json!({ "success": true }))
    })
    .await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Creates an event from an admin payload.
///
/// # Errors
///
/// Returns [`ApiError::Conflict`] when the slug is already taken.
pub fn create_event(
    state: &AppState,
    actor: &str,
    payload: EventPayload,
) -> Result<Value, ApiError> {
    let draft = event_draft(payload)?;
    let id = state.db.create_event(&draft)?;
    state
        .audit
        .record(&ApiAuditEvent::new("event_create", "ok").with_record(id).with_actor(actor));
    Ok(json!({ "success": true, "id": id }))
}

/// `GET /api/admin/events`
pub async fn events_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        auth::require_admin(&state.db, &headers)?;
        let events = state
            .db
            .list_all_events()?
            .iter()
            .map(|(event, confirmed)| {
                let mut value = serde_json::to_value(event)
                    .map_err(|err| ApiError::Internal(err.to_string()))?;
                if let Some(object) = value.as_object_mut() {
                    object.insert("confirmed_attendees".to_string(), json!(confirmed));
                }
                Ok(value)
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(json!({ "success": true, "events": events }))
    })
    .await?;
    Ok(Json(value))
}

/// `POST /api/admin/events`
pub async fn events_create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<EventPayload>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        create_event(&state, &admin.username, payload)
    })
    .await?;
    Ok(Json(value))
}

/// `PUT /api/admin/events/{id}`
pub async fn events_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
    Json(payload): Json<EventPayload>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        let draft = event_draft(payload)?;
        if !state.db.update_event(event_id, &draft)? {
            return Err(ApiError::NotFound("event not found".to_string()));
        }
        state.audit.record(
            &ApiAuditEvent::new("event_update", "ok")
                .with_record(event_id)
                .with_actor(&admin.username),
        );
        Ok(json!({ "success": true }))
    })
    .await?;
    Ok(Json(value))
}

/// `DELETE /api/admin/events/{id}`
pub async fn events_delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        if !state.db.delete_event(event_id)? {
            return Err(ApiError::NotFound("event not found".to_string()));
        }
        state.audit.record(
            &ApiAuditEvent::new("event_delete", "ok")
                .with_record(event_id)
                .with_actor(&admin.username),
        );
        Ok(json!({ "success": true }))
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/admin/events/{id}/registrations`
pub async fn event_registrations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        auth::require_admin(&state.db, &headers)?;
        if state.db.get_event(event_id)?.is_none() {
            return Err(ApiError::NotFound("event not found".to_string()));
        }
        let registrations = state.db.list_registrations(event_id)?;
        Ok(json!({ "success": true, "registrations": registrations }))
    })
    .await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Agenda
// ============================================================================

/// `POST /api/admin/agenda`
pub async fn agenda_create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AgendaPayload>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        let draft = agenda_draft(payload)?;
        let id = state.db.create_agenda_item(&draft)?;
        state.audit.record(
            &ApiAuditEvent::new("agenda_create", "ok").with_record(id).with_actor(&admin.username),
        );
        Ok(json!({ "success": true, "id": id }))
    })
    .await?;
    Ok(Json(value))
}

/// `PUT /api/admin/agenda/{id}`
pub async fn agenda_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(item_id): Path<i64>,
    Json(payload): Json<AgendaPayload>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        let draft = agenda_draft(payload)?;
        if !state.db.update_agenda_item(item_id, &draft)? {
            return Err(ApiError::NotFound("agenda item not found".to_string()));
        }
        state.audit.record(
            &ApiAuditEvent::new("agenda_update", "ok")
                .with_record(item_id)
                .with_actor(&admin.username),
        );
        Ok(json!({ "success": true }))
    })
    .await?;
    Ok(Json(value))
}

/// `DELETE /api/admin/agenda/{id}`
pub async fn agenda_delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(item_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        if !state.db.delete_agenda_item(item_id)? {
            return Err(ApiError::NotFound("agenda item not found".to_string()));
        }
        state.audit.record(
            &ApiAuditEvent::new("agenda_delete", "ok")
                .with_record(item_id)
                .with_actor(&admin.username),
        );
        Ok(json!({ "success": true }))
    })
    .await?;
    Ok(Json(value))
}

// ============================================================================
// SECTION: Comment Moderation
// ============================================================================

/// `GET /api/admin/comments`
pub async fn comments_pending(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        auth::require_admin(&state.db, &headers)?;
        let comments = state.db.list_pending_comments()?;
        Ok(json!({ "success": true, "comments": comments }))
    })
    .await?;
    Ok(Json(value))
}

/// `POST /api/admin/comments/{id}/approve`
pub async fn comment_approve(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(comment_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        if !state.db.approve_comment(comment_id)? {
            return Err(ApiError::NotFound("pending comment not found".to_string()));
        }
        state.audit.record(
            &ApiAuditEvent::new("comment_approve", "ok")
                .with_record(comment_id)
                .with_actor(&admin.username),
        );
        Ok(json!({ "success": true }))
    })
    .await?;
    Ok(Json(value))
}

/// `DELETE /api/admin/comments/{id}`
pub async fn comment_delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(comment_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let value = run_blocking(move || {
        let admin = auth::require_admin(&state.db, &headers)?;
        if !state.db.delete_comment(comment_id)? {
            return Err(ApiError::NotFound("comment not found".to_string()));
        }
        state.audit.record(
            &ApiAuditEvent::new("comment_delete", "ok")
                .with_record(comment_id)
                .with_actor(&admin.username),
        );
        Ok(json!({ "success": true }))
    })
    .await?;
    Ok(Json(value))
}
