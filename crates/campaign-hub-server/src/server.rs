// crates/campaign-hub-server/src/server.rs
// ============================================================================
// Module: HTTP Server Assembly
// Description: Application state, routing, CORS, and serving.
// Purpose: Wire config, store, notifier, payments, and audit into one router.
// Dependencies: axum, campaign-hub-config, campaign-hub-store-sqlite, tokio,
//               tower-http
// ============================================================================

//! ## Overview
//! [`CampaignServer::from_config`] opens the store, seeds content, and picks
//! the notifier and payment client implied by configuration. The router is a
//! plain axum route table with a CORS layer restricted to the configured
//! origins and a body size cap. Store work never runs on the async executor;
//! handlers move it onto blocking worker threads through [`run_blocking`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::header;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use campaign_hub_config::CampaignConfig;
use campaign_hub_store_sqlite::CampaignDb;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;

use crate::admin;
use crate::audit::ApiAuditSink;
use crate::audit::StderrAuditSink;
use crate::error::ApiError;
use crate::mpesa::MpesaClient;
use crate::notify::LogNotifier;
use crate::notify::Notifier;
use crate::notify::SmtpNotifier;
use crate::payments;
use crate::public;
use crate::seed;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server construction and serving errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Store open or seeding failure.
    #[error("store error: {0}")]
    Store(String),
    /// Notifier construction failure.
    #[error("notifier error: {0}")]
    Notify(String),
    /// Payment client construction failure.
    #[error("payment client error: {0}")]
    Payment(String),
    /// Bind or serve failure.
    #[error("server io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared application state handed to every handler.
pub struct AppState {
    /// Campaign database.
    pub db: CampaignDb,
    /// Outbound notification seam.
    pub notifier: Arc<dyn Notifier>,
    /// Audit sink for API events.
    pub audit: Arc<dyn ApiAuditSink>,
    /// Payment client when payments are enabled.
    pub mpesa: Option<MpesaClient>,
}

/// Runs a synchronous service function on a blocking worker thread.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] when the worker task is cancelled.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Assembled campaign server.
pub struct CampaignServer {
    /// Loaded configuration.
    config: CampaignConfig,
    /// Shared application state.
    state: Arc<AppState>,
}

impl CampaignServer {
    /// Builds the server from configuration.
    ///
    /// Opens the store, seeds default articles when enabled, and selects the
    /// SMTP or log notifier and the optional payment client.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when any component cannot be constructed.
    pub fn from_config(config: CampaignConfig) -> Result<Self, ServerError> {
        let notifier: Arc<dyn Notifier> = if config.mail.enabled {
            Arc::new(SmtpNotifier::new(&config.mail).map_err(|err| ServerError::Notify(err.to_string()))?)
        } else {
            Arc::new(LogNotifier)
        };
        Self::with_components(config, notifier, Arc::new(StderrAuditSink))
    }

    /// Builds the server with explicit notifier and audit sink components.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the store or payment client cannot be
    /// constructed.
    pub fn with_components(
        config: CampaignConfig,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn ApiAuditSink>,
    ) -> Result<Self, ServerError> {
        let db = CampaignDb::open(&config.database)
            .map_err(|err| ServerError::Store(err.to_string()))?;
        if config.content.seed_articles {
            db.seed_articles(&seed::default_articles())
                .map_err(|err| ServerError::Store(err.to_string()))?;
        }
        let mpesa = if config.mpesa.enabled {
            Some(
                MpesaClient::new(config.mpesa.clone())
                    .map_err(|err| ServerError::Payment(err.to_string()))?,
            )
        } else {
            None
        };
        let state = Arc::new(AppState {
            db,
            notifier,
            audit,
            mpesa,
        });
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the shared application state.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Builds the full route table.
    #[must_use]
    pub fn router(&self) -> Router {
        let cors = cors_layer(&self.config.server.cors_origins);
        Router::new()
            .route("/", get(public::health))
            .route("/api/contact", post(public::contact))
            .route("/api/newsletter/subscribe", post(public::newsletter_subscribe))
            .route("/api/newsletter/unsubscribe", post(public::newsletter_unsubscribe))
            .route("/api/volunteer", post(public::volunteer))
            .route("/api/news", get(public::news_index))
            .route("/api/news/categories", get(public::news_categories))
            .route("/api/news/{key}", get(public::news_detail))
            .route("/api/news/{key}/like", post(public::news_like))
            .route("/api/news/{key}/share", post(public::news_share))
            .route("/api/news/{key}/metrics", get(public::news_metrics))
            .route(
                "/api/news/{key}/comments",
                get(public::comment_index).post(public::comment_create),
            )
            .route("/api/events", get(public::events_index))
            .route("/api/events/{id}", get(public::event_detail))
            .route("/api/events/{id}/register", post(public::event_register))
            .route("/api/agenda", get(public::agenda_index))
            .route("/api/social/feed", get(public::social_index))
            .route("/api/donate", post(payments::donate))
            .route("/api/mpesa/callback", post(payments::mpesa_callback))
            .route("/api/admin/login", post(admin::login))
            .route("/api/admin/contacts", get(admin::contacts_index))
            .route("/api/admin/subscriptions", get(admin::subscriptions_index))
            .route("/api/admin/volunteers", get(admin::volunteers_index))
            .route("/api/admin/donations", get(admin::donations_index))
            .route("/api/admin/news", get(admin::news_index).post(admin::news_create))
            .route(
                "/api/admin/news/{id}",
                put(admin::news_update).delete(admin::news_delete),
            )
            .route("/api/admin/events", get(admin::events_index).post(admin::events_create))
            .route(
                "/api/admin/events/{id}",
                put(admin::events_update).delete(admin::events_delete),
            )
            .route("/api/admin/events/{id}/registrations", get(admin::event_registrations))
            .route("/api/admin/agenda", post(admin::agenda_create))
            .route(
                "/api/admin/agenda/{id}",
                put(admin::agenda_update).delete(admin::agenda_delete),
            )
            .route("/api/admin/comments", get(admin::comments_pending))
            .route("/api/admin/comments/{id}/approve", post(admin::comment_approve))
            .route("/api/admin/comments/{id}", delete(admin::comment_delete))
            .layer(DefaultBodyLimit::max(self.config.server.max_body_bytes))
            .layer(cors)
            .with_state(Arc::clone(&self.state))
    }

    /// Binds the configured address and serves until shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] when the listener cannot bind or serving
    /// fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let router = self.router();
        let listener = TcpListener::bind(&self.config.server.bind)
            .await
            .map_err(|err| ServerError::Io(err.to_string()))?;
        axum::serve(listener, router)
            .await
            .map_err(|err| ServerError::Io(err.to_string()))
    }
}

/// Builds the CORS layer for the configured origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> =
        origins.iter().filter_map(|origin| origin.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
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

    use std::sync::Arc;

    use campaign_hub_config::CampaignConfig;

    use super::CampaignServer;
    use crate::audit::NoopAuditSink;
    use crate::notify::LogNotifier;

    #[test]
    fn from_config_seeds_articles_and_skips_payments_when_disabled() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let mut config = CampaignConfig::default();
        config.database.path = dir.path().join("campaign.db");
        let server = CampaignServer::with_components(
            config,
            Arc::new(LogNotifier),
            Arc::new(NoopAuditSink),
        )
        .expect("build server");
        let state = server.state();
        assert!(state.mpesa.is_none());
        let (articles, total) =
            state.db.list_published_articles(None, 10, 0).expect("list seeded");
        assert_eq!(total, 3);
        assert_eq!(articles.len(), 3);
        let _router = server.router();
    }

    #[test]
    fn seeding_can_be_disabled() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let mut config = CampaignConfig::default();
        config.database.path = dir.path().join("campaign.db");
        config.content.seed_articles = false;
        let server = CampaignServer::with_components(
            config,
            Arc::new(LogNotifier),
            Arc::new(NoopAuditSink),
        )
        .expect("build server");
        let (_, total) =
            server.state().db.list_published_articles(None, 10, 0).expect("list");
        assert_eq!(total, 0);
    }
}
