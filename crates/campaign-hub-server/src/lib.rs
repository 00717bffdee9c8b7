// crates/campaign-hub-server/src/lib.rs
// ============================================================================
// Module: Campaign Hub Server
// Description: Axum HTTP API over the campaign store.
// Purpose: Serve public submissions, CMS reads, payments, and the admin API.
// Dependencies: axum, campaign-hub-config, campaign-hub-core,
//               campaign-hub-store-sqlite, lettre, reqwest, serde, tower-http
// ============================================================================

//! ## Overview
//! The server exposes a JSON API in three rings: public endpoints (contact,
//! newsletter, volunteers, news, events, agenda), payment endpoints backed by
//! an M-Pesa STK push client, and a bearer-token admin API for content
//! management. Handlers validate at the boundary, run store work on blocking
//! worker threads, and emit structured audit events for every mutation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod admin;
pub mod audit;
pub mod auth;
pub mod error;
pub mod mpesa;
pub mod notify;
pub mod payments;
pub mod public;
pub mod seed;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiAuditEvent;
pub use audit::ApiAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use error::ApiError;
pub use mpesa::MpesaClient;
pub use notify::LogNotifier;
pub use notify::Notifier;
pub use notify::SmtpNotifier;
pub use server::AppState;
pub use server::CampaignServer;
