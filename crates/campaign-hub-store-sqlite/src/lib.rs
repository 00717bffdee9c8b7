// crates/campaign-hub-store-sqlite/src/lib.rs
// ============================================================================
// Module: Campaign Hub SQLite Store
// Description: Durable campaign store backed by a single SQLite file.
// Purpose: Persist every public submission and admin-managed record.
// Dependencies: campaign-hub-config, campaign-hub-core, rusqlite, thiserror
// ============================================================================

//! ## Overview
//! All campaign state (contacts, subscriptions, volunteers, donations,
//! articles, comments, events, registrations, agenda items, admin accounts)
//! lives in one `SQLite` database opened in WAL mode. Writes that must be
//! atomic, such as capacity-checked event registration, run inside a single
//! transaction on the shared connection.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::CampaignDb;
pub use store::RegistrationError;
pub use store::StoreError;
pub use store::SubscribeOutcome;
