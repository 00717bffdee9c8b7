// crates/campaign-hub-core/src/lib.rs
// ============================================================================
// Module: Campaign Hub Core
// Description: Domain records, validation helpers, and credential hashing.
// Purpose: Provide the shared vocabulary for store, server, and CLI crates.
// Dependencies: serde, sha2, subtle, thiserror, time
// ============================================================================

//! ## Overview
//! Campaign Hub Core defines the flat domain records persisted by the store
//! (contacts, subscriptions, articles, events, registrations, agenda items,
//! volunteers, donations, admin users), the pure validation helpers shared by
//! every submission endpoint, and salted credential hashing for admin login.
//! All inputs are untrusted and validated at the boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod password;
pub mod records;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use records::AdminUser;
pub use records::AgendaDraft;
pub use records::AgendaItem;
pub use records::AgendaPriority;
pub use records::AgendaStatus;
pub use records::ArticleDraft;
pub use records::ArticleMetrics;
pub use records::ArticleStatus;
pub use records::ArticleSummary;
pub use records::Comment;
pub use records::ContactStatus;
pub use records::ContactSubmission;
pub use records::Donation;
pub use records::DonationStatus;
pub use records::Event;
pub use records::EventDraft;
pub use records::EventRegistration;
pub use records::EventStatus;
pub use records::NewContact;
pub use records::NewDonation;
pub use records::NewRegistration;
pub use records::NewVolunteer;
pub use records::NewsArticle;
pub use records::NewsletterSubscription;
pub use records::RecordError;
pub use records::RegistrationStatus;
pub use records::SubscriptionStatus;
pub use records::VolunteerSignup;
pub use records::VolunteerStatus;
pub use records::unix_millis;
