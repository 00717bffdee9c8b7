// crates/campaign-hub-core/src/records.rs
// ============================================================================
// Module: Campaign Domain Records
// Description: Flat persisted records and status enumerations.
// Purpose: Provide typed rows with stable wire labels for every table.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Every record is an independent, flat row with an auto-incrementing
//! identity, a creation timestamp in unix milliseconds, and a status
//! enumeration where relevant. Status enums serialize as stable snake_case
//! labels that match the stored text column exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Record decoding errors.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A stored status label did not match any known variant.
    #[error("unknown {field} label: {label}")]
    UnknownLabel {
        /// Field that carried the label.
        field: &'static str,
        /// Offending label value.
        label: String,
    },
}

// ============================================================================
// SECTION: Time
// ============================================================================

/// Returns the current unix epoch in milliseconds.
#[must_use]
pub fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

// ============================================================================
// SECTION: Status Enumerations
// ============================================================================

/// Contact submission triage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Newly received, not yet read.
    #[default]
    New,
    /// Read by a campaign staffer.
    Read,
    /// Archived after handling.
    Archived,
}

impl ContactStatus {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Read => "read",
            Self::Archived => "archived",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "new" => Ok(Self::New),
            "read" => Ok(Self::Read),
            "archived" => Ok(Self::Archived),
            other => Err(RecordError::UnknownLabel {
                field: "contact status",
                label: other.to_string(),
            }),
        }
    }
}

/// Newsletter subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Receiving the newsletter.
    #[default]
    Active,
    /// Opted out; the row is retained for reactivation.
    Unsubscribed,
}

impl SubscriptionStatus {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Unsubscribed => "unsubscribed",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "active" => Ok(Self::Active),
            "unsubscribed" => Ok(Self::Unsubscribed),
            other => Err(RecordError::UnknownLabel {
                field: "subscription status",
                label: other.to_string(),
            }),
        }
    }
}

/// News article publication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// Not yet visible on the public site.
    #[default]
    Draft,
    /// Live on the public site.
    Published,
    /// Removed from the public site but retained.
    Archived,
}

impl ArticleStatus {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(RecordError::UnknownLabel {
                field: "article status",
                label: other.to_string(),
            }),
        }
    }
}

/// Event lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Scheduled and open to the public.
    #[default]
    Upcoming,
    /// Currently in progress.
    Ongoing,
    /// Finished.
    Completed,
    /// Cancelled before completion.
    Cancelled,
}

impl EventStatus {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(RecordError::UnknownLabel {
                field: "event status",
                label: other.to_string(),
            }),
        }
    }
}

/// Event registration status. Confirmed rows count against capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Holding a seat at the event.
    #[default]
    Confirmed,
    /// Cancelled; does not count against capacity.
    Cancelled,
}

impl RegistrationStatus {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(RecordError::UnknownLabel {
                field: "registration status",
                label: other.to_string(),
            }),
        }
    }
}

/// Agenda item delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgendaStatus {
    /// Planned but not started.
    #[default]
    Planned,
    /// Work underway.
    InProgress,
    /// Delivered.
    Completed,
}

impl AgendaStatus {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "planned" => Ok(Self::Planned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(RecordError::UnknownLabel {
                field: "agenda status",
                label: other.to_string(),
            }),
        }
    }
}

/// Agenda item priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgendaPriority {
    /// Low priority.
    Low,
    /// Medium priority.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl AgendaPriority {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(RecordError::UnknownLabel {
                field: "agenda priority",
                label: other.to_string(),
            }),
        }
    }
}

/// Volunteer vetting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Approved for campaign work.
    Approved,
    /// Declined.
    Declined,
}

impl VolunteerStatus {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            other => Err(RecordError::UnknownLabel {
                field: "volunteer status",
                label: other.to_string(),
            }),
        }
    }
}

/// Donation settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    /// Initiated, awaiting gateway confirmation.
    #[default]
    Pending,
    /// Confirmed by the payment gateway.
    Completed,
    /// Rejected or abandoned at the gateway.
    Failed,
}

impl DonationStatus {
    /// Returns the stable stored label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a stored label.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownLabel`] for unrecognized labels.
    pub fn parse(label: &str) -> Result<Self, RecordError> {
        match label {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(RecordError::UnknownLabel {
                field: "donation status",
                label: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Persisted Records
// ============================================================================

/// A stored contact form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    /// Row identifier.
    pub id: i64,
    /// Sender name.
    pub name: String,
    /// Sender email, stored lower-cased.
    pub email: String,
    /// Optional sender phone in normalized `254…` form.
    pub phone: Option<String>,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Submission time (unix milliseconds).
    pub submitted_at_ms: i64,
    /// Client IP when known.
    pub ip_address: Option<String>,
    /// Client user agent when known.
    pub user_agent: Option<String>,
    /// Triage status.
    pub status: ContactStatus,
}

/// A stored newsletter subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    /// Row identifier.
    pub id: i64,
    /// Subscriber email, unique and lower-cased.
    pub email: String,
    /// Optional subscriber name.
    pub name: Option<String>,
    /// Subscription time (unix milliseconds).
    pub subscribed_at_ms: i64,
    /// Client IP when known.
    pub ip_address: Option<String>,
    /// Subscription status.
    pub status: SubscriptionStatus,
}

/// A stored admin account with salted credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    /// Row identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Unique contact email.
    pub email: String,
    /// Hex-encoded salted SHA-256 of the password.
    pub password_hash: String,
    /// Hex-encoded random salt.
    pub salt: String,
    /// Role label (free-form, defaults to `admin`).
    pub role: String,
    /// Account creation time (unix milliseconds).
    pub created_at_ms: i64,
    /// Last successful login (unix milliseconds).
    pub last_login_ms: Option<i64>,
}

/// A stored donation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    /// Row identifier.
    pub id: i64,
    /// Donor name.
    pub donor_name: String,
    /// Optional donor email.
    pub donor_email: Option<String>,
    /// Optional donor phone in normalized `254…` form.
    pub phone: Option<String>,
    /// Amount in Kenyan shillings.
    pub amount_kes: f64,
    /// Payment method label (`mpesa`, `bank`, …).
    pub payment_method: String,
    /// Settlement status.
    pub status: DonationStatus,
    /// Gateway transaction identifier once settled.
    pub transaction_id: Option<String>,
    /// Creation time (unix milliseconds).
    pub created_at_ms: i64,
    /// Settlement time (unix milliseconds).
    pub completed_at_ms: Option<i64>,
    /// Client IP when known.
    pub ip_address: Option<String>,
}

/// A stored news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Row identifier.
    pub id: i64,
    /// Article title.
    pub title: String,
    /// Unique URL slug.
    pub slug: String,
    /// Optional list-view excerpt.
    pub excerpt: Option<String>,
    /// Full HTML content.
    pub content: String,
    /// Optional featured image path.
    pub featured_image: Option<String>,
    /// Author byline.
    pub author: String,
    /// Optional category label.
    pub category: Option<String>,
    /// Publication status.
    pub status: ArticleStatus,
    /// Creation time (unix milliseconds).
    pub created_at_ms: i64,
    /// Last update time (unix milliseconds).
    pub updated_at_ms: i64,
    /// First publication time (unix milliseconds).
    pub published_at_ms: Option<i64>,
    /// View counter.
    pub views: i64,
    /// Like counter.
    pub likes: i64,
    /// Share counter.
    pub shares: i64,
    /// Tag labels.
    pub tags: Vec<String>,
}

/// A list-view article summary without the full content body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    /// Row identifier.
    pub id: i64,
    /// Article title.
    pub title: String,
    /// Unique URL slug.
    pub slug: String,
    /// Optional list-view excerpt.
    pub excerpt: Option<String>,
    /// Optional featured image path.
    pub featured_image: Option<String>,
    /// Author byline.
    pub author: String,
    /// Optional category label.
    pub category: Option<String>,
    /// Publication status.
    pub status: ArticleStatus,
    /// Creation time (unix milliseconds).
    pub created_at_ms: i64,
    /// First publication time (unix milliseconds).
    pub published_at_ms: Option<i64>,
    /// View counter.
    pub views: i64,
    /// Tag labels.
    pub tags: Vec<String>,
}

/// Engagement counters for an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetrics {
    /// View counter.
    pub views: i64,
    /// Like counter.
    pub likes: i64,
    /// Share counter.
    pub shares: i64,
}

/// A stored article comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Row identifier.
    pub id: i64,
    /// Article the comment belongs to.
    pub article_id: i64,
    /// Commenter name.
    pub name: String,
    /// Commenter email, stored lower-cased.
    pub email: String,
    /// Comment body.
    pub body: String,
    /// True once approved for public display.
    pub approved: bool,
    /// Creation time (unix milliseconds).
    pub created_at_ms: i64,
}

/// A stored campaign event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Row identifier.
    pub id: i64,
    /// Event title.
    pub title: String,
    /// Unique URL slug.
    pub slug: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional venue.
    pub location: Option<String>,
    /// Start time as an RFC 3339 timestamp.
    pub starts_at: String,
    /// Optional end time as an RFC 3339 timestamp.
    pub ends_at: Option<String>,
    /// Optional featured image path.
    pub featured_image: Option<String>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Optional attendee cap for registration.
    pub max_attendees: Option<u32>,
    /// True when attendance requires registration.
    pub registration_required: bool,
    /// Creation time (unix milliseconds).
    pub created_at_ms: i64,
    /// Last update time (unix milliseconds).
    pub updated_at_ms: i64,
}

/// A stored event registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRegistration {
    /// Row identifier.
    pub id: i64,
    /// Event the registration belongs to.
    pub event_id: i64,
    /// Attendee name.
    pub name: String,
    /// Attendee email, stored lower-cased and unique per event.
    pub email: String,
    /// Optional attendee phone in normalized `254…` form.
    pub phone: Option<String>,
    /// Registration status.
    pub status: RegistrationStatus,
    /// Registration time (unix milliseconds).
    pub registered_at_ms: i64,
    /// Optional attendee notes.
    pub notes: Option<String>,
}

/// A stored agenda item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    /// Row identifier.
    pub id: i64,
    /// Item title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional category label.
    pub category: Option<String>,
    /// Priority.
    pub priority: AgendaPriority,
    /// Delivery status.
    pub status: AgendaStatus,
    /// Optional target date as an RFC 3339 timestamp.
    pub target_date: Option<String>,
    /// Completion percentage (0–100).
    pub progress_percent: u8,
    /// Creation time (unix milliseconds).
    pub created_at_ms: i64,
    /// Last update time (unix milliseconds).
    pub updated_at_ms: i64,
}

/// A stored volunteer sign-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerSignup {
    /// Row identifier.
    pub id: i64,
    /// Volunteer name.
    pub name: String,
    /// Volunteer email, stored lower-cased.
    pub email: String,
    /// Volunteer phone in normalized `254…` form.
    pub phone: String,
    /// Optional home location.
    pub location: Option<String>,
    /// Optional skills description.
    pub skills: Option<String>,
    /// Optional availability description.
    pub availability: Option<String>,
    /// Optional prior experience.
    pub experience: Option<String>,
    /// Optional motivation statement.
    pub motivation: Option<String>,
    /// Vetting status.
    pub status: VolunteerStatus,
    /// Sign-up time (unix milliseconds).
    pub registered_at_ms: i64,
    /// Client IP when known.
    pub ip_address: Option<String>,
}

// ============================================================================
// SECTION: Insert Payloads
// ============================================================================

/// Validated payload for a new contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    /// Sender name.
    pub name: String,
    /// Sender email, lower-cased.
    pub email: String,
    /// Optional normalized phone.
    pub phone: Option<String>,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Client IP when known.
    pub ip_address: Option<String>,
    /// Client user agent when known.
    pub user_agent: Option<String>,
}

/// Validated payload for a new volunteer sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVolunteer {
    /// Volunteer name.
    pub name: String,
    /// Volunteer email, lower-cased.
    pub email: String,
    /// Normalized phone.
    pub phone: String,
    /// Optional home location.
    pub location: Option<String>,
    /// Optional skills description.
    pub skills: Option<String>,
    /// Optional availability description.
    pub availability: Option<String>,
    /// Optional prior experience.
    pub experience: Option<String>,
    /// Optional motivation statement.
    pub motivation: Option<String>,
    /// Client IP when known.
    pub ip_address: Option<String>,
}

/// Validated payload for a new donation record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    /// Donor name.
    pub donor_name: String,
    /// Optional donor email, lower-cased.
    pub donor_email: Option<String>,
    /// Optional normalized donor phone.
    pub phone: Option<String>,
    /// Amount in Kenyan shillings.
    pub amount_kes: f64,
    /// Payment method label.
    pub payment_method: String,
    /// Client IP when known.
    pub ip_address: Option<String>,
}

/// Validated payload for a new event registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    /// Attendee name.
    pub name: String,
    /// Attendee email, lower-cased.
    pub email: String,
    /// Optional normalized phone.
    pub phone: Option<String>,
    /// Optional attendee notes.
    pub notes: Option<String>,
}

/// Create/update payload for a news article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    /// Article title.
    pub title: String,
    /// Explicit slug; derived from the title when `None`.
    pub slug: Option<String>,
    /// Optional excerpt.
    pub excerpt: Option<String>,
    /// Full HTML content.
    pub content: String,
    /// Optional featured image path.
    pub featured_image: Option<String>,
    /// Author byline; a default byline is applied when `None`.
    pub author: Option<String>,
    /// Optional category label.
    pub category: Option<String>,
    /// Publication status.
    pub status: ArticleStatus,
    /// Tag labels.
    pub tags: Vec<String>,
}

/// Create/update payload for a campaign event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Event title.
    pub title: String,
    /// Explicit slug; derived from the title when `None`.
    pub slug: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional venue.
    pub location: Option<String>,
    /// Start time as an RFC 3339 timestamp.
    pub starts_at: String,
    /// Optional end time as an RFC 3339 timestamp.
    pub ends_at: Option<String>,
    /// Optional featured image path.
    pub featured_image: Option<String>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Optional attendee cap.
    pub max_attendees: Option<u32>,
    /// True when attendance requires registration.
    pub registration_required: bool,
}

/// Create/update payload for an agenda item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaDraft {
    /// Item title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional category label.
    pub category: Option<String>,
    /// Priority.
    pub priority: AgendaPriority,
    /// Delivery status.
    pub status: AgendaStatus,
    /// Optional target date as an RFC 3339 timestamp.
    pub target_date: Option<String>,
    /// Completion percentage (0–100).
    pub progress_percent: u8,
}
