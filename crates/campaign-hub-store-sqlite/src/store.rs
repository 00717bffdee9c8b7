// crates/campaign-hub-store-sqlite/src/store.rs
// ============================================================================
// Module: Campaign Database
// Description: SQLite-backed persistence for all campaign records.
// Purpose: Provide transactional storage with idempotent public submissions.
// Dependencies: campaign-hub-config, campaign-hub-core, rusqlite, thiserror
// ============================================================================

//! ## Overview
//! [`CampaignDb`] owns a single `SQLite` connection guarded by a mutex. The
//! schema is versioned through a `store_meta` table and created on first open.
//! Registration for capacity-limited events performs its state, duplicate, and
//! capacity checks inside one transaction so concurrent submissions cannot
//! oversubscribe an event. Database contents are untrusted; every stored
//! status label is re-parsed on read and rejected when unknown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use campaign_hub_config::DatabaseConfig;
use campaign_hub_core::AdminUser;
use campaign_hub_core::AgendaDraft;
use campaign_hub_core::AgendaItem;
use campaign_hub_core::AgendaPriority;
use campaign_hub_core::AgendaStatus;
use campaign_hub_core::ArticleDraft;
use campaign_hub_core::ArticleMetrics;
use campaign_hub_core::ArticleStatus;
use campaign_hub_core::ArticleSummary;
use campaign_hub_core::Comment;
use campaign_hub_core::ContactStatus;
use campaign_hub_core::ContactSubmission;
use campaign_hub_core::Donation;
use campaign_hub_core::DonationStatus;
use campaign_hub_core::Event;
use campaign_hub_core::EventDraft;
use campaign_hub_core::EventStatus;
use campaign_hub_core::NewContact;
use campaign_hub_core::NewDonation;
use campaign_hub_core::NewRegistration;
use campaign_hub_core::NewVolunteer;
use campaign_hub_core::NewsArticle;
use campaign_hub_core::NewsletterSubscription;
use campaign_hub_core::RegistrationStatus;
use campaign_hub_core::SubscriptionStatus;
use campaign_hub_core::VolunteerSignup;
use campaign_hub_core::VolunteerStatus;
use campaign_hub_core::unix_millis;
use campaign_hub_core::validation::slugify;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::params;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the campaign store.
const SCHEMA_VERSION: i64 = 1;
/// Fallback author recorded when an article draft omits one.
const DEFAULT_AUTHOR: &str = "Campaign Team";
/// Column list shared by article detail queries.
const ARTICLE_COLUMNS: &str = "id, title, slug, excerpt, content, featured_image, author, \
                               category, status, created_at_ms, updated_at_ms, published_at_ms, \
                               views, likes, shares, tags";
/// Column list shared by article summary queries.
const SUMMARY_COLUMNS: &str = "id, title, slug, excerpt, featured_image, author, category, \
                               status, created_at_ms, published_at_ms, views, tags";
/// Column list shared by event queries, including the confirmed head count.
const EVENT_COLUMNS: &str = "e.id, e.title, e.slug, e.description, e.location, e.starts_at, \
                             e.ends_at, e.featured_image, e.status, e.max_attendees, \
                             e.registration_required, e.created_at_ms, e.updated_at_ms, \
                             (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id \
                             AND r.status = 'confirmed')";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Campaign store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("campaign store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("campaign store db error: {0}")]
    Db(String),
    /// Invalid stored data.
    #[error("campaign store invalid data: {0}")]
    Invalid(String),
    /// Unique-constraint conflict.
    #[error("campaign store conflict: {0}")]
    Conflict(String),
    /// Store schema version mismatch.
    #[error("campaign store version mismatch: {0}")]
    VersionMismatch(String),
}

/// Outcome of a transactional event registration attempt.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The event does not exist.
    #[error("event not found")]
    EventNotFound,
    /// The event is not accepting registrations.
    #[error("registration is closed for this event")]
    RegistrationClosed,
    /// The email address is already registered for the event.
    #[error("this email is already registered for the event")]
    AlreadyRegistered,
    /// The event has reached its attendee limit.
    #[error("the event is fully booked")]
    CapacityExceeded,
    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of an idempotent newsletter subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// A new subscription row was created.
    Subscribed,
    /// A previously unsubscribed address was reactivated.
    Reactivated,
    /// The address already holds an active subscription.
    AlreadySubscribed,
}

/// Maps a rusqlite error to a store error, detecting unique conflicts.
fn map_sql_err(err: rusqlite::Error, conflict_hint: &str) -> StoreError {
    if let rusqlite::Error::SqliteFailure(code, _) = &err
        && code.code == rusqlite::ErrorCode::ConstraintViolation
    {
        return StoreError::Conflict(conflict_hint.to_string());
    }
    StoreError::Db(err.to_string())
}

/// Wraps a record-label parse failure as a row conversion error.
fn label_err(index: usize, err: campaign_hub_core::RecordError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed campaign store.
#[derive(Clone)]
pub struct CampaignDb {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl CampaignDb {
    /// Opens the campaign database, creating and migrating the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the database cannot be opened or its schema
    /// version is unsupported.
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection, failing closed on poisoned mutexes.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Db("mutex poisoned".to_string()))
    }
}

/// Creates the parent directory of the database file when missing.
fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| StoreError::Io(err.to_string()))?;
    }
    Ok(())
}

/// Opens the `SQLite` connection and applies the configured pragmas.
fn open_connection(config: &DatabaseConfig) -> Result<Connection, StoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| StoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .map_err(|err| StoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "journal_mode", config.journal_mode.pragma_value())
        .map_err(|err| StoreError::Db(err.to_string()))?;
    connection
        .pragma_update(None, "synchronous", config.sync_mode.pragma_value())
        .map_err(|err| StoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| StoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Creates the schema on first open and verifies the stored version.
fn initialize_schema(connection: &mut Connection) -> Result<(), StoreError> {
    let tx = connection
        .transaction()
        .map_err(|err| StoreError::Db(err.to_string()))?;
    tx.execute(
        "CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|err| StoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|err| StoreError::Db(err.to_string()))?;
    match version {
        None => {
            create_tables(&tx)?;
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![
                SCHEMA_VERSION
            ])
            .map_err(|err| StoreError::Db(err.to_string()))?;
        }
        Some(found) if found == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(StoreError::VersionMismatch(format!(
                "found schema version {found}, expected {SCHEMA_VERSION}"
            )));
        }
    }
    tx.commit().map_err(|err| StoreError::Db(err.to_string()))
}

/// Creates all campaign tables and indexes.
fn create_tables(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(
        "CREATE TABLE contact_submissions (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             name TEXT NOT NULL,
             email TEXT NOT NULL,
             phone TEXT,
             subject TEXT NOT NULL,
             message TEXT NOT NULL,
             submitted_at_ms INTEGER NOT NULL,
             ip_address TEXT,
             user_agent TEXT,
             status TEXT NOT NULL DEFAULT 'new'
         );
         CREATE TABLE newsletter_subscriptions (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             email TEXT NOT NULL UNIQUE,
             name TEXT,
             subscribed_at_ms INTEGER NOT NULL,
             ip_address TEXT,
             status TEXT NOT NULL DEFAULT 'active'
         );
         CREATE TABLE admin_users (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             username TEXT NOT NULL UNIQUE,
             email TEXT NOT NULL UNIQUE,
             password_hash TEXT NOT NULL,
             salt TEXT NOT NULL,
             role TEXT NOT NULL DEFAULT 'admin',
             created_at_ms INTEGER NOT NULL,
             last_login_ms INTEGER
         );
         CREATE TABLE admin_sessions (
             token TEXT PRIMARY KEY,
             admin_id INTEGER NOT NULL REFERENCES admin_users(id) ON DELETE CASCADE,
             issued_at_ms INTEGER NOT NULL,
             expires_at_ms INTEGER NOT NULL
         );
         CREATE TABLE donations (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             donor_name TEXT NOT NULL,
             donor_email TEXT,
             phone TEXT,
             amount_kes REAL NOT NULL,
             payment_method TEXT NOT NULL,
             status TEXT NOT NULL DEFAULT 'pending',
             transaction_id TEXT,
             gateway_request_id TEXT,
             created_at_ms INTEGER NOT NULL,
             completed_at_ms INTEGER,
             ip_address TEXT
         );
         CREATE INDEX idx_donations_gateway ON donations(gateway_request_id);
         CREATE TABLE news_articles (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             title TEXT NOT NULL,
             slug TEXT NOT NULL UNIQUE,
             excerpt TEXT,
             content TEXT NOT NULL,
             featured_image TEXT,
             author TEXT NOT NULL,
             category TEXT,
             status TEXT NOT NULL DEFAULT 'draft',
             created_at_ms INTEGER NOT NULL,
             updated_at_ms INTEGER NOT NULL,
             published_at_ms INTEGER,
             views INTEGER NOT NULL DEFAULT 0,
             likes INTEGER NOT NULL DEFAULT 0,
             shares INTEGER NOT NULL DEFAULT 0,
             tags TEXT NOT NULL DEFAULT ''
         );
         CREATE TABLE comments (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             article_id INTEGER NOT NULL REFERENCES news_articles(id) ON DELETE CASCADE,
             name TEXT NOT NULL,
             email TEXT NOT NULL,
             body TEXT NOT NULL,
             approved INTEGER NOT NULL DEFAULT 0,
             created_at_ms INTEGER NOT NULL
         );
         CREATE INDEX idx_comments_article ON comments(article_id);
         CREATE TABLE events (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             title TEXT NOT NULL,
             slug TEXT NOT NULL UNIQUE,
             description TEXT,
             location TEXT,
             starts_at TEXT NOT NULL,
             ends_at TEXT,
             featured_image TEXT,
             status TEXT NOT NULL DEFAULT 'upcoming',
             max_attendees INTEGER,
             registration_required INTEGER NOT NULL DEFAULT 1,
             created_at_ms INTEGER NOT NULL,
             updated_at_ms INTEGER NOT NULL
         );
         CREATE TABLE event_registrations (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
             name TEXT NOT NULL,
             email TEXT NOT NULL,
             phone TEXT,
             status TEXT NOT NULL DEFAULT 'confirmed',
             registered_at_ms INTEGER NOT NULL,
             notes TEXT,
             UNIQUE(event_id, email)
         );
         CREATE TABLE agenda_items (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             title TEXT NOT NULL,
             description TEXT,
             category TEXT,
             priority TEXT NOT NULL DEFAULT 'medium',
             status TEXT NOT NULL DEFAULT 'planned',
             target_date TEXT,
             progress_percent INTEGER NOT NULL DEFAULT 0,
             created_at_ms INTEGER NOT NULL,
             updated_at_ms INTEGER NOT NULL
         );
         CREATE TABLE volunteer_registrations (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             name TEXT NOT NULL,
             email TEXT NOT NULL,
             phone TEXT NOT NULL,
             location TEXT,
             skills TEXT,
             availability TEXT,
             experience TEXT,
             motivation TEXT,
             status TEXT NOT NULL DEFAULT 'pending',
             registered_at_ms INTEGER NOT NULL,
             ip_address TEXT
         );",
    )
    .map_err(|err| StoreError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Splits a comma-joined tag column into individual tags.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Joins tags into the comma-separated storage form.
fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

/// Maps a contact submission row.
fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<ContactSubmission> {
    let status_label: String = row.get(9)?;
    Ok(ContactSubmission {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        subject: row.get(4)?,
        message: row.get(5)?,
        submitted_at_ms: row.get(6)?,
        ip_address: row.get(7)?,
        user_agent: row.get(8)?,
        status: ContactStatus::parse(&status_label).map_err(|err| label_err(9, err))?,
    })
}

/// Maps a newsletter subscription row.
fn subscription_from_row(row: &Row<'_>) -> rusqlite::Result<NewsletterSubscription> {
    let status_label: String = row.get(5)?;
    Ok(NewsletterSubscription {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        subscribed_at_ms: row.get(3)?,
        ip_address: row.get(4)?,
        status: SubscriptionStatus::parse(&status_label).map_err(|err| label_err(5, err))?,
    })
}

/// Maps a volunteer signup row.
fn volunteer_from_row(row: &Row<'_>) -> rusqlite::Result<VolunteerSignup> {
    let status_label: String = row.get(9)?;
    Ok(VolunteerSignup {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        location: row.get(4)?,
        skills: row.get(5)?,
        availability: row.get(6)?,
        experience: row.get(7)?,
        motivation: row.get(8)?,
        status: VolunteerStatus::parse(&status_label).map_err(|err| label_err(9, err))?,
        registered_at_ms: row.get(10)?,
        ip_address: row.get(11)?,
    })
}

/// Maps a donation row.
fn donation_from_row(row: &Row<'_>) -> rusqlite::Result<Donation> {
    let status_label: String = row.get(6)?;
    Ok(Donation {
        id: row.get(0)?,
        donor_name: row.get(1)?,
        donor_email: row.get(2)?,
        phone: row.get(3)?,
        amount_kes: row.get(4)?,
        payment_method: row.get(5)?,
        status: DonationStatus::parse(&status_label).map_err(|err| label_err(6, err))?,
        transaction_id: row.get(7)?,
        created_at_ms: row.get(8)?,
        completed_at_ms: row.get(9)?,
        ip_address: row.get(10)?,
    })
}

/// Maps a full article row using [`ARTICLE_COLUMNS`] ordering.
fn article_from_row(row: &Row<'_>) -> rusqlite::Result<NewsArticle> {
    let status_label: String = row.get(8)?;
    let tags_raw: String = row.get(15)?;
    Ok(NewsArticle {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        excerpt: row.get(3)?,
        content: row.get(4)?,
        featured_image: row.get(5)?,
        author: row.get(6)?,
        category: row.get(7)?,
        status: ArticleStatus::parse(&status_label).map_err(|err| label_err(8, err))?,
        created_at_ms: row.get(9)?,
        updated_at_ms: row.get(10)?,
        published_at_ms: row.get(11)?,
        views: row.get(12)?,
        likes: row.get(13)?,
        shares: row.get(14)?,
        tags: split_tags(&tags_raw),
    })
}

/// Maps an article summary row using [`SUMMARY_COLUMNS`] ordering.
fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<ArticleSummary> {
    let status_label: String = row.get(7)?;
    let tags_raw: String = row.get(11)?;
    Ok(ArticleSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        excerpt: row.get(3)?,
        featured_image: row.get(4)?,
        author: row.get(5)?,
        category: row.get(6)?,
        status: ArticleStatus::parse(&status_label).map_err(|err| label_err(7, err))?,
        created_at_ms: row.get(8)?,
        published_at_ms: row.get(9)?,
        views: row.get(10)?,
        tags: split_tags(&tags_raw),
    })
}

/// Maps a comment row.
fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        article_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        body: row.get(4)?,
        approved: row.get(5)?,
        created_at_ms: row.get(6)?,
    })
}

/// Maps an event row (with trailing confirmed count) using [`EVENT_COLUMNS`].
fn event_from_row(row: &Row<'_>) -> rusqlite::Result<(Event, i64)> {
    let status_label: String = row.get(8)?;
    let max_raw: Option<i64> = row.get(9)?;
    let max_attendees = match max_raw {
        None => None,
        Some(value) => Some(u32::try_from(value).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                9,
                rusqlite::types::Type::Integer,
                Box::new(err),
            )
        })?),
    };
    let event = Event {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        starts_at: row.get(5)?,
        ends_at: row.get(6)?,
        featured_image: row.get(7)?,
        status: EventStatus::parse(&status_label).map_err(|err| label_err(8, err))?,
        max_attendees,
        registration_required: row.get(10)?,
        created_at_ms: row.get(11)?,
        updated_at_ms: row.get(12)?,
    };
    let confirmed: i64 = row.get(13)?;
    Ok((event, confirmed))
}

/// Maps an agenda item row.
fn agenda_from_row(row: &Row<'_>) -> rusqlite::Result<AgendaItem> {
    let priority_label: String = row.get(4)?;
    let status_label: String = row.get(5)?;
    let progress_raw: i64 = row.get(7)?;
    Ok(AgendaItem {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        priority: AgendaPriority::parse(&priority_label).map_err(|err| label_err(4, err))?,
        status: AgendaStatus::parse(&status_label).map_err(|err| label_err(5, err))?,
        target_date: row.get(6)?,
        progress_percent: u8::try_from(progress_raw.clamp(0, 100)).unwrap_or(100),
        created_at_ms: row.get(8)?,
        updated_at_ms: row.get(9)?,
    })
}

/// Maps an admin user row.
fn admin_from_row(row: &Row<'_>) -> rusqlite::Result<AdminUser> {
    Ok(AdminUser {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        salt: row.get(4)?,
        role: row.get(5)?,
        created_at_ms: row.get(6)?,
        last_login_ms: row.get(7)?,
    })
}

// ============================================================================
// SECTION: Contacts
// ============================================================================

impl CampaignDb {
    /// Inserts a contact submission and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn insert_contact(&self, contact: &NewContact) -> Result<i64, StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO contact_submissions (name, email, phone, subject, message, \
                 submitted_at_ms, ip_address, user_agent) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    contact.name,
                    contact.email,
                    contact.phone,
                    contact.subject,
                    contact.message,
                    unix_millis(),
                    contact.ip_address,
                    contact.user_agent,
                ],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(guard.last_insert_rowid())
    }

    /// Lists contact submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_contacts(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, name, email, phone, subject, message, submitted_at_ms, ip_address, \
                 user_agent, status FROM contact_submissions ORDER BY submitted_at_ms DESC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], contact_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }
}

// ============================================================================
// SECTION: Newsletter
// ============================================================================

impl CampaignDb {
    /// Subscribes an email address, reactivating unsubscribed rows in place.
    ///
    /// The address must already be normalized to lower case by the caller;
    /// the store lower-cases again so the unique index cannot be bypassed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn subscribe_newsletter(
        &self,
        email: &str,
        name: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<SubscribeOutcome, StoreError> {
        let email = email.to_lowercase();
        let mut guard = self.lock()?;
        let tx = guard
            .transaction()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let existing: Option<(i64, String)> = tx
            .query_row(
                "SELECT id, status FROM newsletter_subscriptions WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let outcome = match existing {
            None => {
                tx.execute(
                    "INSERT INTO newsletter_subscriptions (email, name, subscribed_at_ms, \
                     ip_address, status) VALUES (?1, ?2, ?3, ?4, 'active')",
                    params![email, name, unix_millis(), ip_address],
                )
                .map_err(|err| map_sql_err(err, "email already subscribed"))?;
                SubscribeOutcome::Subscribed
            }
            Some((id, status)) => {
                let status = SubscriptionStatus::parse(&status)
                    .map_err(|err| StoreError::Invalid(err.to_string()))?;
                match status {
                    SubscriptionStatus::Active => SubscribeOutcome::AlreadySubscribed,
                    SubscriptionStatus::Unsubscribed => {
                        tx.execute(
                            "UPDATE newsletter_subscriptions SET status = 'active', \
                             subscribed_at_ms = ?1, name = COALESCE(?2, name) WHERE id = ?3",
                            params![unix_millis(), name, id],
                        )
                        .map_err(|err| StoreError::Db(err.to_string()))?;
                        SubscribeOutcome::Reactivated
                    }
                }
            }
        };
        tx.commit().map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(outcome)
    }

    /// Marks an active subscription as unsubscribed.
    ///
    /// Returns `false` when no active subscription exists for the address.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn unsubscribe_newsletter(&self, email: &str) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE newsletter_subscriptions SET status = 'unsubscribed' WHERE email = ?1 \
                 AND status = 'active'",
                params![email.to_lowercase()],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Lists newsletter subscriptions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_subscriptions(&self) -> Result<Vec<NewsletterSubscription>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, email, name, subscribed_at_ms, ip_address, status FROM \
                 newsletter_subscriptions ORDER BY subscribed_at_ms DESC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], subscription_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }
}

// ============================================================================
// SECTION: Volunteers
// ============================================================================

impl CampaignDb {
    /// Inserts a volunteer signup and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn insert_volunteer(&self, volunteer: &NewVolunteer) -> Result<i64, StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO volunteer_registrations (name, email, phone, location, skills, \
                 availability, experience, motivation, registered_at_ms, ip_address) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    volunteer.name,
                    volunteer.email,
                    volunteer.phone,
                    volunteer.location,
                    volunteer.skills,
                    volunteer.availability,
                    volunteer.experience,
                    volunteer.motivation,
                    unix_millis(),
                    volunteer.ip_address,
                ],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(guard.last_insert_rowid())
    }

    /// Lists volunteer signups, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_volunteers(&self) -> Result<Vec<VolunteerSignup>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, name, email, phone, location, skills, availability, experience, \
                 motivation, status, registered_at_ms, ip_address FROM volunteer_registrations \
                 ORDER BY registered_at_ms DESC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], volunteer_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }
}

// ============================================================================
// SECTION: Donations
// ============================================================================

impl CampaignDb {
    /// Inserts a pending donation and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn insert_donation(&self, donation: &NewDonation) -> Result<i64, StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO donations (donor_name, donor_email, phone, amount_kes, \
                 payment_method, status, created_at_ms, ip_address) VALUES (?1, ?2, ?3, ?4, ?5, \
                 'pending', ?6, ?7)",
                params![
                    donation.donor_name,
                    donation.donor_email,
                    donation.phone,
                    donation.amount_kes,
                    donation.payment_method,
                    unix_millis(),
                    donation.ip_address,
                ],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(guard.last_insert_rowid())
    }

    /// Records the payment gateway request identifier for a pending donation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn set_donation_gateway_ref(
        &self,
        donation_id: i64,
        gateway_request_id: &str,
    ) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE donations SET gateway_request_id = ?1 WHERE id = ?2",
                params![gateway_request_id, donation_id],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Completes the pending donation matching a gateway request identifier.
    ///
    /// Returns `false` when no pending donation matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn complete_donation(
        &self,
        gateway_request_id: &str,
        transaction_id: Option<&str>,
    ) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE donations SET status = 'completed', transaction_id = ?1, \
                 completed_at_ms = ?2 WHERE gateway_request_id = ?3 AND status = 'pending'",
                params![transaction_id, unix_millis(), gateway_request_id],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Fails the pending donation matching a gateway request identifier.
    ///
    /// Returns `false` when no pending donation matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn fail_donation(&self, gateway_request_id: &str) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE donations SET status = 'failed' WHERE gateway_request_id = ?1 AND \
                 status = 'pending'",
                params![gateway_request_id],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Lists donations, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_donations(&self) -> Result<Vec<Donation>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, donor_name, donor_email, phone, amount_kes, payment_method, status, \
                 transaction_id, created_at_ms, completed_at_ms, ip_address FROM donations ORDER \
                 BY created_at_ms DESC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], donation_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }
}

// ============================================================================
// SECTION: Articles
// ============================================================================

impl CampaignDb {
    /// Creates an article from a draft and returns its identifier.
    ///
    /// The slug defaults to a slugified title; publishing stamps
    /// `published_at_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the slug is taken.
    pub fn create_article(&self, draft: &ArticleDraft) -> Result<i64, StoreError> {
        let slug = draft
            .slug
            .clone()
            .unwrap_or_else(|| slugify(&draft.title));
        let author = draft.author.clone().unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let now = unix_millis();
        let published_at = (draft.status == ArticleStatus::Published).then_some(now);
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO news_articles (title, slug, excerpt, content, featured_image, \
                 author, category, status, created_at_ms, updated_at_ms, published_at_ms, tags) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9, ?10, ?11)",
                params![
                    draft.title,
                    slug,
                    draft.excerpt,
                    draft.content,
                    draft.featured_image,
                    author,
                    draft.category,
                    draft.status.as_str(),
                    now,
                    published_at,
                    join_tags(&draft.tags),
                ],
            )
            .map_err(|err| map_sql_err(err, "article slug already exists"))?;
        Ok(guard.last_insert_rowid())
    }

    /// Updates an article from a draft, stamping `published_at_ms` on first
    /// publish. Returns `false` when the article does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the new slug is taken.
    pub fn update_article(&self, article_id: i64, draft: &ArticleDraft) -> Result<bool, StoreError> {
        let slug = draft
            .slug
            .clone()
            .unwrap_or_else(|| slugify(&draft.title));
        let author = draft.author.clone().unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let now = unix_millis();
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE news_articles SET title = ?1, slug = ?2, excerpt = ?3, content = ?4, \
                 featured_image = ?5, author = ?6, category = ?7, status = ?8, updated_at_ms = \
                 ?9, tags = ?10, published_at_ms = CASE WHEN ?8 = 'published' THEN \
                 COALESCE(published_at_ms, ?9) ELSE published_at_ms END WHERE id = ?11",
                params![
                    draft.title,
                    slug,
                    draft.excerpt,
                    draft.content,
                    draft.featured_image,
                    author,
                    draft.category,
                    draft.status.as_str(),
                    now,
                    join_tags(&draft.tags),
                    article_id,
                ],
            )
            .map_err(|err| map_sql_err(err, "article slug already exists"))?;
        Ok(changed > 0)
    }

    /// Deletes an article and its comments. Returns `false` when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn delete_article(&self, article_id: i64) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute("DELETE FROM news_articles WHERE id = ?1", params![article_id])
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Lists every article regardless of status, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_all_articles(&self) -> Result<Vec<ArticleSummary>, StoreError> {
        let guard = self.lock()?;
        let sql =
            format!("SELECT {SUMMARY_COLUMNS} FROM news_articles ORDER BY created_at_ms DESC");
        let mut statement = guard
            .prepare(&sql)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], summary_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Lists published articles with optional category filtering and paging.
    ///
    /// Returns the page of summaries plus the total count of matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_published_articles(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ArticleSummary>, i64), StoreError> {
        let guard = self.lock()?;
        let total: i64 = guard
            .query_row(
                "SELECT COUNT(*) FROM news_articles WHERE status = 'published' AND (?1 IS NULL \
                 OR category = ?1)",
                params![category],
                |row| row.get(0),
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS} FROM news_articles WHERE status = 'published' AND (?1 IS \
             NULL OR category = ?1) ORDER BY published_at_ms DESC LIMIT ?2 OFFSET ?3"
        );
        let mut statement = guard
            .prepare(&sql)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![category, limit.max(0), offset.max(0)], summary_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let page = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok((page, total))
    }

    /// Resolves a published article key (numeric id or slug) to its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn find_published_article(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let numeric_id = key.parse::<i64>().unwrap_or(-1);
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT id FROM news_articles WHERE status = 'published' AND (slug = ?1 OR id = \
                 ?2)",
                params![key, numeric_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Fetches a published article by key and increments its view counter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn read_published_article(&self, key: &str) -> Result<Option<NewsArticle>, StoreError> {
        let numeric_id = key.parse::<i64>().unwrap_or(-1);
        let mut guard = self.lock()?;
        let tx = guard
            .transaction()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM news_articles WHERE status = 'published' AND (slug = \
             ?1 OR id = ?2)"
        );
        let article = tx
            .query_row(&sql, params![key, numeric_id], article_from_row)
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let article = match article {
            None => None,
            Some(mut found) => {
                tx.execute(
                    "UPDATE news_articles SET views = views + 1 WHERE id = ?1",
                    params![found.id],
                )
                .map_err(|err| StoreError::Db(err.to_string()))?;
                found.views = found.views.saturating_add(1);
                Some(found)
            }
        };
        tx.commit().map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(article)
    }

    /// Fetches a single article by id regardless of status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn get_article(&self, article_id: i64) -> Result<Option<NewsArticle>, StoreError> {
        let guard = self.lock()?;
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM news_articles WHERE id = ?1");
        guard
            .query_row(&sql, params![article_id], article_from_row)
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Increments the like counter of a published article.
    ///
    /// Returns the new count, or `None` when the article is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn like_article(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.bump_counter(key, "likes")
    }

    /// Increments the share counter of a published article.
    ///
    /// Returns the new count, or `None` when the article is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn share_article(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.bump_counter(key, "shares")
    }

    /// Increments one engagement counter and returns the new value.
    fn bump_counter(&self, key: &str, column: &str) -> Result<Option<i64>, StoreError> {
        let numeric_id = key.parse::<i64>().unwrap_or(-1);
        let mut guard = self.lock()?;
        let tx = guard
            .transaction()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let article_id: Option<i64> = tx
            .query_row(
                "SELECT id FROM news_articles WHERE status = 'published' AND (slug = ?1 OR id = \
                 ?2)",
                params![key, numeric_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let count = match article_id {
            None => None,
            Some(id) => {
                // Column names come from a fixed internal set, never callers.
                let update = format!(
                    "UPDATE news_articles SET {column} = {column} + 1 WHERE id = ?1"
                );
                tx.execute(&update, params![id])
                    .map_err(|err| StoreError::Db(err.to_string()))?;
                let select = format!("SELECT {column} FROM news_articles WHERE id = ?1");
                let value: i64 = tx
                    .query_row(&select, params![id], |row| row.get(0))
                    .map_err(|err| StoreError::Db(err.to_string()))?;
                Some(value)
            }
        };
        tx.commit().map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(count)
    }

    /// Returns engagement metrics for a published article.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn article_metrics(&self, key: &str) -> Result<Option<ArticleMetrics>, StoreError> {
        let numeric_id = key.parse::<i64>().unwrap_or(-1);
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT views, likes, shares FROM news_articles WHERE status = 'published' AND \
                 (slug = ?1 OR id = ?2)",
                params![key, numeric_id],
                |row| {
                    Ok(ArticleMetrics {
                        views: row.get(0)?,
                        likes: row.get(1)?,
                        shares: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Lists the distinct categories of published articles.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_categories(&self) -> Result<Vec<String>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT DISTINCT category FROM news_articles WHERE status = 'published' AND \
                 category IS NOT NULL ORDER BY category",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Inserts seed articles whose slugs are not present yet.
    ///
    /// Returns the number of articles inserted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn seed_articles(&self, drafts: &[ArticleDraft]) -> Result<usize, StoreError> {
        let mut inserted = 0_usize;
        for draft in drafts {
            let slug = draft
                .slug
                .clone()
                .unwrap_or_else(|| slugify(&draft.title));
            let exists: Option<i64> = {
                let guard = self.lock()?;
                guard
                    .query_row(
                        "SELECT id FROM news_articles WHERE slug = ?1",
                        params![slug],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(|err| StoreError::Db(err.to_string()))?
            };
            if exists.is_none() {
                self.create_article(draft)?;
                inserted = inserted.saturating_add(1);
            }
        }
        Ok(inserted)
    }
}

// ============================================================================
// SECTION: Comments
// ============================================================================

impl CampaignDb {
    /// Inserts an unapproved comment on a published article.
    ///
    /// Returns `None` when the article key does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn insert_comment(
        &self,
        article_key: &str,
        name: &str,
        email: &str,
        body: &str,
    ) -> Result<Option<i64>, StoreError> {
        let Some(article_id) = self.find_published_article(article_key)? else {
            return Ok(None);
        };
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO comments (article_id, name, email, body, approved, created_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                params![article_id, name, email, body, unix_millis()],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(Some(guard.last_insert_rowid()))
    }

    /// Lists approved comments for a published article, oldest first.
    ///
    /// Returns `None` when the article key does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_approved_comments(
        &self,
        article_key: &str,
    ) -> Result<Option<Vec<Comment>>, StoreError> {
        let Some(article_id) = self.find_published_article(article_key)? else {
            return Ok(None);
        };
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, article_id, name, email, body, approved, created_at_ms FROM comments \
                 WHERE article_id = ?1 AND approved = 1 ORDER BY created_at_ms ASC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![article_id], comment_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let comments = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(Some(comments))
    }

    /// Lists comments awaiting moderation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_pending_comments(&self) -> Result<Vec<Comment>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, article_id, name, email, body, approved, created_at_ms FROM comments \
                 WHERE approved = 0 ORDER BY created_at_ms ASC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], comment_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Approves a pending comment. Returns `false` when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn approve_comment(&self, comment_id: i64) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE comments SET approved = 1 WHERE id = ?1 AND approved = 0",
                params![comment_id],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Deletes a comment. Returns `false` when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn delete_comment(&self, comment_id: i64) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute("DELETE FROM comments WHERE id = ?1", params![comment_id])
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }
}

// ============================================================================
// SECTION: Events
// ============================================================================

impl CampaignDb {
    /// Creates an event from a draft and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the slug is taken.
    pub fn create_event(&self, draft: &EventDraft) -> Result<i64, StoreError> {
        let slug = draft
            .slug
            .clone()
            .unwrap_or_else(|| slugify(&draft.title));
        let now = unix_millis();
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO events (title, slug, description, location, starts_at, ends_at, \
                 featured_image, status, max_attendees, registration_required, created_at_ms, \
                 updated_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
                params![
                    draft.title,
                    slug,
                    draft.description,
                    draft.location,
                    draft.starts_at,
                    draft.ends_at,
                    draft.featured_image,
                    draft.status.as_str(),
                    draft.max_attendees.map(i64::from),
                    draft.registration_required,
                    now,
                ],
            )
            .map_err(|err| map_sql_err(err, "event slug already exists"))?;
        Ok(guard.last_insert_rowid())
    }

    /// Updates an event from a draft. Returns `false` when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the new slug is taken.
    pub fn update_event(&self, event_id: i64, draft: &EventDraft) -> Result<bool, StoreError> {
        let slug = draft
            .slug
            .clone()
            .unwrap_or_else(|| slugify(&draft.title));
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE events SET title = ?1, slug = ?2, description = ?3, location = ?4, \
                 starts_at = ?5, ends_at = ?6, featured_image = ?7, status = ?8, max_attendees = \
                 ?9, registration_required = ?10, updated_at_ms = ?11 WHERE id = ?12",
                params![
                    draft.title,
                    slug,
                    draft.description,
                    draft.location,
                    draft.starts_at,
                    draft.ends_at,
                    draft.featured_image,
                    draft.status.as_str(),
                    draft.max_attendees.map(i64::from),
                    draft.registration_required,
                    unix_millis(),
                    event_id,
                ],
            )
            .map_err(|err| map_sql_err(err, "event slug already exists"))?;
        Ok(changed > 0)
    }

    /// Deletes an event and its registrations. Returns `false` when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn delete_event(&self, event_id: i64) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute("DELETE FROM events WHERE id = ?1", params![event_id])
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Fetches an event with its confirmed registration count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn get_event(&self, event_id: i64) -> Result<Option<(Event, i64)>, StoreError> {
        let guard = self.lock()?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = ?1");
        guard
            .query_row(&sql, params![event_id], event_from_row)
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Lists upcoming and ongoing events ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_public_events(&self) -> Result<Vec<(Event, i64)>, StoreError> {
        let guard = self.lock()?;
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e WHERE e.status IN ('upcoming', 'ongoing') \
             ORDER BY e.starts_at ASC"
        );
        let mut statement = guard
            .prepare(&sql)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], event_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Lists every event regardless of status, newest start first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_all_events(&self) -> Result<Vec<(Event, i64)>, StoreError> {
        let guard = self.lock()?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e ORDER BY e.starts_at DESC");
        let mut statement = guard
            .prepare(&sql)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], event_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Registers an attendee inside a single transaction.
    ///
    /// The event must exist, be upcoming with registration required, not
    /// already hold a confirmed registration for the email, and have spare
    /// capacity. The email is stored lower-cased so the per-event unique
    /// index holds.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] describing the first failed check.
    pub fn register_attendee(
        &self,
        event_id: i64,
        registration: &NewRegistration,
    ) -> Result<i64, RegistrationError> {
        let email = registration.email.to_lowercase();
        let mut guard = self.lock().map_err(RegistrationError::Store)?;
        let tx = guard
            .transaction()
            .map_err(|err| RegistrationError::Store(StoreError::Db(err.to_string())))?;
        let event: Option<(String, bool, Option<i64>)> = tx
            .query_row(
                "SELECT status, registration_required, max_attendees FROM events WHERE id = ?1",
                params![event_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|err| RegistrationError::Store(StoreError::Db(err.to_string())))?;
        let Some((status_label, registration_required, max_attendees)) = event else {
            return Err(RegistrationError::EventNotFound);
        };
        let status = EventStatus::parse(&status_label)
            .map_err(|err| RegistrationError::Store(StoreError::Invalid(err.to_string())))?;
        if status != EventStatus::Upcoming || !registration_required {
            return Err(RegistrationError::RegistrationClosed);
        }
        let duplicate: Option<i64> = tx
            .query_row(
                "SELECT id FROM event_registrations WHERE event_id = ?1 AND email = ?2 AND \
                 status = ?3",
                params![event_id, email, RegistrationStatus::Confirmed.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| RegistrationError::Store(StoreError::Db(err.to_string())))?;
        if duplicate.is_some() {
            return Err(RegistrationError::AlreadyRegistered);
        }
        if let Some(limit) = max_attendees {
            let confirmed: i64 = tx
                .query_row(
                    "SELECT COUNT(*) FROM event_registrations WHERE event_id = ?1 AND status = \
                     ?2",
                    params![event_id, RegistrationStatus::Confirmed.as_str()],
                    |row| row.get(0),
                )
                .map_err(|err| RegistrationError::Store(StoreError::Db(err.to_string())))?;
            if confirmed >= limit {
                return Err(RegistrationError::CapacityExceeded);
            }
        }
        tx.execute(
            "INSERT INTO event_registrations (event_id, name, email, phone, status, \
             registered_at_ms, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event_id,
                registration.name,
                email,
                registration.phone,
                RegistrationStatus::Confirmed.as_str(),
                unix_millis(),
                registration.notes,
            ],
        )
        .map_err(|err| {
            if let rusqlite::Error::SqliteFailure(code, _) = &err
                && code.code == rusqlite::ErrorCode::ConstraintViolation
            {
                return RegistrationError::AlreadyRegistered;
            }
            RegistrationError::Store(StoreError::Db(err.to_string()))
        })?;
        let registration_id = tx.last_insert_rowid();
        tx.commit()
            .map_err(|err| RegistrationError::Store(StoreError::Db(err.to_string())))?;
        Ok(registration_id)
    }

    /// Lists registrations for an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_registrations(
        &self,
        event_id: i64,
    ) -> Result<Vec<campaign_hub_core::EventRegistration>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, event_id, name, email, phone, status, registered_at_ms, notes FROM \
                 event_registrations WHERE event_id = ?1 ORDER BY registered_at_ms DESC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![event_id], |row| {
                let status_label: String = row.get(5)?;
                Ok(campaign_hub_core::EventRegistration {
                    id: row.get(0)?,
                    event_id: row.get(1)?,
                    name: row.get(2)?,
                    email: row.get(3)?,
                    phone: row.get(4)?,
                    status: RegistrationStatus::parse(&status_label)
                        .map_err(|err| label_err(5, err))?,
                    registered_at_ms: row.get(6)?,
                    notes: row.get(7)?,
                })
            })
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }
}

// ============================================================================
// SECTION: Agenda
// ============================================================================

impl CampaignDb {
    /// Creates an agenda item from a draft and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn create_agenda_item(&self, draft: &AgendaDraft) -> Result<i64, StoreError> {
        let now = unix_millis();
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO agenda_items (title, description, category, priority, status, \
                 target_date, progress_percent, created_at_ms, updated_at_ms) VALUES (?1, ?2, \
                 ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    draft.title,
                    draft.description,
                    draft.category,
                    draft.priority.as_str(),
                    draft.status.as_str(),
                    draft.target_date,
                    i64::from(draft.progress_percent.min(100)),
                    now,
                ],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(guard.last_insert_rowid())
    }

    /// Updates an agenda item from a draft. Returns `false` when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn update_agenda_item(
        &self,
        item_id: i64,
        draft: &AgendaDraft,
    ) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE agenda_items SET title = ?1, description = ?2, category = ?3, priority = \
                 ?4, status = ?5, target_date = ?6, progress_percent = ?7, updated_at_ms = ?8 \
                 WHERE id = ?9",
                params![
                    draft.title,
                    draft.description,
                    draft.category,
                    draft.priority.as_str(),
                    draft.status.as_str(),
                    draft.target_date,
                    i64::from(draft.progress_percent.min(100)),
                    unix_millis(),
                    item_id,
                ],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Deletes an agenda item. Returns `false` when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn delete_agenda_item(&self, item_id: i64) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute("DELETE FROM agenda_items WHERE id = ?1", params![item_id])
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(changed > 0)
    }

    /// Lists agenda items ordered by priority rank, then recency.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn list_agenda_items(&self) -> Result<Vec<AgendaItem>, StoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, title, description, category, priority, status, target_date, \
                 progress_percent, created_at_ms, updated_at_ms FROM agenda_items ORDER BY CASE \
                 priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END, created_at_ms DESC",
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map([], agenda_from_row)
            .map_err(|err| StoreError::Db(err.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| StoreError::Db(err.to_string()))
    }
}

// ============================================================================
// SECTION: Admin Accounts and Sessions
// ============================================================================

impl CampaignDb {
    /// Creates an admin account with a pre-hashed credential.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the username or email is taken.
    pub fn create_admin(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        salt: &str,
        role: &str,
    ) -> Result<i64, StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO admin_users (username, email, password_hash, salt, role, \
                 created_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![username, email, password_hash, salt, role, unix_millis()],
            )
            .map_err(|err| map_sql_err(err, "admin username or email already exists"))?;
        Ok(guard.last_insert_rowid())
    }

    /// Looks up an admin account by username.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn find_admin(&self, username: &str) -> Result<Option<AdminUser>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT id, username, email, password_hash, salt, role, created_at_ms, \
                 last_login_ms FROM admin_users WHERE username = ?1",
                params![username],
                admin_from_row,
            )
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Records a successful login for an admin account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn record_admin_login(&self, admin_id: i64) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "UPDATE admin_users SET last_login_ms = ?1 WHERE id = ?2",
                params![unix_millis(), admin_id],
            )
            .map_err(|err| StoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Stores a bearer session token for an admin account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn insert_session(
        &self,
        token: &str,
        admin_id: i64,
        issued_at_ms: i64,
        expires_at_ms: i64,
    ) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO admin_sessions (token, admin_id, issued_at_ms, expires_at_ms) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![token, admin_id, issued_at_ms, expires_at_ms],
            )
            .map_err(|err| map_sql_err(err, "session token already exists"))?;
        Ok(())
    }

    /// Resolves a live session token to its admin account.
    ///
    /// Expired or unknown tokens return `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn session_admin(&self, token: &str) -> Result<Option<AdminUser>, StoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT u.id, u.username, u.email, u.password_hash, u.salt, u.role, \
                 u.created_at_ms, u.last_login_ms FROM admin_sessions s JOIN admin_users u ON \
                 u.id = s.admin_id WHERE s.token = ?1 AND s.expires_at_ms > ?2",
                params![token, unix_millis()],
                admin_from_row,
            )
            .optional()
            .map_err(|err| StoreError::Db(err.to_string()))
    }

    /// Deletes expired session tokens and returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure.
    pub fn purge_expired_sessions(&self) -> Result<usize, StoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "DELETE FROM admin_sessions WHERE expires_at_ms <= ?1",
                params![unix_millis()],
            )
            .map_err(|err| StoreError::Db(err.to_string()))
    }
}
