// crates/campaign-hub-store-sqlite/tests/campaign_store.rs
// ============================================================================
// Module: Campaign Store Integration Tests
// Description: Exercises the SQLite store against temporary databases.
// Purpose: Verify schema creation, idempotent writes, and registration rules.
// Dependencies: campaign-hub-config, campaign-hub-core, campaign-hub-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Each test opens a fresh database in a temporary directory and drives the
//! store through its public API, covering the newsletter reactivation rules,
//! article engagement counters, and the transactional event registration
//! checks.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    reason = "Test-only assertions are permitted."
)]

use campaign_hub_config::DatabaseConfig;
use campaign_hub_core::ArticleDraft;
use campaign_hub_core::ArticleStatus;
use campaign_hub_core::EventDraft;
use campaign_hub_core::EventStatus;
use campaign_hub_core::NewContact;
use campaign_hub_core::NewDonation;
use campaign_hub_core::NewRegistration;
use campaign_hub_core::NewVolunteer;
use campaign_hub_core::password;
use campaign_hub_core::unix_millis;
use campaign_hub_store_sqlite::CampaignDb;
use campaign_hub_store_sqlite::RegistrationError;
use campaign_hub_store_sqlite::StoreError;
use campaign_hub_store_sqlite::SubscribeOutcome;
use tempfile::TempDir;

/// Opens a fresh store under a temporary directory.
fn open_store(dir: &TempDir) -> CampaignDb {
    let config = DatabaseConfig {
        path: dir.path().join("campaign.db"),
        ..DatabaseConfig::default()
    };
    CampaignDb::open(&config).expect("open store")
}

/// Builds an article draft with the provided title and status.
fn article_draft(title: &str, status: ArticleStatus, category: Option<&str>) -> ArticleDraft {
    ArticleDraft {
        title: title.to_string(),
        slug: None,
        excerpt: Some(format!("{title} excerpt")),
        content: format!("{title} body"),
        featured_image: None,
        author: None,
        category: category.map(ToString::to_string),
        status,
        tags: vec!["campaign".to_string()],
    }
}

/// Builds an open event draft with the provided capacity.
fn event_draft(title: &str, max_attendees: Option<u32>) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        slug: None,
        description: Some("Town hall".to_string()),
        location: Some("Community grounds".to_string()),
        starts_at: "2026-10-01T10:00:00Z".to_string(),
        ends_at: None,
        featured_image: None,
        status: EventStatus::Upcoming,
        max_attendees,
        registration_required: true,
    }
}

/// Builds a registration payload for the provided email.
fn registration(email: &str) -> NewRegistration {
    NewRegistration {
        name: "Amina Odhiambo".to_string(),
        email: email.to_string(),
        phone: Some("254712345678".to_string()),
        notes: None,
    }
}

#[test]
fn open_is_idempotent_across_reopens() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    drop(store);
    let store = open_store(&dir);
    assert!(store.list_contacts().expect("list contacts").is_empty());
}

#[test]
fn contact_insert_and_list_roundtrip() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let id = store
        .insert_contact(&NewContact {
            name: "Juma K".to_string(),
            email: "juma@example.org".to_string(),
            phone: Some("254712345678".to_string()),
            subject: "Roads".to_string(),
            message: "When does grading start?".to_string(),
            ip_address: Some("127.0.0.1".to_string()),
            user_agent: None,
        })
        .expect("insert contact");
    assert!(id > 0);
    let contacts = store.list_contacts().expect("list contacts");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].subject, "Roads");
    assert_eq!(contacts[0].status.as_str(), "new");
}

#[test]
fn newsletter_subscription_is_idempotent_and_reactivates() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let first = store
        .subscribe_newsletter("Voter@Example.org", Some("Voter"), None)
        .expect("subscribe");
    assert_eq!(first, SubscribeOutcome::Subscribed);
    let again = store
        .subscribe_newsletter("voter@example.org", None, None)
        .expect("subscribe again");
    assert_eq!(again, SubscribeOutcome::AlreadySubscribed);
    assert!(store.unsubscribe_newsletter("voter@example.org").expect("unsubscribe"));
    assert!(!store.unsubscribe_newsletter("voter@example.org").expect("second unsubscribe"));
    let back = store
        .subscribe_newsletter("voter@example.org", None, None)
        .expect("resubscribe");
    assert_eq!(back, SubscribeOutcome::Reactivated);
    let rows = store.list_subscriptions().expect("list subscriptions");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email, "voter@example.org");
}

#[test]
fn volunteer_insert_and_list_roundtrip() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    store
        .insert_volunteer(&NewVolunteer {
            name: "Wanjiru M".to_string(),
            email: "wanjiru@example.org".to_string(),
            phone: "254701234567".to_string(),
            location: Some("Ward 4".to_string()),
            skills: Some("First aid".to_string()),
            availability: Some("Weekends".to_string()),
            experience: None,
            motivation: None,
            ip_address: None,
        })
        .expect("insert volunteer");
    let volunteers = store.list_volunteers().expect("list volunteers");
    assert_eq!(volunteers.len(), 1);
    assert_eq!(volunteers[0].status.as_str(), "pending");
}

#[test]
fn article_slug_conflicts_are_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    store
        .create_article(&article_draft("Water Project", ArticleStatus::Published, None))
        .expect("create article");
    let duplicate = store.create_article(&article_draft(
        "Water Project",
        ArticleStatus::Draft,
        None,
    ));
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
}

#[test]
fn published_listing_filters_by_category_and_pages() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    store
        .create_article(&article_draft("Health Post", ArticleStatus::Published, Some("health")))
        .expect("create health");
    store
        .create_article(&article_draft("Roads Post", ArticleStatus::Published, Some("infrastructure")))
        .expect("create roads");
    store
        .create_article(&article_draft("Hidden Draft", ArticleStatus::Draft, Some("health")))
        .expect("create draft");
    let (all, total) = store
        .list_published_articles(None, 10, 0)
        .expect("list published");
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);
    let (health, health_total) = store
        .list_published_articles(Some("health"), 10, 0)
        .expect("list health");
    assert_eq!(health_total, 1);
    assert_eq!(health[0].title, "Health Post");
    let (page_two, _) = store
        .list_published_articles(None, 1, 1)
        .expect("page two");
    assert_eq!(page_two.len(), 1);
    let categories = store.list_categories().expect("categories");
    assert_eq!(categories, vec!["health".to_string(), "infrastructure".to_string()]);
}

#[test]
fn reading_an_article_increments_views_once_per_read() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    store
        .create_article(&article_draft("Launch Rally", ArticleStatus::Published, None))
        .expect("create article");
    let first = store
        .read_published_article("launch-rally")
        .expect("read")
        .expect("article exists");
    assert_eq!(first.views, 1);
    let second = store
        .read_published_article(&first.id.to_string())
        .expect("read by id")
        .expect("article exists");
    assert_eq!(second.views, 2);
    let metrics = store
        .article_metrics("launch-rally")
        .expect("metrics")
        .expect("metrics exist");
    assert_eq!(metrics.views, 2);
}

#[test]
fn likes_and_shares_accumulate_and_missing_articles_return_none() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    store
        .create_article(&article_draft("Manifesto", ArticleStatus::Published, None))
        .expect("create article");
    assert_eq!(store.like_article("manifesto").expect("like"), Some(1));
    assert_eq!(store.like_article("manifesto").expect("like"), Some(2));
    assert_eq!(store.share_article("manifesto").expect("share"), Some(1));
    assert_eq!(store.like_article("no-such-slug").expect("like missing"), None);
}

#[test]
fn drafts_are_invisible_to_public_reads() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let id = store
        .create_article(&article_draft("Quiet Draft", ArticleStatus::Draft, None))
        .expect("create draft");
    assert!(store.read_published_article("quiet-draft").expect("read").is_none());
    assert!(store.read_published_article(&id.to_string()).expect("read by id").is_none());
    assert!(store.get_article(id).expect("admin read").is_some());
}

#[test]
fn publishing_via_update_stamps_published_at_once() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let id = store
        .create_article(&article_draft("Slow Burn", ArticleStatus::Draft, None))
        .expect("create draft");
    let mut draft = article_draft("Slow Burn", ArticleStatus::Published, None);
    assert!(store.update_article(id, &draft).expect("publish"));
    let published = store
        .get_article(id)
        .expect("get")
        .expect("article exists");
    let stamp = published.published_at_ms.expect("published stamp");
    draft.excerpt = Some("revised".to_string());
    assert!(store.update_article(id, &draft).expect("revise"));
    let revised = store.get_article(id).expect("get").expect("article exists");
    assert_eq!(revised.published_at_ms, Some(stamp));
}

#[test]
fn seeding_skips_existing_slugs() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let seeds = vec![
        article_draft("Seed One", ArticleStatus::Published, Some("community")),
        article_draft("Seed Two", ArticleStatus::Published, Some("community")),
    ];
    assert_eq!(store.seed_articles(&seeds).expect("seed"), 2);
    assert_eq!(store.seed_articles(&seeds).expect("seed again"), 0);
}

#[test]
fn comments_require_a_published_article_and_moderation() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    assert!(store
        .insert_comment("missing", "A", "a@example.org", "hi")
        .expect("insert on missing")
        .is_none());
    store
        .create_article(&article_draft("Open Post", ArticleStatus::Published, None))
        .expect("create article");
    let comment_id = store
        .insert_comment("open-post", "Asha", "asha@example.org", "Great plan")
        .expect("insert comment")
        .expect("article resolved");
    let visible = store
        .list_approved_comments("open-post")
        .expect("list approved")
        .expect("article resolved");
    assert!(visible.is_empty());
    let pending = store.list_pending_comments().expect("pending");
    assert_eq!(pending.len(), 1);
    assert!(store.approve_comment(comment_id).expect("approve"));
    assert!(!store.approve_comment(comment_id).expect("approve twice"));
    let visible = store
        .list_approved_comments("open-post")
        .expect("list approved")
        .expect("article resolved");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].body, "Great plan");
    assert!(store.delete_comment(comment_id).expect("delete"));
}

#[test]
fn registration_enforces_capacity_within_one_transaction() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let event_id = store
        .create_event(&event_draft("Small Hall Meeting", Some(2)))
        .expect("create event");
    store
        .register_attendee(event_id, &registration("one@example.org"))
        .expect("first registration");
    store
        .register_attendee(event_id, &registration("two@example.org"))
        .expect("second registration");
    let full = store.register_attendee(event_id, &registration("three@example.org"));
    assert!(matches!(full, Err(RegistrationError::CapacityExceeded)));
    let (_, confirmed) = store
        .get_event(event_id)
        .expect("get event")
        .expect("event exists");
    assert_eq!(confirmed, 2);
}

#[test]
fn registration_rejects_duplicates_case_insensitively() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let event_id = store
        .create_event(&event_draft("Rally", None))
        .expect("create event");
    store
        .register_attendee(event_id, &registration("Voter@Example.org"))
        .expect("first registration");
    let duplicate = store.register_attendee(event_id, &registration("voter@example.org"));
    assert!(matches!(duplicate, Err(RegistrationError::AlreadyRegistered)));
}

#[test]
fn registration_rejects_missing_and_closed_events() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let missing = store.register_attendee(999, &registration("x@example.org"));
    assert!(matches!(missing, Err(RegistrationError::EventNotFound)));
    let mut closed = event_draft("Finished Event", None);
    closed.status = EventStatus::Completed;
    let closed_id = store.create_event(&closed).expect("create closed event");
    let result = store.register_attendee(closed_id, &registration("x@example.org"));
    assert!(matches!(result, Err(RegistrationError::RegistrationClosed)));
    let mut walk_in = event_draft("Walk-in Day", None);
    walk_in.registration_required = false;
    let walk_in_id = store.create_event(&walk_in).expect("create walk-in event");
    let result = store.register_attendee(walk_in_id, &registration("x@example.org"));
    assert!(matches!(result, Err(RegistrationError::RegistrationClosed)));
    let mut running = event_draft("Live Rally", None);
    running.status = EventStatus::Ongoing;
    let running_id = store.create_event(&running).expect("create running event");
    let result = store.register_attendee(running_id, &registration("x@example.org"));
    assert!(matches!(result, Err(RegistrationError::RegistrationClosed)));
}

#[test]
fn public_event_listing_excludes_finished_events() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    store.create_event(&event_draft("Open Rally", None)).expect("create open");
    let mut done = event_draft("Past Rally", None);
    done.status = EventStatus::Completed;
    store.create_event(&done).expect("create done");
    let public = store.list_public_events().expect("list public");
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].0.title, "Open Rally");
    let all = store.list_all_events().expect("list all");
    assert_eq!(all.len(), 2);
}

#[test]
fn event_update_and_delete_cascade_registrations() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let event_id = store
        .create_event(&event_draft("Editable", Some(10)))
        .expect("create event");
    store
        .register_attendee(event_id, &registration("a@example.org"))
        .expect("register");
    let mut draft = event_draft("Editable", Some(5));
    draft.location = Some("New grounds".to_string());
    assert!(store.update_event(event_id, &draft).expect("update"));
    assert_eq!(store.list_registrations(event_id).expect("registrations").len(), 1);
    assert!(store.delete_event(event_id).expect("delete"));
    assert!(store.get_event(event_id).expect("get").is_none());
    assert!(store.list_registrations(event_id).expect("registrations").is_empty());
}

#[test]
fn agenda_items_order_by_priority_rank() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let low = campaign_hub_core::AgendaDraft {
        title: "Paint office".to_string(),
        description: None,
        category: None,
        priority: campaign_hub_core::AgendaPriority::Low,
        status: campaign_hub_core::AgendaStatus::Planned,
        target_date: None,
        progress_percent: 0,
    };
    let high = campaign_hub_core::AgendaDraft {
        title: "Water access".to_string(),
        priority: campaign_hub_core::AgendaPriority::High,
        progress_percent: 40,
        ..low.clone()
    };
    store.create_agenda_item(&low).expect("create low");
    let high_id = store.create_agenda_item(&high).expect("create high");
    let items = store.list_agenda_items().expect("list agenda");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Water access");
    let mut updated = high.clone();
    updated.progress_percent = 100;
    updated.status = campaign_hub_core::AgendaStatus::Completed;
    assert!(store.update_agenda_item(high_id, &updated).expect("update"));
    assert!(store.delete_agenda_item(high_id).expect("delete"));
}

#[test]
fn donation_lifecycle_resolves_by_gateway_reference() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let id = store
        .insert_donation(&NewDonation {
            donor_name: "Halima".to_string(),
            donor_email: Some("halima@example.org".to_string()),
            phone: Some("254712345678".to_string()),
            amount_kes: 500.0,
            payment_method: "mpesa".to_string(),
            ip_address: None,
        })
        .expect("insert donation");
    store
        .set_donation_gateway_ref(id, "ws_CO_123")
        .expect("set gateway ref");
    assert!(store
        .complete_donation("ws_CO_123", Some("QBC1XYZ"))
        .expect("complete"));
    assert!(!store
        .complete_donation("ws_CO_123", Some("QBC1XYZ"))
        .expect("complete twice"));
    assert!(!store.fail_donation("ws_CO_123").expect("fail completed"));
    let donations = store.list_donations().expect("list donations");
    assert_eq!(donations.len(), 1);
    assert_eq!(donations[0].status.as_str(), "completed");
    assert_eq!(donations[0].transaction_id.as_deref(), Some("QBC1XYZ"));
    assert_eq!(donations[0].amount_kes, 500.0);
}

#[test]
fn failed_gateway_callbacks_mark_pending_donations() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let id = store
        .insert_donation(&NewDonation {
            donor_name: "Otieno".to_string(),
            donor_email: None,
            phone: Some("254701112233".to_string()),
            amount_kes: 100.0,
            payment_method: "mpesa".to_string(),
            ip_address: None,
        })
        .expect("insert donation");
    store
        .set_donation_gateway_ref(id, "ws_CO_456")
        .expect("set gateway ref");
    assert!(store.fail_donation("ws_CO_456").expect("fail"));
    let donations = store.list_donations().expect("list donations");
    assert_eq!(donations[0].status.as_str(), "failed");
}

#[test]
fn admin_accounts_and_sessions_roundtrip() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(&dir);
    let salt = "00ff00ff";
    let hash = password::hash_password("correct horse", salt);
    let admin_id = store
        .create_admin("chair", "chair@example.org", &hash, salt, "admin")
        .expect("create admin");
    let duplicate = store.create_admin("chair", "other@example.org", &hash, salt, "admin");
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
    let admin = store
        .find_admin("chair")
        .expect("find admin")
        .expect("admin exists");
    assert!(password::verify_password("correct horse", &admin.salt, &admin.password_hash));
    store.record_admin_login(admin_id).expect("record login");
    let now = unix_millis();
    store
        .insert_session("live-token", admin_id, now, now + 60_000)
        .expect("insert live session");
    store
        .insert_session("dead-token", admin_id, now - 120_000, now - 60_000)
        .expect("insert dead session");
    let resolved = store
        .session_admin("live-token")
        .expect("resolve live")
        .expect("session valid");
    assert_eq!(resolved.username, "chair");
    assert!(store.session_admin("dead-token").expect("resolve dead").is_none());
    assert!(store.session_admin("unknown").expect("resolve unknown").is_none());
    assert_eq!(store.purge_expired_sessions().expect("purge"), 1);
}
