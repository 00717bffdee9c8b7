// crates/campaign-hub-server/src/notify.rs
// ============================================================================
// Module: Email Notifications
// Description: SMTP notification sender behind a trait seam.
// Purpose: Acknowledge submissions and alert staff without blocking requests.
// Dependencies: campaign-hub-config, lettre, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Handlers never talk to SMTP directly; they call a [`Notifier`]. The
//! production implementation sends HTML mail over STARTTLS via `lettre`. A
//! log-only implementation backs deployments without mail credentials and the
//! test suite. Notification failures are reported to the caller but must
//! never fail the originating request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use campaign_hub_config::MailConfig;
use lettre::Message;
use lettre::SmtpTransport;
use lettre::Transport;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Email address failed to parse.
    #[error("invalid mail address: {0}")]
    Address(String),
    /// Message construction failed.
    #[error("mail build failed: {0}")]
    Build(String),
    /// SMTP transport failed.
    #[error("mail send failed: {0}")]
    Send(String),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Outbound notification seam used by the handlers.
pub trait Notifier: Send + Sync {
    /// Acknowledges a contact submission and alerts the campaign inbox.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the mail cannot be sent.
    fn contact_received(&self, name: &str, email: &str, subject: &str) -> Result<(), NotifyError>;

    /// Sends the newsletter welcome mail.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the mail cannot be sent.
    fn newsletter_welcome(&self, email: &str, name: Option<&str>) -> Result<(), NotifyError>;

    /// Acknowledges a volunteer signup.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the mail cannot be sent.
    fn volunteer_received(&self, name: &str, email: &str) -> Result<(), NotifyError>;

    /// Confirms an event registration.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the mail cannot be sent.
    fn registration_confirmed(
        &self,
        name: &str,
        email: &str,
        event_title: &str,
        starts_at: &str,
    ) -> Result<(), NotifyError>;
}

// ============================================================================
// SECTION: SMTP Notifier
// ============================================================================

/// SMTP-backed notifier using STARTTLS.
pub struct SmtpNotifier {
    /// Shared SMTP transport.
    transport: SmtpTransport,
    /// Parsed sender mailbox.
    sender: Mailbox,
    /// Campaign inbox that receives staff alerts.
    admin_address: Mailbox,
}

impl SmtpNotifier {
    /// Builds an SMTP notifier from the mail configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the relay host or addresses are invalid.
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let sender = config
            .sender
            .parse::<Mailbox>()
            .map_err(|err| NotifyError::Address(err.to_string()))?;
        let admin_address = config
            .admin_address
            .parse::<Mailbox>()
            .map_err(|err| NotifyError::Address(err.to_string()))?;
        let transport = SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|err| NotifyError::Send(err.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            sender,
            admin_address,
        })
    }

    /// Sends one HTML message to the recipient address.
    fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), NotifyError> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|err| NotifyError::Address(err.to_string()))?;
        let message = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|err| NotifyError::Build(err.to_string()))?;
        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|err| NotifyError::Send(err.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn contact_received(&self, name: &str, email: &str, subject: &str) -> Result<(), NotifyError> {
        self.send_html(
            email,
            "We received your message",
            format!(
                "<h2>Thank you, {name}</h2><p>We received your message about \
                 \"{subject}\" and will respond as soon as possible.</p>"
            ),
        )?;
        self.send_html(
            self.admin_address.email.to_string().as_str(),
            "New contact form submission",
            format!("<p>New message from <b>{name}</b> ({email}): {subject}</p>"),
        )
    }

    fn newsletter_welcome(&self, email: &str, name: Option<&str>) -> Result<(), NotifyError> {
        let greeting = name.unwrap_or("friend");
        self.send_html(
            email,
            "Welcome to the campaign newsletter",
            format!(
                "<h2>Karibu, {greeting}!</h2><p>You are now subscribed to campaign \
                 updates. You can unsubscribe at any time.</p>"
            ),
        )
    }

    fn volunteer_received(&self, name: &str, email: &str) -> Result<(), NotifyError> {
        self.send_html(
            email,
            "Thank you for volunteering",
            format!(
                "<h2>Asante, {name}!</h2><p>Your volunteer registration is in. Our \
                 team will reach out with next steps.</p>"
            ),
        )
    }

    fn registration_confirmed(
        &self,
        name: &str,
        email: &str,
        event_title: &str,
        starts_at: &str,
    ) -> Result<(), NotifyError> {
        let [attendee, staff] = registration_messages(name, email, event_title, starts_at);
        self.send_html(email, &attendee.0, attendee.1)?;
        self.send_html(self.admin_address.email.to_string().as_str(), &staff.0, staff.1)
    }
}

/// Builds the attendee confirmation and the staff alert for one registration.
///
/// Index 0 is addressed to the attendee, index 1 to the campaign inbox; each
/// entry is a `(subject, html body)` pair.
fn registration_messages(
    name: &str,
    email: &str,
    event_title: &str,
    starts_at: &str,
) -> [(String, String); 2] {
    [
        (
            "Your event registration is confirmed".to_string(),
            format!(
                "<h2>See you there, {name}!</h2><p>You are confirmed for \
                 <b>{event_title}</b> starting {starts_at}.</p>"
            ),
        ),
        (
            "New event registration".to_string(),
            format!("<p><b>{name}</b> ({email}) registered for {event_title}.</p>"),
        ),
    ]
}

// ============================================================================
// SECTION: Log Notifier
// ============================================================================

/// Notifier that records intent as JSON lines instead of sending mail.
///
/// Used when mail is disabled in configuration and by the test suite.
pub struct LogNotifier;

impl LogNotifier {
    /// Writes one notification record to stderr.
    fn log(&self, kind: &str, recipient: &str, subject: &str) {
        let payload = json!({
            "event": "notification",
            "kind": kind,
            "recipient": recipient,
            "subject": subject,
        });
        let _ = writeln!(std::io::stderr(), "{payload}");
    }
}

impl Notifier for LogNotifier {
    fn contact_received(&self, _name: &str, email: &str, subject: &str) -> Result<(), NotifyError> {
        self.log("contact_ack", email, subject);
        Ok(())
    }

    fn newsletter_welcome(&self, email: &str, _name: Option<&str>) -> Result<(), NotifyError> {
        self.log("newsletter_welcome", email, "welcome");
        Ok(())
    }

    fn volunteer_received(&self, _name: &str, email: &str) -> Result<(), NotifyError> {
        self.log("volunteer_ack", email, "volunteer");
        Ok(())
    }

    fn registration_confirmed(
        &self,
        _name: &str,
        email: &str,
        event_title: &str,
        _starts_at: &str,
    ) -> Result<(), NotifyError> {
        self.log("registration_confirmed", email, event_title);
        Ok(())
    }
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

    use super::registration_messages;

    #[test]
    fn registration_mail_covers_attendee_and_campaign_inbox() {
        let [attendee, staff] = registration_messages(
            "Akinyi",
            "akinyi@example.org",
            "Town Hall",
            "2026-09-01T10:00:00Z",
        );
        assert!(attendee.1.contains("Akinyi"));
        assert!(attendee.1.contains("Town Hall"));
        assert!(attendee.1.contains("2026-09-01T10:00:00Z"));
        assert!(staff.1.contains("akinyi@example.org"));
        assert!(staff.1.contains("Town Hall"));
        assert_ne!(attendee.0, staff.0);
    }
}
