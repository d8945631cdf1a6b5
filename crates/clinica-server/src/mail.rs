//! Outbound notification mail.
//!
//! Sends are fire-and-forget: a failure is logged and never reaches the
//! request that triggered it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::MailSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Mail {
    pub fn appointment_booked(to: &str, scheduled_for: DateTime<Utc>) -> Self {
        Self {
            to: to.to_string(),
            subject: "Consulta Agendada".into(),
            body: format!(
                "Sua consulta foi marcada para {}.",
                scheduled_for.format("%d/%m/%Y %H:%M")
            ),
        }
    }

    pub fn appointment_cancelled(to: &str, scheduled_for: DateTime<Utc>) -> Self {
        Self {
            to: to.to_string(),
            subject: "Consulta Cancelada".into(),
            body: format!(
                "Sua consulta de {} foi cancelada.",
                scheduled_for.format("%d/%m/%Y %H:%M")
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("mail could not be built: {0}")]
    Message(String),

    #[error("mail transport failed: {0}")]
    Transport(String),
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Blocking mail transport.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

/// Writes mails to the log instead of delivering them.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl Mailer for LogMailer {
    fn send(&self, mail: &Mail) -> Result<(), MailError> {
        info!(
            from = %self.from,
            to = %mail.to,
            subject = %mail.subject,
            "{}",
            mail.body
        );
        Ok(())
    }
}

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers mail through an SMTP relay.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    server: String,
    port: u16,
}

impl SmtpMailer {
    /// Build a relay client from settings, or `None` when no server is set.
    ///
    /// No connection is opened here; the first send dials the relay.
    pub fn from_settings(settings: &MailSettings) -> Result<Option<Self>, MailError> {
        let Some(server) = settings
            .smtp_server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return Ok(None);
        };
        let from = mailbox(&settings.from)?;

        let mut builder = if settings.use_tls {
            SmtpTransport::starttls_relay(server)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            SmtpTransport::builder_dangerous(server)
        }
        .port(settings.smtp_port)
        .timeout(Some(SMTP_TIMEOUT));
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Some(Self {
            transport: builder.build(),
            from,
            server: server.to_string(),
            port: settings.smtp_port,
        }))
    }

    pub fn relay(&self) -> (&str, u16) {
        (&self.server, self.port)
    }

    pub fn message(&self, mail: &Mail) -> Result<Message, MailError> {
        Message::builder()
            .from(self.from.clone())
            .to(mailbox(&mail.to)?)
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| MailError::Message(e.to_string()))
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: &Mail) -> Result<(), MailError> {
        let message = self.message(mail)?;
        self.transport
            .send(&message)
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// The configured transport: SMTP when a relay is set, the log otherwise.
pub fn from_settings(settings: &MailSettings) -> Result<Arc<dyn Mailer>, MailError> {
    match SmtpMailer::from_settings(settings)? {
        Some(mailer) => {
            let (server, port) = mailer.relay();
            info!(server, port, tls = settings.use_tls, "Mail delivered over SMTP");
            Ok(Arc::new(mailer))
        }
        None => {
            info!("No SMTP server configured, mail is logged only");
            Ok(Arc::new(LogMailer::new(settings.from.clone())))
        }
    }
}

/// Hand `mail` to a blocking task and return immediately.
pub fn send_detached(mailer: Arc<dyn Mailer>, mail: Mail) {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = mailer.send(&mail) {
            warn!(to = %mail.to, subject = %mail.subject, error = %e, "Mail not sent");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings(smtp_server: Option<&str>) -> MailSettings {
        MailSettings {
            from: "nao-responda@clinica.local".into(),
            smtp_server: smtp_server.map(str::to_string),
            smtp_port: 2525,
            username: Some("clinica".into()),
            password: Some("segredo".into()),
            use_tls: false,
        }
    }

    #[test]
    fn booking_mail_uses_local_date_format() {
        let when = Utc.with_ymd_and_hms(2025, 7, 1, 14, 30, 0).unwrap();
        let mail = Mail::appointment_booked("maria@email.com", when);
        assert_eq!(mail.subject, "Consulta Agendada");
        assert_eq!(mail.body, "Sua consulta foi marcada para 01/07/2025 14:30.");
    }

    #[test]
    fn log_mailer_never_fails() {
        let mailer = LogMailer::new("nao-responda@clinica.local");
        let when = Utc.with_ymd_and_hms(2025, 7, 1, 14, 30, 0).unwrap();
        assert!(
            mailer
                .send(&Mail::appointment_cancelled("a@b.com", when))
                .is_ok()
        );
    }

    #[test]
    fn smtp_is_selected_only_when_a_server_is_set() {
        assert!(SmtpMailer::from_settings(&settings(None)).unwrap().is_none());
        assert!(SmtpMailer::from_settings(&settings(Some("  "))).unwrap().is_none());

        let mailer = SmtpMailer::from_settings(&settings(Some("smtp.hospital.org")))
            .unwrap()
            .unwrap();
        assert_eq!(mailer.relay(), ("smtp.hospital.org", 2525));
        assert!(from_settings(&settings(Some("smtp.hospital.org"))).is_ok());
        assert!(from_settings(&settings(None)).is_ok());
    }

    #[test]
    fn invalid_sender_is_a_configuration_error() {
        let mut bad = settings(Some("smtp.hospital.org"));
        bad.from = "not an address".into();
        assert!(matches!(
            SmtpMailer::from_settings(&bad),
            Err(MailError::Address { .. })
        ));
        // the log transport never parses the sender
        bad.smtp_server = None;
        assert!(from_settings(&bad).is_ok());
    }

    #[test]
    fn smtp_message_carries_subject_and_recipient() {
        let mailer = SmtpMailer::from_settings(&settings(Some("smtp.hospital.org")))
            .unwrap()
            .unwrap();
        let when = Utc.with_ymd_and_hms(2025, 7, 1, 14, 30, 0).unwrap();
        let message = mailer
            .message(&Mail::appointment_booked("maria@email.com", when))
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Consulta Agendada"));
        assert!(raw.contains("To: maria@email.com"));

        assert!(matches!(
            mailer.message(&Mail::appointment_booked("sem-arroba", when)),
            Err(MailError::Address { .. })
        ));
    }
}
