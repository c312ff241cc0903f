use std::fmt;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use super::export::{ExportedDocument, DOCUMENT_TITLE};
use crate::config::MailConfig;

pub const MAIL_BODY: &str = "Прилагаем список отсутствующих за сегодня.";

/// Outbound delivery of a rendered report.
pub trait ReportNotifier: Send + Sync {
    fn send(&self, recipient: &str, document: &ExportedDocument) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("e-mail delivery is not configured")]
    NotConfigured,
    #[error("invalid e-mail address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("failed to compose e-mail: {0}")]
    Message(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|err| NotifyError::Address {
            address: address.to_string(),
            reason: err.to_string(),
        })
}

/// Sends reports through an SMTP relay using STARTTLS.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let (Some(credentials), Some(from)) = (&config.credentials, &config.from) else {
            return Err(NotifyError::NotConfigured);
        };

        let transport = SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|err| NotifyError::Transport(err.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: mailbox(from)?,
        })
    }
}

fn compose_message(
    from: Mailbox,
    to: Mailbox,
    document: &ExportedDocument,
) -> Result<Message, NotifyError> {
    let content_type = ContentType::parse(document.content_type)
        .map_err(|err| NotifyError::Message(err.to_string()))?;
    let attachment =
        Attachment::new(document.file_name.to_string()).body(document.bytes.clone(), content_type);

    Message::builder()
        .from(from)
        .to(to)
        .subject(DOCUMENT_TITLE)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(MAIL_BODY.to_string()))
                .singlepart(attachment),
        )
        .map_err(|err| NotifyError::Message(err.to_string()))
}

impl fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl ReportNotifier for SmtpNotifier {
    fn send(&self, recipient: &str, document: &ExportedDocument) -> Result<(), NotifyError> {
        let to = mailbox(recipient)?;
        let message = compose_message(self.from.clone(), to, document)?;
        self.transport
            .send(&message)
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        info!(%recipient, attachment = document.file_name, "sent absence report");
        Ok(())
    }
}

/// Stand-in used when no SMTP credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

impl ReportNotifier for DisabledNotifier {
    fn send(&self, recipient: &str, _document: &ExportedDocument) -> Result<(), NotifyError> {
        mailbox(recipient)?;
        Err(NotifyError::NotConfigured)
    }
}
