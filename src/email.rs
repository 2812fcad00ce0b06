//! Outbound mail composed from contact form submissions.

use askama::Template;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::stub::StubTransport;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("failed to render email template: {0}")]
    Render(#[from] askama::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("stub transport error: {0}")]
    Stub(#[from] lettre::transport::stub::Error),
}

/// A contact form submission, consumed once to build one outbound message.
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "emails/contact.html")]
struct ContactHtmlTemplate<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "emails/contact.txt")]
struct ContactTextTemplate<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Clone)]
enum MailTransport {
    Smtp(SmtpTransport),
    Stub(StubTransport),
}

/// Mail service relaying submissions to the operator's mailbox
#[derive(Clone)]
pub struct Mailer {
    transport: MailTransport,
    sender: Mailbox,
    recipient: Mailbox,
}

impl Mailer {
    /// Create a new mailer from configuration
    ///
    /// The transport and both mailboxes are built once here so bad
    /// configuration fails at startup, not on the first submission.
    pub fn new(config: &MailConfig) -> Result<Self, EmailError> {
        let builder = if config.use_ssl {
            // TLS from the first byte (SMTPS)
            SmtpTransport::relay(&config.server)?
        } else if config.use_tls {
            SmtpTransport::starttls_relay(&config.server)?
        } else {
            // Plaintext connection (e.g., MailDev)
            SmtpTransport::builder_dangerous(&config.server)
        };

        let mut builder = builder.port(config.port);

        if config.username.is_empty() || config.password.is_empty() {
            tracing::info!(
                smtp_host = %config.server,
                smtp_port = config.port,
                "SMTP credentials not configured, sending unauthenticated"
            );
        } else {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: MailTransport::Smtp(builder.build()),
            sender: config.default_sender.parse()?,
            recipient: config.recipient.parse()?,
        })
    }

    /// Mailer backed by a recording transport, for tests. The returned
    /// handle exposes every message "sent" through it.
    pub fn stub(config: &MailConfig) -> Result<(Self, StubTransport), EmailError> {
        let stub = StubTransport::new_ok();
        let mailer = Self {
            transport: MailTransport::Stub(stub.clone()),
            sender: config.default_sender.parse()?,
            recipient: config.recipient.parse()?,
        };
        Ok((mailer, stub))
    }

    /// Mailer whose transport rejects every message, for failure-path tests.
    pub fn failing(config: &MailConfig) -> Result<Self, EmailError> {
        Ok(Self {
            transport: MailTransport::Stub(StubTransport::new_error()),
            sender: config.default_sender.parse()?,
            recipient: config.recipient.parse()?,
        })
    }

    /// Relay one submission to the configured recipient.
    ///
    /// Blocks the calling request until the transport accepts or rejects
    /// the message; there is no retry.
    pub fn send_contact_notification(&self, submission: &Submission) -> Result<(), EmailError> {
        let html = ContactHtmlTemplate {
            name: &submission.name,
            email: &submission.email,
            message: &submission.message,
        }
        .render()?;

        let plain = ContactTextTemplate {
            name: &submission.name,
            email: &submission.email,
            message: &submission.message,
        }
        .render()?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(format!("Contact Form Submission from {}", submission.name))
            .multipart(MultiPart::alternative_plain_html(plain, html))?;

        match &self.transport {
            MailTransport::Smtp(mailer) => {
                mailer.send(&message)?;
            }
            MailTransport::Stub(mailer) => {
                mailer.send(&message)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;

    fn test_mail_config() -> MailConfig {
        MailConfig {
            default_sender: "noreply@postbox.test".to_string(),
            recipient: "operator@postbox.test".to_string(),
            ..MailConfig::default()
        }
    }

    fn test_submission() -> Submission {
        Submission {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            message: "Hi".to_string(),
        }
    }

    #[test]
    fn test_send_records_one_message_with_subject() {
        let (mailer, outbox) = Mailer::stub(&test_mail_config()).unwrap();

        mailer.send_contact_notification(&test_submission()).unwrap();

        let messages = outbox.messages();
        assert_eq!(messages.len(), 1);

        let (envelope, raw) = &messages[0];
        assert_eq!(envelope.to()[0].to_string(), "operator@postbox.test");
        assert!(raw.contains("Contact Form Submission from Alice"));
    }

    #[test]
    fn test_html_part_escapes_user_fields() {
        let (mailer, outbox) = Mailer::stub(&test_mail_config()).unwrap();

        let submission = Submission {
            name: "Mallory".to_string(),
            email: "m@x.com".to_string(),
            message: "<script>alert(1)</script>".to_string(),
        };
        mailer.send_contact_notification(&submission).unwrap();

        let messages = outbox.messages();
        let (_, raw) = &messages[0];
        assert!(raw.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_failing_transport_surfaces_error() {
        let mailer = Mailer::failing(&test_mail_config()).unwrap();

        let result = mailer.send_contact_notification(&test_submission());
        assert!(matches!(result, Err(EmailError::Stub(_))));
    }

    #[test]
    fn test_unparsable_sender_fails_at_construction() {
        let config = MailConfig {
            default_sender: "not a mailbox".to_string(),
            ..test_mail_config()
        };

        assert!(matches!(Mailer::new(&config), Err(EmailError::Address(_))));
    }
}
