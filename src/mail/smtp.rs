//! SMTP sender via lettre.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use tracing::info;

use super::settings::{SmtpSecurity, TransportSettings};
use super::transport::{Credentials, MailSender, OutboundEmail};
use crate::error::TransportError;

/// Sends multipart (plain + HTML) emails through the sender's SMTP relay.
pub struct SmtpMailSender {
    from: Mailbox,
    transport: SmtpTransport,
}

impl SmtpMailSender {
    /// Build a sender for `credentials` against the resolved relay.
    pub fn new(
        settings: &TransportSettings,
        credentials: &Credentials,
    ) -> Result<Self, TransportError> {
        let from: Mailbox =
            credentials
                .address
                .parse()
                .map_err(|e| TransportError::InvalidAddress {
                    address: credentials.address.clone(),
                    reason: format!("{e}"),
                })?;

        let builder = match settings.smtp_security {
            SmtpSecurity::ImplicitTls => SmtpTransport::relay(&settings.smtp_host),
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(&settings.smtp_host),
        }
        .map_err(|e| TransportError::Relay {
            host: settings.smtp_host.clone(),
            reason: format!("{e}"),
        })?;

        let transport = builder
            .port(settings.smtp_port)
            .credentials(SmtpCredentials::new(
                credentials.address.clone(),
                credentials.password.expose_secret().to_string(),
            ))
            .build();

        Ok(Self { from, transport })
    }
}

/// Build the MIME message for one outbound email.
pub fn build_message(from: &Mailbox, email: &OutboundEmail) -> Result<Message, TransportError> {
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| TransportError::InvalidAddress {
            address: email.to.clone(),
            reason: format!("{e}"),
        })?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
        .map_err(|e| TransportError::BuildFailed {
            to: email.to.clone(),
            reason: format!("{e}"),
        })
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send(&self, email: &OutboundEmail) -> Result<(), TransportError> {
        let message = build_message(&self.from, email)?;
        let transport = self.transport.clone();
        let to = email.to.clone();

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| TransportError::SendFailed {
                to: to.clone(),
                reason: format!("send task panicked: {e}"),
            })?
            .map_err(|e| TransportError::SendFailed {
                to: to.clone(),
                reason: format!("SMTP send failed: {e}"),
            })?;

        info!(to = %to, "Email sent");
        Ok(())
    }
}
