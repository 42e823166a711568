//! Production mailer — lettre SMTP for sending, IMAP for reply checks.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::imap::ImapMailFetcher;
use super::settings::{TransportSettings, resolve_transport_settings};
use super::smtp::SmtpMailSender;
use super::transport::{Credentials, MailFetcher, MailSender, MailerFactory};
use crate::config::OutreachConfig;
use crate::error::TransportError;

/// Builds real SMTP senders and IMAP fetchers from request credentials.
pub struct LiveMailer {
    smtp_host_override: Option<String>,
    imap_host_override: Option<String>,
    fetch_timeout: Duration,
}

impl LiveMailer {
    pub fn new(config: &OutreachConfig) -> Self {
        Self {
            smtp_host_override: config.smtp_host_override.clone(),
            imap_host_override: config.imap_host_override.clone(),
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Endpoints for `address`, after applying configured overrides.
    pub fn settings_for(&self, address: &str) -> TransportSettings {
        resolve_transport_settings(address).with_overrides(
            self.smtp_host_override.as_deref(),
            self.imap_host_override.as_deref(),
        )
    }
}

impl MailerFactory for LiveMailer {
    fn sender(&self, credentials: &Credentials) -> Result<Arc<dyn MailSender>, TransportError> {
        let settings = self.settings_for(&credentials.address);
        debug!(
            provider = ?settings.provider,
            host = %settings.smtp_host,
            port = settings.smtp_port,
            "Building SMTP sender"
        );
        Ok(Arc::new(SmtpMailSender::new(&settings, credentials)?))
    }

    fn fetcher(&self, credentials: &Credentials) -> Arc<dyn MailFetcher> {
        let settings = self.settings_for(&credentials.address);
        Arc::new(ImapMailFetcher::new(
            settings.imap_host,
            settings.imap_port,
            credentials,
            self.fetch_timeout,
        ))
    }
}
