//! Mail capabilities the outreach core consumes — sending, fetching, and the
//! factory that builds both from a sender's credentials.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, TransportError, ValidationError};

/// One personalized outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// An inbound message attributed to a sender address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledMessage {
    /// Bare sender address; the join key against contact emails.
    pub email: String,
    /// Sender as displayed, e.g. `Royal Chess Club <info@royalchess.org>`.
    pub from: String,
    pub subject: String,
    pub date: DateTime<Utc>,
    pub text: String,
}

/// Sends one email. Errors are per-message; callers decide whether to continue.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), TransportError>;
}

/// Fetches unseen inbound messages from the last `window_days` days.
///
/// Implementations bound the whole operation by a timeout and return what they
/// gathered when it expires; only connection, login, or search failures are errors.
#[async_trait]
pub trait MailFetcher: Send + Sync {
    async fn fetch_unseen_since(&self, window_days: u32)
    -> Result<Vec<ReconciledMessage>, FetchError>;
}

/// Mailbox login supplied with each request.
#[derive(Clone)]
pub struct Credentials {
    pub address: String,
    pub password: SecretString,
}

impl Credentials {
    /// Build credentials, rejecting blank address or password.
    pub fn new(
        address: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let address = address.into().trim().to_string();
        let password = SecretString::from(password.into());
        if address.is_empty() || password.expose_secret().is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(Self { address, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Builds per-request mail handles. Each request gets its own sender and fetcher.
pub trait MailerFactory: Send + Sync {
    fn sender(&self, credentials: &Credentials) -> Result<Arc<dyn MailSender>, TransportError>;
    fn fetcher(&self, credentials: &Credentials) -> Arc<dyn MailFetcher>;
}
