//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::outreach::reconcile::AddressMatch;

/// Subject used for first-contact emails.
pub const DEFAULT_SUBJECT: &str = "Chess Coaching Inquiry";

/// Subject used for follow-up emails.
pub const DEFAULT_FOLLOW_UP_SUBJECT: &str = "Follow-up: Chess Coaching Inquiry";

/// Service configuration, built from `OUTREACH_*` environment variables.
#[derive(Debug, Clone)]
pub struct OutreachConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Pause between two sends of the same batch.
    pub send_delay: Duration,
    /// Minimum time since the last send before a follow-up is due.
    pub follow_up_after: chrono::Duration,
    /// How far back the reply check searches the inbox.
    pub inbox_window_days: u32,
    /// Hard limit on one mailbox fetch; partial results are kept on expiry.
    pub fetch_timeout: Duration,
    pub subject: String,
    pub follow_up_subject: String,
    /// How reply addresses are compared with contact emails.
    pub address_match: AddressMatch,
    /// Overrides the provider-derived SMTP host.
    pub smtp_host_override: Option<String>,
    /// Overrides the provider-derived IMAP host.
    pub imap_host_override: Option<String>,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            send_delay: Duration::from_millis(2000),
            follow_up_after: chrono::Duration::days(3),
            inbox_window_days: 7,
            fetch_timeout: Duration::from_secs(30),
            subject: DEFAULT_SUBJECT.to_string(),
            follow_up_subject: DEFAULT_FOLLOW_UP_SUBJECT.to_string(),
            address_match: AddressMatch::Exact,
            smtp_host_override: None,
            imap_host_override: None,
        }
    }
}

impl OutreachConfig {
    /// Build config from the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_var(&lookup, "OUTREACH_PORT")?.unwrap_or(defaults.port);
        let send_delay = parse_var::<u64, _>(&lookup, "OUTREACH_SEND_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.send_delay);
        let follow_up_after = parse_var::<i64, _>(&lookup, "OUTREACH_FOLLOW_UP_DAYS")?
            .map(chrono::Duration::days)
            .unwrap_or(defaults.follow_up_after);
        let inbox_window_days = parse_var(&lookup, "OUTREACH_INBOX_WINDOW_DAYS")?
            .unwrap_or(defaults.inbox_window_days);
        let fetch_timeout = parse_var::<u64, _>(&lookup, "OUTREACH_FETCH_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout);
        let address_match =
            parse_var(&lookup, "OUTREACH_ADDRESS_MATCH")?.unwrap_or(defaults.address_match);

        Ok(Self {
            port,
            send_delay,
            follow_up_after,
            inbox_window_days,
            fetch_timeout,
            subject: non_empty(&lookup, "OUTREACH_SUBJECT").unwrap_or(defaults.subject),
            follow_up_subject: non_empty(&lookup, "OUTREACH_FOLLOW_UP_SUBJECT")
                .unwrap_or(defaults.follow_up_subject),
            address_match,
            smtp_host_override: non_empty(&lookup, "OUTREACH_SMTP_HOST"),
            imap_host_override: non_empty(&lookup, "OUTREACH_IMAP_HOST"),
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
    }
}
