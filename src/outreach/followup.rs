//! Follow-up selection.

use chrono::{DateTime, Duration, Utc};

use crate::contacts::{Contact, ContactStatus};

/// Default wait after the last send before a follow-up is due.
pub fn default_follow_up_after() -> Duration {
    Duration::days(3)
}

/// Whether `contact` is due a follow-up at `now`.
pub fn is_follow_up_due(contact: &Contact, now: DateTime<Utc>, min_elapsed: Duration) -> bool {
    contact.status == ContactStatus::Sent
        && !contact.response_received
        && contact
            .last_contact_at
            .is_some_and(|last| now.signed_duration_since(last) >= min_elapsed)
}

/// Contacts that were emailed, never replied, and were last contacted at least
/// `min_elapsed` ago. Input order is preserved.
pub fn select_follow_up_candidates(
    contacts: &[Contact],
    now: DateTime<Utc>,
    min_elapsed: Duration,
) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| is_follow_up_due(c, now, min_elapsed))
        .cloned()
        .collect()
}
