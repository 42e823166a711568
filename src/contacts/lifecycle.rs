//! Contact state transitions.
//!
//! ```text
//! pending ──send ok──▶ sent ──send ok (follow-up)──▶ sent
//!    │                  │
//!    └──────reply───────┴──────────reply──────────▶ responded
//! ```
//!
//! A failed send changes nothing; the contact stays where it was and shows up
//! in the batch's `failed` list so the caller can resubmit it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::model::{Contact, ContactStatus};
use crate::error::LifecycleError;
use crate::outreach::dispatcher::BatchResult;

impl ContactStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: ContactStatus) -> bool {
        use ContactStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Sent)
                | (Sent, Sent)
                | (Pending, Responded)
                | (Sent, Responded)
                | (Responded, Responded)
        )
    }
}

impl Contact {
    /// Record a successful outbound send at `at`.
    ///
    /// First sends move `pending → sent`; follow-ups keep `sent` and refresh the
    /// timestamp. Contacts that already replied are not sent to again.
    pub fn record_send(&mut self, at: DateTime<Utc>) -> Result<(), LifecycleError> {
        self.transition(ContactStatus::Sent)?;
        self.last_contact_at = Some(at);
        Ok(())
    }

    /// Record that a reply from this contact's address was seen. Idempotent.
    pub fn record_response(&mut self) {
        self.status = ContactStatus::Responded;
        self.response_received = true;
    }

    /// Same prospect with its outreach state reset to a fresh `pending`.
    ///
    /// Used for contacts that arrive from outside the store: their status and
    /// flags are not trusted, only their descriptive fields.
    pub fn as_pending(&self) -> Contact {
        Contact::new(self.email.clone())
            .with_name(self.name.clone())
            .with_phone(self.phone.clone())
            .with_website(self.website.clone())
            .with_country(self.country.clone())
            .with_kind(self.kind.clone())
    }

    fn transition(&mut self, next: ContactStatus) -> Result<(), LifecycleError> {
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                email: self.email.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Apply a batch result to a contact collection, returning the updated copy.
///
/// Every contact whose email is in `result.sent_to` records a send at `at`.
/// Contacts not in the batch, or whose transition is illegal, come back unchanged.
pub fn apply_dispatch(contacts: &[Contact], result: &BatchResult, at: DateTime<Utc>) -> Vec<Contact> {
    let sent: HashSet<&str> = result.sent_to.iter().map(String::as_str).collect();

    contacts
        .iter()
        .map(|contact| {
            if !sent.contains(contact.email.as_str()) {
                return contact.clone();
            }
            let mut updated = contact.clone();
            match updated.record_send(at) {
                Ok(()) => updated,
                Err(e) => {
                    warn!(email = %contact.email, error = %e, "Ignoring send result");
                    contact.clone()
                }
            }
        })
        .collect()
}
