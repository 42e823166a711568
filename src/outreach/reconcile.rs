//! Response reconciliation — fold fetched replies into contact state.

use std::collections::HashSet;

use tracing::debug;

use crate::contacts::Contact;
use crate::mail::ReconciledMessage;

/// How reply addresses are compared with contact emails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressMatch {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Trimmed, ASCII case-insensitive equality.
    Normalized,
}

impl AddressMatch {
    fn key(self, address: &str) -> String {
        match self {
            Self::Exact => address.to_string(),
            Self::Normalized => address.trim().to_ascii_lowercase(),
        }
    }
}

impl std::fmt::Display for AddressMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Normalized => write!(f, "normalized"),
        }
    }
}

impl std::str::FromStr for AddressMatch {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "normalized" => Ok(Self::Normalized),
            _ => Err(format!("Unknown address match policy: {}", s)),
        }
    }
}

/// Mark every contact with a matching reply as responded, using exact matching.
pub fn reconcile(contacts: &[Contact], messages: &[ReconciledMessage]) -> Vec<Contact> {
    reconcile_with(contacts, messages, AddressMatch::Exact)
}

/// Mark every contact with a matching reply as responded.
///
/// Returns a new collection; contacts without a reply are cloned unchanged.
pub fn reconcile_with(
    contacts: &[Contact],
    messages: &[ReconciledMessage],
    policy: AddressMatch,
) -> Vec<Contact> {
    let repliers: HashSet<String> = messages
        .iter()
        .filter(|m| !m.email.is_empty())
        .map(|m| policy.key(&m.email))
        .collect();

    contacts
        .iter()
        .map(|contact| {
            let mut contact = contact.clone();
            if repliers.contains(&policy.key(&contact.email)) {
                debug!(email = %contact.email, "Reply matched");
                contact.record_response();
            }
            contact
        })
        .collect()
}
