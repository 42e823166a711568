//! Outreach dispatcher — sequential, rate-limited batch send.
//!
//! Sends go out one at a time in input order with a fixed pause between them.
//! This is deliberate throttling for mail providers; do not parallelize.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::template::{render, to_html};
use crate::contacts::Contact;
use crate::mail::{MailSender, OutboundEmail};

/// Default pause between two sends of a batch.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(2000);

/// Appended after the user's template for follow-up sends.
pub const FOLLOW_UP_NOTE: &str =
    "Just following up on my previous email. I wanted to check if you had a chance to review my inquiry.";

/// Result of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub email: String,
    pub succeeded: bool,
}

impl DispatchOutcome {
    pub fn new(email: impl Into<String>, succeeded: bool) -> Self {
        Self {
            email: email.into(),
            succeeded,
        }
    }
}

/// Ordered outcomes of one batch, split by success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub sent_to: Vec<String>,
    pub failed: Vec<String>,
    /// Every attempt, in the order it was made.
    pub outcomes: Vec<DispatchOutcome>,
}

impl BatchResult {
    /// Append one outcome.
    pub fn record(&mut self, outcome: DispatchOutcome) {
        if outcome.succeeded {
            self.sent_to.push(outcome.email.clone());
        } else {
            self.failed.push(outcome.email.clone());
        }
        self.outcomes.push(outcome);
    }

    /// Number of contacts a send was attempted for.
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }
}

/// Wrap a template for a follow-up: prefixed with `Follow-up: ` and followed by a reminder note.
pub fn follow_up_template(template: &str) -> String {
    format!("Follow-up: {template}\n\n{FOLLOW_UP_NOTE}")
}

/// Render the email for one contact.
pub fn personalize(contact: &Contact, template: &str, subject: &str) -> OutboundEmail {
    let text = render(template, contact);
    OutboundEmail {
        to: contact.email.clone(),
        subject: subject.to_string(),
        html: to_html(&text),
        text,
    }
}

/// Runs batches against a `MailSender` with a fixed inter-send delay.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    delay: Duration,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_DELAY)
    }
}

impl Dispatcher {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Send `template` to each contact in order.
    ///
    /// A failed send is logged and recorded; it never stops the batch. A contact
    /// whose email already appeared earlier in the batch is skipped.
    pub async fn dispatch(
        &self,
        contacts: &[Contact],
        template: &str,
        subject: &str,
        transport: &dyn MailSender,
    ) -> BatchResult {
        let batch_id = Uuid::new_v4();
        let span = info_span!("dispatch", %batch_id, contacts = contacts.len());
        self.run(contacts, template, subject, transport)
            .instrument(span)
            .await
    }

    /// Same as [`dispatch`](Self::dispatch) with the follow-up wrapper applied to `template`.
    pub async fn dispatch_follow_up(
        &self,
        contacts: &[Contact],
        template: &str,
        subject: &str,
        transport: &dyn MailSender,
    ) -> BatchResult {
        self.dispatch(contacts, &follow_up_template(template), subject, transport)
            .await
    }

    async fn run(
        &self,
        contacts: &[Contact],
        template: &str,
        subject: &str,
        transport: &dyn MailSender,
    ) -> BatchResult {
        let mut result = BatchResult::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for contact in contacts {
            if !seen.insert(contact.email.as_str()) {
                debug!(email = %contact.email, "Duplicate contact in batch, skipping");
                continue;
            }

            if result.processed() > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let email = personalize(contact, template, subject);
            let succeeded = match transport.send(&email).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(email = %contact.email, error = %e, "Send failed");
                    false
                }
            };
            result.record(DispatchOutcome::new(contact.email.clone(), succeeded));
        }

        info!(
            sent = result.sent_to.len(),
            failed = result.failed.len(),
            "Batch complete"
        );
        result
    }
}

/// Dispatch with the default delay.
pub async fn dispatch(
    contacts: &[Contact],
    template: &str,
    subject: &str,
    transport: &dyn MailSender,
) -> BatchResult {
    Dispatcher::default()
        .dispatch(contacts, template, subject, transport)
        .await
}
