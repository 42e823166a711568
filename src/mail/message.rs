//! Turning raw RFC 822 bytes into `ReconciledMessage`s.

use chrono::{DateTime, Utc};
use mail_parser::MessageParser;

use super::transport::ReconciledMessage;

/// Parse a fetched message. Returns `None` if the bytes are not a message at all.
pub fn parse_reconciled_message(raw: &[u8]) -> Option<ReconciledMessage> {
    let parsed = MessageParser::default().parse(raw)?;

    let sender = parsed.from().and_then(|addr| addr.first());
    let email = sender
        .and_then(|a| a.address())
        .map(|s| s.to_string())
        .unwrap_or_default();
    let from = match sender.and_then(|a| a.name()) {
        Some(name) if !email.is_empty() => format!("{name} <{email}>"),
        Some(name) => name.to_string(),
        None => email.clone(),
    };

    let date = parsed
        .date()
        .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0))
        .unwrap_or_else(Utc::now);

    let text = match parsed.body_text(0) {
        Some(text) => text.trim().to_string(),
        None => parsed
            .body_html(0)
            .map(|html| strip_html(html.as_ref()))
            .unwrap_or_default(),
    };

    Some(ReconciledMessage {
        email,
        from,
        subject: parsed.subject().unwrap_or_default().to_string(),
        date,
        text,
    })
}

/// Strip HTML tags from content (basic).
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}
