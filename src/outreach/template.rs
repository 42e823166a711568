//! Template rendering — `{name}`-style placeholders filled from a contact.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::contacts::Contact;

/// `{name}`, `{email}`, `{country}`, `{website}`, `{type}`. Anything else in braces is left alone.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(name|email|country|website|type)\}").unwrap());

/// Replace every recognized placeholder in `template` with the contact's field.
///
/// Single pass: a field value that itself looks like a placeholder is not expanded again.
pub fn render(template: &str, contact: &Contact) -> String {
    TOKEN_RE
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "name" => contact.name.clone(),
            "email" => contact.email.clone(),
            "country" => contact.country.clone(),
            "website" => contact.website.clone(),
            "type" => contact.kind.clone(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Minimal text → HTML: newlines become `<br>`. Nothing else is escaped.
pub fn to_html(text: &str) -> String {
    text.replace('\n', "<br>")
}
