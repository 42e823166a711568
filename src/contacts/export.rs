//! CSV export of the contact table.

use super::model::Contact;

/// Column headers, in output order.
pub const CSV_HEADERS: [&str; 9] = [
    "Name",
    "Email",
    "Phone",
    "Website",
    "Country",
    "Type",
    "Status",
    "Last Contact",
    "Responded",
];

/// Render contacts as CSV: one header row, one row per contact, every field quoted.
pub fn contacts_to_csv(contacts: &[Contact]) -> String {
    let mut lines = Vec::with_capacity(contacts.len() + 1);
    lines.push(csv_row(CSV_HEADERS.iter().copied()));

    for c in contacts {
        let status = c.status.to_string();
        let last_contact = c
            .last_contact_at
            .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            .unwrap_or_default();
        let responded = if c.response_received { "Yes" } else { "No" };
        lines.push(csv_row([
            c.name.as_str(),
            c.email.as_str(),
            c.phone.as_str(),
            c.website.as_str(),
            c.country.as_str(),
            c.kind.as_str(),
            status.as_str(),
            last_contact.as_str(),
            responded,
        ]));
    }

    lines.join("\n")
}

fn csv_row<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    cells
        .into_iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}
