//! Provider detection and SMTP/IMAP endpoint selection from a sender address.

/// Mail provider inferred from the sender's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailProvider {
    Gmail,
    Outlook,
    Yahoo,
    /// Anything else; falls back to Gmail's endpoints.
    Generic,
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte (port 465).
    ImplicitTls,
    /// Plain connect, then STARTTLS (port 587).
    StartTls,
}

/// Resolved endpoints for one sender address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub provider: MailProvider,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_security: SmtpSecurity,
    pub imap_host: String,
    pub imap_port: u16,
}

impl TransportSettings {
    /// Replace the detected hosts with explicit ones, when given.
    pub fn with_overrides(mut self, smtp_host: Option<&str>, imap_host: Option<&str>) -> Self {
        if let Some(host) = smtp_host {
            self.smtp_host = host.to_string();
        }
        if let Some(host) = imap_host {
            self.imap_host = host.to_string();
        }
        self
    }
}

/// Classify an address by its domain (case-insensitive).
pub fn detect_provider(address: &str) -> MailProvider {
    let domain = address
        .rsplit_once('@')
        .map(|(_, d)| d.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match domain.as_str() {
        "gmail.com" | "googlemail.com" => MailProvider::Gmail,
        "outlook.com" | "hotmail.com" | "live.com" => MailProvider::Outlook,
        "yahoo.com" => MailProvider::Yahoo,
        _ => MailProvider::Generic,
    }
}

/// Pick SMTP and IMAP endpoints for a sender address.
pub fn resolve_transport_settings(address: &str) -> TransportSettings {
    let provider = detect_provider(address);
    let (smtp_host, smtp_port, smtp_security, imap_host) = match provider {
        MailProvider::Gmail => ("smtp.gmail.com", 465, SmtpSecurity::ImplicitTls, "imap.gmail.com"),
        MailProvider::Outlook => (
            "smtp-mail.outlook.com",
            587,
            SmtpSecurity::StartTls,
            "outlook.office365.com",
        ),
        MailProvider::Yahoo => (
            "smtp.mail.yahoo.com",
            465,
            SmtpSecurity::ImplicitTls,
            "imap.mail.yahoo.com",
        ),
        MailProvider::Generic => ("smtp.gmail.com", 587, SmtpSecurity::StartTls, "imap.gmail.com"),
    };

    TransportSettings {
        provider,
        smtp_host: smtp_host.to_string(),
        smtp_port,
        smtp_security,
        imap_host: imap_host.to_string(),
        imap_port: 993,
    }
}
