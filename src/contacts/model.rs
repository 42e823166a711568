//! Contact data model — prospect identity plus outreach status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a contact is in the outreach lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Discovered, nothing sent yet.
    #[default]
    Pending,
    /// At least one email went out.
    Sent,
    /// A reply from this address was seen.
    Responded,
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Sent => write!(f, "sent"),
            Self::Responded => write!(f, "responded"),
        }
    }
}

impl std::str::FromStr for ContactStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "responded" => Ok(Self::Responded),
            _ => Err(format!("Unknown contact status: {}", s)),
        }
    }
}

/// A discovered prospect. `email` is the key that joins sends, replies, and follow-ups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub country: String,
    /// Free-form category, e.g. "Academy" or "Coach".
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: ContactStatus,
    /// Time of the most recent outbound send.
    #[serde(default, alias = "lastContact", skip_serializing_if = "Option::is_none")]
    pub last_contact_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub response_received: bool,
}

impl Contact {
    /// Create a new pending contact with only an address.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            email: email.into(),
            phone: String::new(),
            website: String::new(),
            country: String::new(),
            kind: String::new(),
            status: ContactStatus::Pending,
            last_contact_at: None,
            response_received: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}
