//! Contact discovery — where new prospects come from.

pub mod synthetic;

use async_trait::async_trait;

use crate::contacts::Contact;
use crate::error::{Error, ValidationError};

pub use synthetic::SyntheticDiscovery;

/// Finds prospects in the given countries.
///
/// Implementations return `pending` contacts with unique emails.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn discover(&self, countries: &[String]) -> Result<Vec<Contact>, Error>;
}

/// Split a comma-separated country list, trimming and dropping blanks.
pub fn parse_country_list(raw: &str) -> Result<Vec<String>, ValidationError> {
    let countries: Vec<String> = raw
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if countries.is_empty() {
        return Err(ValidationError::NoCountries);
    }
    Ok(countries)
}
