//! Synthetic discovery — plausible-looking academies and coaches, no network.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::Discovery;
use crate::contacts::Contact;
use crate::error::Error;

const SAMPLE_NAMES: [&str; 10] = [
    "Elite Chess Academy",
    "Chess Masters Institute",
    "Royal Chess Club",
    "Strategic Chess Training",
    "Grand Master Coaching",
    "Chess Excellence Center",
    "Advanced Chess School",
    "Youth Chess Academy",
    "Professional Chess Training",
    "Chess Champions Institute",
];

const TLDS: [&str; 4] = [".com", ".org", ".net", ".edu"];

/// Contacts generated per country, inclusive.
const PER_COUNTRY: std::ops::RangeInclusive<usize> = 5..=10;

/// Random contact generator standing in for a real search backend.
pub struct SyntheticDiscovery {
    rng: Mutex<StdRng>,
}

impl Default for SyntheticDiscovery {
    fn default() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl SyntheticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic generator for tests and demos.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn generate(&self, countries: &[String]) -> Vec<Contact> {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        let mut seen = HashSet::new();
        let mut contacts = Vec::new();

        for country in countries {
            let country = country.trim();
            let count = rng.gen_range(PER_COUNTRY);
            for _ in 0..count {
                let name = SAMPLE_NAMES.choose(&mut *rng).copied().unwrap_or(SAMPLE_NAMES[0]);
                let tld = TLDS.choose(&mut *rng).copied().unwrap_or(TLDS[0]);
                let slug = slugify(name);

                let mut domain = format!("{slug}{tld}");
                let mut suffix = 2;
                while !seen.insert(format!("info@{domain}")) {
                    domain = format!("{slug}{suffix}{tld}");
                    suffix += 1;
                }

                let phone = format!(
                    "+{}-{}",
                    rng.gen_range(100..1000),
                    rng.gen_range(1_000_000..10_000_000)
                );
                let kind = if rng.gen_bool(0.5) { "Academy" } else { "Coach" };

                contacts.push(
                    Contact::new(format!("info@{domain}"))
                        .with_name(format!("{name} - {country}"))
                        .with_phone(phone)
                        .with_website(format!("https://www.{domain}"))
                        .with_country(country)
                        .with_kind(kind),
                );
            }
        }

        contacts
    }
}

#[async_trait]
impl Discovery for SyntheticDiscovery {
    async fn discover(&self, countries: &[String]) -> Result<Vec<Contact>, Error> {
        let contacts = self.generate(countries);
        info!(
            countries = countries.len(),
            found = contacts.len(),
            "Synthetic discovery complete"
        );
        Ok(contacts)
    }
}

/// Lowercase and drop whitespace: "Royal Chess Club" → "royalchessclub".
fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::ContactStatus;

    fn countries(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn generates_five_to_ten_per_country() {
        let discovery = SyntheticDiscovery::with_seed(7);
        let found = discovery.discover(&countries(&["USA", "India"])).await.unwrap();

        for country in ["USA", "India"] {
            let n = found.iter().filter(|c| c.country == country).count();
            assert!(PER_COUNTRY.contains(&n), "{country}: {n}");
        }
    }

    #[tokio::test]
    async fn contacts_are_pending_with_unique_emails() {
        let discovery = SyntheticDiscovery::with_seed(42);
        let found = discovery
            .discover(&countries(&["USA", "UK", "India", "Germany", "Spain"]))
            .await
            .unwrap();

        let unique: HashSet<_> = found.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(unique.len(), found.len());
        assert!(found.iter().all(|c| c.status == ContactStatus::Pending));
        assert!(found.iter().all(|c| c.kind == "Academy" || c.kind == "Coach"));
    }

    #[tokio::test]
    async fn fields_are_consistent() {
        let discovery = SyntheticDiscovery::with_seed(1);
        let found = discovery.discover(&countries(&["France"])).await.unwrap();
        for c in &found {
            assert!(c.name.ends_with(" - France"));
            let domain = c.email.strip_prefix("info@").unwrap();
            assert_eq!(c.website, format!("https://www.{domain}"));
            assert!(c.phone.starts_with('+'));
        }
    }

    #[tokio::test]
    async fn same_seed_same_contacts() {
        let a = SyntheticDiscovery::with_seed(9)
            .discover(&countries(&["UK"]))
            .await
            .unwrap();
        let b = SyntheticDiscovery::with_seed(9)
            .discover(&countries(&["UK"]))
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn slugify_strips_whitespace() {
        assert_eq!(slugify("Royal Chess Club"), "royalchessclub");
    }
}
