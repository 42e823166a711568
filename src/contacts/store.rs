//! Contact repository — the injected home of the contact collection.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::model::Contact;
use crate::error::StoreError;

/// A whole-collection rewrite, applied under the store's write lock.
pub type ContactTransform<'a> = &'a (dyn Fn(&[Contact]) -> Vec<Contact> + Send + Sync);

/// Backend-agnostic contact repository. Contacts are keyed by email.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// All contacts, in insertion order.
    async fn list(&self) -> Result<Vec<Contact>, StoreError>;

    /// Look up a contact by exact email.
    async fn get(&self, email: &str) -> Result<Option<Contact>, StoreError>;

    /// Insert contacts whose email is not stored yet. Stored contacts keep their
    /// state. Returns the number of newly inserted contacts.
    async fn insert_new(&self, contacts: Vec<Contact>) -> Result<usize, StoreError>;

    /// Replace the collection with `transform(current)` atomically.
    /// Returns the new collection.
    async fn transform(&self, transform: ContactTransform<'_>) -> Result<Vec<Contact>, StoreError>;
}

/// In-memory contact store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryContactStore {
    contacts: RwLock<Vec<Contact>>,
}

impl InMemoryContactStore {
    /// Create an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn list(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.contacts.read().await.clone())
    }

    async fn get(&self, email: &str) -> Result<Option<Contact>, StoreError> {
        let contacts = self.contacts.read().await;
        Ok(contacts.iter().find(|c| c.email == email).cloned())
    }

    async fn insert_new(&self, incoming: Vec<Contact>) -> Result<usize, StoreError> {
        let mut contacts = self.contacts.write().await;
        let mut inserted = 0;
        for contact in incoming {
            if contacts.iter().any(|c| c.email == contact.email) {
                continue;
            }
            contacts.push(contact);
            inserted += 1;
        }
        debug!(inserted, total = contacts.len(), "Contacts inserted");
        Ok(inserted)
    }

    async fn transform(&self, transform: ContactTransform<'_>) -> Result<Vec<Contact>, StoreError> {
        let mut contacts = self.contacts.write().await;
        let updated = transform(contacts.as_slice());
        *contacts = updated.clone();
        Ok(updated)
    }
}
