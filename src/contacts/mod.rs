//! Contacts — data model, lifecycle transitions, storage, and export.

pub mod export;
pub mod lifecycle;
pub mod model;
pub mod store;

pub use export::contacts_to_csv;
pub use lifecycle::apply_dispatch;
pub use model::{Contact, ContactStatus};
pub use store::{ContactStore, InMemoryContactStore};
