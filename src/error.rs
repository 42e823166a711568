//! Error types for Outreach.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A request was missing something it needs before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No contacts provided")]
    NoContacts,

    #[error("Email template is empty")]
    EmptyTemplate,

    #[error("Email credentials required")]
    MissingCredentials,

    #[error("Please provide at least one country")]
    NoCountries,
}

/// Outbound mail errors. Per-contact send failures are recorded, not propagated.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message for {to}: {reason}")]
    BuildFailed { to: String, reason: String },

    #[error("SMTP relay {host} unavailable: {reason}")]
    Relay { host: String, reason: String },

    #[error("Send to {to} failed: {reason}")]
    SendFailed { to: String, reason: String },
}

/// Mailbox fetch errors. A timeout is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("IMAP login rejected for {user}")]
    AuthFailed { user: String },

    #[error("IMAP command {command} failed: {reason}")]
    Command { command: String, reason: String },

    #[error("Mailbox fetch task aborted after {elapsed:?}: {reason}")]
    Aborted { elapsed: Duration, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contact repository errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Illegal contact state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Contact {email} is {from}, cannot transition to {to}")]
    InvalidTransition {
        email: String,
        from: String,
        to: String,
    },
}

/// Result type alias for Outreach.
pub type Result<T> = std::result::Result<T, Error>;
