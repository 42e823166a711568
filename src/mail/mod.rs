//! Mail transport — the send/fetch capabilities and their SMTP/IMAP implementations.

pub mod imap;
pub mod live;
pub mod message;
pub mod settings;
pub mod smtp;
pub mod transport;

pub use live::LiveMailer;
pub use settings::{MailProvider, TransportSettings, resolve_transport_settings};
pub use transport::{
    Credentials, MailFetcher, MailSender, MailerFactory, OutboundEmail, ReconciledMessage,
};
