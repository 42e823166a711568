//! Outreach — discover prospects, email them, follow up, and track replies.

pub mod api;
pub mod config;
pub mod contacts;
pub mod discovery;
pub mod error;
pub mod mail;
pub mod outreach;
