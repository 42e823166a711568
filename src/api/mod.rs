//! HTTP API — the JSON surface the outreach UI talks to.

pub mod routes;
pub mod types;

pub use routes::{AppState, outreach_routes};
