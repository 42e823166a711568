//! Outreach lifecycle core — templating, batch dispatch, follow-up selection,
//! and reply reconciliation.

pub mod dispatcher;
pub mod followup;
pub mod reconcile;
pub mod template;

pub use dispatcher::{
    BatchResult, DispatchOutcome, Dispatcher, dispatch, follow_up_template, personalize,
};
pub use followup::select_follow_up_candidates;
pub use reconcile::{AddressMatch, reconcile, reconcile_with};
pub use template::{render, to_html};
