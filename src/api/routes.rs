//! REST endpoints for search, outreach, follow-ups, and reply checks.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use super::types::{
    CheckResponsesRequest, CheckResponsesResponse, DispatchRequest, DispatchResponse,
    SearchRequest, SearchResponse,
};
use crate::config::OutreachConfig;
use crate::contacts::{Contact, ContactStore, apply_dispatch, contacts_to_csv};
use crate::discovery::{Discovery, parse_country_list};
use crate::error::ValidationError;
use crate::mail::MailerFactory;
use crate::outreach::followup::select_follow_up_candidates;
use crate::outreach::{BatchResult, Dispatcher, reconcile_with};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContactStore>,
    pub discovery: Arc<dyn Discovery>,
    pub mailer: Arc<dyn MailerFactory>,
    pub dispatcher: Dispatcher,
    pub config: Arc<OutreachConfig>,
}

impl AppState {
    pub fn new(
        config: OutreachConfig,
        store: Arc<dyn ContactStore>,
        discovery: Arc<dyn Discovery>,
        mailer: Arc<dyn MailerFactory>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(config.send_delay),
            config: Arc::new(config),
            store,
            discovery,
            mailer,
        }
    }
}

/// Build the Axum router with all outreach routes.
pub fn outreach_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", post(search))
        .route("/api/send-emails", post(send_emails))
        .route("/api/follow-up", post(follow_up))
        .route("/api/check-responses", post(check_responses))
        .route("/api/contacts", get(list_contacts))
        .route("/api/contacts/follow-up", get(follow_up_candidates))
        .route("/api/contacts/export", get(export_contacts))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn failure(status: StatusCode, error: impl std::fmt::Display) -> Response {
    (
        status,
        Json(serde_json::json!({"success": false, "error": error.to_string()})),
    )
        .into_response()
}

fn invalid(e: ValidationError) -> Response {
    warn!(error = %e, "Rejected request");
    failure(StatusCode::BAD_REQUEST, e)
}

/// Malformed or mistyped JSON bodies get the same 400 shape as validation errors.
fn malformed(rejection: JsonRejection) -> Response {
    let reason = rejection.body_text();
    warn!(error = %reason, "Rejected request body");
    failure(StatusCode::BAD_REQUEST, reason)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "outreach"
    }))
}

// ── Search ──────────────────────────────────────────────────────────────

async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return malformed(rejection),
    };
    let countries = match parse_country_list(body.countries.as_deref().unwrap_or_default()) {
        Ok(countries) => countries,
        Err(e) => return invalid(e),
    };

    let contacts = match state.discovery.discover(&countries).await {
        Ok(contacts) => contacts,
        Err(e) => {
            error!(error = %e, "Search failed");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Search failed");
        }
    };

    if let Err(e) = state.store.insert_new(contacts.clone()).await {
        error!(error = %e, "Failed to store discovered contacts");
    }

    let message = format!(
        "Found {} contacts across {} countries",
        contacts.len(),
        countries.len()
    );
    info!(found = contacts.len(), countries = countries.len(), "Search complete");

    Json(SearchResponse {
        success: true,
        contacts,
        message,
    })
    .into_response()
}

// ── Outreach ────────────────────────────────────────────────────────────

async fn send_emails(
    State(state): State<AppState>,
    payload: Result<Json<DispatchRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(body)) => run_batch(&state, body, BatchKind::Initial).await,
        Err(rejection) => malformed(rejection),
    }
}

async fn follow_up(
    State(state): State<AppState>,
    payload: Result<Json<DispatchRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(body)) => run_batch(&state, body, BatchKind::FollowUp).await,
        Err(rejection) => malformed(rejection),
    }
}

#[derive(Debug, Clone, Copy)]
enum BatchKind {
    Initial,
    FollowUp,
}

async fn run_batch(state: &AppState, body: DispatchRequest, kind: BatchKind) -> Response {
    let credentials = match body.validate() {
        Ok(credentials) => credentials,
        Err(e) => return invalid(e),
    };

    let sender = match state.mailer.sender(&credentials) {
        Ok(sender) => sender,
        Err(e) => {
            error!(error = %e, "Could not build mail transport");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
    };

    let result = match kind {
        BatchKind::Initial => {
            state
                .dispatcher
                .dispatch(&body.contacts, &body.email_template, &state.config.subject, &*sender)
                .await
        }
        BatchKind::FollowUp => {
            state
                .dispatcher
                .dispatch_follow_up(
                    &body.contacts,
                    &body.email_template,
                    &state.config.follow_up_subject,
                    &*sender,
                )
                .await
        }
    };

    record_batch(state.store.as_ref(), &body.contacts, &result, Utc::now()).await;
    info!(
        kind = ?kind,
        sent = result.sent_to.len(),
        failed = result.failed.len(),
        "Batch finished"
    );

    Json(DispatchResponse::from(result)).into_response()
}

/// Apply a batch result to the store.
///
/// Request contacts the store has not seen are added as fresh `pending`
/// prospects before the result is applied; their client-supplied state is dropped.
async fn record_batch(
    store: &dyn ContactStore,
    requested: &[Contact],
    result: &BatchResult,
    at: DateTime<Utc>,
) {
    let fresh: Vec<Contact> = requested.iter().map(Contact::as_pending).collect();
    let requested = apply_dispatch(&fresh, result, at);
    let merge = |stored: &[Contact]| -> Vec<Contact> {
        let mut merged = apply_dispatch(stored, result, at);
        for contact in &requested {
            if !merged.iter().any(|c| c.email == contact.email) {
                merged.push(contact.clone());
            }
        }
        merged
    };

    if let Err(e) = store.transform(&merge).await {
        error!(error = %e, "Failed to record batch result");
    }
}

// ── Replies ─────────────────────────────────────────────────────────────

async fn check_responses(
    State(state): State<AppState>,
    payload: Result<Json<CheckResponsesRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return malformed(rejection),
    };
    let credentials = match body.validate() {
        Ok(credentials) => credentials,
        Err(e) => return invalid(e),
    };

    let fetcher = state.mailer.fetcher(&credentials);
    let responses = match fetcher
        .fetch_unseen_since(state.config.inbox_window_days)
        .await
    {
        Ok(responses) => responses,
        Err(e) => {
            error!(error = %e, "Response check failed");
            return failure(StatusCode::BAD_GATEWAY, e);
        }
    };

    let policy = state.config.address_match;
    let reconcile = |stored: &[Contact]| reconcile_with(stored, &responses, policy);
    if let Err(e) = state.store.transform(&reconcile).await {
        error!(error = %e, "Failed to reconcile responses");
    }

    info!(count = responses.len(), "Responses checked");
    Json(CheckResponsesResponse {
        success: true,
        count: responses.len(),
        responses,
    })
    .into_response()
}

// ── Contacts ────────────────────────────────────────────────────────────

async fn list_contacts(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(contacts) => Json(contacts).into_response(),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn follow_up_candidates(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(contacts) => Json(select_follow_up_candidates(
            &contacts,
            Utc::now(),
            state.config.follow_up_after,
        ))
        .into_response(),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

async fn export_contacts(State(state): State<AppState>) -> Response {
    let contacts = match state.store.list().await {
        Ok(contacts) => contacts,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let filename = format!(
        "attachment; filename=\"chess-coaches-{}.csv\"",
        Utc::now().timestamp_millis()
    );
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        contacts_to_csv(&contacts),
    )
        .into_response()
}
