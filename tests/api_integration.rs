//! Integration tests for the outreach REST API.
//!
//! Each test spins up an Axum server on a random port with stub mail
//! transports and exercises the real HTTP contract through reqwest.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use outreach::api::{AppState, outreach_routes};
use outreach::config::OutreachConfig;
use outreach::contacts::{Contact, ContactStatus, ContactStore, InMemoryContactStore};
use outreach::discovery::SyntheticDiscovery;
use outreach::error::{FetchError, TransportError};
use outreach::mail::{
    Credentials, MailFetcher, MailSender, MailerFactory, OutboundEmail, ReconciledMessage,
};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Records every email and refuses recipients in `rejects`.
#[derive(Default)]
struct StubMailer {
    rejects: HashSet<String>,
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
    inbox: Vec<ReconciledMessage>,
}

struct StubSender {
    rejects: HashSet<String>,
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

#[async_trait]
impl MailSender for StubSender {
    async fn send(&self, email: &OutboundEmail) -> Result<(), TransportError> {
        if self.rejects.contains(&email.to) {
            return Err(TransportError::SendFailed {
                to: email.to.clone(),
                reason: "550 mailbox unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

struct StubFetcher(Vec<ReconciledMessage>);

#[async_trait]
impl MailFetcher for StubFetcher {
    async fn fetch_unseen_since(&self, _: u32) -> Result<Vec<ReconciledMessage>, FetchError> {
        Ok(self.0.clone())
    }
}

impl MailerFactory for StubMailer {
    fn sender(&self, _: &Credentials) -> Result<Arc<dyn MailSender>, TransportError> {
        Ok(Arc::new(StubSender {
            rejects: self.rejects.clone(),
            sent: Arc::clone(&self.sent),
        }))
    }

    fn fetcher(&self, _: &Credentials) -> Arc<dyn MailFetcher> {
        Arc::new(StubFetcher(self.inbox.clone()))
    }
}

fn reply_from(email: &str) -> ReconciledMessage {
    ReconciledMessage {
        email: email.to_string(),
        from: format!("Coach <{email}>"),
        subject: "Re: Chess Coaching Inquiry".into(),
        date: Utc::now(),
        text: "Happy to talk.".into(),
    }
}

struct TestServer {
    base: String,
    store: Arc<InMemoryContactStore>,
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

/// Start an Axum server on a random port with zero send delay.
async fn start_server(mailer: StubMailer) -> TestServer {
    let config = OutreachConfig {
        send_delay: Duration::ZERO,
        follow_up_after: chrono::Duration::zero(),
        ..OutreachConfig::default()
    };
    let store = InMemoryContactStore::new();
    let sent = Arc::clone(&mailer.sent);
    let state = AppState::new(
        config,
        store.clone(),
        Arc::new(SyntheticDiscovery::with_seed(11)),
        Arc::new(mailer),
    );
    let app = outreach_routes(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        base: format!("http://127.0.0.1:{port}"),
        store,
        sent,
    }
}

async fn post(server: &TestServer, path: &str, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}{path}", server.base))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

fn batch(contacts: Value, template: &str) -> Value {
    json!({
        "contacts": contacts,
        "emailTemplate": template,
        "senderEmail": "me@gmail.com",
        "emailPassword": "app-password",
    })
}

#[tokio::test]
async fn health_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(StubMailer::default()).await;
        let body: Value = reqwest::get(format!("{}/health", server.base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "outreach");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn search_stores_discovered_contacts() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(StubMailer::default()).await;
        let (status, body) = post(&server, "/api/search", json!({"countries": "USA, India"})).await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);

        let found = body["contacts"].as_array().unwrap().len();
        assert!((10..=20).contains(&found), "found {found}");
        assert_eq!(server.store.list().await.unwrap().len(), found);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn repeat_search_keeps_contact_state() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(StubMailer::default()).await;
        post(&server, "/api/search", json!({"countries": "USA, UK, India"})).await;

        let mark_all = |contacts: &[Contact]| -> Vec<Contact> {
            contacts
                .iter()
                .cloned()
                .map(|mut c| {
                    c.record_response();
                    c
                })
                .collect()
        };
        let first = server.store.transform(&mark_all).await.unwrap();

        let (status, _) = post(
            &server,
            "/api/search",
            json!({"countries": "Spain, France, Germany"}),
        )
        .await;
        assert_eq!(status, 200);

        let stored = server.store.list().await.unwrap();
        assert!(stored.len() >= first.len());
        for before in &first {
            let after = stored.iter().find(|c| c.email == before.email).unwrap();
            assert_eq!(after, before);
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn search_without_countries_is_bad_request() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(StubMailer::default()).await;
        let (status, body) = post(&server, "/api/search", json!({"countries": " , "})).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Please provide at least one country");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn partial_failure_keeps_going_and_updates_statuses() {
    timeout(TEST_TIMEOUT, async {
        let mailer = StubMailer {
            rejects: HashSet::from(["bad@x.com".to_string()]),
            ..StubMailer::default()
        };
        let server = start_server(mailer).await;

        let contacts = json!([
            {"name": "Alpha Academy", "email": "a@x.com", "country": "USA"},
            {"name": "Broken", "email": "bad@x.com"},
            {"name": "Gamma Coach", "email": "c@x.com"},
        ]);
        let (status, body) = post(&server, "/api/send-emails", batch(contacts, "Hello {name}")).await;
        assert_eq!(status, 200);
        assert_eq!(body["sent"], 2);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["sentTo"], json!(["a@x.com", "c@x.com"]));
        assert_eq!(body["failedTo"], json!(["bad@x.com"]));

        let sent = server.sent.lock().unwrap().clone();
        assert_eq!(sent[0].text, "Hello Alpha Academy");
        assert_eq!(sent[0].subject, "Chess Coaching Inquiry");

        let stored = server.store.get("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.status, ContactStatus::Sent);
        assert!(stored.last_contact_at.is_some());
        let failed = server.store.get("bad@x.com").await.unwrap().unwrap();
        assert_eq!(failed.status, ContactStatus::Pending);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn client_supplied_state_is_not_trusted() {
    timeout(TEST_TIMEOUT, async {
        let mailer = StubMailer {
            rejects: HashSet::from(["z@x.com".to_string()]),
            ..StubMailer::default()
        };
        let server = start_server(mailer).await;

        let contacts = json!([
            {"name": "Zed", "email": "z@x.com", "status": "sent"},
            {"name": "Rho", "email": "r@x.com", "status": "pending", "responseReceived": true},
        ]);
        let (status, body) = post(&server, "/api/send-emails", batch(contacts, "Hi")).await;
        assert_eq!(status, 200);
        assert_eq!(body["failedTo"], json!(["z@x.com"]));

        let failed = server.store.get("z@x.com").await.unwrap().unwrap();
        assert_eq!(failed.status, ContactStatus::Pending);
        assert!(failed.last_contact_at.is_none());
        assert_eq!(failed.name, "Zed");

        let sent = server.store.get("r@x.com").await.unwrap().unwrap();
        assert_eq!(sent.status, ContactStatus::Sent);
        assert!(!sent.response_received);
        assert!(sent.last_contact_at.is_some());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn follow_up_wraps_template() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(StubMailer::default()).await;
        let contacts = json!([{"name": "Alpha", "email": "a@x.com", "status": "sent"}]);
        let (status, body) = post(&server, "/api/follow-up", batch(contacts, "Hi {name}")).await;
        assert_eq!(status, 200);
        assert_eq!(body["sent"], 1);

        let sent = server.sent.lock().unwrap().clone();
        assert!(sent[0].text.starts_with("Follow-up: Hi Alpha\n\n"));
        assert_eq!(sent[0].subject, "Follow-up: Chess Coaching Inquiry");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn send_without_credentials_is_bad_request() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(StubMailer::default()).await;
        let body = json!({"contacts": [{"email": "a@x.com"}], "emailTemplate": "Hi"});
        let (status, body) = post(&server, "/api/send-emails", body).await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Email credentials required");
        assert!(server.sent.lock().unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn check_responses_marks_repliers() {
    timeout(TEST_TIMEOUT, async {
        let mailer = StubMailer {
            inbox: vec![reply_from("a@x.com"), reply_from("stranger@y.com")],
            ..StubMailer::default()
        };
        let server = start_server(mailer).await;

        let contacts = json!([{"email": "a@x.com"}, {"email": "c@x.com"}]);
        post(&server, "/api/send-emails", batch(contacts, "Hi")).await;

        let creds = json!({"senderEmail": "me@gmail.com", "emailPassword": "app-password"});
        let (status, body) = post(&server, "/api/check-responses", creds).await;
        assert_eq!(status, 200);
        assert_eq!(body["count"], 2);
        assert_eq!(body["responses"][0]["email"], "a@x.com");

        let replied = server.store.get("a@x.com").await.unwrap().unwrap();
        assert_eq!(replied.status, ContactStatus::Responded);
        assert!(replied.response_received);
        let quiet = server.store.get("c@x.com").await.unwrap().unwrap();
        assert_eq!(quiet.status, ContactStatus::Sent);
        assert!(server.store.get("stranger@y.com").await.unwrap().is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn follow_up_candidates_exclude_responded() {
    timeout(TEST_TIMEOUT, async {
        let mailer = StubMailer {
            inbox: vec![reply_from("a@x.com")],
            ..StubMailer::default()
        };
        let server = start_server(mailer).await;

        let contacts = json!([{"email": "a@x.com"}, {"email": "c@x.com"}]);
        post(&server, "/api/send-emails", batch(contacts, "Hi")).await;
        let creds = json!({"senderEmail": "me@gmail.com", "emailPassword": "app-password"});
        post(&server, "/api/check-responses", creds).await;

        let due: Value = reqwest::get(format!("{}/api/contacts/follow-up", server.base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let emails: Vec<&str> = due
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["email"].as_str().unwrap())
            .collect();
        assert_eq!(emails, vec!["c@x.com"]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn export_returns_csv() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(StubMailer::default()).await;
        let contacts = json!([{"name": "Say \"Hi\" Club", "email": "a@x.com"}]);
        post(&server, "/api/send-emails", batch(contacts, "Hi")).await;

        let resp = reqwest::get(format!("{}/api/contacts/export", server.base))
            .await
            .unwrap();
        assert_eq!(resp.headers()["content-type"], "text/csv");
        assert!(
            resp.headers()["content-disposition"]
                .to_str()
                .unwrap()
                .starts_with("attachment; filename=\"chess-coaches-")
        );

        let csv = resp.text().await.unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("\"Name\""));
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Say \"\"Hi\"\" Club\",\"a@x.com\""), "{row}");
        assert!(row.contains("\"sent\""));
    })
    .await
    .expect("test timed out");
}
