//! IMAP fetcher — unseen replies over TLS, bounded by a hard timeout.
//!
//! The session speaks just enough IMAP4rev1 for the reply check: LOGIN,
//! EXAMINE (read-only, so nothing is marked \Seen), SEARCH UNSEEN SINCE,
//! FETCH BODY.PEEK[] and LOGOUT. It runs on a blocking thread; every parsed
//! message lands in a shared buffer so a timeout can still hand back what
//! arrived before it.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rustls_pki_types::ServerName;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use super::message::parse_reconciled_message;
use super::transport::{Credentials, MailFetcher, ReconciledMessage};
use crate::error::FetchError;

type TlsStream = rustls::StreamOwned<rustls::ClientConnection, TcpStream>;

/// Fetches unseen messages from a mailbox's INBOX.
#[derive(Clone)]
pub struct ImapMailFetcher {
    host: String,
    port: u16,
    user: String,
    password: SecretString,
    timeout: Duration,
}

impl ImapMailFetcher {
    pub fn new(host: impl Into<String>, port: u16, credentials: &Credentials, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            user: credentials.address.clone(),
            password: credentials.password.clone(),
            timeout,
        }
    }

    /// Blocking fetch; pushes each parsed message into `sink` as it arrives.
    fn fetch_blocking(
        &self,
        since: NaiveDate,
        sink: &Mutex<Vec<ReconciledMessage>>,
    ) -> Result<(), FetchError> {
        let mut session = ImapSession::connect(&self.host, self.port, self.timeout)?;

        let login = format!(
            "LOGIN {} {}",
            imap_quote(&self.user),
            imap_quote(self.password.expose_secret())
        );
        session
            .command(&login)
            .map_err(|e| login_failure(&self.user, e))?;

        session.command("EXAMINE \"INBOX\"")?;

        let search = session.command(&format!("SEARCH UNSEEN SINCE {}", imap_date(since)))?;
        let ids = parse_search_response(&search.lines);
        debug!(count = ids.len(), "Unseen messages matched");

        for id in ids {
            let fetched = session.command(&format!("FETCH {id} BODY.PEEK[]"))?;
            for literal in &fetched.literals {
                if let Some(msg) = parse_reconciled_message(literal) {
                    sink.lock().unwrap_or_else(|p| p.into_inner()).push(msg);
                }
            }
        }

        let _ = session.command("LOGOUT");
        Ok(())
    }
}

#[async_trait]
impl MailFetcher for ImapMailFetcher {
    async fn fetch_unseen_since(
        &self,
        window_days: u32,
    ) -> Result<Vec<ReconciledMessage>, FetchError> {
        let since = (Utc::now() - chrono::Duration::days(i64::from(window_days))).date_naive();
        let fetcher = self.clone();
        collect_within(&self.host, self.timeout, move |sink| {
            fetcher.fetch_blocking(since, sink)
        })
        .await
    }
}

/// Run a blocking collector on the blocking pool, bounded by `limit`.
///
/// `work` pushes messages into the sink as it parses them. When `limit` expires
/// first, whatever is in the sink is returned as a successful partial result.
pub async fn collect_within<F>(
    host: &str,
    limit: Duration,
    work: F,
) -> Result<Vec<ReconciledMessage>, FetchError>
where
    F: FnOnce(&Mutex<Vec<ReconciledMessage>>) -> Result<(), FetchError> + Send + 'static,
{
    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    let started = Instant::now();

    let task = tokio::task::spawn_blocking(move || work(&sink));

    let outcome = tokio::time::timeout(limit, task).await;
    let take = || std::mem::take(&mut *collected.lock().unwrap_or_else(|p| p.into_inner()));

    match outcome {
        Ok(Ok(Ok(()))) => {
            let messages = take();
            info!(host = %host, count = messages.len(), "Mailbox fetched");
            Ok(messages)
        }
        Ok(Ok(Err(e))) => Err(e),
        Ok(Err(e)) => Err(FetchError::Aborted {
            elapsed: started.elapsed(),
            reason: e.to_string(),
        }),
        Err(_) => {
            let messages = take();
            warn!(
                host = %host,
                timeout = ?limit,
                count = messages.len(),
                "Mailbox fetch timed out, returning partial results"
            );
            Ok(messages)
        }
    }
}

/// A tagged `NO`/`BAD` to LOGIN means bad credentials; anything else passes through.
fn login_failure(user: &str, err: FetchError) -> FetchError {
    match err {
        FetchError::Command { .. } => FetchError::AuthFailed {
            user: user.to_string(),
        },
        other => other,
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// Lines and literals returned by one tagged command.
#[derive(Debug, Default)]
struct Response {
    lines: Vec<String>,
    literals: Vec<Vec<u8>>,
}

struct ImapSession {
    reader: BufReader<TlsStream>,
    next_tag: u32,
}

impl ImapSession {
    fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, FetchError> {
        let connect_err = |reason: String| FetchError::Connect {
            host: host.to_string(),
            port,
            reason,
        };

        let tcp = TcpStream::connect((host, port)).map_err(|e| connect_err(e.to_string()))?;
        tcp.set_read_timeout(Some(timeout))?;
        tcp.set_write_timeout(Some(timeout))?;

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = Arc::new(
            rustls::ClientConfig::builder_with_provider(Arc::new(
                rustls::crypto::ring::default_provider(),
            ))
            .with_safe_default_protocol_versions()
            .map_err(|e| connect_err(e.to_string()))?
            .with_root_certificates(root_store)
            .with_no_client_auth(),
        );
        let server_name =
            ServerName::try_from(host.to_string()).map_err(|e| connect_err(e.to_string()))?;
        let conn = rustls::ClientConnection::new(tls_config, server_name)
            .map_err(|e| connect_err(e.to_string()))?;

        let mut session = Self {
            reader: BufReader::new(rustls::StreamOwned::new(conn, tcp)),
            next_tag: 1,
        };

        let greeting = session.read_line()?;
        if !greeting.starts_with("* OK") && !greeting.starts_with("* PREAUTH") {
            return Err(connect_err(format!("unexpected greeting: {}", greeting.trim_end())));
        }
        Ok(session)
    }

    fn read_line(&mut self) -> Result<String, FetchError> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Err(FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "IMAP connection closed",
            )));
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Send a tagged command and collect its response, failing unless it ends in `OK`.
    fn command(&mut self, cmd: &str) -> Result<Response, FetchError> {
        let tag = format!("A{}", self.next_tag);
        self.next_tag += 1;

        let stream = self.reader.get_mut();
        stream.write_all(format!("{tag} {cmd}\r\n").as_bytes())?;
        stream.flush()?;

        let verb = cmd.split_whitespace().next().unwrap_or(cmd).to_string();
        let mut response = Response::default();
        loop {
            let line = self.read_line()?;
            if let Some(len) = literal_len(&line) {
                let mut literal = vec![0u8; len];
                self.reader.read_exact(&mut literal)?;
                response.literals.push(literal);
            }
            if let Some(status) = line.strip_prefix(&format!("{tag} ")) {
                if status.starts_with("OK") {
                    response.lines.push(line);
                    return Ok(response);
                }
                return Err(FetchError::Command {
                    command: verb,
                    reason: status.trim_end().to_string(),
                });
            }
            response.lines.push(line);
        }
    }
}

// ── Helpers (public for testing) ────────────────────────────────────

/// Message sequence numbers from `* SEARCH` lines.
pub fn parse_search_response(lines: &[String]) -> Vec<u32> {
    lines
        .iter()
        .filter_map(|line| line.strip_prefix("* SEARCH"))
        .flat_map(|rest| rest.split_whitespace().filter_map(|id| id.parse().ok()))
        .collect()
}

/// Length of the literal announced at the end of a line (`... {123}\r\n`).
pub fn literal_len(line: &str) -> Option<usize> {
    let line = line.trim_end_matches(['\r', '\n']);
    let rest = line.strip_suffix('}')?;
    let open = rest.rfind('{')?;
    rest[open + 1..].parse().ok()
}

/// IMAP date for SEARCH criteria, e.g. `08-Oct-2026`.
pub fn imap_date(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}

/// Quote a string for IMAP, escaping `\` and `"`.
pub fn imap_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
