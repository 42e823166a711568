use std::sync::Arc;

use outreach::api::{AppState, outreach_routes};
use outreach::config::OutreachConfig;
use outreach::contacts::InMemoryContactStore;
use outreach::discovery::SyntheticDiscovery;
use outreach::mail::LiveMailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = OutreachConfig::from_env()?;
    let port = config.port;

    eprintln!("📬 Outreach v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api", port);
    eprintln!("   Send delay: {}ms", config.send_delay.as_millis());
    eprintln!(
        "   Follow-up after: {}h",
        config.follow_up_after.num_hours()
    );
    eprintln!("   Inbox window: {} days", config.inbox_window_days);
    eprintln!("   Address match: {}\n", config.address_match);

    let mailer = Arc::new(LiveMailer::new(&config));
    let state = AppState::new(
        config,
        InMemoryContactStore::new(),
        Arc::new(SyntheticDiscovery::new()),
        mailer,
    );
    let app = outreach_routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!(port, "Outreach server started");
    axum::serve(listener, app).await?;

    Ok(())
}
