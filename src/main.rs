use anyhow::Result;
use clap::Parser;
use convoscribe::{create_router, AppState, Config, NatsBackendClient, NatsBackendConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "convoscribe", about = "Conversation recording orchestrator")]
struct Args {
    /// Config file path (without extension)
    #[arg(long, default_value = "config/convoscribe")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let backend = NatsBackendClient::connect(NatsBackendConfig {
        url: cfg.backend.nats_url.clone(),
        subject_prefix: cfg.backend.subject_prefix.clone(),
        request_timeout: Duration::from_secs(cfg.backend.request_timeout_secs),
    })
    .await?;

    let state = AppState::new(
        Arc::new(backend),
        Duration::from_millis(cfg.polling.transcript_interval_ms),
        Duration::from_millis(cfg.polling.conversation_interval_ms),
        Duration::from_secs(cfg.polling.idle_ttl_secs),
        cfg.conversations.page_size,
    );

    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
