use anyhow::{Context, Result};
use clap::Parser;
use dealcoach_relay::{
    create_router, spawn_transcript_pump, AppState, Config, SttBackendFactory, SttSource,
};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "dealcoach-relay",
    about = "Live transcription relay for DealCoach meetings"
)]
struct Args {
    /// Config file base path (extension resolved by the loader)
    #[arg(long, default_value = "config/dealcoach-relay")]
    config: String,

    /// Override the HTTP port from the config file
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;
    let port = args.port.unwrap_or(cfg.service.http.port);

    info!("{} v0.1.0", cfg.service.name);

    let source = SttSource::from_config(&cfg.stt)?;
    let backend = SttBackendFactory::create(source).await?;
    info!("STT backend: {}", backend.name());

    let state = AppState::new(backend, Duration::from_secs(cfg.cache.transcript_ttl_secs));
    spawn_transcript_pump(state.clone());

    let router = create_router(state);
    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Relay listening on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
