use anyhow::{Context, Result};
use clap::Parser;
use loqa_notes::{create_router, AppState, Config, GeminiClient};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "loqa-notes", version, about = "Meeting notes summary service")]
struct Args {
    /// Configuration file (extension optional; missing file falls back to defaults)
    #[arg(short, long, default_value = "config/loqa-notes")]
    config: String,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides configuration)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let client = GeminiClient::new(cfg.gemini.clone())?;
    info!("Using model {}", client.model());

    let state = AppState::new(Arc::new(client))
        .with_request_timeout(cfg.service.http.request_timeout())
        .with_max_upload_bytes(cfg.service.http.max_upload_bytes);
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server started at {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
