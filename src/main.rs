use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostrelay::cli::{Cli, Commands};
use hostrelay::{build_router, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "hostrelay=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = Cli::parse();

    let port = match args.command {
        Some(Commands::Serve { port }) => port.unwrap_or(cfg.port),
        None => cfg.port,
    };

    run_server(cfg, port).await
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&cfg)?);

    let origin = format!("{}://{}", cfg.origin_scheme, cfg.origin_host);
    tracing::info!(%origin, "forwarding all requests to origin");

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("hostrelay listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
