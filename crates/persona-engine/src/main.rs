mod config;
mod error;
mod progress;
mod server;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use persona_common::redis::RedisCache;
use progress::ProgressStore;
use server::PersonaEngineServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries MCP JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting persona-engine MCP server");

    let config = Config::from_env()?;
    info!(
        redis = config.redis_url.is_some(),
        roadmap_variant = config.roadmap_variant.as_str(),
        progress_ttl_secs = config.progress_ttl_secs,
        "configuration loaded"
    );

    let redis = RedisCache::new(config.redis_url.as_deref());
    let progress = Arc::new(ProgressStore::new(redis, config.progress_ttl_secs));
    if progress.is_available().await {
        info!("redis connected, progress will be persisted");
    } else {
        info!("redis unavailable, running without progress persistence");
    }

    let server = PersonaEngineServer::new(progress, config.roadmap_variant);

    if let Some(addr) = config.tcp_listen_addr.as_deref() {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
