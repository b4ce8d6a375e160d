mod config;
mod errors;
mod generation;
mod llm_client;
mod progress;
mod roadmap;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::{FunctionRoadmapSource, LlmRoadmapSource, RoadmapSource};
use crate::llm_client::LlmClient;
use crate::progress::{MemorySnapshotStore, RedisSnapshotStore, SnapshotStore, TrackerRegistry};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing generation backend)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathway API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_snapshot_store(&config).await?;
    info!("Snapshot store initialized ({})", store.backend());

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()?;
    let source = build_roadmap_source(&config, http)?;
    info!("Roadmap source initialized ({})", source.backend());

    let state = AppState {
        registry: Arc::new(TrackerRegistry::new(
            store,
            config.snapshot_key_prefix.clone(),
            config.tracker_cache_capacity,
        )),
        source,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web front-end host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when configured, otherwise a process-local store that forgets
/// progress on restart.
async fn build_snapshot_store(config: &Config) -> Result<Arc<dyn SnapshotStore>> {
    match &config.redis_url {
        Some(url) => Ok(Arc::new(RedisSnapshotStore::connect(url).await?)),
        None => {
            warn!("REDIS_URL not set; progress snapshots will not survive a restart");
            Ok(Arc::new(MemorySnapshotStore::new()))
        }
    }
}

/// The remote function wins when both backends are configured.
fn build_roadmap_source(config: &Config, http: reqwest::Client) -> Result<Arc<dyn RoadmapSource>> {
    if let Some(url) = &config.roadmap_function_url {
        return Ok(Arc::new(FunctionRoadmapSource::new(
            http,
            url.clone(),
            config.roadmap_function_key.clone(),
        )));
    }
    match &config.anthropic_api_key {
        Some(key) => {
            info!("LLM model: {}", llm_client::MODEL);
            Ok(Arc::new(LlmRoadmapSource::new(LlmClient::new(http, key.clone()))))
        }
        None => anyhow::bail!("no roadmap generation backend configured"),
    }
}
