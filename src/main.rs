use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aqimap::{AqimapConfig, CacheStore, Dashboard, LocationQuery, logging, web};
use tracing::info;

/// With arguments, print the dashboard for that location as JSON.
/// Without, serve the HTTP API.
#[tokio::main]
async fn main() -> Result<()> {
    let config = AqimapConfig::load()?;
    logging::init(&config.logging)?;

    let cache_dir = config.cache.resolved_location();
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
    let store = CacheStore::open(&cache_dir)
        .with_context(|| format!("Failed to open cache at {}", cache_dir.display()))?;
    info!("Using cache at {}", cache_dir.display());

    let dashboard = Dashboard::from_config(&config, &store)?;

    let input = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if !input.trim().is_empty() {
        let query = LocationQuery::parse(&input)?;
        let record = dashboard.query(query).await?;
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.bind, config.server.port
            )
        })?;
    web::run(addr, Arc::new(dashboard)).await
}
