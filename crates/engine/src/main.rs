//! lifeboat warm-up entry point.
//!
//! Boots the engine against the configured origin: installs this build's
//! generation (precache), activates it (stale-generation cleanup and
//! takeover), and reports the result. Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use lifeboat_client::HttpNetwork;
use lifeboat_core::config::AppConfig;
use lifeboat_core::{Manifest, VersionedStore};

mod engine;
mod fallback;
mod lifecycle;
mod precache;
mod resolve;
#[cfg(test)]
mod testutil;

use engine::Engine;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let manifest = match &config.manifest_path {
        Some(path) => {
            Manifest::from_file(path).with_context(|| format!("reading manifest {}", path.display()))?
        }
        None => Manifest::app_defaults(),
    };

    tracing::info!(
        origin = %config.origin,
        tag = %config.cache_version,
        assets = manifest.len(),
        "starting lifeboat warm-up"
    );

    let network = Arc::new(HttpNetwork::new(&config.origin, &config.user_agent)?);
    let store = VersionedStore::open(&config.db_path).await?;
    let engine = Engine::new(config, manifest, store, network)?;

    let summary = engine.handle_install().await.context("install failed")?;
    engine.handle_activate().await.context("activate failed")?;

    let total = engine.store().entry_count(engine.current_tag()).await?;
    tracing::info!(
        tag = engine.current_tag(),
        cached = summary.cached,
        failed = summary.failed,
        total,
        "warm-up complete"
    );

    Ok(())
}
