//! Precache loader: eager population of a fresh generation.
//!
//! Runs once per install against the manifest. Every entry is fetched with
//! a cache-bypassing reload and stored under its normalized key. One
//! unreachable asset must not brick the install, so per-entry failures are
//! logged and skipped; only failing to open the generation itself is fatal.

use lifeboat_core::{Error, Manifest, StoredResponse, VersionedStore};
use lifeboat_client::{FetchMode, Network};
use url::Url;

/// Outcome of one precache pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecacheSummary {
    /// Entries fetched and stored.
    pub cached: usize,
    /// Entries skipped after a fetch or store failure.
    pub failed: usize,
}

/// Populate `tag` with the manifest's assets.
///
/// Completes successfully as long as the generation exists, regardless of
/// how many entries failed.
pub async fn run(
    store: &VersionedStore,
    network: &dyn Network,
    origin: &Url,
    manifest: &Manifest,
    tag: &str,
) -> Result<PrecacheSummary, Error> {
    store.open_generation(tag).await?;

    let mut summary = PrecacheSummary { cached: 0, failed: 0 };
    for path in manifest.paths() {
        match precache_entry(store, network, origin, tag, path).await {
            Ok(()) => summary.cached += 1,
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "precache entry failed; continuing");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

async fn precache_entry(
    store: &VersionedStore,
    network: &dyn Network,
    origin: &Url,
    tag: &str,
    path: &str,
) -> Result<(), Error> {
    let url = origin.join(path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let response = network.fetch(&url, FetchMode::Reload).await?;

    if response.status != 200 {
        return Err(Error::Network(format!("status {}", response.status)));
    }

    let stored = StoredResponse::new(response.status, response.headers, response.body.to_vec());
    store.put(tag, path, &stored).await
}
