//! Response resolution policy: the per-request decision procedure.
//!
//! Documents are shell-first: any navigation request is answered with the
//! cached app shell when one exists, guaranteeing an instant, consistent
//! entry point; the network is only consulted on a shell miss, and a
//! successful document fetch refreshes the shell entry in the background.
//!
//! Static assets are cache-first with network fill: a miss fetches the
//! asset and, when the response is a 200 same-origin one, stores it in the
//! background. Offline images degrade to a synthesized placeholder; every
//! other offline asset surfaces as a failed fetch.
//!
//! Background puts are fire-and-forget: the response returns to the caller
//! without awaiting the write, and a failed write is logged, never
//! surfaced. A rapid repeat request may still observe a miss until the
//! write lands; last write wins.

use bytes::Bytes;

use lifeboat_core::{Error, SHELL_KEY, StoredResponse, VersionedStore};
use lifeboat_client::{FetchMode, InterceptedRequest, Network, NetworkResponse, RequestClass};

use crate::fallback;

/// Where a resolved response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    Fallback,
}

/// The single response answering one intercepted request.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl Resolved {
    fn from_stored(stored: StoredResponse) -> Self {
        Self {
            status: stored.status,
            headers: stored.headers,
            body: Bytes::from(stored.body),
            source: ResponseSource::Cache,
        }
    }

    fn from_network(response: &NetworkResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            source: ResponseSource::Network,
        }
    }

    /// First header value matching `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Resolve one intercepted request against the current generation.
pub async fn resolve(
    store: &VersionedStore,
    network: &dyn Network,
    tag: &str,
    fallback_label: &str,
    request: &InterceptedRequest,
) -> Result<Resolved, Error> {
    match request.class() {
        RequestClass::Document => resolve_document(store, network, tag, request).await,
        RequestClass::Image => resolve_asset(store, network, tag, request, Some(fallback_label)).await,
        RequestClass::Other => resolve_asset(store, network, tag, request, None).await,
    }
}

/// Navigation requests: canonical shell entry first, network second,
/// shell again as the offline fallback.
async fn resolve_document(
    store: &VersionedStore,
    network: &dyn Network,
    tag: &str,
    request: &InterceptedRequest,
) -> Result<Resolved, Error> {
    if let Some(shell) = store.get(tag, SHELL_KEY).await? {
        tracing::debug!(url = %request.url, "serving app shell from cache");
        return Ok(Resolved::from_stored(shell));
    }

    match network.fetch(&request.url, FetchMode::Default).await {
        Ok(response) => {
            // Only a plain 200 refreshes the shell entry; redirects and
            // error documents pass through uncached.
            if response.status == 200 {
                spawn_put(store.clone(), tag.to_string(), SHELL_KEY.to_string(), response.to_stored());
            }
            Ok(Resolved::from_network(&response))
        }
        Err(err) => match store.get(tag, SHELL_KEY).await? {
            Some(shell) => {
                tracing::debug!(url = %request.url, "offline; falling back to cached shell");
                Ok(Resolved::from_stored(shell))
            }
            None => Err(err),
        },
    }
}

/// Images and other static assets: cache-first with background fill.
async fn resolve_asset(
    store: &VersionedStore,
    network: &dyn Network,
    tag: &str,
    request: &InterceptedRequest,
    image_fallback_label: Option<&str>,
) -> Result<Resolved, Error> {
    let key = request.key();

    if let Some(hit) = store.get(tag, &key).await? {
        return Ok(Resolved::from_stored(hit));
    }

    match network.fetch(&request.url, FetchMode::Default).await {
        Ok(response) => {
            if response.is_cacheable() {
                spawn_put(store.clone(), tag.to_string(), key, response.to_stored());
            }
            Ok(Resolved::from_network(&response))
        }
        Err(err) => match image_fallback_label {
            Some(label) => {
                tracing::debug!(url = %request.url, "offline image; serving placeholder");
                Ok(fallback::placeholder_image(label))
            }
            None => Err(err),
        },
    }
}

/// Untracked background write. The caller already has its response; a
/// storage failure here is logged and otherwise dropped.
fn spawn_put(store: VersionedStore, tag: String, key: String, response: StoredResponse) {
    tokio::spawn(async move {
        if let Err(err) = store.put(&tag, &key, &response).await {
            tracing::warn!(key = %key, error = %err, "background cache write failed");
        }
    });
}
