//! Shared test doubles for the engine.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use lifeboat_client::{FetchMode, Network, NetworkResponse, ResponseOrigin};
use lifeboat_core::{Error, StoredResponse, VersionedStore};

/// A 200 same-origin response with an html content type.
pub fn ok_response(body: &str) -> NetworkResponse {
    NetworkResponse {
        status: 200,
        headers: vec![("content-type".to_string(), "text/html".to_string())],
        body: Bytes::from(body.to_string()),
        origin: ResponseOrigin::Basic,
    }
}

/// A 200 response judged cross-origin.
pub fn opaque_response(body: &str) -> NetworkResponse {
    NetworkResponse { origin: ResponseOrigin::Opaque, ..ok_response(body) }
}

/// Scripted network: URLs map to canned responses; anything unscripted is
/// unreachable (a transport failure). Records every fetch.
pub struct FakeNetwork {
    responses: Mutex<HashMap<String, NetworkResponse>>,
    calls: Mutex<Vec<(String, FetchMode)>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self { responses: Mutex::new(HashMap::new()), calls: Mutex::new(Vec::new()) }
    }

    pub fn insert(&self, url: &str, response: NetworkResponse) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn calls(&self) -> Vec<(String, FetchMode)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, url: &Url, mode: FetchMode) -> Result<NetworkResponse, Error> {
        self.calls.lock().unwrap().push((url.to_string(), mode));
        self.responses
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("unreachable: {url}")))
    }
}

/// Poll for a fire-and-forget write to land.
pub async fn wait_for_entry(store: &VersionedStore, tag: &str, key: &str) -> Option<StoredResponse> {
    for _ in 0..50 {
        if let Ok(Some(entry)) = store.get(tag, key).await {
            return Some(entry);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}
