//! Engine: signal dispatch and generation lifecycle orchestration.
//!
//! One engine instance is constructed at startup and lives for the
//! process. It owns the store handle, the network client, and the
//! lifecycle state of the generation it installs and serves from. The
//! host delivers signals (install, activate, fetch, message, and the
//! deferred-work family) and the engine answers each with exactly one
//! response or a propagated failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use url::Url;

use lifeboat_client::{InterceptedRequest, Network, canonicalize};
use lifeboat_core::config::AppConfig;
use lifeboat_core::{Error, Manifest, SHELL_KEY, VersionedStore};

use crate::lifecycle::LifecycleState;
use crate::precache::{self, PrecacheSummary};
use crate::resolve::{self, Resolved};

/// Control messages the engine recognizes; anything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ControlMessage {
    /// "Adopt new version now": force promotion of a waiting generation.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

/// The offline-resilience engine.
pub struct Engine {
    config: AppConfig,
    manifest: Manifest,
    store: VersionedStore,
    network: Arc<dyn Network>,
    origin: Url,
    state: Mutex<LifecycleState>,
    skip_waiting: AtomicBool,
    /// Set once activation completes: the engine then intercepts every
    /// in-scope request, including ones already in flight.
    claimed: AtomicBool,
}

impl Engine {
    pub fn new(
        config: AppConfig,
        manifest: Manifest,
        store: VersionedStore,
        network: Arc<dyn Network>,
    ) -> Result<Self, Error> {
        let origin = canonicalize(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            origin,
            skip_waiting: AtomicBool::new(config.skip_waiting),
            claimed: AtomicBool::new(false),
            state: Mutex::new(LifecycleState::Installing),
            config,
            manifest,
            store,
            network,
        })
    }

    /// Install signal: open this build's generation and precache the
    /// manifest. Partial precache failure still installs; only a store
    /// failure is fatal. Ends Waiting, or Active when skip-waiting is set.
    pub async fn handle_install(&self) -> Result<PrecacheSummary, Error> {
        let tag = &self.config.cache_version;
        let summary =
            precache::run(&self.store, self.network.as_ref(), &self.origin, &self.manifest, tag).await?;

        tracing::info!(
            tag = %tag,
            cached = summary.cached,
            failed = summary.failed,
            "install complete"
        );

        if self.skip_waiting.load(Ordering::SeqCst) {
            self.advance(LifecycleState::Active);
        } else {
            self.advance(LifecycleState::Waiting);
        }

        Ok(summary)
    }

    /// Activate signal: delete every generation but the current one, then
    /// claim interception of all in-scope requests. A store failure halts
    /// the pass and leaves stale generations; no automatic retry.
    pub async fn handle_activate(&self) -> Result<(), Error> {
        let tag = &self.config.cache_version;

        if let Err(err) = self.delete_stale_generations(tag).await {
            tracing::error!(error = %err, "activation halted; stale generations remain");
            return Err(err);
        }

        self.claimed.store(true, Ordering::SeqCst);
        self.advance(LifecycleState::Active);
        tracing::info!(tag = %tag, "generation active");
        Ok(())
    }

    async fn delete_stale_generations(&self, current: &str) -> Result<(), Error> {
        for tag in self.store.list_tags().await? {
            if tag != current {
                tracing::info!(stale = %tag, "deleting superseded generation");
                self.store.delete_generation(&tag).await?;
            }
        }
        Ok(())
    }

    /// Intercept signal: answered with exactly one resolved response or a
    /// propagated failure.
    pub async fn handle_fetch(&self, request: &InterceptedRequest) -> Result<Resolved, Error> {
        resolve::resolve(
            &self.store,
            self.network.as_ref(),
            &self.config.cache_version,
            &self.config.fallback_label,
            request,
        )
        .await
    }

    /// Control message: `{"type":"SKIP_WAITING"}` forces promotion of a
    /// waiting generation; anything else, bad JSON included, is ignored.
    pub async fn handle_message(&self, raw: &str) {
        match serde_json::from_str::<ControlMessage>(raw) {
            Ok(ControlMessage::SkipWaiting) => self.adopt_now().await,
            Err(_) => tracing::debug!(raw, "ignoring unrecognized control message"),
        }
    }

    /// Forced promotion: a waiting generation activates immediately.
    pub async fn adopt_now(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
        if self.state() == LifecycleState::Waiting {
            if let Err(err) = self.handle_activate().await {
                tracing::error!(error = %err, "forced promotion failed");
            }
        }
    }

    /// Background-sync acknowledgement. No deferred work is registered;
    /// business data lives in the application's own local store.
    pub fn handle_sync(&self, tag: &str) {
        tracing::debug!(tag, "sync acknowledged; no deferred work");
    }

    /// Push acknowledgement: returns the body text a notification would
    /// carry. Delivery itself is out of scope.
    pub fn handle_push(&self, payload: Option<&str>) -> String {
        let body = payload.unwrap_or("lifeboat notification").to_string();
        tracing::debug!(body = %body, "push acknowledged");
        body
    }

    /// Notification-click acknowledgement: the path the host should open.
    pub fn handle_notification_click(&self) -> &'static str {
        tracing::debug!("notification click; reopening app shell");
        SHELL_KEY
    }

    /// Marks this instance as replaced by a newer generation.
    pub fn supersede(&self) {
        self.advance(LifecycleState::Superseded);
        self.claimed.store(false, Ordering::SeqCst);
    }

    fn advance(&self, next: LifecycleState) {
        let mut state = self.state.lock().unwrap();
        if *state == next {
            return;
        }
        if state.may_advance_to(next) {
            tracing::debug!(from = state.as_str(), to = next.as_str(), "lifecycle transition");
            *state = next;
        } else {
            tracing::warn!(from = state.as_str(), to = next.as_str(), "ignoring invalid lifecycle transition");
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap()
    }

    /// Whether this engine has taken over request interception.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }

    pub fn current_tag(&self) -> &str {
        &self.config.cache_version
    }

    pub fn store(&self) -> &VersionedStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeNetwork, ok_response};
    use lifeboat_core::StoredResponse;

    async fn engine_with(config: AppConfig, manifest: &str, network: FakeNetwork) -> Engine {
        let store = VersionedStore::open_in_memory().await.unwrap();
        Engine::new(config, Manifest::parse(manifest), store, Arc::new(network)).unwrap()
    }

    fn config(tag: &str, skip_waiting: bool) -> AppConfig {
        AppConfig {
            origin: "https://app.example".into(),
            cache_version: tag.into(),
            skip_waiting,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_install_then_activate() {
        let network = FakeNetwork::new();
        network.insert("https://app.example/", ok_response("shell"));
        let engine = engine_with(config("v1", true), "/\n", network).await;

        assert_eq!(engine.state(), LifecycleState::Installing);
        let summary = engine.handle_install().await.unwrap();
        assert_eq!(summary.cached, 1);
        assert_eq!(engine.state(), LifecycleState::Active);

        engine.handle_activate().await.unwrap();
        assert!(engine.is_claimed());
        assert_eq!(engine.store().list_tags().await.unwrap(), vec!["v1".to_string()]);
    }

    #[tokio::test]
    async fn test_install_without_skip_ends_waiting() {
        let network = FakeNetwork::new();
        network.insert("https://app.example/", ok_response("shell"));
        let engine = engine_with(config("v1", false), "/\n", network).await;

        engine.handle_install().await.unwrap();
        assert_eq!(engine.state(), LifecycleState::Waiting);
        assert!(!engine.is_claimed());
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_generations() {
        // Store holds v1 and v2, current is v2: post-activate only v2 remains.
        let engine = engine_with(config("v2", true), "", FakeNetwork::new()).await;
        let store = engine.store().clone();
        store
            .put("v1", "/", &StoredResponse::new(200, vec![], b"old".to_vec()))
            .await
            .unwrap();
        store
            .put("v2", "/", &StoredResponse::new(200, vec![], b"new".to_vec()))
            .await
            .unwrap();

        engine.handle_activate().await.unwrap();

        assert_eq!(store.list_tags().await.unwrap(), vec!["v2".to_string()]);
        assert!(store.get("v1", "/").await.unwrap().is_none());
        assert_eq!(store.get("v2", "/").await.unwrap().unwrap().body, b"new");
    }

    #[tokio::test]
    async fn test_activate_storage_failure_halts_and_keeps_stale_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.sqlite");
        let store = VersionedStore::open(&path).await.unwrap();
        store
            .put("v1", "/", &StoredResponse::new(200, vec![], b"old".to_vec()))
            .await
            .unwrap();
        store
            .put("v2", "/", &StoredResponse::new(200, vec![], b"new".to_vec()))
            .await
            .unwrap();
        let engine =
            Engine::new(config("v2", true), Manifest::parse(""), store.clone(), Arc::new(FakeNetwork::new()))
                .unwrap();
        store.close().await.unwrap();

        let err = engine.handle_activate().await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!engine.is_claimed());
        assert_eq!(engine.state(), LifecycleState::Installing);

        // The stale generation survives for the next activation pass.
        let reopened = VersionedStore::open(&path).await.unwrap();
        assert_eq!(reopened.list_tags().await.unwrap(), vec!["v1".to_string(), "v2".to_string()]);
    }

    #[tokio::test]
    async fn test_skip_waiting_message_promotes_waiting_generation() {
        let network = FakeNetwork::new();
        network.insert("https://app.example/", ok_response("shell"));
        let engine = engine_with(config("v1", false), "/\n", network).await;

        engine.handle_install().await.unwrap();
        assert_eq!(engine.state(), LifecycleState::Waiting);

        engine.handle_message(r#"{"type":"SKIP_WAITING"}"#).await;

        assert_eq!(engine.state(), LifecycleState::Active);
        assert!(engine.is_claimed());
    }

    #[tokio::test]
    async fn test_unknown_messages_ignored() {
        let engine = engine_with(config("v1", false), "", FakeNetwork::new()).await;

        engine.handle_message(r#"{"type":"SOMETHING_ELSE"}"#).await;
        engine.handle_message("not even json").await;

        assert_eq!(engine.state(), LifecycleState::Installing);
        assert!(!engine.is_claimed());
    }

    #[tokio::test]
    async fn test_fetch_serves_precached_asset() {
        let network = FakeNetwork::new();
        network.insert("https://app.example/", ok_response("<html>shell</html>"));
        let engine = engine_with(config("v1", true), "/\n", network).await;
        engine.handle_install().await.unwrap();
        engine.handle_activate().await.unwrap();

        let request = InterceptedRequest::parse("https://app.example/some/route", "document").unwrap();
        let resolved = engine.handle_fetch(&request).await.unwrap();

        assert_eq!(resolved.body, "<html>shell</html>");
    }

    #[tokio::test]
    async fn test_deferred_work_signals_are_noops() {
        let engine = engine_with(config("v1", true), "", FakeNetwork::new()).await;

        engine.handle_sync("backup-data");
        assert_eq!(engine.handle_push(Some("hello")), "hello");
        assert_eq!(engine.handle_push(None), "lifeboat notification");
        assert_eq!(engine.handle_notification_click(), SHELL_KEY);
    }

    #[tokio::test]
    async fn test_supersede_releases_claim() {
        let engine = engine_with(config("v1", true), "", FakeNetwork::new()).await;
        engine.handle_install().await.unwrap();
        engine.handle_activate().await.unwrap();
        assert!(engine.is_claimed());

        engine.supersede();

        assert_eq!(engine.state(), LifecycleState::Superseded);
        assert!(!engine.is_claimed());
    }
}
