use std::sync::Arc;

use netmap_client::{ClientConfig, UrlSet};
use netmap_ore::metrics::MetricsRegistry;
use netmap_store::MemoryStore;

use netmap_cluster::PeerManager;

/// Shared state for every axum handler.
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub peers: Arc<PeerManager>,
    pub notifiers: Option<UrlSet>,
    pub metrics: MetricsRegistry,
}

impl AppState {
    pub fn new(
        store: Arc<MemoryStore>,
        peers: Arc<PeerManager>,
        notifier_urls: Vec<String>,
        metrics: MetricsRegistry,
    ) -> Result<Self, anyhow::Error> {
        let notifiers = if notifier_urls.is_empty() {
            None
        } else {
            Some(UrlSet::new(ClientConfig::new(notifier_urls))?)
        };
        Ok(AppState {
            store,
            peers,
            notifiers,
            metrics,
        })
    }
}
