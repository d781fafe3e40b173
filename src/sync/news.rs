// src/sync/news.rs
//! # News Synchronizer
//! On-demand, per-symbol news fetches coordinated through the
//! [`SubResourceRegistry`]. Symbols are independent: one symbol loading never
//! blocks another symbol's toggle.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::model::NewsItem;
use crate::registry::{FailedNewsPolicy, SubResourceRegistry, SubResourceState, ToggleOutcome, Visibility};
use crate::service::DynStockService;
use crate::sync::bounded;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsEntry {
    pub symbol: String,
    pub visibility: Visibility,
    pub control_enabled: bool,
    #[serde(flatten)]
    pub state: SubResourceState<NewsItem>,
}

#[derive(Clone)]
pub struct NewsSynchronizer {
    service: DynStockService,
    timeout: Option<Duration>,
    registry: Arc<Mutex<SubResourceRegistry<NewsItem>>>,
}

impl NewsSynchronizer {
    pub fn new(service: DynStockService, timeout: Option<Duration>, policy: FailedNewsPolicy) -> Self {
        Self {
            service,
            timeout,
            registry: Arc::new(Mutex::new(SubResourceRegistry::new(policy))),
        }
    }

    fn registry(&self) -> MutexGuard<'_, SubResourceRegistry<NewsItem>> {
        self.registry.lock().expect("news registry mutex poisoned")
    }

    /// Flip visibility for `symbol`. When the outcome is
    /// [`ToggleOutcome::Fetch`] the key is already `Loading` and the caller
    /// must follow up with [`resolve`](Self::resolve).
    pub fn toggle(&self, symbol: &str) -> ToggleOutcome {
        self.registry().toggle(symbol)
    }

    /// Fetch news for `symbol` outside of a toggle. Returns `false` without
    /// issuing a request when a fetch for that symbol is already in flight.
    pub async fn fetch_news(&self, symbol: &str) -> bool {
        if !self.registry().start(symbol) {
            debug!(symbol, "news fetch already in flight");
            return false;
        }
        self.resolve(symbol).await;
        true
    }

    /// Issue the request for a symbol the registry already holds as `Loading`.
    pub async fn resolve(&self, symbol: &str) {
        let res = bounded(self.timeout, self.service.fetch_news(symbol)).await;

        let mut reg = self.registry();
        match res {
            Ok(items) => {
                info!(symbol, count = items.len(), "news loaded");
                reg.complete(symbol, items);
            }
            Err(e) => {
                warn!(symbol, error = %e, "news fetch failed");
                reg.fail(symbol, e.to_string());
            }
        }
    }

    pub fn state(&self, symbol: &str) -> SubResourceState<NewsItem> {
        self.registry().state(symbol)
    }

    pub fn visibility(&self, symbol: &str) -> Visibility {
        self.registry().visibility(symbol)
    }

    pub fn is_control_enabled(&self, symbol: &str) -> bool {
        self.registry().is_control_enabled(symbol)
    }

    pub fn snapshot(&self) -> Vec<NewsEntry> {
        self.registry()
            .snapshot()
            .into_iter()
            .map(|(symbol, visibility, state)| NewsEntry {
                control_enabled: !state.is_loading(),
                symbol,
                visibility,
                state,
            })
            .collect()
    }
}
