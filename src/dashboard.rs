// src/dashboard.rs
//! # Dashboard Controller
//! Composes the collection synchronizer, the news synchronizer and the series
//! aggregator into one observable snapshot, and exposes the user intents.
//!
//! Intents return as soon as the request is issued: network work runs on a
//! spawned task whose `JoinHandle` is handed back to the caller.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result as AnyResult;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::aggregate::{aggregate, TimeSeries};
use crate::chart::{ChartRenderer, ChartSpec};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::model::StockRecord;
use crate::registry::{FailedNewsPolicy, ToggleOutcome};
use crate::service::DynStockService;
use crate::sync::collection::{CollectionState, CollectionSynchronizer};
use crate::sync::news::{NewsEntry, NewsSynchronizer};

/// What the whole page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "message", rename_all = "snake_case")]
pub enum DashboardView {
    Loading,
    /// Collection load failed; replaces the entire dashboard.
    Error(String),
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    #[serde(flatten)]
    pub view: DashboardView,
    pub stocks: Vec<StockRecord>,
    pub series: Vec<TimeSeries>,
    pub news: Vec<NewsEntry>,
    pub add_error: Option<DashboardError>,
    pub adds_in_flight: usize,
    pub add_form_enabled: bool,
    pub news_panel_open: bool,
}

impl DashboardSnapshot {
    /// List rows shown under the chart, in collection order.
    pub fn stock_lines(&self) -> Vec<String> {
        self.stocks.iter().map(StockRecord::display_line).collect()
    }
}

/// Result of a news toggle; `pending` is set when a fetch was issued.
#[derive(Debug)]
pub struct NewsToggle {
    pub outcome: ToggleOutcome,
    pub pending: Option<JoinHandle<()>>,
}

pub struct DashboardController {
    collection: CollectionSynchronizer,
    news: NewsSynchronizer,
    news_panel_open: AtomicBool,
}

impl DashboardController {
    pub fn new(service: DynStockService, cfg: &DashboardConfig) -> Self {
        let timeout = cfg.timeout();
        Self {
            collection: CollectionSynchronizer::new(service.clone(), timeout),
            news: NewsSynchronizer::new(service, timeout, cfg.failed_news_policy),
            news_panel_open: AtomicBool::new(false),
        }
    }

    /// Default config: no timeout, failed news retried on reveal.
    pub fn with_service(service: DynStockService) -> Self {
        Self::new(service, &DashboardConfig::default())
    }

    pub fn with_policy(service: DynStockService, policy: FailedNewsPolicy) -> Self {
        let cfg = DashboardConfig {
            failed_news_policy: policy,
            ..DashboardConfig::default()
        };
        Self::new(service, &cfg)
    }

    /// Start the one-time collection load.
    pub fn refresh(&self) -> JoinHandle<()> {
        let collection = self.collection.clone();
        tokio::spawn(async move { collection.load().await })
    }

    /// Submit the add-stock form. Blank input fails here, before any request.
    pub fn submit_symbol(&self, text: &str) -> Result<JoinHandle<Result<StockRecord>>> {
        let symbol = self.collection.begin_add(text)?;
        debug!(symbol = %symbol, "add stock issued");
        let collection = self.collection.clone();
        Ok(tokio::spawn(async move { collection.finish_add(symbol).await }))
    }

    pub fn toggle_news(&self, symbol: &str) -> Result<NewsToggle> {
        self.ensure_ready()?;
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(DashboardError::Validation("symbol must not be empty".into()));
        }

        let outcome = self.news.toggle(symbol);
        let pending = (outcome == ToggleOutcome::Fetch).then(|| {
            let news = self.news.clone();
            let symbol = symbol.to_string();
            tokio::spawn(async move { news.resolve(&symbol).await })
        });
        Ok(NewsToggle { outcome, pending })
    }

    /// Flip the container disclosure for the news section. Returns the new value.
    pub fn toggle_all_news_panel(&self) -> Result<bool> {
        self.ensure_ready()?;
        Ok(!self.news_panel_open.fetch_xor(true, Ordering::SeqCst))
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.collection.is_ready() {
            Ok(())
        } else {
            Err(DashboardError::NotReady)
        }
    }

    pub fn collection_state(&self) -> CollectionState {
        self.collection.state()
    }

    /// Series derived from the current collection; recomputed on every call.
    pub fn series(&self) -> Vec<TimeSeries> {
        aggregate(&self.collection.records())
    }

    pub fn chart(&self) -> ChartSpec {
        ChartSpec::from_series(&self.series())
    }

    pub fn render(&self, renderer: &dyn ChartRenderer) -> AnyResult<()> {
        renderer.render(&self.chart())
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let coll = self.collection.snapshot();
        let view = match &coll.state {
            CollectionState::Idle | CollectionState::Loading => DashboardView::Loading,
            CollectionState::Failed(msg) => DashboardView::Error(msg.clone()),
            CollectionState::Ready => DashboardView::Ready,
        };
        let ready = view == DashboardView::Ready;

        DashboardSnapshot {
            series: aggregate(&coll.records),
            stocks: coll.records,
            news: self.news.snapshot(),
            add_error: coll.add_error,
            adds_in_flight: coll.adds_in_flight,
            add_form_enabled: ready,
            news_panel_open: self.news_panel_open.load(Ordering::SeqCst),
            view,
        }
    }
}
