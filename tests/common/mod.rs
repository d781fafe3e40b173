// tests/common/mod.rs
//! Scripted in-memory stock service shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stock_dashboard::{NewsItem, StockRecord, StockService};
use tokio::sync::Semaphore;

#[derive(Default)]
pub struct ScriptedService {
    list: Mutex<Option<Vec<StockRecord>>>,
    failing_adds: Mutex<HashSet<String>>,
    failing_news: Mutex<HashSet<String>>,
    news: Mutex<HashMap<String, Vec<NewsItem>>>,
    calls: Mutex<Vec<String>>,
    /// When set, every call waits for a permit before answering.
    gate: Option<Semaphore>,
}

impl ScriptedService {
    pub fn with_stocks(records: Vec<StockRecord>) -> Self {
        Self {
            list: Mutex::new(Some(records)),
            ..Default::default()
        }
    }

    /// `list_stocks` answers HTTP 500.
    pub fn failing_list() -> Self {
        Self::default()
    }

    /// Calls block until [`release`](Self::release) hands out permits.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, n: usize) {
        if let Some(g) = &self.gate {
            g.add_permits(n);
        }
    }

    pub fn fail_add(self, symbol: &str) -> Self {
        self.failing_adds.lock().unwrap().insert(symbol.to_string());
        self
    }

    pub fn fail_news(&self, symbol: &str) {
        self.failing_news.lock().unwrap().insert(symbol.to_string());
    }

    pub fn heal_news(&self, symbol: &str) {
        self.failing_news.lock().unwrap().remove(symbol);
    }

    pub fn with_news(self, symbol: &str, items: Vec<NewsItem>) -> Self {
        self.news.lock().unwrap().insert(symbol.to_string(), items);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    async fn enter(&self, call: String) {
        self.calls.lock().unwrap().push(call);
        if let Some(g) = &self.gate {
            g.acquire().await.expect("gate closed").forget();
        }
    }
}

#[async_trait]
impl StockService for ScriptedService {
    async fn list_stocks(&self) -> anyhow::Result<Vec<StockRecord>> {
        self.enter("list".into()).await;
        self.list
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("HTTP 500: Failed to fetch saved stock data"))
    }

    async fn add_stock(&self, symbol: &str) -> anyhow::Result<StockRecord> {
        self.enter(format!("add:{symbol}")).await;
        if self.failing_adds.lock().unwrap().contains(symbol) {
            anyhow::bail!("HTTP 500: Failed to fetch stock data");
        }
        Ok(StockRecord::new(symbol, format!("{symbol} Corp"), 1000.0))
    }

    async fn fetch_news(&self, symbol: &str) -> anyhow::Result<Vec<NewsItem>> {
        self.enter(format!("news:{symbol}")).await;
        if self.failing_news.lock().unwrap().contains(symbol) {
            anyhow::bail!("HTTP 500: crawl failed");
        }
        Ok(self
            .news
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| vec![headline(symbol, 1)]))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn headline(symbol: &str, n: usize) -> NewsItem {
    NewsItem {
        title: format!("{symbol} headline {n}"),
        summary: format!("summary {n}"),
        url: format!("https://news.example/{symbol}/{n}"),
        date: None,
    }
}

pub fn record(symbol: &str, price: f64, ts: &str) -> StockRecord {
    StockRecord::new(symbol, format!("{symbol} Corp"), price).observed(ts)
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub fn shared(svc: ScriptedService) -> Arc<ScriptedService> {
    Arc::new(svc)
}
