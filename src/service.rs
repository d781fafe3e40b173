// src/service.rs
//! Remote data-service seam.
//!
//! The dashboard never talks HTTP directly: it is handed an
//! `Arc<dyn StockService>`. [`HttpStockService`] is the production
//! implementation; tests inject in-memory fakes.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::model::{NewsItem, StockRecord};

pub const LIST_PATH: &str = "/saved-stocks-info";
pub const ADD_PATH: &str = "/stock";
pub const NEWS_PATH: &str = "/stock-news";

#[async_trait]
pub trait StockService: Send + Sync {
    /// GET the tracked collection, in server order.
    async fn list_stocks(&self) -> Result<Vec<StockRecord>>;
    /// POST a new symbol; returns the record the service created.
    async fn add_stock(&self, symbol: &str) -> Result<StockRecord>;
    /// POST a news lookup for one symbol.
    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &'static str;
}

pub type DynStockService = Arc<dyn StockService>;

#[derive(Serialize)]
struct SymbolReq<'a> {
    symbol: &'a str,
}

// The service serializes empty slices as `null`.
#[derive(Deserialize)]
struct ListResp<T> {
    data: Option<Vec<T>>,
}

#[derive(Deserialize)]
struct AddResp {
    #[serde(default)]
    message: Option<String>,
    data: StockRecord,
}

#[derive(Deserialize)]
struct ErrorResp {
    error: String,
}

#[derive(Clone)]
pub struct HttpStockService {
    base_url: String,
    client: Client,
}

impl HttpStockService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn from_config(cfg: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stock-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")?;
        Ok(Self::with_client(cfg.base_url.clone(), client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(op: &'static str, resp: Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await.with_context(|| format!("{op}: reading body"))?;

        if !status.is_success() {
            counter!("dashboard_request_failures_total", "op" => op).increment(1);
            let detail = serde_json::from_str::<ErrorResp>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.trim().chars().take(200).collect());
            return Err(anyhow!("{op}: HTTP {status}: {detail}"));
        }

        serde_json::from_str(&body).with_context(|| format!("{op}: parsing response JSON"))
    }

    async fn send(&self, op: &'static str, req: reqwest::RequestBuilder) -> Result<Response> {
        counter!("dashboard_requests_total", "op" => op).increment(1);
        match req.send().await {
            Ok(resp) => Ok(resp),
            Err(e) => {
                tracing::warn!(error = ?e, op, "stock service transport error");
                counter!("dashboard_request_failures_total", "op" => op).increment(1);
                Err(e).with_context(|| format!("{op}: request failed"))
            }
        }
    }
}

#[async_trait]
impl StockService for HttpStockService {
    async fn list_stocks(&self) -> Result<Vec<StockRecord>> {
        let op = "list_stocks";
        let resp = self.send(op, self.client.get(self.url(LIST_PATH))).await?;
        let parsed: ListResp<StockRecord> = Self::decode(op, resp).await?;
        Ok(parsed.data.unwrap_or_default())
    }

    async fn add_stock(&self, symbol: &str) -> Result<StockRecord> {
        let op = "add_stock";
        let req = self.client.post(self.url(ADD_PATH)).json(&SymbolReq { symbol });
        let resp = self.send(op, req).await?;
        let parsed: AddResp = Self::decode(op, resp).await?;
        if let Some(msg) = parsed.message.as_deref() {
            tracing::debug!(symbol, message = msg, "add_stock acknowledged");
        }
        Ok(parsed.data)
    }

    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>> {
        let op = "fetch_news";
        let req = self.client.post(self.url(NEWS_PATH)).json(&SymbolReq { symbol });
        let resp = self.send(op, req).await?;
        let parsed: ListResp<NewsItem> = Self::decode(op, resp).await?;
        Ok(parsed.data.unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
