// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod service;
pub mod sync;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, aggregate_with, SeriesColor, TimeSeries};
pub use crate::api::router;
pub use crate::config::DashboardConfig;
pub use crate::dashboard::{DashboardController, DashboardSnapshot, DashboardView};
pub use crate::error::DashboardError;
pub use crate::model::{NewsItem, StockRecord};
pub use crate::service::{HttpStockService, StockService};

use std::sync::Arc;

/// Build a controller against the real HTTP service described by `cfg`.
///
/// ```ignore
/// let cfg = stock_dashboard::DashboardConfig::load_default()?;
/// let dash = stock_dashboard::connect(&cfg)?;
/// dash.refresh().await?;
/// ```
pub fn connect(cfg: &DashboardConfig) -> anyhow::Result<Arc<DashboardController>> {
    let service = HttpStockService::from_config(cfg)?;
    tracing::info!(base_url = service.base_url(), timeout_ms = ?cfg.timeout_ms, "stock service configured");
    Ok(Arc::new(DashboardController::new(Arc::new(service), cfg)))
}
