// src/error.rs
//! User-visible error taxonomy.
//!
//! Transport failures arrive from the [`StockService`](crate::service::StockService)
//! seam as `anyhow::Error` and are folded into [`DashboardError::Service`] or
//! [`DashboardError::Timeout`] by the synchronizer that owns the request.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum DashboardError {
    /// Rejected before any network call (e.g. blank symbol).
    #[error("invalid input: {0}")]
    Validation(String),

    /// Intent issued while the collection has not finished loading.
    #[error("dashboard is not ready")]
    NotReady,

    /// Non-success response or transport failure.
    #[error("service error: {0}")]
    Service(String),

    /// Configured `timeout_ms` elapsed before the service answered.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

impl DashboardError {
    pub(crate) fn from_service(err: &anyhow::Error) -> Self {
        DashboardError::Service(format!("{err:#}"))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DashboardError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
