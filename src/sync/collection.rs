// src/sync/collection.rs
//! # Collection Synchronizer
//! Owns the canonical stock collection.
//!
//! `Idle → Loading → {Ready, Failed}`. The collection is loaded once per
//! lifetime and then only grows by appending records returned from
//! successful adds. Overlapping adds are allowed and are not de-duplicated.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use metrics::gauge;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{DashboardError, Result};
use crate::model::StockRecord;
use crate::service::DynStockService;
use crate::sync::bounded;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum CollectionState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Point-in-time copy of everything the collection synchronizer owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSnapshot {
    pub state: CollectionState,
    pub records: Vec<StockRecord>,
    pub add_error: Option<DashboardError>,
    pub adds_in_flight: usize,
}

#[derive(Debug)]
struct Inner {
    state: CollectionState,
    records: Vec<StockRecord>,
    add_error: Option<DashboardError>,
    adds_in_flight: usize,
}

#[derive(Clone)]
pub struct CollectionSynchronizer {
    service: DynStockService,
    timeout: Option<Duration>,
    inner: Arc<Mutex<Inner>>,
}

impl CollectionSynchronizer {
    pub fn new(service: DynStockService, timeout: Option<Duration>) -> Self {
        Self {
            service,
            timeout,
            inner: Arc::new(Mutex::new(Inner {
                state: CollectionState::Idle,
                records: Vec::new(),
                add_error: None,
                adds_in_flight: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("collection mutex poisoned")
    }

    /// Initial read of the collection. Only the first call does anything.
    pub async fn load(&self) {
        {
            let mut inner = self.lock();
            if inner.state != CollectionState::Idle {
                warn!(state = ?inner.state, "collection already loaded; ignoring load()");
                return;
            }
            inner.state = CollectionState::Loading;
        }

        let res = bounded(self.timeout, self.service.list_stocks()).await;

        let mut inner = self.lock();
        match res {
            Ok(records) => {
                info!(
                    count = records.len(),
                    service = self.service.name(),
                    "stock collection loaded"
                );
                inner.records = records;
                inner.state = CollectionState::Ready;
                gauge!("dashboard_collection_size").set(inner.records.len() as f64);
            }
            Err(e) => {
                warn!(error = %e, "stock collection load failed");
                inner.records.clear();
                inner.state = CollectionState::Failed(e.to_string());
            }
        }
    }

    /// Validate and register an add without touching the network.
    ///
    /// Blank input is recorded as the add error. Outside `Ready` the call is
    /// refused with `NotReady` and nothing is recorded. On success the add
    /// counts as in flight and the trimmed symbol is returned; the caller must
    /// follow up with [`finish_add`](Self::finish_add).
    pub fn begin_add(&self, symbol: &str) -> Result<String> {
        let mut inner = self.lock();
        if inner.state != CollectionState::Ready {
            return Err(DashboardError::NotReady);
        }
        let symbol = symbol.trim();
        if symbol.is_empty() {
            let err = DashboardError::Validation("symbol must not be empty".into());
            inner.add_error = Some(err.clone());
            return Err(err);
        }
        inner.adds_in_flight += 1;
        Ok(symbol.to_string())
    }

    /// Issue the create request for a symbol accepted by `begin_add`.
    pub async fn finish_add(&self, symbol: String) -> Result<StockRecord> {
        let res = bounded(self.timeout, self.service.add_stock(&symbol)).await;

        let mut inner = self.lock();
        inner.adds_in_flight = inner.adds_in_flight.saturating_sub(1);
        match res {
            Ok(record) => {
                info!(symbol = %symbol, name = %record.name, "stock added");
                inner.records.push(record.clone());
                inner.add_error = None;
                gauge!("dashboard_collection_size").set(inner.records.len() as f64);
                Ok(record)
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "add stock failed");
                inner.add_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub async fn add_stock(&self, symbol: &str) -> Result<StockRecord> {
        let symbol = self.begin_add(symbol)?;
        self.finish_add(symbol).await
    }

    pub fn state(&self) -> CollectionState {
        self.lock().state.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().state == CollectionState::Ready
    }

    pub fn records(&self) -> Vec<StockRecord> {
        self.lock().records.clone()
    }

    pub fn add_error(&self) -> Option<DashboardError> {
        self.lock().add_error.clone()
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        let inner = self.lock();
        CollectionSnapshot {
            state: inner.state.clone(),
            records: inner.records.clone(),
            add_error: inner.add_error.clone(),
            adds_in_flight: inner.adds_in_flight,
        }
    }
}
