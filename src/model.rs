// src/model.rs
//! Wire and domain types shared by the synchronizers and the aggregator.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage format used by the service for `created_at` when it is not RFC 3339.
const SERVICE_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One price observation for a symbol at a point in time.
///
/// Timestamps are kept exactly as received; parsing happens on read so that a
/// single malformed record never fails the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    #[serde(rename = "created_at", alias = "observedAt", default)]
    pub observed_at: Option<String>,
    #[serde(alias = "listingDate", default, skip_serializing_if = "Option::is_none")]
    pub listing_date: Option<String>,
}

impl StockRecord {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            observed_at: None,
            listing_date: None,
        }
    }

    pub fn observed(mut self, ts: impl Into<String>) -> Self {
        self.observed_at = Some(ts.into());
        self
    }

    /// Parsed observation time, or `None` when missing/unparseable.
    pub fn observed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.observed_at.as_deref().and_then(parse_timestamp)
    }

    pub fn listing_date(&self) -> Option<NaiveDate> {
        self.listing_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
    }

    /// Name when present, else the symbol.
    pub fn label(&self) -> &str {
        let n = self.name.trim();
        if n.is_empty() {
            &self.symbol
        } else {
            n
        }
    }

    /// Row shown in the stock list under the chart.
    pub fn display_line(&self) -> String {
        format!("{} ({}) - {} 원", self.label(), self.symbol, format_price(self.price))
    }
}

/// Accepts RFC 3339 and the service's `YYYY-MM-DD HH:MM:SS` (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, SERVICE_TS_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{}", price as i64)
    } else {
        format!("{price:.2}")
    }
}

/// One news headline attached to a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}
