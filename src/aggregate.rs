// src/aggregate.rs
//! # Series Aggregator
//! Turns the flat, arrival-ordered stock collection into one time series per
//! symbol, ready for the chart.
//!
//! The output is never stored: callers recompute it from the current
//! collection on every read.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::model::StockRecord;

/// 24-bit RGB color, rendered as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesColor(u32);

impl SeriesColor {
    pub const MAX: u32 = 0xFF_FF_FF;

    /// Masks to 24 bits so every value is a full 6-hex-digit color.
    pub fn from_rgb(rgb: u32) -> Self {
        Self(rgb & Self::MAX)
    }

    pub fn rgb(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SeriesColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl Serialize for SeriesColor {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Chooses a color for the `index`-th series (in first-appearance order).
pub trait ColorPicker {
    fn pick(&mut self, index: usize) -> SeriesColor;
}

/// Uniformly random colors over the whole 16^6 space.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomColors;

impl ColorPicker for RandomColors {
    fn pick(&mut self, _index: usize) -> SeriesColor {
        SeriesColor::from_rgb(rand::rng().random_range(0..=SeriesColor::MAX))
    }
}

/// Deterministic colors: a fixed palette, then a golden-ratio walk once the
/// palette is exhausted.
#[derive(Debug, Clone)]
pub struct PaletteColors {
    palette: Vec<SeriesColor>,
}

impl Default for PaletteColors {
    fn default() -> Self {
        let palette = [
            0x1F77B4, 0xFF7F0E, 0x2CA02C, 0xD62728, 0x9467BD, 0x8C564B, 0xE377C2, 0x7F7F7F,
            0xBCBD22, 0x17BECF,
        ]
        .into_iter()
        .map(SeriesColor::from_rgb)
        .collect();
        Self { palette }
    }
}

impl PaletteColors {
    pub fn new(palette: Vec<SeriesColor>) -> Self {
        Self { palette }
    }
}

impl ColorPicker for PaletteColors {
    fn pick(&mut self, index: usize) -> SeriesColor {
        match self.palette.get(index) {
            Some(c) => *c,
            None => SeriesColor::from_rgb((index as u32).wrapping_mul(0x9E_37_79)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub ts: DateTime<Utc>,
    pub price: f64,
}

/// Time-ordered price points for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub symbol: String,
    pub display_label: String,
    pub color: SeriesColor,
    pub points: Vec<SeriesPoint>,
}

/// Aggregate with random colors (the dashboard default).
pub fn aggregate(records: &[StockRecord]) -> Vec<TimeSeries> {
    aggregate_with(records, &mut RandomColors)
}

/// Partition by symbol (first-appearance order), then stable-sort each
/// partition by timestamp. Records without a parseable timestamp are skipped
/// for their own symbol only.
pub fn aggregate_with(records: &[StockRecord], colors: &mut dyn ColorPicker) -> Vec<TimeSeries> {
    struct Partition<'a> {
        symbol: &'a str,
        label: Option<&'a str>,
        points: Vec<SeriesPoint>,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut parts: Vec<Partition<'_>> = Vec::new();
    let mut skipped = 0usize;

    for rec in records {
        let slot = *index.entry(rec.symbol.as_str()).or_insert_with(|| {
            parts.push(Partition {
                symbol: rec.symbol.as_str(),
                label: None,
                points: Vec::new(),
            });
            parts.len() - 1
        });
        let part = &mut parts[slot];

        if part.label.is_none() && !rec.name.trim().is_empty() {
            part.label = Some(rec.name.trim());
        }

        match rec.observed_at_utc() {
            Some(ts) => part.points.push(SeriesPoint {
                ts,
                price: rec.price,
            }),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "records without a usable timestamp left out of the chart");
    }

    let mut out = Vec::with_capacity(parts.len());
    for part in parts.into_iter().filter(|p| !p.points.is_empty()) {
        let mut points = part.points;
        // stable: equal timestamps keep arrival order
        points.sort_by_key(|p| p.ts);
        let color = colors.pick(out.len());
        out.push(TimeSeries {
            symbol: part.symbol.to_string(),
            display_label: part.label.unwrap_or(part.symbol).to_string(),
            color,
            points,
        });
    }
    out
}
