// src/chart.rs
//! Chart description handed to the rendering capability.
//!
//! The layout mirrors what a time-axis line chart library expects: one dataset
//! per series plus axis options. Drawing itself is the renderer's business.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::aggregate::TimeSeries;

pub const CHART_TITLE: &str = "Stock Price Chart";
const FILL_RGBA: &str = "rgba(75,192,192,0.2)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: DateTime<Utc>,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub symbol: String,
    pub data: Vec<ChartPoint>,
    pub border_color: String,
    pub background_color: String,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip_format: Option<&'static str>,
    pub title: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub title: &'static str,
    pub tooltip_mode: &'static str,
    pub intersect: bool,
    pub x: Axis,
    pub y: Axis,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: CHART_TITLE,
            tooltip_mode: "index",
            intersect: false,
            x: Axis {
                kind: Some("time"),
                unit: Some("day"),
                tooltip_format: Some("MM/dd/yyyy"),
                title: "Date",
            },
            y: Axis {
                kind: None,
                unit: None,
                tooltip_format: None,
                title: "Price (원)",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

impl ChartSpec {
    pub fn from_series(series: &[TimeSeries]) -> Self {
        let datasets = series
            .iter()
            .map(|s| Dataset {
                label: s.display_label.clone(),
                symbol: s.symbol.clone(),
                data: s
                    .points
                    .iter()
                    .map(|p| ChartPoint { x: p.ts, y: p.price })
                    .collect(),
                border_color: s.color.to_string(),
                background_color: FILL_RGBA.to_string(),
                fill: true,
            })
            .collect();
        Self {
            datasets,
            options: ChartOptions::default(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.datasets.iter().map(|d| d.data.len()).sum()
    }
}

/// Drawing capability: accepts a prepared chart and renders it somewhere.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &ChartSpec) -> Result<()>;
}

/// Renderer used by the binary when no browser is attached: logs a summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRenderer;

impl ChartRenderer for LogRenderer {
    fn render(&self, chart: &ChartSpec) -> Result<()> {
        for d in &chart.datasets {
            let last = d.data.last().map(|p| p.y);
            info!(
                target: "chart",
                symbol = %d.symbol,
                label = %d.label,
                points = d.data.len(),
                last = ?last,
                color = %d.border_color,
                "series"
            );
        }
        info!(
            target: "chart",
            datasets = chart.datasets.len(),
            points = chart.point_count(),
            "{}",
            chart.options.title
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate_with, PaletteColors};
    use crate::model::StockRecord;

    #[test]
    fn builds_one_dataset_per_series() {
        let records = vec![
            StockRecord::new("AAA", "Alpha", 2.0).observed("2024-01-02T00:00:00Z"),
            StockRecord::new("BBB", "", 5.0).observed("2024-01-01T00:00:00Z"),
            StockRecord::new("AAA", "Alpha", 1.0).observed("2024-01-01T00:00:00Z"),
        ];
        let series = aggregate_with(&records, &mut PaletteColors::default());
        let chart = ChartSpec::from_series(&series);

        assert_eq!(chart.datasets.len(), 2);
        assert_eq!(chart.point_count(), 3);
        assert_eq!(chart.datasets[0].label, "Alpha");
        assert_eq!(chart.datasets[0].border_color, "#1F77B4");
        assert_eq!(chart.datasets[1].label, "BBB");
        assert!(chart.datasets.iter().all(|d| d.fill));
    }

    #[test]
    fn serializes_axis_options() {
        let v = serde_json::to_value(ChartSpec::from_series(&[])).unwrap();
        assert_eq!(v["options"]["x"]["type"], "time");
        assert_eq!(v["options"]["x"]["tooltipFormat"], "MM/dd/yyyy");
        assert!(v["options"]["y"].get("type").is_none());
        assert_eq!(v["datasets"].as_array().map(|a| a.len()), Some(0));
    }
}
