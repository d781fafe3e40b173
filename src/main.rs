//! Stock Dashboard: binary entrypoint
//! Connects to the stock data service, performs the initial load, and serves
//! the dashboard snapshot, chart and intents to the browser view.

use anyhow::Context;
use stock_dashboard::{chart::LogRenderer, metrics::Metrics, DashboardConfig, DashboardView};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; JSON lines when DASHBOARD_LOG_JSON=1.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stock_dashboard=info,warn"));

    let json = std::env::var("DASHBOARD_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = DashboardConfig::load_default()?;
    let metrics = Metrics::init()?;
    let dash = stock_dashboard::connect(&cfg)?;

    dash.refresh().await.context("initial load task")?;
    match dash.snapshot().view {
        DashboardView::Ready => {
            if let Err(e) = dash.render(&LogRenderer) {
                tracing::warn!("chart render failed: {e:#}");
            }
        }
        DashboardView::Error(msg) => tracing::error!(%msg, "dashboard unavailable"),
        DashboardView::Loading => {}
    }

    let app = stock_dashboard::router(dash).merge(metrics.router());
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "dashboard listening");
    axum::serve(listener, app).await.context("serving dashboard")?;
    Ok(())
}
