// src/api.rs
//! Browser-facing JSON surface over one [`DashboardController`].

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::chart::ChartSpec;
use crate::dashboard::{DashboardController, DashboardSnapshot};
use crate::error::DashboardError;

pub type AppState = Arc<DashboardController>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/dashboard", get(dashboard))
        .route("/chart", get(chart))
        .route("/stocks", post(submit_stock))
        .route("/news/toggle", post(toggle_news))
        .route("/news/panel", post(toggle_panel))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct SymbolReq {
    #[serde(default)]
    symbol: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
            DashboardError::NotReady => StatusCode::CONFLICT,
            DashboardError::Service(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        };
        (status, Json(json!({ "error": self }))).into_response()
    }
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.snapshot())
}

async fn chart(State(state): State<AppState>) -> Json<ChartSpec> {
    Json(state.chart())
}

/// The add runs in the background; its outcome shows up in `/dashboard`.
async fn submit_stock(
    State(state): State<AppState>,
    Json(body): Json<SymbolReq>,
) -> Result<(StatusCode, Json<serde_json::Value>), DashboardError> {
    state.submit_symbol(&body.symbol)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "accepted": body.symbol.trim() })),
    ))
}

async fn toggle_news(
    State(state): State<AppState>,
    Json(body): Json<SymbolReq>,
) -> Result<Json<serde_json::Value>, DashboardError> {
    let toggled = state.toggle_news(&body.symbol)?;
    Ok(Json(json!({
        "symbol": body.symbol.trim(),
        "outcome": toggled.outcome,
        "fetching": toggled.pending.is_some(),
    })))
}

async fn toggle_panel(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, DashboardError> {
    let open = state.toggle_all_news_panel()?;
    Ok(Json(json!({ "open": open })))
}
