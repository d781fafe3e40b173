// tests/http_service.rs
//
// Wire-level tests: HttpStockService against an in-process fake of the
// stock data service bound to an ephemeral port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use stock_dashboard::{DashboardConfig, DashboardController, DashboardError, DashboardView};
use stock_dashboard::{HttpStockService, StockService};

#[derive(Clone, Default)]
struct Fake {
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn saved(State(_): State<Fake>) -> Json<Value> {
    Json(json!({
        "data": [
            {"symbol": "005930", "name": "삼성전자", "price": 71200, "created_at": "2024-05-02T09:00:00+09:00"},
            {"symbol": "005930", "name": "삼성전자", "price": 70800, "created_at": "2024-05-01T09:00:00+09:00"}
        ]
    }))
}

async fn add(State(f): State<Fake>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    f.bodies.lock().unwrap().push(body.clone());
    match body["symbol"].as_str() {
        Some("000000") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to fetch stock data"})),
        ),
        Some(sym) => (
            StatusCode::OK,
            Json(json!({
                "message": "Stock data saved successfully",
                "data": {"symbol": sym, "name": "TIGER 미국S&P500", "price": 18000}
            })),
        ),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid request body"})),
        ),
    }
}

async fn news(State(f): State<Fake>, Json(body): Json<Value>) -> Json<Value> {
    f.bodies.lock().unwrap().push(body.clone());
    if body["symbol"] == "EMPTY" {
        // nil slice on the service side
        return Json(json!({ "data": null }));
    }
    Json(json!({
        "data": [{"title": "실적 발표", "summary": "1분기", "url": "https://n.example/1", "date": ""}]
    }))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "data": [] }))
}

async fn spawn_fake(slow_list: bool) -> (String, Fake) {
    let fake = Fake::default();
    let list = if slow_list { get(slow) } else { get(saved) };
    let app = Router::new()
        .route("/saved-stocks-info", list)
        .route("/stock", post(add))
        .route("/stock-news", post(news))
        .with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), fake)
}

#[tokio::test]
async fn lists_adds_and_fetches_news() {
    let (base, fake) = spawn_fake(false).await;
    let svc = HttpStockService::new(base);

    let list = svc.list_stocks().await.unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|r| r.observed_at_utc().is_some()));

    let rec = svc.add_stock("360750").await.unwrap();
    assert_eq!(rec.symbol, "360750");
    assert!(rec.observed_at.is_none());

    let items = svc.fetch_news("005930").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "실적 발표");

    assert!(svc.fetch_news("EMPTY").await.unwrap().is_empty());

    let bodies = fake.bodies.lock().unwrap().clone();
    assert_eq!(bodies[0], json!({"symbol": "360750"}));
    assert_eq!(bodies[1], json!({"symbol": "005930"}));
}

#[tokio::test]
async fn non_success_status_carries_service_error() {
    let (base, _) = spawn_fake(false).await;
    let svc = HttpStockService::new(base);
    let err = svc.add_stock("000000").await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("500"), "{msg}");
    assert!(msg.contains("Failed to fetch stock data"), "{msg}");
}

#[tokio::test]
async fn unreachable_service_fails_the_load() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dash = DashboardController::with_service(Arc::new(HttpStockService::new(base)));
    dash.refresh().await.unwrap();
    assert!(matches!(dash.snapshot().view, DashboardView::Error(_)));
}

#[tokio::test]
async fn timeout_bounds_a_hung_load() {
    let (base, _) = spawn_fake(true).await;
    let cfg = DashboardConfig {
        base_url: base.clone(),
        timeout_ms: Some(100),
        ..DashboardConfig::default()
    };
    let dash = DashboardController::new(Arc::new(HttpStockService::new(base)), &cfg);
    dash.refresh().await.unwrap();

    let expected = DashboardError::Timeout(100).to_string();
    assert_eq!(dash.snapshot().view, DashboardView::Error(expected));
}

#[tokio::test]
async fn end_to_end_add_through_controller() {
    let (base, _) = spawn_fake(false).await;
    let cfg = DashboardConfig {
        base_url: base,
        ..DashboardConfig::default()
    };
    let dash = stock_dashboard::connect(&cfg).unwrap();
    dash.refresh().await.unwrap();

    dash.submit_symbol("360750").unwrap().await.unwrap().unwrap();
    let failed = dash.submit_symbol("000000").unwrap().await.unwrap();
    assert!(matches!(failed, Err(DashboardError::Service(_))));

    let snap = dash.snapshot();
    assert_eq!(snap.stocks.len(), 3);
    // the added record has no timestamp, so the chart still has one series of two points
    assert_eq!(snap.series.len(), 1);
    assert_eq!(snap.series[0].points.len(), 2);
    assert_eq!(snap.stock_lines()[2], "TIGER 미국S&P500 (360750) - 18000 원");
}
