use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use demand_forecast::data::HistoricalData;
use demand_forecast::sample::generate;
use forecast_server::{app, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut records = generate(&["ITEM001", "ITEM002"], start, 200, 42).unwrap();
    records.extend(generate(&["TINY"], start, 10, 42).unwrap());

    let data = HistoricalData::from_records(records);
    app(AppState::new(Arc::new(data)))
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let response = test_app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn health_reports_dataset_state() {
    let (status, json) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dataset_loaded"], true);
    assert_eq!(json["records"], 410);
}

#[tokio::test]
async fn items_are_listed_sorted() {
    let (status, json) = get("/items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["items"],
        serde_json::json!(["ITEM001", "ITEM002", "TINY"])
    );
}

#[tokio::test]
async fn forecast_returns_both_targets() {
    let (status, json) = get("/forecast/ITEM001?days=10&model=arima").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["item_id"], "ITEM001");
    assert_eq!(json["model"], "arima");
    assert_eq!(json["forecast_days"], 10);
    assert_eq!(json["targets"]["demand"]["points"].as_array().unwrap().len(), 10);
    assert_eq!(json["targets"]["price"]["points"].as_array().unwrap().len(), 10);

    let first = &json["targets"]["demand"]["points"][0];
    assert!(first["date"].is_string());
    assert!(first["forecast"].is_number());
    assert!(first["lower"].is_number());
    assert!(first["upper"].is_number());
}

#[tokio::test]
async fn unknown_item_is_404() {
    let (status, json) = get("/forecast/GHOST?days=10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("GHOST"));
}

#[tokio::test]
async fn insufficient_data_is_400() {
    let (status, _) = get("/forecast/TINY?days=10&model=arima").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn out_of_range_days_is_400() {
    let (status, _) = get("/forecast/ITEM001?days=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get("/forecast/ITEM001?days=366").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_model_is_400() {
    let (status, json) = get("/forecast/ITEM001?days=10&model=lstm").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("lstm"));
}

#[tokio::test]
async fn metrics_cover_both_targets() {
    let (status, json) = get("/metrics/ITEM001?model=arima").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["model"], "arima");
    assert!(json["metrics"]["demand"].is_object());
    assert!(json["metrics"]["price"].is_object());
}

#[tokio::test]
async fn cost_analysis_accepts_known_periods() {
    let (status, json) = get("/cost-analysis/ITEM001?period=30d").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["period"], "30d");
    assert_eq!(json["records"], 30);
    assert!(json["avg_cost"].is_number());

    let (status, _) = get("/cost-analysis/ITEM001?period=2w").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
