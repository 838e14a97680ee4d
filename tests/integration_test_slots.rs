mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn tomorrow() -> String {
    (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn test_standard_interval_day() {
    let app = TestApp::new().await;
    app.seed_schedule(TestApp::open_week_config(10, vec![])).await;
    let date = tomorrow();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/slots?date={}", date))
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers().get(header::CACHE_CONTROL).unwrap().to_str().unwrap()
            .contains("stale-while-revalidate"),
        "slot responses must carry a short SWR cache directive"
    );

    let slots = parse_body(res).await;
    let slots = slots.as_array().unwrap();

    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0]["time"], "09:00");
    assert_eq!(slots[15]["time"], "16:30");
    assert!(slots.iter().all(|s| s["available"] == json!(true)));
}

#[tokio::test]
async fn test_blocked_date_returns_empty() {
    let app = TestApp::new().await;
    let date = tomorrow();
    app.seed_schedule(TestApp::open_week_config(10, vec![date.clone()])).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/slots?date={}", date))
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let slots = parse_body(res).await;
    assert!(slots.as_array().unwrap().is_empty(), "blocked date must expose no slots");
}

#[tokio::test]
async fn test_past_date_returns_empty() {
    let app = TestApp::new().await;
    app.seed_schedule(TestApp::open_week_config(10, vec![])).await;
    let date = (Utc::now() - Duration::days(2)).format("%Y-%m-%d").to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/slots?date={}", date))
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    let slots = parse_body(res).await;
    assert!(slots.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_closed_weekday_returns_empty() {
    let app = TestApp::new().await;
    let mut config = TestApp::open_week_config(10, vec![]);
    let date = tomorrow();
    let weekday = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap()
        .format("%w").to_string().parse::<usize>().unwrap();
    config["weekday_rules"][weekday]["is_open"] = serde_json::json!(false);
    app.seed_schedule(config).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/slots?date={}", date))
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    let slots = parse_body(res).await;
    assert!(slots.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_consumes_slot() {
    let app = TestApp::new().await;
    app.seed_schedule(TestApp::open_week_config(10, vec![])).await;
    let date = tomorrow();

    let book = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/bookings")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "date": date, "time": "10:00", "name": "Aiko", "email": "aiko@example.com"
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(book.status(), StatusCode::CREATED);

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/slots?date={}", date))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let slots = parse_body(res).await;
    let slots = slots.as_array().unwrap();

    let ten = slots.iter().find(|s| s["time"] == "10:00").unwrap();
    assert_eq!(ten["available"], json!(false));
    let nine = slots.iter().find(|s| s["time"] == "09:00").unwrap();
    assert_eq!(nine["available"], json!(true));
}

#[tokio::test]
async fn test_unseeded_schedule_serves_defaults() {
    // Freshly-provisioned tenant: no schedule document at all. The
    // normalizer's template must still answer.
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/schedule")
            .body(Body::empty()).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers().get(header::CACHE_CONTROL).unwrap().to_str().unwrap()
            .contains("max-age=3600"),
        "schedule summary is long-cacheable"
    );

    let body = parse_body(res).await;
    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["is_open"], json!(false), "Sunday closed by default");
    assert!(days[1]["anchor_times"].as_array().is_some(), "single-slot days expose anchors");
}
