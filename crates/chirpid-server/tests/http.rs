use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chirpid::{
    CUSTOM_EPOCH, LockSnowflakeGenerator, MachineId, Result, SnowflakeId, SystemClock, TimeSource,
};
use chirpid_server::router;
use serde_json::Value;
use tower::ServiceExt;

#[derive(Clone)]
struct ManualClock(Arc<AtomicU64>);

impl TimeSource for ManualClock {
    fn current_millis(&self) -> Result<u64> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

fn system_app(machine_id: i64) -> Router {
    router(LockSnowflakeGenerator::try_new(machine_id, SystemClock::default()).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn root_reports_machine_id() {
    let app = system_app(17);
    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Snowflake ID Service");
    assert_eq!(body["machine_id"], 17);
}

#[tokio::test]
async fn health_is_serving() {
    let (status, _, body) = get(&system_app(0), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "serving");
}

#[tokio::test]
async fn issues_increasing_ids() {
    let app = system_app(5);

    let (status, _, first) = get(&app, "/id").await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, second) = get(&app, "/id").await;

    let first = first["id"].as_u64().unwrap();
    let second = second["id"].as_u64().unwrap();
    assert!(second > first);
    assert_eq!(SnowflakeId::try_from(first).unwrap().machine_id(), 5);
}

#[tokio::test]
async fn issues_batches() {
    let app = system_app(1);

    let (status, _, body) = get(&app, "/ids/5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    let ids: Vec<u64> = body["ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .collect();
    assert_eq!(ids.len(), 5);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let (status, _, body) = get(&app, "/ids/1000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1000);
    assert_eq!(body["ids"].as_array().unwrap().len(), 1000);
}

#[tokio::test]
async fn rejects_bad_batch_counts() {
    let app = system_app(1);
    for uri in ["/ids/0", "/ids/1001", "/ids/-1", "/ids/abc"] {
        let (status, _, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn parses_known_id() {
    let id = SnowflakeId::from_components(1000, 3, 7);
    let (status, _, body) = get(&system_app(0), &format!("/parse/{id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.to_raw());
    assert_eq!(body["timestamp"], CUSTOM_EPOCH.as_millis() as u64 + 1000);
    assert_eq!(body["timestamp_offset"], 1000);
    assert_eq!(body["machine_id"], 3);
    assert_eq!(body["sequence"], 7);
    assert_eq!(body["datetime"], "2025-01-01 00:00:01.000");
}

#[tokio::test]
async fn parses_what_it_issues() {
    let app = system_app(9);
    let (_, _, issued) = get(&app, "/id").await;
    let raw = issued["id"].as_u64().unwrap();

    let (status, _, parsed) = get(&app, &format!("/parse/{raw}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parsed["id"], raw);
    assert_eq!(parsed["machine_id"], 9);
    assert_eq!(parsed["sequence"], SnowflakeId::try_from(raw).unwrap().sequence());
}

#[tokio::test]
async fn rejects_bad_ids() {
    let app = system_app(0);
    for uri in ["/parse/-1", "/parse/9223372036854775808", "/parse/abc"] {
        let (status, _, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn clock_regression_is_retryable() {
    let clock = ManualClock(Arc::new(AtomicU64::new(500)));
    let app = router(LockSnowflakeGenerator::new(
        MachineId::new(2).unwrap(),
        clock.clone(),
    ));

    let (status, _, _) = get(&app, "/id").await;
    assert_eq!(status, StatusCode::OK);

    clock.0.store(400, Ordering::SeqCst);
    let (status, headers, body) = get(&app, "/id").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(headers[header::RETRY_AFTER], "1");
    assert!(body["error"].as_str().unwrap().contains("backwards"));

    let (status, _, _) = get(&app, "/ids/3").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    clock.0.store(501, Ordering::SeqCst);
    let (status, _, _) = get(&app, "/id").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn clock_before_epoch_is_internal_error() {
    let future_epoch = CUSTOM_EPOCH + Duration::from_secs(500 * 365 * 24 * 3600);
    let app = router(LockSnowflakeGenerator::new(
        MachineId::new(0).unwrap(),
        SystemClock::with_epoch(future_epoch),
    ));

    let (status, headers, body) = get(&app, "/id").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers.get(header::RETRY_AFTER).is_none());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn cors_is_open() {
    let response = system_app(0)
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "https://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
