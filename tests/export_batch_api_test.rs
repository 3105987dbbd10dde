//! End-to-end tests of `GET /monitor/export/batch` through the axum router

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use export_monitor::{
    api::Server,
    config::{Config, DatabaseConfig},
    error::StoreError,
    matcher::BatchMatcher,
    report::JsonReportRenderer,
    store::{MemoryTaskStore, SqliteTaskStore, TaskStore},
    ExportMonitor, ExportTask, TaskStatus,
};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceExt;

fn config() -> Config {
    Config::from_toml(
        r#"
        [api]
        host = "127.0.0.1"
        port = 0

        [database]
        url = "sqlite::memory:"
        max_connections = 1
        "#,
    )
    .unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn task(pk: i64, batch_id: Option<&str>, status: TaskStatus, updated: i64) -> ExportTask {
    ExportTask {
        pk,
        batch_id: batch_id.map(str::to_string),
        device_name: "dcm4chee-arc".to_string(),
        exporter_id: "STORESCU".to_string(),
        status,
        created_time: at(updated),
        updated_time: at(updated),
        scheduled_time: None,
        processing_start_time: None,
        processing_end_time: None,
    }
}

fn router_over(store: Arc<dyn TaskStore>) -> Router {
    let monitor = ExportMonitor::new(store, None);
    Server::new(config(), monitor, Arc::new(JsonReportRenderer::new())).router()
}

fn router(tasks: Vec<ExportTask>) -> Router {
    router_over(Arc::new(MemoryTaskStore::with_tasks(tasks)))
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(router, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

const ZERO_TASKS: [(&str, u64); 6] = [
    ("scheduled", 0),
    ("in-process", 0),
    ("warning", 0),
    ("failed", 0),
    ("canceled", 0),
    ("completed", 0),
];

fn tasks_json(overrides: &[(&str, u64)]) -> Value {
    let mut tasks = serde_json::Map::new();
    for (name, count) in ZERO_TASKS.iter().chain(overrides) {
        tasks.insert(name.to_string(), json!(count));
    }
    Value::Object(tasks)
}

#[tokio::test]
async fn test_batch_sorts_before_older_singleton() {
    let router = router(vec![
        task(1, None, TaskStatus::Completed, 100),
        task(2, Some("b1"), TaskStatus::Failed, 200),
        task(3, Some("b1"), TaskStatus::Completed, 300),
    ]);

    let (status, body) = get_json(&router, "/monitor/export/batch").await;

    assert_eq!(status, StatusCode::OK);
    let batches = body.as_array().unwrap();
    assert_eq!(batches.len(), 2);

    assert_eq!(batches[0]["batchID"], "b1");
    assert_eq!(batches[0]["tasks"], tasks_json(&[("failed", 1), ("completed", 1)]));
    assert_eq!(
        batches[0]["updatedTimeRange"],
        json!(["1970-01-01T00:03:20.000Z", "1970-01-01T00:05:00.000Z"])
    );

    assert!(batches[1].get("batchID").is_none());
    assert_eq!(batches[1]["tasks"], tasks_json(&[("completed", 1)]));
    assert_eq!(
        batches[1]["updatedTimeRange"],
        json!(["1970-01-01T00:01:40.000Z", "1970-01-01T00:01:40.000Z"])
    );
    assert!(batches[1].get("processingStartTimeRange").is_none());
}

#[tokio::test]
async fn test_response_headers() {
    let router = router(vec![task(1, None, TaskStatus::Completed, 100)]);
    let response = router
        .oneshot(Request::builder().uri("/monitor/export/batch").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
}

#[tokio::test]
async fn test_status_without_matches_is_empty_array() {
    let router = router(vec![task(1, Some("b1"), TaskStatus::Completed, 100)]);

    let (status, body) = get(&router, "/monitor/export/batch?status=IN%20PROCESS").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"[]");

    let (status, body) = get(&router, "/monitor/export/batch?status=IN+PROCESS").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"[]");
}

#[tokio::test]
async fn test_filters_by_exporter_and_device() {
    let mut wado = task(2, Some("b2"), TaskStatus::Completed, 200);
    wado.exporter_id = "WADO".to_string();
    let mut other_device = task(3, Some("b3"), TaskStatus::Completed, 300);
    other_device.device_name = "other-arc".to_string();
    let router = router(vec![task(1, Some("b1"), TaskStatus::Completed, 100), wado, other_device]);

    let (_, body) = get_json(&router, "/monitor/export/batch?ExporterID=WADO").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["batchID"], "b2");
    assert_eq!(body[0]["ExporterID"], json!(["WADO"]));

    let (_, body) = get_json(&router, "/monitor/export/batch?dicomDeviceName=other-arc").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["batchID"], "b3");
}

#[tokio::test]
async fn test_updated_time_range_filter() {
    let router = router(vec![
        task(1, Some("old"), TaskStatus::Completed, 0),
        // 1970-01-02T00:00:00Z
        task(2, Some("new"), TaskStatus::Completed, 86_400),
    ]);

    let (status, body) = get_json(&router, "/monitor/export/batch?updatedTime=19700102-").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["batchID"], "new");

    let (_, body) = get_json(&router, "/monitor/export/batch?updatedTime=-19700101").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["batchID"], "old");
}

#[tokio::test]
async fn test_created_time_single_date_is_exact() {
    let router = router(vec![
        task(1, Some("midnight"), TaskStatus::Completed, 0),
        task(2, Some("one-am"), TaskStatus::Completed, 3_600),
    ]);

    let (status, body) = get_json(&router, "/monitor/export/batch?createdTime=19700101").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["batchID"], "midnight");

    let (status, body) = get_json(&router, "/monitor/export/batch?createdTime=19700101-19700101").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|b| b["batchID"].as_str().unwrap()).collect();
    assert_eq!(ids, ["one-am", "midnight"]);
}

#[tokio::test]
async fn test_serves_with_peer_address() {
    let peer: SocketAddr = "192.0.2.10:40000".parse().unwrap();
    let router = router(vec![task(1, Some("b1"), TaskStatus::Completed, 0)]).layer(MockConnectInfo(peer));

    let (status, body) = get_json(&router, "/monitor/export/batch").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["batchID"], "b1");
}

#[tokio::test]
async fn test_invalid_parameters_are_bad_requests() {
    let router = router(vec![task(1, None, TaskStatus::Completed, 100)]);

    for uri in [
        "/monitor/export/batch?orderby=foo",
        "/monitor/export/batch?status=DONE",
        "/monitor/export/batch?status=completed",
        "/monitor/export/batch?createdTime=yesterday",
        "/monitor/export/batch?updatedTime=20180201-20180101",
        "/monitor/export/batch?offset=-1",
        "/monitor/export/batch?limit=0",
        "/monitor/export/batch?limit=123456",
    ] {
        let (status, body) = get_json(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["errorMessage"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_order_message() {
    let router = router(Vec::new());
    let (status, body) = get_json(&router, "/monitor/export/batch?orderby=foo").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errorMessage"].as_str().unwrap().starts_with("Invalid orderby"));
}

fn many_batches() -> Vec<ExportTask> {
    // 12 batches of two tasks each with interleaved update times.
    (0..24)
        .map(|i| {
            let batch = format!("batch-{:02}", i % 12);
            let status = if i % 3 == 0 { TaskStatus::Failed } else { TaskStatus::Completed };
            task(i, Some(&batch), status, (i * 37) % 101)
        })
        .collect()
}

fn max_updated(batch: &Value) -> String {
    batch["updatedTimeRange"][1].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_default_order_is_latest_update_first() {
    let router = router(many_batches());
    let (_, body) = get_json(&router, "/monitor/export/batch").await;
    let batches = body.as_array().unwrap();
    assert_eq!(batches.len(), 12);
    for pair in batches.windows(2) {
        assert!(max_updated(&pair[0]) >= max_updated(&pair[1]));
    }

    let (_, body) = get_json(&router, "/monitor/export/batch?orderby=updatedTime").await;
    let batches = body.as_array().unwrap();
    for pair in batches.windows(2) {
        assert!(max_updated(&pair[0]) <= max_updated(&pair[1]));
    }
}

#[tokio::test]
async fn test_pagination_returns_slice_of_full_sequence() {
    let router = router(many_batches());
    let (_, full) = get_json(&router, "/monitor/export/batch?orderby=-createdTime").await;
    let full = full.as_array().unwrap();

    let (_, page) = get_json(&router, "/monitor/export/batch?orderby=-createdTime&offset=3&limit=4").await;
    assert_eq!(page.as_array().unwrap(), &full[3..7].to_vec());

    let (_, tail) = get_json(&router, "/monitor/export/batch?orderby=-createdTime&offset=10&limit=5").await;
    assert_eq!(tail.as_array().unwrap(), &full[10..].to_vec());
}

#[tokio::test]
async fn test_counts_sum_to_tasks_and_ranges_are_ordered() {
    let router = router(many_batches());
    let (_, body) = get_json(&router, "/monitor/export/batch").await;
    let mut total = 0;
    for batch in body.as_array().unwrap() {
        let counts = batch["tasks"].as_object().unwrap();
        assert_eq!(counts.len(), 6);
        let sum: u64 = counts.values().map(|v| v.as_u64().unwrap()).sum();
        assert_eq!(sum, 2);
        total += sum;

        let range = &batch["updatedTimeRange"];
        assert!(range[0].as_str().unwrap() <= range[1].as_str().unwrap());
    }
    assert_eq!(total, 24);
}

#[tokio::test]
async fn test_repeated_query_is_byte_identical() {
    let router = router(many_batches());
    let (_, first) = get(&router, "/monitor/export/batch?status=FAILED").await;
    let (_, second) = get(&router, "/monitor/export/batch?status=FAILED").await;
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

struct UnavailableStore;

#[async_trait]
impl TaskStore for UnavailableStore {
    async fn list_tasks(&self, _matcher: &BatchMatcher) -> Result<Vec<ExportTask>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }
}

#[tokio::test]
async fn test_store_failure_is_service_unavailable() {
    let router = router_over(Arc::new(UnavailableStore));
    let (status, body) = get_json(&router, "/monitor/export/batch").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["errorMessage"].is_string());
}

#[tokio::test]
async fn test_validation_runs_before_store_access() {
    // The broken store would answer 503; a bad parameter must win.
    let router = router_over(Arc::new(UnavailableStore));
    let (status, _) = get(&router, "/monitor/export/batch?orderby=foo").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sqlite_backed_report() {
    let store = SqliteTaskStore::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .unwrap();
    for t in [
        task(1, None, TaskStatus::Completed, 100),
        task(2, Some("b1"), TaskStatus::Failed, 200),
        task(3, Some("b1"), TaskStatus::Completed, 300),
    ] {
        store.insert_task(&t).await.unwrap();
    }

    let router = router_over(Arc::new(store));
    let (status, body) = get_json(&router, "/monitor/export/batch?status=COMPLETED").await;

    assert_eq!(status, StatusCode::OK);
    let batches = body.as_array().unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0]["batchID"], "b1");
    assert_eq!(batches[0]["tasks"], tasks_json(&[("completed", 1)]));
    assert!(batches[1].get("batchID").is_none());
}

#[tokio::test]
async fn test_health() {
    let router = router(Vec::new());
    let (status, body) = get_json(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
}
