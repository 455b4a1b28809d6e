//! Scrapes the exporter router backed by a real Sensu client and an
//! in-process fake Sensu API.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use sensu_api::{ClientConfig, SensuClient};
use sensu_exporter::{
    run, CheckCollector, CollectorOptions, ExporterConfig, ExporterError, ExporterServer,
    ScrapeRegistry,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn upstream_with(results: Value) -> Router {
    Router::new().route("/results", get(move || async move { Json(results) }))
}

fn exporter_for(base_url: &str, options: CollectorOptions) -> ExporterServer<SensuClient> {
    let client = SensuClient::new(
        ClientConfig::new(base_url).with_timeout(Duration::from_secs(2)),
    )
    .unwrap();
    ExporterServer::new(ScrapeRegistry::new(CheckCollector::new(client, options)), "/metrics")
}

async fn scrape(server: &ExporterServer<SensuClient>, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn sample_lines(body: &str) -> Vec<&str> {
    body.lines()
        .filter(|line| line.starts_with("sensu_check_status{"))
        .collect()
}

#[tokio::test]
async fn passing_check_is_exported_as_up() {
    let base = spawn_upstream(upstream_with(json!([
        {"client": "node1", "check": {"name": "disk", "status": 0, "output": "OK"}}
    ])))
    .await;
    let server = exporter_for(&base, CollectorOptions::new());

    let (status, body) = scrape(&server, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        body.lines()
            .any(|line| line == "# HELP sensu_check_status Sensu Check Status(1:Up, 0:Down).")
    );
    assert!(body.contains("# TYPE sensu_check_status gauge"));
    let samples = sample_lines(&body);
    assert_eq!(samples.len(), 1);
    assert!(samples[0].starts_with(r#"sensu_check_status{client="node1",check_name="disk"} 1"#));
}

#[tokio::test]
async fn pascal_case_payload_is_understood() {
    let base = spawn_upstream(upstream_with(json!([
        {"Client": "node1", "Check": {"Name": "disk", "Status": 0}}
    ])))
    .await;
    let server = exporter_for(&base, CollectorOptions::new());

    let (_, body) = scrape(&server, "/metrics").await;

    let samples = sample_lines(&body);
    assert_eq!(samples.len(), 1);
    assert!(samples[0].starts_with(r#"sensu_check_status{client="node1",check_name="disk"} 1"#));
}

#[tokio::test]
async fn severity_labels_describe_failing_check() {
    let base = spawn_upstream(upstream_with(json!([
        {"client": "node1", "check": {"name": "disk", "status": 2, "output": "DISK CRITICAL"}},
        {"client": "node2", "check": {"name": "load", "status": 1, "output": "LOAD WARNING"}}
    ])))
    .await;
    let server = exporter_for(&base, CollectorOptions::new().with_severity_labels(true));

    let (_, body) = scrape(&server, "/metrics").await;

    let samples = sample_lines(&body);
    assert_eq!(samples.len(), 2);
    assert!(body.contains(
        r#"sensu_check_status{client="node1",check_name="disk",check_message="DISK CRITICAL",check_severity="critical"} 0"#
    ));
    assert!(body.contains(
        r#"sensu_check_status{client="node2",check_name="load",check_message="LOAD WARNING",check_severity="warning"} 0"#
    ));
}

#[tokio::test]
async fn check_output_is_escaped_in_labels() {
    let base = spawn_upstream(upstream_with(json!([
        {"client": "node1", "check": {
            "name": "http",
            "status": 2,
            "output": "CheckHttp CRITICAL: \"GET /\" failed\nréponse: C:\\logs"
        }}
    ])))
    .await;
    let server = exporter_for(&base, CollectorOptions::new().with_severity_labels(true));

    let (status, body) = scrape(&server, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let samples = sample_lines(&body);
    assert_eq!(samples.len(), 1);
    assert!(samples[0].contains(
        r#"check_message="CheckHttp CRITICAL: \"GET /\" failed\nréponse: C:\\logs",check_severity="critical"} 0"#
    ));
    assert!(
        body.lines()
            .all(|line| line.starts_with('#') || line.starts_with("sensu_check_status{"))
    );
}

#[tokio::test]
async fn unreachable_api_yields_empty_scrape() {
    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = unused.local_addr().unwrap();
    drop(unused);
    let server = exporter_for(&format!("http://{addr}"), CollectorOptions::new());

    let (status, body) = scrape(&server, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(sample_lines(&body).is_empty());
}

#[tokio::test]
async fn api_error_status_yields_empty_scrape() {
    let router = Router::new().route(
        "/results",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let server = exporter_for(&spawn_upstream(router).await, CollectorOptions::new());

    let (status, body) = scrape(&server, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(sample_lines(&body).is_empty());
}

#[tokio::test]
async fn cached_exporter_serves_previous_snapshot() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let router = Router::new().route(
        "/results",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Json(json!([
                    {"client": "node1", "check": {"name": "disk", "status": if n == 0 { 0 } else { 2 }}}
                ]))
            }
        }),
    );
    let server = exporter_for(
        &spawn_upstream(router).await,
        CollectorOptions::new().with_cache(true),
    );

    // First scrape fetches synchronously.
    let (_, first) = scrape(&server, "/metrics").await;
    assert!(first.contains(r#"check_name="disk"} 1"#));

    // Second scrape is answered from the cache while a refresh runs.
    let (_, second) = scrape(&server, "/metrics").await;
    assert!(second.contains(r#"check_name="disk"} 1"#));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(hits.load(Ordering::SeqCst) >= 2);

    let (_, third) = scrape(&server, "/metrics").await;
    assert!(third.contains(r#"check_name="disk"} 0"#));
}

#[tokio::test]
async fn root_points_at_metrics_path() {
    let server = exporter_for("http://127.0.0.1:1", CollectorOptions::new());

    let (status, body) = scrape(&server, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/metrics");
}

#[tokio::test]
async fn run_rejects_invalid_config() {
    let config = ExporterConfig::new(SocketAddr::from(([127, 0, 0, 1], 0))).with_api_url("not a url");

    let err = run(config, async {}).await.unwrap_err();

    assert!(matches!(err, ExporterError::Api(sensu_api::ApiError::InvalidUrl { .. })));
}

#[tokio::test]
async fn run_reports_bind_failure() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = taken.local_addr().unwrap();

    let err = run(ExporterConfig::new(addr), async {}).await.unwrap_err();

    assert!(matches!(err, ExporterError::BindFailed(a, _) if a == addr));
}
